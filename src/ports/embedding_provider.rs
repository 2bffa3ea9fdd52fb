//! Embedding Provider Port - turns text into a dense vector.

use async_trait::async_trait;

use super::AIError;

/// Port for text embedding models.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AIError>;
}
