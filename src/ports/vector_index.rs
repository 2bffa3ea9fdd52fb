//! Vector Index Port - nearest-neighbour lookup over seeded example reasons.
//!
//! The index holds example weight-loss reasons, each tagged with whether it
//! qualifies. The classifier only ever asks for the single nearest match.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Metadata stored with each example vector.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReasonMetadata {
    /// The example phrase that was embedded.
    pub reason: Option<String>,
    /// Whether the example is a qualifying (health) reason.
    pub qualified: Option<bool>,
}

/// The closest stored vector to a query.
#[derive(Debug, Clone, PartialEq)]
pub struct NearestMatch {
    pub id: String,
    /// Similarity reported by the index. Absent if the backend omits it.
    pub score: Option<f32>,
    pub metadata: ReasonMetadata,
}

/// A vector to write into the index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedVector {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: ReasonMetadata,
}

/// Port for vector similarity search.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Returns the single nearest stored vector, or `None` if the index is empty.
    async fn query_nearest(&self, vector: &[f32]) -> Result<Option<NearestMatch>, VectorIndexError>;

    /// Inserts or replaces vectors by id.
    async fn upsert(&self, vectors: Vec<IndexedVector>) -> Result<(), VectorIndexError>;
}

/// Vector index errors.
#[derive(Debug, thiserror::Error)]
pub enum VectorIndexError {
    #[error("vector index request failed: {0}")]
    Request(String),

    #[error("vector index returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("invalid vector index response: {0}")]
    Parse(String),

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
