//! Seeds the vector index with the example reasons.

use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::funnel::reasons::{QUALIFYING_EXAMPLES, REJECTING_EXAMPLES};
use crate::ports::{AIError, EmbeddingProvider, IndexedVector, ReasonMetadata, VectorIndex, VectorIndexError};

/// Why seeding stopped.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to embed example '{reason}': {source}")]
    Embedding {
        reason: String,
        #[source]
        source: AIError,
    },

    #[error("failed to upsert examples: {0}")]
    Upsert(#[from] VectorIndexError),
}

/// Embeds every example reason and writes them in one upsert.
///
/// Ids are `qualified-{i}` and `rejected-{i}`, so re-seeding replaces
/// rather than duplicates.
pub struct ReasonSeeder {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
}

impl ReasonSeeder {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Seeds the index, logging instead of failing.
    ///
    /// Returns whether the examples were written. The classifier keeps
    /// working either way.
    pub async fn seed(&self) -> bool {
        match self.try_seed().await {
            Ok(count) => {
                info!(count, "Seeded example reasons");
                true
            }
            Err(e) => {
                warn!(stage = "index_seed", error = %e, "Seeding example reasons failed");
                false
            }
        }
    }

    pub async fn try_seed(&self) -> Result<usize, SeedError> {
        let examples = QUALIFYING_EXAMPLES
            .iter()
            .enumerate()
            .map(|(i, reason)| (format!("qualified-{}", i), *reason, true))
            .chain(
                REJECTING_EXAMPLES
                    .iter()
                    .enumerate()
                    .map(|(i, reason)| (format!("rejected-{}", i), *reason, false)),
            );

        let mut vectors = Vec::new();
        for (id, reason, qualified) in examples {
            let values = self
                .embedder
                .embed(reason)
                .await
                .map_err(|source| SeedError::Embedding {
                    reason: reason.to_string(),
                    source,
                })?;
            vectors.push(IndexedVector {
                id,
                values,
                metadata: ReasonMetadata {
                    reason: Some(reason.to_string()),
                    qualified: Some(qualified),
                },
            });
        }

        let count = vectors.len();
        self.index.upsert(vectors).await?;
        Ok(count)
    }
}
