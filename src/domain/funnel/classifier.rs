//! Similarity classifier for weight-loss reasons.
//!
//! Produces a confidence in `[0, 1]` that a reason is health-motivated.
//! The semantic path embeds the text and looks up the nearest seeded example;
//! any failure there drops to a deterministic keyword heuristic. Callers
//! cannot tell which path produced the score.

use std::sync::Arc;

use tracing::warn;

use crate::domain::foundation::PhoneNumber;
use crate::ports::{EmbeddingProvider, VectorIndex};

use super::reasons::{AESTHETIC_KEYWORDS, HEALTH_KEYWORDS};

/// Score assigned when the nearest example is a rejecting one.
pub const REJECTED_MATCH_SCORE: f32 = 0.2;

/// Heuristic score for aesthetic wording.
pub const AESTHETIC_SCORE: f32 = 0.2;

/// Heuristic score for health wording.
pub const HEALTH_SCORE: f32 = 0.8;

/// Heuristic score when neither keyword set matches.
pub const NEUTRAL_SCORE: f32 = 0.3;

#[derive(Clone)]
struct SemanticBackend {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
}

/// Scores how strongly a reason expresses a qualifying motivation.
#[derive(Clone)]
pub struct SimilarityClassifier {
    semantic: Option<SemanticBackend>,
}

impl SimilarityClassifier {
    /// Classifier backed by an embedding model and a seeded vector index.
    pub fn semantic(embedder: Arc<dyn EmbeddingProvider>, index: Arc<dyn VectorIndex>) -> Self {
        Self {
            semantic: Some(SemanticBackend { embedder, index }),
        }
    }

    /// Classifier that only uses the keyword heuristic.
    pub fn keyword_only() -> Self {
        Self { semantic: None }
    }

    pub fn has_semantic_backend(&self) -> bool {
        self.semantic.is_some()
    }

    /// Confidence that `text` is a qualifying reason.
    ///
    /// `phone_number` only labels the fallback warnings.
    pub async fn score(&self, phone_number: &PhoneNumber, text: &str) -> f32 {
        let Some(backend) = &self.semantic else {
            return fallback_score(text);
        };

        let vector = match backend.embedder.embed(text).await {
            Ok(vector) => vector,
            Err(e) => {
                warn!(
                    phone_number = %phone_number,
                    stage = "embedding",
                    error = %e,
                    "Embedding failed, using keyword heuristic"
                );
                return fallback_score(text);
            }
        };

        match backend.index.query_nearest(&vector).await {
            Ok(None) => 0.0,
            Ok(Some(nearest)) if nearest.metadata.qualified == Some(false) => REJECTED_MATCH_SCORE,
            Ok(Some(nearest)) => nearest.score.unwrap_or(0.0).clamp(0.0, 1.0),
            Err(e) => {
                warn!(
                    phone_number = %phone_number,
                    stage = "vector_query",
                    error = %e,
                    "Vector query failed, using keyword heuristic"
                );
                fallback_score(text)
            }
        }
    }
}

/// Deterministic keyword heuristic.
///
/// Aesthetic wording wins over health wording.
pub fn fallback_score(text: &str) -> f32 {
    let lower = text.to_lowercase();
    if AESTHETIC_KEYWORDS.iter().any(|k| lower.contains(k)) {
        AESTHETIC_SCORE
    } else if HEALTH_KEYWORDS.iter().any(|k| lower.contains(k)) {
        HEALTH_SCORE
    } else {
        NEUTRAL_SCORE
    }
}
