//! In-memory vector index.
//!
//! Brute-force cosine search over a handful of seeded vectors. Used when no
//! hosted index is configured and in tests.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ports::{IndexedVector, NearestMatch, VectorIndex, VectorIndexError};

/// Cosine similarity between two vectors of equal length.
///
/// Returns 0.0 when either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Vector index held in process memory.
#[derive(Clone, Default)]
pub struct InMemoryVectorIndex {
    vectors: Arc<RwLock<Vec<IndexedVector>>>,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.vectors.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.vectors.read().await.is_empty()
    }

    fn check_dimension(stored: &[IndexedVector], actual: usize) -> Result<(), VectorIndexError> {
        match stored.first() {
            Some(first) if first.values.len() != actual => Err(VectorIndexError::DimensionMismatch {
                expected: first.values.len(),
                actual,
            }),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn query_nearest(&self, vector: &[f32]) -> Result<Option<NearestMatch>, VectorIndexError> {
        let stored = self.vectors.read().await;
        Self::check_dimension(&stored, vector.len())?;

        let nearest = stored
            .iter()
            .map(|entry| (entry, cosine_similarity(vector, &entry.values)))
            .max_by(|(_, a), (_, b)| a.total_cmp(b));

        Ok(nearest.map(|(entry, score)| NearestMatch {
            id: entry.id.clone(),
            score: Some(score),
            metadata: entry.metadata.clone(),
        }))
    }

    async fn upsert(&self, vectors: Vec<IndexedVector>) -> Result<(), VectorIndexError> {
        let mut stored = self.vectors.write().await;
        for vector in vectors {
            Self::check_dimension(&stored, vector.values.len())?;
            match stored.iter_mut().find(|existing| existing.id == vector.id) {
                Some(existing) => *existing = vector,
                None => stored.push(vector),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::ReasonMetadata;

    fn entry(id: &str, values: Vec<f32>, qualified: bool) -> IndexedVector {
        IndexedVector {
            id: id.to_string(),
            values,
            metadata: ReasonMetadata {
                reason: Some(id.to_string()),
                qualified: Some(qualified),
            },
        }
    }

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = vec![3.0, 4.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < f32::EPSILON);
    }

    #[test]
    fn cosine_with_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[tokio::test]
    async fn empty_index_has_no_match() {
        let index = InMemoryVectorIndex::new();
        assert!(index.query_nearest(&[1.0, 0.0]).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn returns_the_closest_vector() {
        let index = InMemoryVectorIndex::new();
        index
            .upsert(vec![
                entry("qualified-0", vec![1.0, 0.0], true),
                entry("rejected-0", vec![0.0, 1.0], false),
            ])
            .await
            .unwrap();

        let nearest = index.query_nearest(&[0.1, 0.9]).await.unwrap().unwrap();
        assert_eq!(nearest.id, "rejected-0");
        assert_eq!(nearest.metadata.qualified, Some(false));
        assert!(nearest.score.unwrap() > 0.9);
    }

    #[tokio::test]
    async fn upsert_replaces_by_id() {
        let index = InMemoryVectorIndex::new();
        index.upsert(vec![entry("a", vec![1.0, 0.0], true)]).await.unwrap();
        index.upsert(vec![entry("a", vec![0.0, 1.0], false)]).await.unwrap();

        assert_eq!(index.len().await, 1);
        let nearest = index.query_nearest(&[0.0, 1.0]).await.unwrap().unwrap();
        assert_eq!(nearest.metadata.qualified, Some(false));
    }

    #[tokio::test]
    async fn rejects_mismatched_dimensions() {
        let index = InMemoryVectorIndex::new();
        index.upsert(vec![entry("a", vec![1.0, 0.0], true)]).await.unwrap();

        let result = index.query_nearest(&[1.0, 0.0, 0.0]).await;
        assert!(matches!(
            result,
            Err(VectorIndexError::DimensionMismatch { expected: 2, actual: 3 })
        ));
    }
}
