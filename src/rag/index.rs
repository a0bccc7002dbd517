//! In-memory vector index.
//!
//! Stores one embedding per segment and answers nearest-neighbour queries by
//! exhaustive cosine scoring. Built once per session and read-only afterwards.

use std::time::Duration;

use serde::Serialize;

use super::chunker::Segment;
use super::embed_with_deadline;
use crate::core::errors::ApiError;
use crate::llm::EmbeddingProvider;
use crate::vector_math::{compare_ranked, cosine_similarity};

#[derive(Debug, Clone)]
struct IndexEntry {
    /// Insertion position; unique and stable for the life of the index.
    id: usize,
    segment: Segment,
    vector: Vec<f32>,
}

/// A retrieved segment with its cosine similarity to the query.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredSegment {
    pub segment: Segment,
    pub score: f32,
}

#[derive(Debug, Default)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
    dimension: Option<usize>,
}

impl VectorIndex {
    /// Embed `segments` in batches and index them in order.
    pub async fn build(
        segments: Vec<Segment>,
        embedder: &dyn EmbeddingProvider,
        batch_size: usize,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let batch_size = batch_size.max(1);
        let mut vectors = Vec::with_capacity(segments.len());

        for batch in segments.chunks(batch_size) {
            let inputs: Vec<String> = batch.iter().map(|s| s.text.clone()).collect();
            let embedded = embed_with_deadline(embedder, &inputs, timeout).await?;
            if embedded.len() != inputs.len() {
                return Err(ApiError::EmbeddingUnavailable(format!(
                    "embedder returned {} vectors for {} segments",
                    embedded.len(),
                    inputs.len()
                )));
            }
            vectors.extend(embedded);
        }

        Self::from_embeddings(segments, vectors)
    }

    /// Pair pre-computed vectors with their segments.
    pub fn from_embeddings(
        segments: Vec<Segment>,
        vectors: Vec<Vec<f32>>,
    ) -> Result<Self, ApiError> {
        if segments.len() != vectors.len() {
            return Err(ApiError::EmbeddingUnavailable(format!(
                "{} vectors for {} segments",
                vectors.len(),
                segments.len()
            )));
        }

        let mut dimension = None;
        let mut entries = Vec::with_capacity(segments.len());
        for (id, (segment, vector)) in segments.into_iter().zip(vectors).enumerate() {
            if vector.is_empty() {
                return Err(ApiError::EmbeddingUnavailable(format!(
                    "empty embedding for segment {}",
                    id
                )));
            }
            match dimension {
                None => dimension = Some(vector.len()),
                Some(dim) if dim != vector.len() => {
                    return Err(ApiError::EmbeddingUnavailable(format!(
                        "embedding dimension changed from {} to {} at segment {}",
                        dim,
                        vector.len(),
                        id
                    )));
                }
                Some(_) => {}
            }
            entries.push(IndexEntry {
                id,
                segment,
                vector,
            });
        }

        Ok(Self { entries, dimension })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Top-`k` entries by descending cosine similarity; ties go to the lower id.
    pub fn query(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredSegment>, ApiError> {
        let Some(dimension) = self.dimension else {
            return Ok(Vec::new());
        };
        if k == 0 {
            return Ok(Vec::new());
        }
        if vector.len() != dimension {
            return Err(ApiError::BadRequest(format!(
                "query vector has dimension {}, index expects {}",
                vector.len(),
                dimension
            )));
        }

        let mut scored = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            scored.push((entry.id, cosine_similarity(vector, &entry.vector)?));
        }
        scored.sort_by(|left, right| compare_ranked(*left, *right));
        scored.truncate(k.min(self.entries.len()));

        Ok(scored
            .into_iter()
            .map(|(id, score)| ScoredSegment {
                segment: self.entries[id].segment.clone(),
                score,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::HashEmbedder;
    use std::sync::atomic::Ordering;

    fn index_of(vectors: Vec<Vec<f32>>) -> VectorIndex {
        let segments = (0..vectors.len())
            .map(|i| Segment::new(format!("segment {}", i)))
            .collect();
        VectorIndex::from_embeddings(segments, vectors).expect("index builds")
    }

    #[test]
    fn identical_vector_is_returned_first() {
        let index = index_of(vec![
            vec![0.2, 0.9, 0.1],
            vec![0.7, 0.1, 0.6],
            vec![0.1, 0.1, 0.9],
        ]);

        let hits = index.query(&[0.7, 0.1, 0.6], 3).expect("query works");
        assert_eq!(hits[0].segment.text, "segment 1");
        assert!(hits[0].score >= hits[1].score);
        assert!((hits[0].score - 1.0).abs() < 1e-5);
    }

    #[test]
    fn ties_break_by_ascending_id() {
        let index = index_of(vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![3.0, 0.0], vec![1.0, 0.0]]);

        let hits = index.query(&[1.0, 0.0], 3).expect("query works");
        let order: Vec<&str> = hits.iter().map(|h| h.segment.text.as_str()).collect();
        assert_eq!(order, vec!["segment 0", "segment 2", "segment 3"]);
    }

    #[test]
    fn k_is_clamped_and_empty_index_returns_nothing() {
        let index = index_of(vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        assert_eq!(index.query(&[1.0, 1.0], 10).expect("query works").len(), 2);
        assert!(index.query(&[1.0, 1.0], 0).expect("query works").is_empty());

        let empty = VectorIndex::default();
        assert!(empty.query(&[1.0, 1.0], 4).expect("query works").is_empty());
    }

    #[test]
    fn rejects_inconsistent_embeddings() {
        let segments = vec![Segment::new("a"), Segment::new("b")];
        let mismatched = VectorIndex::from_embeddings(segments.clone(), vec![vec![1.0], vec![1.0, 2.0]]);
        assert!(matches!(mismatched, Err(ApiError::EmbeddingUnavailable(_))));

        let missing = VectorIndex::from_embeddings(segments, vec![vec![1.0]]);
        assert!(matches!(missing, Err(ApiError::EmbeddingUnavailable(_))));
    }

    #[test]
    fn query_with_wrong_dimension_is_rejected() {
        let index = index_of(vec![vec![1.0, 0.0]]);
        assert!(matches!(
            index.query(&[1.0, 0.0, 0.0], 1),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn build_embeds_in_batches() {
        let embedder = HashEmbedder::default();
        let segments: Vec<Segment> = ["cats purr", "dogs bark", "birds sing", "fish swim", "cows moo"]
            .into_iter()
            .map(Segment::new)
            .collect();

        let index = VectorIndex::build(segments, &embedder, 2, Duration::from_secs(5))
            .await
            .expect("index builds");

        assert_eq!(index.len(), 5);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 3);
        let hits = index
            .query(&HashEmbedder::vector_for("fish swim"), 1)
            .expect("query works");
        assert_eq!(hits[0].segment.text, "fish swim");
    }

    #[tokio::test]
    async fn build_surfaces_embedding_failures() {
        let embedder = HashEmbedder::default();
        embedder.fail.store(true, Ordering::SeqCst);

        let result = VectorIndex::build(
            vec![Segment::new("anything")],
            &embedder,
            8,
            Duration::from_secs(5),
        )
        .await;
        assert!(matches!(result, Err(ApiError::EmbeddingUnavailable(_))));
    }
}
