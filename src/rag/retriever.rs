use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::chunker::Segment;
use super::embed_with_deadline;
use super::index::{ScoredSegment, VectorIndex};
use crate::core::config::defaults::DEFAULT_TOP_K;
use crate::core::errors::ApiError;
use crate::llm::EmbeddingProvider;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Segments retrieved per question
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl RetrievalConfig {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.top_k == 0 {
            return Err(ApiError::Configuration(
                "retrieval.top_k must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Query interface over a built [`VectorIndex`].
#[derive(Clone)]
pub struct Retriever {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    timeout: Duration,
}

impl Retriever {
    pub fn new(
        index: Arc<VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        timeout: Duration,
    ) -> Self {
        Self {
            index,
            embedder,
            timeout,
        }
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub async fn retrieve(&self, question: &str, k: usize) -> Result<Vec<Segment>, ApiError> {
        Ok(self
            .retrieve_scored(question, k)
            .await?
            .into_iter()
            .map(|hit| hit.segment)
            .collect())
    }

    pub async fn retrieve_scored(
        &self,
        question: &str,
        k: usize,
    ) -> Result<Vec<ScoredSegment>, ApiError> {
        let inputs = [question.to_string()];
        let vector = embed_with_deadline(self.embedder.as_ref(), &inputs, self.timeout)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                ApiError::EmbeddingUnavailable("embedder returned no vector".to_string())
            })?;

        if let Some(dimension) = self.index.dimension() {
            if vector.len() != dimension {
                return Err(ApiError::EmbeddingUnavailable(format!(
                    "{} returned a {}-dimensional query vector for a {}-dimensional index",
                    self.embedder.name(),
                    vector.len(),
                    dimension
                )));
            }
        }

        let hits = self.index.query(&vector, k)?;
        tracing::debug!("Retrieved {} of {} segments", hits.len(), self.index.len());
        Ok(hits)
    }
}
