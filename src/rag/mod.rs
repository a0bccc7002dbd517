//! RAG (Retrieval-Augmented Generation) module.
//!
//! This module provides:
//! - `TextChunker`: Splits ingested text into overlapping segments
//! - `VectorIndex`: Exact cosine nearest-neighbour search over segment embeddings
//! - `Retriever`: Question text to ranked segments
//! - `RAGContextBuilder`: Formats retrieved segments as grounding context

mod chunker;
mod context_builder;
mod index;
mod retriever;

use std::time::Duration;

pub use chunker::{chunk, ChunkingConfig, Segment, TextChunker};
pub use context_builder::RAGContextBuilder;
pub use index::{ScoredSegment, VectorIndex};
pub use retriever::{RetrievalConfig, Retriever};

use crate::core::errors::ApiError;
use crate::llm::EmbeddingProvider;

/// Calls the embedder under a deadline; expiry counts as the embedder being unavailable.
pub(crate) async fn embed_with_deadline(
    embedder: &dyn EmbeddingProvider,
    inputs: &[String],
    timeout: Duration,
) -> Result<Vec<Vec<f32>>, ApiError> {
    match tokio::time::timeout(timeout, embedder.embed(inputs)).await {
        Ok(result) => result,
        Err(_) => Err(ApiError::EmbeddingUnavailable(format!(
            "{} did not respond within {}s",
            embedder.name(),
            timeout.as_secs()
        ))),
    }
}
