//! Pipeline orchestration: raw text in, conversation sessions out.
//!
//! [`Pipeline`] composes chunker, embedder and vector index into a ready
//! [`ConversationSession`]; [`SessionManager`] owns the live sessions and
//! serializes every mutation of a session behind its own lock.

mod manager;

use std::sync::Arc;
use std::time::Duration;

pub use manager::{SessionHandle, SessionManager, SessionStatus};

use crate::conversation::{AnswerOptions, ConversationSession};
use crate::core::config::AppConfig;
use crate::core::errors::ApiError;
use crate::llm::{EmbeddingProvider, LlmProvider, Providers};
use crate::rag::{Retriever, TextChunker, VectorIndex};

#[derive(Clone)]
pub struct Pipeline {
    chunker: TextChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
    options: Arc<AnswerOptions>,
    embedding_batch_size: usize,
    embedding_timeout: Duration,
}

impl Pipeline {
    pub fn new(config: &AppConfig, providers: Providers) -> Result<Self, ApiError> {
        config.validate()?;
        let chunker = TextChunker::new(config.chunking.clone())?;

        let options = AnswerOptions {
            conversation: config.conversation.clone(),
            top_k: config.retrieval.top_k,
            generation_timeout: config.llm.generation_timeout(),
            ..Default::default()
        };

        Ok(Self {
            chunker,
            embedder: providers.embedder,
            llm: providers.llm,
            options: Arc::new(options),
            embedding_batch_size: config.llm.embedding_batch_size,
            embedding_timeout: config.llm.embedding_timeout(),
        })
    }

    /// A session with nothing ingested.
    pub fn idle_session(&self) -> ConversationSession {
        ConversationSession::idle(self.llm.clone(), self.options.clone())
    }

    /// Chunk, embed and index `raw_text` into a new session with empty history.
    pub async fn ingest(&self, raw_text: &str) -> Result<ConversationSession, ApiError> {
        let retriever = self.build_retriever(raw_text).await?;
        Ok(ConversationSession::ready(
            retriever,
            self.llm.clone(),
            self.options.clone(),
        ))
    }

    pub(crate) async fn build_retriever(&self, raw_text: &str) -> Result<Retriever, ApiError> {
        if raw_text.trim().is_empty() {
            return Err(ApiError::EmptyCorpus);
        }

        let segments = self.chunker.chunk(raw_text);
        if segments.is_empty() {
            return Err(ApiError::EmptyCorpus);
        }
        let segment_count = segments.len();

        let index = VectorIndex::build(
            segments,
            self.embedder.as_ref(),
            self.embedding_batch_size,
            self.embedding_timeout,
        )
        .await?;

        tracing::info!(
            "Indexed {} segments from {} characters of text",
            segment_count,
            raw_text.chars().count()
        );

        Ok(Retriever::new(
            Arc::new(index),
            self.embedder.clone(),
            self.embedding_timeout,
        ))
    }
}
