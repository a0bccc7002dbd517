use async_trait::async_trait;

use crate::core::errors::ApiError;

/// Language-model collaborator: one prompt in, one completion out.
///
/// Implementations report every failure (transport, quota, malformed reply)
/// as [`ApiError::Generation`].
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// return the provider name (e.g. "gemini", "openai")
    fn name(&self) -> &str;

    /// single-shot completion (non-streaming)
    async fn generate(&self, prompt: &str) -> Result<String, ApiError>;
}

/// Embedding collaborator. Every vector returned by one instance has the same
/// dimension; failures are reported as [`ApiError::EmbeddingUnavailable`].
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    fn name(&self) -> &str;

    /// generate one embedding per input, in input order
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError>;
}
