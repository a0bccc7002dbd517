use thiserror::Error;

use crate::core::errors::ApiError;

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Failed to load configuration: {0}")]
    Config(#[source] ApiError),

    #[error("Failed to initialize LLM providers: {0}")]
    Llm(#[source] ApiError),

    #[error("Failed to initialize web extractor: {0}")]
    Web(#[source] ApiError),

    #[error("Failed to build pipeline: {0}")]
    Pipeline(#[source] ApiError),
}
