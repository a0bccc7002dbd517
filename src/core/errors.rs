use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid configuration: {0}")]
    Configuration(String),
    #[error("nothing to ingest: the provided text is empty")]
    EmptyCorpus,
    #[error("no documents have been processed for this session yet")]
    NoIndex,
    #[error("embedding service unavailable: {0}")]
    EmbeddingUnavailable(String),
    #[error("answer generation failed: {0}")]
    Generation(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Internal(err.to_string())
    }

    pub fn embedding<E: std::fmt::Display>(err: E) -> Self {
        ApiError::EmbeddingUnavailable(err.to_string())
    }

    pub fn generation<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Generation(err.to_string())
    }

    /// Stable machine-readable tag so clients can tell failures apart.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Configuration(_) => "configuration_error",
            ApiError::EmptyCorpus => "empty_corpus",
            ApiError::NoIndex => "no_index",
            ApiError::EmbeddingUnavailable(_) => "embedding_unavailable",
            ApiError::Generation(_) => "generation_error",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::NotFound(_) => "not_found",
            ApiError::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Configuration(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::EmptyCorpus => StatusCode::BAD_REQUEST,
            ApiError::NoIndex => StatusCode::CONFLICT,
            ApiError::EmbeddingUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Generation(_) => StatusCode::BAD_GATEWAY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!("Request failed: {}", self);
        }

        let body = Json(json!({ "error": self.to_string(), "kind": self.kind() }));
        (status, body).into_response()
    }
}
