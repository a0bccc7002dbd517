use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::config::defaults::{
    DEFAULT_EMBEDDING_BATCH_SIZE, DEFAULT_EMBEDDING_TIMEOUT_SECS, DEFAULT_GEMINI_BASE_URL,
    DEFAULT_GEMINI_CHAT_MODEL, DEFAULT_GEMINI_EMBEDDING_MODEL, DEFAULT_GENERATION_TIMEOUT_SECS,
    DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_CHAT_MODEL, DEFAULT_OPENAI_EMBEDDING_MODEL,
};
use crate::core::errors::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Gemini,
    OpenAi,
}

/// Connection settings shared by the chat and embedding collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: ProviderKind,
    pub base_url: Option<String>,
    pub chat_model: Option<String>,
    pub embedding_model: Option<String>,
    pub api_key: Option<String>,
    pub temperature: Option<f64>,
    /// Inputs sent per embedding request while building an index
    pub embedding_batch_size: usize,
    pub embedding_timeout_secs: u64,
    pub generation_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            base_url: None,
            chat_model: None,
            embedding_model: None,
            api_key: None,
            temperature: None,
            embedding_batch_size: DEFAULT_EMBEDDING_BATCH_SIZE,
            embedding_timeout_secs: DEFAULT_EMBEDDING_TIMEOUT_SECS,
            generation_timeout_secs: DEFAULT_GENERATION_TIMEOUT_SECS,
        }
    }
}

impl LlmConfig {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.embedding_batch_size == 0 {
            return Err(ApiError::Configuration(
                "llm.embedding_batch_size must be greater than zero".to_string(),
            ));
        }
        if self.embedding_timeout_secs == 0 || self.generation_timeout_secs == 0 {
            return Err(ApiError::Configuration(
                "llm timeouts must be at least one second".to_string(),
            ));
        }
        Ok(())
    }

    pub fn base_url(&self) -> String {
        let url = match (&self.base_url, self.provider) {
            (Some(url), _) if !url.trim().is_empty() => url.trim(),
            (_, ProviderKind::Gemini) => DEFAULT_GEMINI_BASE_URL,
            (_, ProviderKind::OpenAi) => DEFAULT_OPENAI_BASE_URL,
        };
        url.trim_end_matches('/').to_string()
    }

    pub fn chat_model(&self) -> String {
        match (&self.chat_model, self.provider) {
            (Some(model), _) if !model.trim().is_empty() => model.trim().to_string(),
            (_, ProviderKind::Gemini) => DEFAULT_GEMINI_CHAT_MODEL.to_string(),
            (_, ProviderKind::OpenAi) => DEFAULT_OPENAI_CHAT_MODEL.to_string(),
        }
    }

    pub fn embedding_model(&self) -> String {
        match (&self.embedding_model, self.provider) {
            (Some(model), _) if !model.trim().is_empty() => model.trim().to_string(),
            (_, ProviderKind::Gemini) => DEFAULT_GEMINI_EMBEDDING_MODEL.to_string(),
            (_, ProviderKind::OpenAi) => DEFAULT_OPENAI_EMBEDDING_MODEL.to_string(),
        }
    }

    pub fn embedding_timeout(&self) -> Duration {
        Duration::from_secs(self.embedding_timeout_secs)
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }
}
