use serde::{Deserialize, Serialize};

use crate::conversation::ConversationConfig;
use crate::core::errors::ApiError;
use crate::llm::LlmConfig;
use crate::rag::{ChunkingConfig, RetrievalConfig};

use super::defaults;

/// Typed view over `config.yml` (merged with `secrets.yml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub conversation: ConversationConfig,
    pub llm: LlmConfig,
    pub web: WebConfig,
}

impl AppConfig {
    /// Cross-field checks that the per-field validation cannot express.
    pub fn validate(&self) -> Result<(), ApiError> {
        self.chunking.validate()?;
        self.retrieval.validate()?;
        self.llm.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::DEFAULT_HOST.to_string(),
            port: 0,
            cors_allowed_origins: Vec::new(),
        }
    }
}

/// Settings for the web page collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Timeout for web requests in seconds
    pub timeout_secs: u64,
    /// Upper bound on the fetched body size
    pub max_bytes: usize,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            timeout_secs: defaults::DEFAULT_WEB_TIMEOUT_SECS,
            max_bytes: defaults::DEFAULT_WEB_MAX_BYTES,
        }
    }
}
