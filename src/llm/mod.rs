pub mod gemini;
pub mod openai;
pub mod provider;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

pub use gemini::GeminiProvider;
pub use openai::OpenAiCompatProvider;
pub use provider::{EmbeddingProvider, LlmProvider};
pub use types::{ChatMessage, LlmConfig, ProviderKind};

use crate::core::errors::ApiError;

/// The pair of collaborators the pipeline talks to.
#[derive(Clone)]
pub struct Providers {
    pub llm: Arc<dyn LlmProvider>,
    pub embedder: Arc<dyn EmbeddingProvider>,
}

/// Build chat and embedding clients for the configured provider.
pub fn build_providers(config: &LlmConfig) -> Result<Providers, ApiError> {
    match config.provider {
        ProviderKind::Gemini => {
            let provider = Arc::new(GeminiProvider::new(
                config.base_url(),
                config.api_key.clone().unwrap_or_default(),
                config.chat_model(),
                config.embedding_model(),
                config.temperature,
            )?);
            Ok(Providers {
                llm: provider.clone(),
                embedder: provider,
            })
        }
        ProviderKind::OpenAi => {
            let provider = Arc::new(OpenAiCompatProvider::new(
                config.base_url(),
                config.api_key.clone(),
                config.chat_model(),
                config.embedding_model(),
                config.temperature,
            ));
            Ok(Providers {
                llm: provider.clone(),
                embedder: provider,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gemini_requires_an_api_key() {
        let result = build_providers(&LlmConfig::default());
        assert!(matches!(result, Err(ApiError::Configuration(_))));
    }

    #[test]
    fn openai_compatible_provider_works_without_key() {
        let config = LlmConfig {
            provider: ProviderKind::OpenAi,
            base_url: Some("http://localhost:1234".to_string()),
            ..Default::default()
        };
        let providers = build_providers(&config).expect("providers build");
        assert_eq!(providers.llm.name(), "openai");
        assert_eq!(providers.embedder.name(), "openai");
    }
}
