use std::sync::Arc;
use std::time::Duration;

use crate::core::config::{AppConfig, AppPaths, ConfigService};
use crate::ingest::{HttpWebExtractor, PlainTextExtractor, TextCollector, WebExtractor};
use crate::llm::{build_providers, Providers};
use crate::pipeline::{Pipeline, SessionManager};

pub mod error;

use error::InitializationError;

/// Application state shared across all routes.
///
/// Holds the config service (for the redacted config view), the typed settings
/// the pipeline was built from, and the live sessions.
#[derive(Clone)]
pub struct AppState {
    pub config: ConfigService,
    pub settings: Arc<AppConfig>,
    pub sessions: SessionManager,
    pub collector: TextCollector,
}

impl AppState {
    /// Loads configuration from disk and builds the configured providers.
    pub fn initialize(paths: Arc<AppPaths>) -> Result<Arc<Self>, InitializationError> {
        let config = ConfigService::new(paths.clone());
        let settings = config
            .load_app_config()
            .map_err(InitializationError::Config)?;

        let providers = build_providers(&settings.llm).map_err(InitializationError::Llm)?;
        tracing::info!(
            "Using {} for generation and {} for embeddings",
            providers.llm.name(),
            providers.embedder.name()
        );

        let web = HttpWebExtractor::new(
            Duration::from_secs(settings.web.timeout_secs),
            settings.web.max_bytes,
        )
        .map_err(InitializationError::Web)?;

        Self::with_providers(paths, settings, providers, Arc::new(web))
    }

    /// Assembles the state around already-built collaborators.
    pub fn with_providers(
        paths: Arc<AppPaths>,
        settings: AppConfig,
        providers: Providers,
        web: Arc<dyn WebExtractor>,
    ) -> Result<Arc<Self>, InitializationError> {
        let config = ConfigService::new(paths);
        let pipeline = Pipeline::new(&settings, providers).map_err(InitializationError::Pipeline)?;
        let collector = TextCollector::new(Arc::new(PlainTextExtractor), web);

        Ok(Arc::new(AppState {
            config,
            settings: Arc::new(settings),
            sessions: SessionManager::new(pipeline),
            collector,
        }))
    }
}
