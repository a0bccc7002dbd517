//! Raw text collection from uploaded documents, pasted text and a web page.

mod document;
mod web;

use std::sync::Arc;

use serde::Deserialize;

pub use document::{DocumentExtractor, PlainTextExtractor, UploadedDocument};
pub use web::{extract_paragraphs, HttpWebExtractor, WebExtractor};

use crate::core::errors::ApiError;

/// Sources for one ingestion, concatenated in the order documents, text, web page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IngestRequest {
    pub documents: Vec<UploadedDocument>,
    pub text: Option<String>,
    pub url: Option<String>,
}

impl IngestRequest {
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
            && self.text.as_deref().map_or(true, |t| t.is_empty())
            && self.url.as_deref().map_or(true, |u| u.trim().is_empty())
    }
}

/// Runs the document and web collaborators and joins their output.
#[derive(Clone)]
pub struct TextCollector {
    documents: Arc<dyn DocumentExtractor>,
    web: Arc<dyn WebExtractor>,
}

impl TextCollector {
    pub fn new(documents: Arc<dyn DocumentExtractor>, web: Arc<dyn WebExtractor>) -> Self {
        Self { documents, web }
    }

    pub async fn collect(&self, request: &IngestRequest) -> Result<String, ApiError> {
        let mut parts = Vec::new();

        for document in &request.documents {
            let text = self.documents.extract(document)?;
            tracing::debug!("Extracted {} characters from {}", text.len(), document.name);
            parts.push(text);
        }

        if let Some(text) = &request.text {
            parts.push(text.clone());
        }

        if let Some(url) = request.url.as_deref().filter(|u| !u.trim().is_empty()) {
            parts.push(self.web.extract(url).await?);
        }

        let parts: Vec<String> = parts
            .into_iter()
            .filter(|part| !part.trim().is_empty())
            .collect();
        Ok(parts.join("\n"))
    }
}
