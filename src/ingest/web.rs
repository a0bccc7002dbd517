//! Web page text extraction.
//!
//! Fetches a page and keeps the text of its `<p>` elements, one paragraph per
//! line. Pages without paragraphs fall back to a full tag strip.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, Url};

use crate::core::errors::ApiError;

#[async_trait]
pub trait WebExtractor: Send + Sync {
    async fn extract(&self, url: &str) -> Result<String, ApiError>;
}

pub struct HttpWebExtractor {
    client: Client,
    max_bytes: usize,
}

impl HttpWebExtractor {
    pub fn new(timeout: Duration, max_bytes: usize) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::internal)?;
        Ok(Self { client, max_bytes })
    }
}

#[async_trait]
impl WebExtractor for HttpWebExtractor {
    async fn extract(&self, url: &str) -> Result<String, ApiError> {
        let parsed = Url::parse(url.trim())
            .map_err(|e| ApiError::BadRequest(format!("Invalid URL {}: {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::BadRequest(format!(
                "Unsupported URL scheme: {}",
                parsed.scheme()
            )));
        }

        let response = self
            .client
            .get(parsed.clone())
            .send()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to fetch {}: {}", parsed, e)))?;

        if !response.status().is_success() {
            return Err(ApiError::BadRequest(format!(
                "Fetching {} returned {}",
                parsed,
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read {}: {}", parsed, e)))?;
        if body.len() > self.max_bytes {
            tracing::warn!(
                "Truncating {} from {} to {} bytes",
                parsed,
                body.len(),
                self.max_bytes
            );
        }
        let html = String::from_utf8_lossy(&body[..body.len().min(self.max_bytes)]);

        let text = extract_paragraphs(&html);
        tracing::info!("Extracted {} characters of text from {}", text.len(), parsed);
        Ok(text)
    }
}

fn paragraph_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?is)<p(?:\s[^>]*)?>(.*?)</p\s*>").expect("paragraph pattern is valid")
    })
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern is valid"))
}

fn hidden_block_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?is)<(script|style|noscript)\b.*?</(script|style|noscript)\s*>")
            .expect("hidden block pattern is valid")
    })
}

/// Text of every `<p>` element, newline-joined.
pub fn extract_paragraphs(html: &str) -> String {
    let html = hidden_block_pattern().replace_all(html, " ");

    let paragraphs: Vec<String> = paragraph_pattern()
        .captures_iter(&html)
        .filter_map(|caps| caps.get(1))
        .map(|inner| normalize_text(&tag_pattern().replace_all(inner.as_str(), "")))
        .filter(|text| !text.is_empty())
        .collect();

    if paragraphs.is_empty() {
        return strip_html_tags(&html);
    }
    paragraphs.join("\n")
}

/// Strip every tag, keeping non-empty lines.
fn strip_html_tags(html: &str) -> String {
    let text = tag_pattern().replace_all(html, "\n");
    text.lines()
        .map(normalize_text)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn normalize_text(text: &str) -> String {
    decode_entities(text)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
