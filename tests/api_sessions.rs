use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use docchat_backend::core::config::{AppConfig, AppPaths};
use docchat_backend::ingest::WebExtractor;
use docchat_backend::llm::{EmbeddingProvider, LlmProvider, Providers};
use docchat_backend::server::router::router;
use docchat_backend::state::AppState;
use docchat_backend::ApiError;

const CORPUS: &str = "Cargo is the Rust package manager.\n\
    rustc is the Rust compiler.\n\
    Paris is the capital of France.";

#[derive(Default)]
struct WordEmbedder {
    offline: AtomicBool,
}

#[async_trait]
impl EmbeddingProvider for WordEmbedder {
    fn name(&self) -> &str {
        "words"
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ApiError::EmbeddingUnavailable("offline".to_string()));
        }
        Ok(inputs
            .iter()
            .map(|text| {
                let mut vector = vec![0.0f32; 32];
                for word in text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
                    let slot = word
                        .to_lowercase()
                        .bytes()
                        .fold(7usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
                    vector[slot % 32] += 1.0;
                }
                vector
            })
            .collect())
    }
}

#[derive(Default)]
struct CountingLlm {
    calls: AtomicUsize,
}

#[async_trait]
impl LlmProvider for CountingLlm {
    fn name(&self) -> &str {
        "counting"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, ApiError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("reply {}", call))
    }
}

struct StaticPage;

#[async_trait]
impl WebExtractor for StaticPage {
    async fn extract(&self, _url: &str) -> Result<String, ApiError> {
        Ok("Bread is baked from flour.".to_string())
    }
}

struct Harness {
    _dir: TempDir,
    app: Router,
    embedder: Arc<WordEmbedder>,
    llm: Arc<CountingLlm>,
}

fn harness() -> Harness {
    let dir = TempDir::new().expect("tempdir");
    let paths = Arc::new(AppPaths::with_dirs(
        dir.path().to_path_buf(),
        dir.path().join("data"),
    ));
    let mut settings = AppConfig::default();
    settings.llm.api_key = Some("super-secret".to_string());

    let embedder = Arc::new(WordEmbedder::default());
    let llm = Arc::new(CountingLlm::default());
    let providers = Providers {
        llm: llm.clone(),
        embedder: embedder.clone(),
    };

    let state = AppState::with_providers(paths, settings, providers, Arc::new(StaticPage))
        .expect("state builds");
    Harness {
        _dir: dir,
        app: router(state),
        embedder,
        llm,
    }
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    let request = match body {
        Some(body) => builder.body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request builds");

    let response = app.clone().oneshot(request).await.expect("router responds");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

async fn create_with_text(app: &Router, text: &str) -> String {
    let (status, body) = send(app, "POST", "/api/sessions", Some(json!({"text": text}))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["session_id"].as_str().expect("session id").to_string()
}

#[tokio::test]
async fn health_reports_ok() {
    let h = harness();
    let (status, body) = send(&h.app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn ingest_ask_and_read_history() {
    let h = harness();
    let id = create_with_text(&h.app, CORPUS).await;

    let (status, body) = send(&h.app, "GET", &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "ready");
    assert_eq!(body["turns"], 0);

    let (status, body) = send(
        &h.app,
        "POST",
        &format!("/api/sessions/{id}/ask"),
        Some(json!({"question": "What is Cargo?"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["answer"], "reply 1");
    let sources = body["sources"].as_array().expect("sources");
    assert_eq!(sources.len(), 1);
    assert!(sources[0]["text"].as_str().expect("text").contains("Cargo"));
    assert_eq!(sources[0]["offset"], 0);

    send(
        &h.app,
        "POST",
        &format!("/api/sessions/{id}/ask"),
        Some(json!({"question": "And rustc?"})),
    )
    .await;

    let (status, body) = send(&h.app, "GET", &format!("/api/sessions/{id}/history"), None).await;
    assert_eq!(status, StatusCode::OK);
    let turns = body["turns"].as_array().expect("turns");
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0]["question"], "What is Cargo?");
    assert_eq!(turns[1]["answer"], "reply 2");

    let (_, body) = send(
        &h.app,
        "GET",
        &format!("/api/sessions/{id}/history?limit=1"),
        None,
    )
    .await;
    assert_eq!(body["turns"].as_array().expect("turns").len(), 1);
    assert_eq!(body["turns"][0]["question"], "And rustc?");
}

#[tokio::test]
async fn asking_an_idle_session_is_a_conflict() {
    let h = harness();
    let (status, body) = send(&h.app, "POST", "/api/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["state"], "idle");
    let id = body["session_id"].as_str().expect("session id");

    let (status, body) = send(
        &h.app,
        "POST",
        &format!("/api/sessions/{id}/ask"),
        Some(json!({"question": "What is Cargo?"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "no_index");
    assert_eq!(h.llm.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn blank_text_is_rejected_as_empty_corpus() {
    let h = harness();
    let (status, body) = send(&h.app, "POST", "/api/sessions", Some(json!({"text": "  \n "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "empty_corpus");
}

#[tokio::test]
async fn documents_replace_the_index_and_history() {
    let h = harness();
    let id = create_with_text(&h.app, CORPUS).await;
    send(
        &h.app,
        "POST",
        &format!("/api/sessions/{id}/ask"),
        Some(json!({"question": "What is Cargo?"})),
    )
    .await;

    let (status, body) = send(
        &h.app,
        "PUT",
        &format!("/api/sessions/{id}/documents"),
        Some(json!({"url": "https://example.com/bread"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["segments"], 1);

    let (_, body) = send(&h.app, "GET", &format!("/api/sessions/{id}/history"), None).await;
    assert!(body["turns"].as_array().expect("turns").is_empty());

    let (_, body) = send(
        &h.app,
        "POST",
        &format!("/api/sessions/{id}/ask"),
        Some(json!({"question": "What is bread made of?"})),
    )
    .await;
    assert_eq!(body["sources"][0]["text"], "Bread is baked from flour.");
}

#[tokio::test]
async fn embedding_outage_keeps_history_unchanged() {
    let h = harness();
    let id = create_with_text(&h.app, CORPUS).await;
    h.embedder.offline.store(true, Ordering::SeqCst);

    let (status, body) = send(
        &h.app,
        "POST",
        &format!("/api/sessions/{id}/ask"),
        Some(json!({"question": "What is Cargo?"})),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["kind"], "embedding_unavailable");

    let (_, body) = send(&h.app, "GET", &format!("/api/sessions/{id}"), None).await;
    assert_eq!(body["turns"], 0);
    assert_eq!(body["state"], "ready");
}

#[tokio::test]
async fn reset_delete_and_unknown_sessions() {
    let h = harness();
    let id = create_with_text(&h.app, CORPUS).await;

    let (status, _) = send(&h.app, "POST", &format!("/api/sessions/{id}/reset"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&h.app, "GET", &format!("/api/sessions/{id}"), None).await;
    assert_eq!(body["state"], "idle");

    let (status, _) = send(&h.app, "DELETE", &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&h.app, "GET", &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");

    let (status, body) = send(&h.app, "GET", "/api/sessions/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "bad_request");
}

#[tokio::test]
async fn config_view_masks_secrets() {
    let h = harness();
    let (status, body) = send(&h.app, "GET", "/api/config", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["llm"]["api_key"], "****");
    assert_eq!(body["chunking"]["chunk_size"], 1000);
}
