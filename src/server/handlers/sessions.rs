use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::core::errors::ApiError;
use crate::history::DialogueTurn;
use crate::ingest::IngestRequest;
use crate::pipeline::SessionHandle;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let request = parse_ingest_request(&body)?;

    if request.is_empty() {
        let session_id = state.sessions.create().await;
        return Ok((
            StatusCode::CREATED,
            Json(json!({"session_id": session_id, "state": "idle", "segments": 0})),
        ));
    }

    let raw_text = state.collector.collect(&request).await?;
    let session_id = state.sessions.ingest(&raw_text).await?;
    let status = state.sessions.status(session_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "session_id": session_id,
            "state": status.state,
            "segments": status.segments
        })),
    ))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = parse_session_id(&session_id)?;
    let status = state.sessions.status(handle).await?;
    Ok(Json(status))
}

pub async fn replace_documents(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let handle = parse_session_id(&session_id)?;
    let request = parse_ingest_request(&body)?;

    let raw_text = state.collector.collect(&request).await?;
    let segments = state.sessions.ingest_into(handle, &raw_text).await?;
    Ok(Json(json!({
        "session_id": handle,
        "state": "ready",
        "segments": segments
    })))
}

pub async fn ask(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(payload): Json<AskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = parse_session_id(&session_id)?;
    let turn = state.sessions.ask(handle, &payload.question).await?;
    Ok(Json(turn_payload(&turn)))
}

pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = parse_session_id(&session_id)?;
    let limit = params.get("limit").and_then(|v| v.parse::<usize>().ok());

    let turns = state.sessions.history(handle).await?;
    let start = limit.map_or(0, |limit| turns.len().saturating_sub(limit));
    let formatted: Vec<Value> = turns[start..].iter().map(turn_payload).collect();

    Ok(Json(json!({"session_id": handle, "turns": formatted})))
}

pub async fn reset_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = parse_session_id(&session_id)?;
    state.sessions.reset(handle).await?;
    Ok(Json(json!({"success": true})))
}

pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = parse_session_id(&session_id)?;
    state.sessions.remove(handle).await?;
    Ok(Json(json!({"success": true})))
}

fn parse_session_id(raw: &str) -> Result<SessionHandle, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid session id: {}", raw)))
}

/// An empty body means "nothing to ingest yet".
fn parse_ingest_request(body: &Bytes) -> Result<IngestRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(IngestRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))
}

fn turn_payload(turn: &DialogueTurn) -> Value {
    let sources: Vec<Value> = turn
        .retrieved
        .iter()
        .map(|segment| json!({"text": segment.text, "offset": segment.source_offset}))
        .collect();
    json!({
        "question": turn.question,
        "answer": turn.answer,
        "sources": sources,
        "created_at": turn.created_at
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_body_is_an_empty_request() {
        assert!(parse_ingest_request(&Bytes::new()).expect("parses").is_empty());
        assert!(parse_ingest_request(&Bytes::from_static(b" \n")).expect("parses").is_empty());
    }

    #[test]
    fn malformed_body_is_a_bad_request() {
        let result = parse_ingest_request(&Bytes::from_static(b"{\"text\": 3"));
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn session_ids_must_be_uuids() {
        assert!(matches!(parse_session_id("abc"), Err(ApiError::BadRequest(_))));
        let id = Uuid::new_v4();
        assert_eq!(parse_session_id(&id.to_string()).expect("parses"), id);
    }
}
