use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::Pipeline;
use crate::conversation::{ConversationSession, SessionState};
use crate::core::errors::ApiError;
use crate::history::DialogueTurn;

pub type SessionHandle = Uuid;

type SharedSession = Arc<Mutex<ConversationSession>>;

#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub session_id: SessionHandle,
    pub state: SessionState,
    /// `None` while a question or re-ingest holds the session.
    pub segments: Option<usize>,
    pub turns: Option<usize>,
}

/// Live sessions keyed by handle.
///
/// Each session sits behind its own mutex; `ask` and re-ingestion hold it for
/// their whole duration, so questions on one session never interleave.
#[derive(Clone)]
pub struct SessionManager {
    pipeline: Pipeline,
    sessions: Arc<RwLock<HashMap<SessionHandle, SharedSession>>>,
}

impl SessionManager {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Register a session with nothing ingested.
    pub async fn create(&self) -> SessionHandle {
        self.insert(self.pipeline.idle_session()).await
    }

    /// Build a new session from `raw_text`.
    pub async fn ingest(&self, raw_text: &str) -> Result<SessionHandle, ApiError> {
        let session = self.pipeline.ingest(raw_text).await?;
        let segments = session.segment_count();
        let handle = self.insert(session).await;
        tracing::info!("Created session {} with {} segments", handle, segments);
        Ok(handle)
    }

    /// Replace the index and history of an existing session.
    ///
    /// The session lock is held while the new index is built, so questions queued
    /// behind it see the new corpus and re-ingests apply in the order they were
    /// issued. On failure the session is unchanged.
    pub async fn ingest_into(
        &self,
        handle: SessionHandle,
        raw_text: &str,
    ) -> Result<usize, ApiError> {
        let session = self.get(handle).await?;
        let mut session = session.lock().await;

        let retriever = self.pipeline.build_retriever(raw_text).await?;
        session.attach(retriever);
        tracing::info!(
            "Re-ingested session {} with {} segments",
            handle,
            session.segment_count()
        );
        Ok(session.segment_count())
    }

    pub async fn ask(
        &self,
        handle: SessionHandle,
        question: &str,
    ) -> Result<DialogueTurn, ApiError> {
        let session = self.get(handle).await?;
        let mut session = session.lock().await;
        session.ask(question).await
    }

    /// Discard the session's index and history; the handle stays valid.
    pub async fn reset(&self, handle: SessionHandle) -> Result<(), ApiError> {
        let session = self.get(handle).await?;
        session.lock().await.reset();
        tracing::info!("Reset session {}", handle);
        Ok(())
    }

    pub async fn remove(&self, handle: SessionHandle) -> Result<(), ApiError> {
        self.sessions
            .write()
            .await
            .remove(&handle)
            .map(|_| ())
            .ok_or_else(|| not_found(handle))
    }

    pub async fn history(&self, handle: SessionHandle) -> Result<Vec<DialogueTurn>, ApiError> {
        let session = self.get(handle).await?;
        let session = session.lock().await;
        Ok(session.history().turns().to_vec())
    }

    pub async fn status(&self, handle: SessionHandle) -> Result<SessionStatus, ApiError> {
        let session = self.get(handle).await?;
        let status = match session.try_lock() {
            Ok(session) => SessionStatus {
                session_id: handle,
                state: session.state(),
                segments: Some(session.segment_count()),
                turns: Some(session.history().len()),
            },
            Err(_) => SessionStatus {
                session_id: handle,
                state: SessionState::Answering,
                segments: None,
                turns: None,
            },
        };
        Ok(status)
    }

    async fn insert(&self, session: ConversationSession) -> SessionHandle {
        let handle = Uuid::new_v4();
        self.sessions
            .write()
            .await
            .insert(handle, Arc::new(Mutex::new(session)));
        handle
    }

    async fn get(&self, handle: SessionHandle) -> Result<SharedSession, ApiError> {
        self.sessions
            .read()
            .await
            .get(&handle)
            .cloned()
            .ok_or_else(|| not_found(handle))
    }
}

fn not_found(handle: SessionHandle) -> ApiError {
    ApiError::NotFound(format!("session {} not found", handle))
}
