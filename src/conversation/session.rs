use std::sync::Arc;

use super::prompt::{build_answer_prompt, build_condense_prompt};
use super::{AnswerOptions, SessionState};
use crate::core::errors::ApiError;
use crate::history::{DialogueTurn, History};
use crate::llm::LlmProvider;
use crate::rag::{RAGContextBuilder, Retriever};

/// One conversation: an optional index plus the history built on top of it.
pub struct ConversationSession {
    retriever: Option<Retriever>,
    history: History,
    state: SessionState,
    llm: Arc<dyn LlmProvider>,
    options: Arc<AnswerOptions>,
    context_builder: RAGContextBuilder,
}

impl ConversationSession {
    /// A session with nothing ingested yet.
    pub fn idle(llm: Arc<dyn LlmProvider>, options: Arc<AnswerOptions>) -> Self {
        let context_builder = RAGContextBuilder::new(options.conversation.include_citations);
        Self {
            retriever: None,
            history: History::new(),
            state: SessionState::Idle,
            llm,
            options,
            context_builder,
        }
    }

    /// A session ready to answer questions over `retriever`'s index.
    pub fn ready(
        retriever: Retriever,
        llm: Arc<dyn LlmProvider>,
        options: Arc<AnswerOptions>,
    ) -> Self {
        let mut session = Self::idle(llm, options);
        session.attach(retriever);
        session
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn segment_count(&self) -> usize {
        self.retriever
            .as_ref()
            .map(|retriever| retriever.index().len())
            .unwrap_or(0)
    }

    /// Swap in a freshly built index. The previous index and history are dropped together.
    pub fn attach(&mut self, retriever: Retriever) {
        self.retriever = Some(retriever);
        self.history = History::new();
        self.state = SessionState::Ready;
    }

    /// Drop the index and history, returning to `Idle`.
    pub fn reset(&mut self) {
        self.retriever = None;
        self.history = History::new();
        self.state = SessionState::Idle;
    }

    /// Answer `question` and record the turn.
    ///
    /// Fails with [`ApiError::NoIndex`] before anything is ingested. Retrieval or
    /// generation failures return the session to `Ready` without recording a turn.
    pub async fn ask(&mut self, question: &str) -> Result<DialogueTurn, ApiError> {
        let Some(retriever) = self.retriever.clone() else {
            return Err(ApiError::NoIndex);
        };

        let question = question.trim();
        if question.is_empty() {
            return Err(ApiError::BadRequest("question cannot be empty".to_string()));
        }

        if self.state == SessionState::Answering {
            tracing::warn!("Previous question was interrupted before completing");
        }

        self.state = SessionState::Answering;
        let outcome = self.answer(&retriever, question).await;
        self.state = SessionState::Ready;

        let turn = outcome?;
        self.history.push(turn.clone());
        tracing::info!(
            "Answered question with {} grounding segments ({} turns so far)",
            turn.retrieved.len(),
            self.history.len()
        );
        Ok(turn)
    }

    async fn answer(&self, retriever: &Retriever, question: &str) -> Result<DialogueTurn, ApiError> {
        let conversation = &self.options.conversation;
        let turns = self.history.recent(conversation.max_history_turns);

        let search_query = if conversation.condense_question && !turns.is_empty() {
            let prompt = build_condense_prompt(&self.options.condense_instruction, turns, question);
            let standalone = self.generate(&prompt).await?;
            tracing::debug!("Condensed follow-up into: {}", standalone.trim());
            standalone.trim().to_string()
        } else {
            question.to_string()
        };

        let hits = retriever
            .retrieve_scored(&search_query, self.options.top_k)
            .await?;
        let context = self.context_builder.build_context(&hits);
        let prompt = build_answer_prompt(&conversation.system_prompt, turns, &context, question);

        let answer = self.generate(&prompt).await?;

        Ok(DialogueTurn::new(
            question.to_string(),
            answer,
            hits.into_iter().map(|hit| hit.segment).collect(),
        ))
    }

    async fn generate(&self, prompt: &str) -> Result<String, ApiError> {
        let timeout = self.options.generation_timeout;
        let completion = match tokio::time::timeout(timeout, self.llm.generate(prompt)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(ApiError::Generation(format!(
                    "{} did not respond within {}s",
                    self.llm.name(),
                    timeout.as_secs()
                )))
            }
        };

        if completion.trim().is_empty() {
            return Err(ApiError::Generation(format!(
                "{} returned an empty completion",
                self.llm.name()
            )));
        }
        Ok(completion.trim().to_string())
    }
}
