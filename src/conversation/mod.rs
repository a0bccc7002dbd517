//! Multi-turn conversation over an indexed corpus.
//!
//! A [`ConversationSession`] starts `Idle`, becomes `Ready` once an index is
//! attached, and passes through `Answering` while a question is processed.
//! Each successful question appends one turn to the session history; a failed
//! question leaves history untouched.

pub mod prompt;
mod session;


use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use session::ConversationSession;

use crate::core::config::defaults::{
    CONDENSE_QUESTION_PROMPT, DEFAULT_GENERATION_TIMEOUT_SECS, DEFAULT_SYSTEM_PROMPT, DEFAULT_TOP_K,
};

/// Configuration for answer generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// Instructions placed at the top of every answer prompt
    pub system_prompt: String,
    /// Newest turns rendered into the prompt; `None` renders all of them
    pub max_history_turns: Option<usize>,
    /// Rewrite follow-ups into standalone questions before retrieval
    pub condense_question: bool,
    /// Tag grounding passages with offset and relevance
    pub include_citations: bool,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_history_turns: None,
            condense_question: false,
            include_citations: true,
        }
    }
}

/// Everything a session needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct AnswerOptions {
    pub conversation: ConversationConfig,
    pub top_k: usize,
    pub generation_timeout: Duration,
    pub condense_instruction: String,
}

impl Default for AnswerOptions {
    fn default() -> Self {
        Self {
            conversation: ConversationConfig::default(),
            top_k: DEFAULT_TOP_K,
            generation_timeout: Duration::from_secs(DEFAULT_GENERATION_TIMEOUT_SECS),
            condense_instruction: CONDENSE_QUESTION_PROMPT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No index attached yet
    Idle,
    /// Index attached, waiting for a question
    Ready,
    /// A question is being processed
    Answering,
}
