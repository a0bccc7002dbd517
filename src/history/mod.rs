use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rag::Segment;

/// One question/answer exchange together with the segments that grounded it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueTurn {
    pub question: String,
    pub answer: String,
    pub retrieved: Vec<Segment>,
    pub created_at: DateTime<Utc>,
}

impl DialogueTurn {
    pub fn new(question: String, answer: String, retrieved: Vec<Segment>) -> Self {
        Self {
            question,
            answer,
            retrieved,
            created_at: Utc::now(),
        }
    }
}

/// Append-only, chronologically ordered dialogue history.
#[derive(Debug, Clone, Default)]
pub struct History {
    turns: Vec<DialogueTurn>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: DialogueTurn) {
        self.turns.push(turn);
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// All turns, oldest first.
    pub fn turns(&self) -> &[DialogueTurn] {
        &self.turns
    }

    /// The newest `limit` turns (all when `None`), still oldest first.
    pub fn recent(&self, limit: Option<usize>) -> &[DialogueTurn] {
        match limit {
            Some(limit) => &self.turns[self.turns.len().saturating_sub(limit)..],
            None => &self.turns,
        }
    }
}
