//! In-process collaborators for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::provider::{EmbeddingProvider, LlmProvider};
use crate::core::errors::ApiError;

const DIMENSIONS: usize = 64;

/// Bag-of-words embedder: texts sharing words get similar vectors.
#[derive(Default)]
pub(crate) struct HashEmbedder {
    pub fail: AtomicBool,
    pub calls: AtomicUsize,
}

impl HashEmbedder {
    pub fn vector_for(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; DIMENSIONS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let word = word.to_lowercase();
            let hash = word
                .bytes()
                .fold(0xcbf29ce484222325u64, |acc, b| {
                    (acc ^ b as u64).wrapping_mul(0x100000001b3)
                });
            vector[(hash % DIMENSIONS as u64) as usize] += 1.0;
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    fn name(&self) -> &str {
        "hash"
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(ApiError::EmbeddingUnavailable("embedder offline".to_string()));
        }
        Ok(inputs.iter().map(|text| Self::vector_for(text)).collect())
    }
}

/// Bag-of-words embedder that stalls on batches containing `trigger`.
pub(crate) struct SlowEmbedder {
    inner: HashEmbedder,
    trigger: &'static str,
    delay: Duration,
}

impl SlowEmbedder {
    pub fn new(trigger: &'static str, delay: Duration) -> Self {
        Self {
            inner: HashEmbedder::default(),
            trigger,
            delay,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for SlowEmbedder {
    fn name(&self) -> &str {
        "slow-hash"
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        if inputs.iter().any(|text| text.contains(self.trigger)) {
            tokio::time::sleep(self.delay).await;
        }
        self.inner.embed(inputs).await
    }
}

/// Generator that replays scripted replies and records every prompt.
#[derive(Default)]
pub(crate) struct ScriptedLlm {
    replies: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn with_replies(replies: Vec<Result<&str, &str>>) -> Self {
        let replies = replies
            .into_iter()
            .map(|reply| reply.map(str::to_string).map_err(str::to_string))
            .collect();
        Self {
            replies: Mutex::new(replies),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().expect("prompts lock").len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ApiError> {
        let call = {
            let mut prompts = self.prompts.lock().expect("prompts lock");
            prompts.push(prompt.to_string());
            prompts.len()
        };
        let reply = self.replies.lock().expect("replies lock").pop_front();
        match reply {
            Some(Ok(answer)) => Ok(answer),
            Some(Err(message)) => Err(ApiError::Generation(message)),
            None => Ok(format!("answer {}", call)),
        }
    }
}
