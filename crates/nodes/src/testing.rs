//! Scripted [`LlmProvider`] for tests.
//!
//! Replies are served in the order they were queued. Every request is
//! recorded so tests can assert on call counts, temperatures and prompts.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use pipeline::{CompletionRequest, CompletionResponse, LlmError, LlmProvider};
use tokio::sync::Mutex;

/// Mock provider answering from a fixed queue.
#[derive(Debug, Default)]
pub struct ScriptedLlmProvider {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    calls: AtomicUsize,
}

impl ScriptedLlmProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful completion with `content` as its text.
    pub fn with_reply(mut self, content: impl Into<String>) -> Self {
        self.replies.get_mut().push_back(Ok(content.into()));
        self
    }

    /// Queues a failure.
    pub fn with_error(mut self, error: LlmError) -> Self {
        self.replies.get_mut().push_back(Err(error));
        self
    }

    /// Number of `complete` calls so far, including failed ones.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every request received, oldest first.
    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }

    /// Replies not yet consumed.
    pub async fn remaining(&self) -> usize {
        self.replies.lock().await.len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlmProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push(request);
        match self.replies.lock().await.pop_front() {
            Some(Ok(content)) => Ok(CompletionResponse {
                content,
                usage: None,
            }),
            Some(Err(err)) => Err(err),
            None => Err(LlmError::Transport(
                "scripted provider has no replies left".to_string(),
            )),
        }
    }
}
