//! Scripted model for `llm_mode = "mock"` and for tests.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use super::{ChatModel, CompletionRequest, ModelTurn};
use crate::error::LlmError;

const MOCK_REPLY: &str = "Mock mode is on, so I can't think for real yet. What would you like to work on next?";

/// Returns queued turns in order, then a fixed text reply. Records every request it receives.
#[derive(Default)]
pub struct MockChatModel {
    script: Mutex<VecDeque<Result<ModelTurn, String>>>,
    seen: Mutex<Vec<CompletionRequest>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockChatModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue turns to be returned by successive `complete` calls.
    pub fn with_turns(turns: impl IntoIterator<Item = ModelTurn>) -> Self {
        let model = Self::new();
        lock(&model.script).extend(turns.into_iter().map(Ok));
        model
    }

    /// Queue a failure (surfaced as an API error with status 503).
    pub fn push_failure(&self, message: impl Into<String>) {
        lock(&self.script).push_back(Err(message.into()));
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        lock(&self.seen).clone()
    }
}

#[async_trait::async_trait]
impl ChatModel for MockChatModel {
    async fn complete(&self, request: &CompletionRequest) -> Result<ModelTurn, LlmError> {
        lock(&self.seen).push(request.clone());
        match lock(&self.script).pop_front() {
            Some(Ok(turn)) => Ok(turn),
            Some(Err(body)) => Err(LlmError::Api { status: 503, body }),
            None => Ok(ModelTurn::text(MOCK_REPLY)),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmMessage;

    #[tokio::test]
    async fn replays_script_then_falls_back() {
        let model = MockChatModel::with_turns([ModelTurn::text("first")]);
        model.push_failure("overloaded");
        let request = CompletionRequest {
            messages: vec![LlmMessage::user("hi")],
            tools: Vec::new(),
        };

        let first = model.complete(&request).await.unwrap();
        assert_eq!(first.content.as_deref(), Some("first"));
        assert!(matches!(
            model.complete(&request).await,
            Err(LlmError::Api { status: 503, .. })
        ));
        let fallback = model.complete(&request).await.unwrap();
        assert_eq!(fallback.content.as_deref(), Some(MOCK_REPLY));
        assert_eq!(model.requests().len(), 3);
    }
}
