/// Scripted completion backend for exercising pipeline stages without a network.
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use llm_common::completion::{CompletionService, Prompt};
use llm_common::error::CommonError;
use llm_common::openai::{OpenAiClientError, StatusCode};

/// Replays queued replies in order and records every prompt it receives.
#[derive(Default)]
pub struct ScriptedCompletion {
    script: Mutex<VecDeque<Result<String, String>>>,
    received: Mutex<Vec<(Prompt, f32)>>,
}

impl ScriptedCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()));
        self
    }

    /// Queue an upstream failure, surfaced as a 503 from the completion client.
    pub fn fail(self, message: impl Into<String>) -> Self {
        self.push(Err(message.into()));
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn prompts(&self) -> Vec<(Prompt, f32)> {
        self.received.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.received.lock().unwrap().len()
    }

    fn push(&self, entry: Result<String, String>) {
        self.script.lock().unwrap().push_back(entry);
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, prompt: &Prompt, temperature: f32) -> Result<String, CommonError> {
        self.received
            .lock()
            .unwrap()
            .push((prompt.clone(), temperature));

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(text)) if text.trim().is_empty() => Err(CommonError::EmptyCompletion),
            Some(Ok(text)) => Ok(text.trim().to_string()),
            Some(Err(message)) => Err(unavailable(message)),
            None => Err(unavailable("script exhausted".to_string())),
        }
    }
}

fn unavailable(message: String) -> CommonError {
    CommonError::Client(OpenAiClientError::Upstream {
        status: StatusCode::SERVICE_UNAVAILABLE,
        message,
    })
}
