/// Text-completion abstraction used by every prompt-chaining stage.
///
/// Stages build a [`Prompt`] with pure functions and hand it to a [`CompletionService`].
/// The production implementation is [`OpenAiCompletion`]; tests substitute scripted doubles.
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::CommonError;
use crate::openai::{ChatCompletionRequest, Message, OpenAiClient};

/// A system instruction paired with the user-facing content for one completion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }

    fn into_messages(self) -> Vec<Message> {
        vec![
            Message {
                role: "system".to_string(),
                content: self.system,
            },
            Message {
                role: "user".to_string(),
                content: self.user,
            },
        ]
    }
}

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Send `prompt` to the backend and return the trimmed assistant text.
    async fn complete(&self, prompt: &Prompt, temperature: f32) -> Result<String, CommonError>;
}

/// One model configuration on top of a shared OpenAI-compatible client.
#[derive(Clone)]
pub struct OpenAiCompletion {
    client: Arc<OpenAiClient>,
    model: String,
}

impl OpenAiCompletion {
    pub fn new(client: Arc<OpenAiClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl CompletionService for OpenAiCompletion {
    async fn complete(&self, prompt: &Prompt, temperature: f32) -> Result<String, CommonError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: prompt.clone().into_messages(),
            temperature: Some(temperature),
            max_tokens: None,
        };

        let response = self.client.chat_completions(request, None).await?;

        debug!(
            model = %self.model,
            total_tokens = response.usage.as_ref().and_then(|u| u.total_tokens),
            "completion received"
        );

        response
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .ok_or(CommonError::EmptyCompletion)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::openai::{OpenAiClientConfig, OpenAiClientError};
    use crate::test_server::TestServer;

    #[test]
    fn test_prompt_becomes_system_then_user_messages() {
        let prompt = Prompt::new("You are an expert.", "Query: ISO 13485");
        let messages = prompt.into_messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content, "You are an expert.");
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[1].content, "Query: ISO 13485");
    }

    fn completion_for(server: &TestServer, timeout: Duration) -> OpenAiCompletion {
        let mut config =
            OpenAiClientConfig::new(Some("sk-test".to_string())).with_base_url(&server.base_url);
        config.max_retries = 0;
        config.default_timeout = timeout;
        OpenAiCompletion::new(Arc::new(OpenAiClient::new(config).unwrap()), "gpt-4.1-mini")
    }

    #[tokio::test]
    async fn test_complete_returns_trimmed_first_choice() {
        let server = TestServer::respond_with(vec![(
            200,
            r#"{"choices":[{"message":{"role":"assistant","content":"  ISO 13485 covers QMS.\n"}},{"message":{"content":"second"}}]}"#,
        )])
        .await;
        let completion = completion_for(&server, Duration::from_secs(5));

        let prompt = Prompt::new("You are an expert.", "Query: ISO 13485");
        let text = completion.complete(&prompt, 0.1).await.unwrap();
        assert_eq!(text, "ISO 13485 covers QMS.");

        let raw = &server.requests()[0];
        assert!(raw.contains(r#""role":"system","content":"You are an expert.""#));
        assert!(raw.contains(r#""temperature":0.1"#));
    }

    #[tokio::test]
    async fn test_blank_content_is_empty_completion() {
        let server = TestServer::respond_with(vec![(
            200,
            r#"{"choices":[{"message":{"role":"assistant","content":"   "}}]}"#,
        )])
        .await;
        let completion = completion_for(&server, Duration::from_secs(5));

        let err = completion
            .complete(&Prompt::new("s", "u"), 0.1)
            .await
            .unwrap_err();
        assert!(matches!(err, CommonError::EmptyCompletion));
    }

    #[tokio::test]
    async fn test_timeout_surfaces_as_client_error() {
        let server = TestServer::silent().await;
        let completion = completion_for(&server, Duration::from_millis(300));

        let err = completion
            .complete(&Prompt::new("s", "u"), 0.1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CommonError::Client(OpenAiClientError::Request(ref e)) if e.is_timeout()
        ));
    }
}
