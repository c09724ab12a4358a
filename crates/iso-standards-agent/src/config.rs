use llm_common::openai::OpenAiClientConfig;

use crate::error::AgentError;

pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Application configuration loaded explicitly from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Connection, timeout and retry settings for the completion service.
    pub openai: OpenAiClientConfig,
    /// Model used for query analysis and response formatting.
    pub model: String,
    /// Model used to generate search queries. Defaults to `model`.
    pub search_model: String,
}

impl Config {
    /// Required:
    /// - `OPENAI_API_KEY`: credential for the completion service
    ///
    /// Optional:
    /// - `OPENAI_MODEL`, `OPENAI_SEARCH_MODEL`
    /// - `OPENAI_BASE_URL`, `OPENAI_TIMEOUT_SECS`, `OPENAI_MAX_RETRIES`,
    ///   `OPENAI_RETRY_INITIAL_MS`, `OPENAI_RETRY_MAX_MS`, `OPENAI_MAX_ERROR_BODY_BYTES`
    pub fn from_env() -> Result<Self, AgentError> {
        Self::from_parts(
            OpenAiClientConfig::from_env(),
            std::env::var("OPENAI_MODEL").ok(),
            std::env::var("OPENAI_SEARCH_MODEL").ok(),
        )
    }

    fn from_parts(
        openai: OpenAiClientConfig,
        model: Option<String>,
        search_model: Option<String>,
    ) -> Result<Self, AgentError> {
        if openai.api_key.is_none() {
            return Err(AgentError::Config(
                "OPENAI_API_KEY environment variable is required".to_string(),
            ));
        }

        let model = non_empty(model).unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let search_model = non_empty(search_model).unwrap_or_else(|| model.clone());

        Ok(Self {
            openai,
            model,
            search_model,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
