use llm_common::error::CommonError;

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("language model service unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("could not interpret the query analysis: {0}")]
    MalformedAnalysis(String),

    #[error("could not produce a formatted answer: {0}")]
    MalformedFormat(String),

    #[error("message cannot be empty")]
    EmptyMessage,

    #[error("config error: {0}")]
    Config(String),
}

impl AgentError {
    /// Map a completion failure. An empty completion means the backend answered but
    /// gave the stage nothing usable, so the stage-specific `malformed` variant is used.
    pub fn from_completion(err: CommonError, malformed: fn(String) -> AgentError) -> Self {
        match err {
            CommonError::EmptyCompletion => malformed(err.to_string()),
            CommonError::Client(_) => {
                AgentError::UpstreamUnavailable(err.to_string())
            }
        }
    }
}
