/// Error types for the completion-service boundary.
///
/// These errors describe failures talking to a text-completion backend. Application
/// crates decide how each one surfaces to the user and should wrap or map `CommonError`
/// rather than matching on transport details.
use crate::openai::OpenAiClientError;

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("completion request failed: {0}")]
    Client(#[from] OpenAiClientError),

    #[error("completion response contained no text")]
    EmptyCompletion,
}
