//! Conversational assistant for ISO/IEC medical device standards.
//!
//! Each message runs through a fixed prompt-chaining pipeline: query analysis,
//! search-query generation, catalog retrieval and response formatting. The search
//! step is a placeholder; no live search backend is called.

pub mod analyzer;
pub mod catalog;
pub mod config;
pub mod error;
pub mod formatter;
pub mod history;
pub mod model;
pub mod orchestrator;
pub mod retriever;
pub mod search_query;

#[cfg(test)]
mod testing;

pub use catalog::StandardsCatalog;
pub use config::Config;
pub use error::AgentError;
pub use history::{ConversationHistory, HISTORY_CAPACITY};
pub use model::{AnalysisResult, Exchange, RetrievedItem, SearchQuery, StandardRecord};
pub use orchestrator::{Orchestrator, PipelineStage};
