/// Per-message pipeline: analyze, generate search query, retrieve, format, reply.
///
/// Stages run strictly in sequence. A failure in any stage ends the turn with a
/// user-facing error string and leaves the conversation history untouched.
use std::sync::Arc;

use llm_common::completion::CompletionService;
use tracing::{debug, info, warn};

use crate::analyzer::QueryAnalyzer;
use crate::catalog::StandardsCatalog;
use crate::error::AgentError;
use crate::formatter::ResponseFormatter;
use crate::history::ConversationHistory;
use crate::model::Exchange;
use crate::retriever::InformationRetriever;
use crate::search_query::SearchQueryGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    Analyzing,
    SearchGenerating,
    Retrieving,
    Formatting,
    Done,
    Failed,
}

/// Allowed transitions:
/// - Idle -> Analyzing -> SearchGenerating -> Retrieving -> Formatting -> Done
/// - Analyzing -> Failed, Formatting -> Failed
pub fn is_valid_transition(from: PipelineStage, to: PipelineStage) -> bool {
    matches!(
        (from, to),
        (PipelineStage::Idle, PipelineStage::Analyzing)
            | (PipelineStage::Analyzing, PipelineStage::SearchGenerating)
            | (PipelineStage::Analyzing, PipelineStage::Failed)
            | (PipelineStage::SearchGenerating, PipelineStage::Retrieving)
            | (PipelineStage::Retrieving, PipelineStage::Formatting)
            | (PipelineStage::Formatting, PipelineStage::Done)
            | (PipelineStage::Formatting, PipelineStage::Failed)
    )
}

/// Tracks the current stage of one pipeline run and logs every transition.
struct StageTracker {
    stage: PipelineStage,
}

impl StageTracker {
    fn new() -> Self {
        Self {
            stage: PipelineStage::Idle,
        }
    }

    fn advance(&mut self, next: PipelineStage) {
        debug_assert!(
            is_valid_transition(self.stage, next),
            "invalid pipeline transition {:?} -> {:?}",
            self.stage,
            next
        );
        debug!(from = ?self.stage, to = ?next, "pipeline stage transition");
        self.stage = next;
    }

    fn fail<T>(&mut self, err: AgentError) -> Result<T, AgentError> {
        warn!(stage = ?self.stage, error = %err, "pipeline stage failed");
        debug_assert!(is_valid_transition(self.stage, PipelineStage::Failed));
        self.stage = PipelineStage::Failed;
        Err(err)
    }
}

pub struct Orchestrator {
    catalog: Arc<StandardsCatalog>,
    analyzer: QueryAnalyzer,
    search: SearchQueryGenerator,
    retriever: InformationRetriever,
    formatter: ResponseFormatter,
    history: ConversationHistory,
    last_stage: PipelineStage,
}

impl Orchestrator {
    /// `main` serves analysis and formatting, `search` serves search-query generation.
    pub fn new(
        catalog: Arc<StandardsCatalog>,
        main: Arc<dyn CompletionService>,
        search: Arc<dyn CompletionService>,
    ) -> Self {
        Self {
            analyzer: QueryAnalyzer::new(Arc::clone(&main)),
            search: SearchQueryGenerator::new(search),
            retriever: InformationRetriever::new(Arc::clone(&catalog)),
            formatter: ResponseFormatter::new(main),
            catalog,
            history: ConversationHistory::new(),
            last_stage: PipelineStage::Idle,
        }
    }

    pub fn with_history(mut self, history: ConversationHistory) -> Self {
        self.history = history;
        self
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Stage the most recent `chat` call ended in.
    pub fn last_stage(&self) -> PipelineStage {
        self.last_stage
    }

    /// Answer `message` using this session's history, committing the exchange on success.
    ///
    /// Always returns text: the answer, or an `Error: ...` line when a stage failed.
    pub async fn chat(&mut self, message: &str) -> String {
        let mut tracker = StageTracker::new();
        let result = self.run_pipeline(message, &self.history, &mut tracker).await;
        self.last_stage = tracker.stage;

        match result {
            Ok(response) => {
                self.history
                    .append(Exchange::new(message.trim(), response.clone()));
                info!(history_len = self.history.len(), "exchange committed");
                response
            }
            Err(e) => error_reply(&e),
        }
    }

    /// Stateless entry point. A missing history is treated as empty; nothing is recorded.
    pub async fn chat_once(&self, message: &str, history: Option<&[Exchange]>) -> String {
        let history =
            ConversationHistory::from_exchanges(history.unwrap_or_default().iter().cloned());
        match self.respond(message, &history).await {
            Ok(response) => response,
            Err(e) => error_reply(&e),
        }
    }

    /// Run every stage against `history` without mutating it.
    pub async fn respond(
        &self,
        message: &str,
        history: &ConversationHistory,
    ) -> Result<String, AgentError> {
        let mut tracker = StageTracker::new();
        self.run_pipeline(message, history, &mut tracker).await
    }

    async fn run_pipeline(
        &self,
        message: &str,
        history: &ConversationHistory,
        tracker: &mut StageTracker,
    ) -> Result<String, AgentError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AgentError::EmptyMessage);
        }

        tracker.advance(PipelineStage::Analyzing);
        let known = self.catalog.identifiers();
        let analysis = match self.analyzer.analyze(message, &known).await {
            Ok(analysis) => analysis,
            Err(e) => return tracker.fail(e),
        };

        tracker.advance(PipelineStage::SearchGenerating);
        let query = self.search.generate(&analysis).await;

        tracker.advance(PipelineStage::Retrieving);
        let retrieved = self.retriever.retrieve(&analysis, &query);

        tracker.advance(PipelineStage::Formatting);
        let response = match self.formatter.format(message, &retrieved, history).await {
            Ok(response) => response,
            Err(e) => return tracker.fail(e),
        };

        tracker.advance(PipelineStage::Done);
        Ok(response)
    }
}

fn error_reply(err: &AgentError) -> String {
    format!("Error: {err}")
}
