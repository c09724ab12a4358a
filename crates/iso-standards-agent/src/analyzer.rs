/// Query analysis: classifies a user message as referencing known standards,
/// naming device categories, or being a general inquiry.
use std::sync::{Arc, LazyLock};

use llm_common::completion::{CompletionService, Prompt};
use regex::Regex;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::debug;

use crate::catalog::normalize_identifier;
use crate::error::AgentError;
use crate::model::AnalysisResult;

pub const ANALYSIS_TEMPERATURE: f32 = 0.1;

static STANDARD_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(ISO|IEC)\s*(\d{3,5})\b").expect("valid regex")
});

/// Shape the model is asked to reply with.
#[derive(Debug, Deserialize, JsonSchema)]
struct AnalysisResponse {
    /// Known standard identifiers explicitly referenced by the query, e.g. "ISO 13485".
    matched_identifiers: Vec<String>,
    /// Medical device categories or subject keywords, e.g. "software", "risk management".
    category_hints: Vec<String>,
    /// True when the query neither names a standard nor a device category.
    is_general_inquiry: bool,
}

pub fn analysis_prompt(message: &str, known_identifiers: &[&str]) -> Prompt {
    let schema = schemars::schema_for!(AnalysisResponse);
    let system = format!(
        "You are an expert in ISO medical device standards.\n\
Analyze the user query and determine if it's asking about:\n\
1. A specific ISO standard number\n\
2. A medical device category\n\
3. A general inquiry about medical standards\n\n\
Known standards: {known}\n\n\
Put any of the known standards the query mentions in matched_identifiers, written exactly as listed. \
Put device categories or subject keywords in category_hints as short lowercase phrases. \
Set is_general_inquiry to true only if neither applies.\n\n\
Respond with a single JSON object and nothing else. It must match this JSON Schema:\n{schema}",
        known = known_identifiers.join(", "),
        schema = schema.as_value(),
    );
    Prompt::new(system, format!("Query: {message}"))
}

/// Interpret a raw analysis reply for `message`.
///
/// Identifiers are resolved against `known_identifiers`; unknown ones are dropped.
/// Standards written literally in the message are added if the model missed them.
pub fn parse_analysis(
    raw: &str,
    message: &str,
    known_identifiers: &[&str],
) -> Result<AnalysisResult, AgentError> {
    let response = first_json_object(raw)?;

    let mut matched: Vec<String> = Vec::new();
    let literal = STANDARD_REFERENCE
        .captures_iter(message)
        .map(|c| format!("{} {}", &c[1], &c[2]));
    for candidate in response.matched_identifiers.into_iter().chain(literal) {
        match resolve_known(&candidate, known_identifiers) {
            Some(id) if !matched.iter().any(|m| m == id) => matched.push(id.to_string()),
            Some(_) => {}
            None => debug!(candidate = %candidate, "ignoring identifier not in catalog"),
        }
    }

    let mut category_hints: Vec<String> = Vec::new();
    for hint in response.category_hints {
        let hint = hint.trim().to_lowercase();
        if !hint.is_empty() && !category_hints.contains(&hint) {
            category_hints.push(hint);
        }
    }

    let is_general_inquiry =
        matched.is_empty() && (response.is_general_inquiry || category_hints.is_empty());

    Ok(AnalysisResult {
        query: message.to_string(),
        matched_identifiers: matched,
        category_hints,
        is_general_inquiry,
    })
}

fn resolve_known<'a>(candidate: &str, known_identifiers: &[&'a str]) -> Option<&'a str> {
    let key = normalize_identifier(candidate);
    known_identifiers
        .iter()
        .copied()
        .find(|id| normalize_identifier(id) == key)
}

/// First JSON object in `raw`, ignoring markdown fences and any prose around it.
fn first_json_object(raw: &str) -> Result<AnalysisResponse, AgentError> {
    let missing =
        || AgentError::MalformedAnalysis("response did not contain a JSON object".to_string());
    let start = raw.find('{').ok_or_else(missing)?;
    serde_json::Deserializer::from_str(&raw[start..])
        .into_iter::<AnalysisResponse>()
        .next()
        .ok_or_else(missing)?
        .map_err(|e| AgentError::MalformedAnalysis(format!("invalid analysis JSON: {e}")))
}

pub struct QueryAnalyzer {
    completion: Arc<dyn CompletionService>,
}

impl QueryAnalyzer {
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self { completion }
    }

    pub async fn analyze(
        &self,
        message: &str,
        known_identifiers: &[&str],
    ) -> Result<AnalysisResult, AgentError> {
        let prompt = analysis_prompt(message, known_identifiers);
        let raw = self
            .completion
            .complete(&prompt, ANALYSIS_TEMPERATURE)
            .await
            .map_err(|e| AgentError::from_completion(e, AgentError::MalformedAnalysis))?;

        let analysis = parse_analysis(&raw, message, known_identifiers)?;
        debug!(
            matched = ?analysis.matched_identifiers,
            hints = ?analysis.category_hints,
            general = analysis.is_general_inquiry,
            "query analyzed"
        );
        Ok(analysis)
    }
}
