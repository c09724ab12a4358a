/// Web-search query generation.
///
/// The generated query is informational only. No search backend is wired in, so the
/// retriever embeds it in a placeholder snippet instead of executing it.
use std::sync::Arc;

use llm_common::completion::{CompletionService, Prompt};
use tracing::{debug, warn};

use crate::model::{AnalysisResult, SearchQuery};

pub const SEARCH_QUERY_TEMPERATURE: f32 = 0.1;

pub fn search_query_prompt(analysis: &AnalysisResult) -> Prompt {
    let mut context = String::new();
    if !analysis.matched_identifiers.is_empty() {
        context.push_str(&format!(
            "\nReferenced standards: {}",
            analysis.matched_identifiers.join(", ")
        ));
    }
    if !analysis.category_hints.is_empty() {
        context.push_str(&format!(
            "\nDevice categories: {}",
            analysis.category_hints.join(", ")
        ));
    }

    let system = format!(
        "Create a web search query to find current information about ISO medical device standards \
based on this user query: {query}{context}\n\n\
Focus on finding:\n\
- Official ISO standard documents\n\
- Publication dates and current versions\n\
- Scope and application information\n\
- Medical device regulatory information\n\n\
Return only the search query, nothing else.",
        query = analysis.query,
    );
    Prompt::new(system, analysis.query.clone())
}

/// Query used when the model gives nothing usable.
pub fn fallback_query(analysis: &AnalysisResult) -> SearchQuery {
    let message = analysis.query.trim();
    if message.is_empty() {
        SearchQuery("ISO medical device standards".to_string())
    } else {
        SearchQuery(format!("{message} ISO medical device standard"))
    }
}

/// First non-empty line of the reply without surrounding quotes or backticks.
fn clean_reply(raw: &str) -> Option<String> {
    raw.lines()
        .map(|line| line.trim().trim_matches(|c: char| c == '"' || c == '`' || c == '\'').trim())
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

pub struct SearchQueryGenerator {
    completion: Arc<dyn CompletionService>,
}

impl SearchQueryGenerator {
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self { completion }
    }

    /// Always yields a query; completion failures fall back to one built from the raw message.
    pub async fn generate(&self, analysis: &AnalysisResult) -> SearchQuery {
        let prompt = search_query_prompt(analysis);
        match self.completion.complete(&prompt, SEARCH_QUERY_TEMPERATURE).await {
            Ok(raw) => match clean_reply(&raw) {
                Some(query) => {
                    debug!(query = %query, "search query generated");
                    SearchQuery(query)
                }
                None => fallback_query(analysis),
            },
            Err(e) => {
                warn!(error = %e, "search query generation failed, using fallback");
                fallback_query(analysis)
            }
        }
    }
}
