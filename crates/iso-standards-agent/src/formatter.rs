/// Final answer formatting: catalog data, placeholder search notes and recent
/// history go to the completion service together with a fixed output template.
use std::sync::Arc;

use llm_common::completion::{CompletionService, Prompt};
use tracing::debug;

use crate::error::AgentError;
use crate::history::{ConversationHistory, HISTORY_CAPACITY};
use crate::model::{RetrievedItem, StandardRecord};

/// Low temperature biases toward consistent phrasing; identical input may still differ.
pub const FORMAT_TEMPERATURE: f32 = 0.1;

pub const RESPONSE_TEMPLATE: &str = "📋 **ISO Standard Information**

**Standard:** [ISO Number and Title]
**Topic:** [Main subject area]
**Scope:** [What it covers]
**Product Application:** [Which devices/products]
**Publication Date:** [When published/updated]

**Summary:** [Brief description]";

pub fn format_prompt(
    user_message: &str,
    retrieved: &[RetrievedItem],
    history: &ConversationHistory,
) -> Prompt {
    let records: Vec<&StandardRecord> = retrieved.iter().filter_map(RetrievedItem::as_record).collect();
    let records_json = if records.is_empty() {
        "(none)".to_string()
    } else {
        serde_json::to_string_pretty(&records).unwrap_or_else(|_| "(unavailable)".to_string())
    };

    let snippets: Vec<&str> = retrieved
        .iter()
        .filter_map(RetrievedItem::as_snippet)
        .map(|s| s.text.as_str())
        .collect();
    let snippets_text = if snippets.is_empty() {
        "(none)".to_string()
    } else {
        snippets.join("\n\n")
    };

    let system = format!(
        "You are an ISO medical device standards expert. Answer the user's query using the \
standards data and search notes below.\n\n\
Standards data:\n{records_json}\n\n\
Search notes:\n{snippets_text}\n\n\
Format the answer in a clear, structured way using this template:\n\n\
{RESPONSE_TEMPLATE}\n\n\
If multiple standards are relevant, list them separately. \
If the query mentions a specific standard number, focus on that standard. \
If it is about a device category, suggest the relevant standards. \
If the search notes indicate newer versions or updates, mention them. \
If no standard in the data matches, say so and use the search notes and general knowledge, \
pointing the user to official sources. \
Use the conversation history only to resolve follow-up references. \
Be concise but comprehensive."
    );

    let mut user = String::new();
    let recent = history.recent(HISTORY_CAPACITY);
    if !recent.is_empty() {
        user.push_str("Conversation so far (oldest first):\n");
        for exchange in &recent {
            user.push_str(&format!(
                "User: {}\nAssistant: {}\n",
                exchange.user_message, exchange.bot_response
            ));
        }
        user.push('\n');
    }
    user.push_str(&format!("User query: {user_message}"));

    Prompt::new(system, user)
}

pub struct ResponseFormatter {
    completion: Arc<dyn CompletionService>,
}

impl ResponseFormatter {
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self { completion }
    }

    pub async fn format(
        &self,
        user_message: &str,
        retrieved: &[RetrievedItem],
        history: &ConversationHistory,
    ) -> Result<String, AgentError> {
        let prompt = format_prompt(user_message, retrieved, history);
        let response = self
            .completion
            .complete(&prompt, FORMAT_TEMPERATURE)
            .await
            .map_err(|e| AgentError::from_completion(e, AgentError::MalformedFormat))?;

        debug!(chars = response.len(), "response formatted");
        Ok(response)
    }
}
