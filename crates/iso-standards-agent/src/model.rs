use std::fmt;

use serde::{Deserialize, Serialize};

/// A single published standard from the built-in catalog (e.g. "ISO 13485").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardRecord {
    /// Lookup key, e.g. "ISO 13485", "IEC 62304"
    pub identifier: String,
    /// Official short title
    pub title: String,
    /// Main subject area
    pub topic: String,
    /// What the standard covers
    pub scope: String,
    /// Which devices or products it applies to
    pub product_application: String,
    /// Publication year and version note, e.g. "2016 (current version)"
    pub publication_date: String,
    /// One-paragraph description
    pub summary: String,
}

/// Classification of one user message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisResult {
    /// The raw user message the analysis was produced for.
    pub query: String,
    /// Canonical catalog identifiers referenced by the message, de-duplicated, in reported order.
    pub matched_identifiers: Vec<String>,
    /// Device-category or subject keywords, e.g. "software", "risk".
    pub category_hints: Vec<String>,
    pub is_general_inquiry: bool,
}

/// Web-search query text generated for one turn.
///
/// Informational only: no search backend executes it. It is carried into the
/// placeholder snippet so the formatter can mention what would have been searched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery(pub String);

impl SearchQuery {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnippetSource {
    Catalog,
    /// Fixed stand-in text used because no live search integration exists.
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievedSnippet {
    pub source: SnippetSource,
    pub text: String,
}

/// One element of the retriever's ordered output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievedItem {
    Record(StandardRecord),
    Snippet(RetrievedSnippet),
}

impl RetrievedItem {
    pub fn as_record(&self) -> Option<&StandardRecord> {
        match self {
            RetrievedItem::Record(record) => Some(record),
            RetrievedItem::Snippet(_) => None,
        }
    }

    pub fn as_snippet(&self) -> Option<&RetrievedSnippet> {
        match self {
            RetrievedItem::Record(_) => None,
            RetrievedItem::Snippet(snippet) => Some(snippet),
        }
    }
}

/// One user message paired with the assistant's reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub user_message: String,
    pub bot_response: String,
}

impl Exchange {
    pub fn new(user_message: impl Into<String>, bot_response: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            bot_response: bot_response.into(),
        }
    }
}
