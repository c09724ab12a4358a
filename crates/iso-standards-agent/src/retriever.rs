/// Catalog retrieval with a placeholder in place of live web search.
///
/// There is no search backend: the generated query is never executed. Its text is
/// carried in a `Placeholder` snippet so the formatter can say what would have been
/// searched and point the user at official sources.
use std::sync::Arc;

use tracing::debug;

use crate::catalog::StandardsCatalog;
use crate::model::{
    AnalysisResult, RetrievedItem, RetrievedSnippet, SearchQuery, SnippetSource, StandardRecord,
};

pub const NO_MATCH_MESSAGE: &str = "No specific standard in the built-in catalog matched this query. \
The catalog covers ISO 13485 (quality management), ISO 14971 (risk management) and \
IEC 62304 (medical device software life cycle).";

const SEARCH_NOTES: &str = "Recent ISO medical device standards information:
- ISO standards are regularly updated and maintained by the International Organization for Standardization
- Medical device standards focus on quality management, risk management, and software lifecycle processes
- Current versions should be verified through official ISO website or regulatory bodies
- Standards may have amendments or technical corrigenda that update requirements

Note: For most current information, consult official ISO catalog or regulatory guidance documents.";

/// Stand-in for web search results.
pub fn simulated_search_results(query: &SearchQuery) -> String {
    format!("Search query: {query}\n\n{SEARCH_NOTES}")
}

pub struct InformationRetriever {
    catalog: Arc<StandardsCatalog>,
}

impl InformationRetriever {
    pub fn new(catalog: Arc<StandardsCatalog>) -> Self {
        Self { catalog }
    }

    /// Records for the analysis followed by at most one placeholder snippet. Never fails.
    pub fn retrieve(&self, analysis: &AnalysisResult, query: &SearchQuery) -> Vec<RetrievedItem> {
        let mut records = self.by_identifier(analysis);
        if records.is_empty() {
            records = self.by_category(analysis);
        }

        debug!(
            records = records.len(),
            query = %query,
            "catalog retrieval complete"
        );

        if records.is_empty() {
            let text = if query.is_empty() {
                NO_MATCH_MESSAGE.to_string()
            } else {
                format!("{NO_MATCH_MESSAGE}\n\n{}", simulated_search_results(query))
            };
            return vec![placeholder(text)];
        }

        let mut items: Vec<RetrievedItem> = records
            .into_iter()
            .cloned()
            .map(RetrievedItem::Record)
            .collect();
        if !query.is_empty() {
            items.push(placeholder(simulated_search_results(query)));
        }
        items
    }

    fn by_identifier(&self, analysis: &AnalysisResult) -> Vec<&StandardRecord> {
        let mut records: Vec<&StandardRecord> = Vec::new();
        for id in &analysis.matched_identifiers {
            match self.catalog.get(id) {
                Some(record) if !records.contains(&record) => records.push(record),
                Some(_) => {}
                None => debug!(identifier = %id, "identifier not in catalog"),
            }
        }
        records
    }

    fn by_category(&self, analysis: &AnalysisResult) -> Vec<&StandardRecord> {
        let hits: Vec<&StandardRecord> = analysis
            .category_hints
            .iter()
            .flat_map(|hint| self.catalog.find_by_keyword(hint))
            .collect();
        // catalog order, each record once
        self.catalog
            .records()
            .iter()
            .filter(|record| hits.contains(record))
            .collect()
    }
}

fn placeholder(text: String) -> RetrievedItem {
    RetrievedItem::Snippet(RetrievedSnippet {
        source: SnippetSource::Placeholder,
        text,
    })
}
