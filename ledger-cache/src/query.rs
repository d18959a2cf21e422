//! Query layer
//!
//! Pure search, filter and pagination over a ledger snapshot. Runs on the
//! cloned snapshot the service hands out, so a query can never observe a
//! half-applied mutation.

use serde::{Deserialize, Serialize};

use crate::types::{LedgerEntry, Prediction};

/// Entries per page unless the caller overrides it
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Verdict filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PredictionFilter {
    /// All entries
    #[default]
    All,
    /// Only entries scored as fraudulent
    Fraud,
    /// Only entries scored as legitimate; unscored entries are excluded
    Legit,
}

/// Query parameters
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParams {
    /// Case-insensitive substring matched against the formatted amount and
    /// the prediction label; empty matches everything
    pub search_term: String,

    /// Verdict filter
    pub filter: PredictionFilter,

    /// Page number, 1-indexed
    pub page: usize,

    /// Entries per page
    pub page_size: usize,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            filter: PredictionFilter::All,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl QueryParams {
    /// Set the search term
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    /// Set the verdict filter
    pub fn with_filter(mut self, filter: PredictionFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set the page number (1-indexed)
    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }
}

/// One page of query results
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPage {
    /// Matching entries on the requested page, in snapshot order
    pub items: Vec<LedgerEntry>,

    /// The page that was served
    pub page: usize,

    /// Total pages for this query; `0` when nothing matches
    pub total_pages: usize,

    /// Matches across all pages
    pub total_matches: usize,
}

/// Run a query against a snapshot
///
/// Order always follows the snapshot. A page beyond the last yields empty
/// `items` with the totals intact. Page and page size are clamped to 1.
pub fn query(entries: &[LedgerEntry], params: &QueryParams) -> QueryPage {
    let page = params.page.max(1);
    let page_size = params.page_size.max(1);
    let needle = params.search_term.to_lowercase();

    let matches: Vec<&LedgerEntry> = entries
        .iter()
        .filter(|entry| matches_term(entry, &needle) && matches_filter(entry, params.filter))
        .collect();

    let total_matches = matches.len();
    let total_pages = total_matches.div_ceil(page_size);

    let items = matches
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .cloned()
        .collect();

    QueryPage {
        items,
        page,
        total_pages,
        total_matches,
    }
}

fn matches_term(entry: &LedgerEntry, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }

    if entry.amount.to_string().contains(needle) {
        return true;
    }

    entry
        .verdict
        .as_ref()
        .is_some_and(|verdict| verdict.prediction.label().to_lowercase().contains(needle))
}

fn matches_filter(entry: &LedgerEntry, filter: PredictionFilter) -> bool {
    let prediction = entry.verdict.as_ref().map(|verdict| verdict.prediction);

    match filter {
        PredictionFilter::All => true,
        PredictionFilter::Fraud => prediction == Some(Prediction::Fraudulent),
        PredictionFilter::Legit => prediction == Some(Prediction::Legitimate),
    }
}
