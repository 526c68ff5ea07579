//! Free-text search combined with facet filters.
//!
//! `search` is a pure, stable filter over the corpus. Matching is
//! case-insensitive substring matching on the name, primary expertise tags,
//! institution name and current role title; facets are ANDed on top.

pub mod debounce;

pub use debounce::{LatestSlot, QueryDebouncer, SearchTicket};

use std::time::Instant;

use crate::types::{Expert, FilterState, LocationFilter};

#[derive(Debug, Clone)]
pub struct QueryResult<T> {
    pub items: Vec<T>,
    pub total_matches: usize,
    pub query_duration_ms: u64,
}

impl<T> QueryResult<T> {
    pub fn new(items: Vec<T>, total_matches: usize, query_duration_ms: u64) -> Self {
        Self {
            items,
            total_matches,
            query_duration_ms,
        }
    }
}

/// Filter `corpus` down to the experts matching `query` and `filters`, in
/// corpus order.
pub fn search<'a>(query: &str, filters: &FilterState, corpus: &'a [Expert]) -> Vec<&'a Expert> {
    let needle = query.to_lowercase();
    corpus
        .iter()
        .filter(|expert| matches_normalized(expert, &needle, filters))
        .collect()
}

/// Same as [`search`], with timing for callers that report it.
pub fn search_with_stats<'a>(query: &str, filters: &FilterState, corpus: &'a [Expert]) -> QueryResult<&'a Expert> {
    let start_time = Instant::now();
    let items = search(query, filters, corpus);
    let len = items.len();
    QueryResult::new(items, len, start_time.elapsed().as_millis() as u64)
}

/// Whether a single expert satisfies the query and every facet.
pub fn matches(expert: &Expert, query: &str, filters: &FilterState) -> bool {
    matches_normalized(expert, &query.to_lowercase(), filters)
}

fn matches_normalized(expert: &Expert, needle: &str, filters: &FilterState) -> bool {
    matches_text(expert, needle) && matches_expertise_filter(expert, filters) && matches_location_filter(expert, filters)
}

fn matches_text(expert: &Expert, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }

    contains_ignore_case(expert.full_name(), needle)
        || expert
            .primary_expertise()
            .iter()
            .any(|tag| contains_ignore_case(tag, needle))
        || contains_ignore_case(expert.institution_name(), needle)
        || contains_ignore_case(expert.role_title(), needle)
}

/// Exact tag membership, unlike the text query.
fn matches_expertise_filter(expert: &Expert, filters: &FilterState) -> bool {
    filters.expertise.is_empty()
        || expert
            .primary_expertise()
            .iter()
            .any(|tag| filters.expertise.contains(tag))
}

fn matches_location_filter(expert: &Expert, filters: &FilterState) -> bool {
    match &filters.location {
        LocationFilter::All => true,
        LocationFilter::City(city) => contains_ignore_case(expert.institution_name(), &city.to_lowercase()),
    }
}

fn contains_ignore_case(text: &str, lowered_needle: &str) -> bool {
    text.to_lowercase().contains(lowered_needle)
}
