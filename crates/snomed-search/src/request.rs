//! Search request/response shapes, per spec.md §4.9.

use snomed_types::SctId;

/// When to apply fuzzy (edit-distance-2) matching on top of the
/// match-or-prefix term query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuzzyMode {
    /// Always include fuzzy terms in the query.
    Always,
    /// Run the exact query first; only re-run with fuzzy terms on zero hits.
    Fallback,
    /// Never apply fuzzy matching.
    Never,
}

/// A Search Indexer query, per spec.md §4.9.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// The free-text search string.
    pub s: String,
    /// Restrict to descendants of any of these concepts (recursive, OR'd).
    pub is_a: Vec<SctId>,
    /// Restrict to direct children of any of these concepts (OR'd).
    pub direct_parents: Vec<SctId>,
    /// Restrict to concepts that are members of any of these refsets (OR'd).
    pub concept_refsets: Vec<SctId>,
    /// Restrict to descriptions that are members of any of these refsets (OR'd).
    pub description_refsets: Vec<SctId>,
    /// Whether inactive concepts/descriptions are eligible.
    pub include_inactive: bool,
    pub fuzzy: FuzzyMode,
    pub maximum_hits: usize,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            s: String::new(),
            is_a: Vec::new(),
            direct_parents: Vec::new(),
            concept_refsets: Vec::new(),
            description_refsets: Vec::new(),
            include_inactive: false,
            fuzzy: FuzzyMode::Fallback,
            maximum_hits: 50,
        }
    }
}

/// A single matched description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub description_id: SctId,
    pub concept_id: SctId,
    pub term: String,
}

/// The result of a [`crate::index::SearchIndex::search`] call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchResponse {
    pub hits: Vec<SearchHit>,
}
