//! Special index (vishesh suchi) extraction from comma-separated search-term fields
//!
//! The index is sorted by plain code point order, not by [`HindiCollator`](crate::collation::HindiCollator).
//! Listings have always returned it that way, so the two orderings stay separate.

use serde_json::Value;
use std::collections::BTreeSet;

/// Split a raw search-term field into trimmed, non-empty terms
pub fn split_terms(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|t| !t.is_empty())
}

/// Collect the unique search terms of `entries`, sorted by code point.
///
/// Entries whose field is missing or blank contribute nothing.
pub fn extract_special_index<T, F>(entries: &[T], field: F) -> Vec<String>
where
    F: Fn(&T) -> Option<&str>,
{
    let mut seen: BTreeSet<String> = BTreeSet::new();

    for raw in entries.iter().filter_map(|e| field(e)) {
        for term in split_terms(raw) {
            if !seen.contains(term) {
                seen.insert(term.to_string());
            }
        }
    }

    seen.into_iter().collect()
}

/// Same as [`extract_special_index`] for untyped documents.
///
/// A field that is absent, null, or not a string (e.g. a number) is skipped.
pub fn extract_special_index_json(records: &[Value], field: &str) -> Vec<String> {
    extract_special_index(records, |r| r.get(field).and_then(Value::as_str))
}
