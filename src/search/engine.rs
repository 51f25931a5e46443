use crate::search::matcher::TextMatcher;
use crate::search::query::{TextRemove, TextSearch};
use crate::store::fulltext::FullTextStore;

/// Scans entries in order and returns the text of each match.
///
/// Stops once `search.limit` results are collected (0 = no limit).
pub fn scan(store: &FullTextStore, search: &TextSearch) -> Vec<String> {
    let matcher = TextMatcher::new(&search.query, search.strict_mode);
    let matches = store
        .entries()
        .iter()
        .filter(|entry| matcher.matches(&entry.text))
        .map(|entry| entry.text.clone());

    match search.limit {
        0 => matches.collect(),
        n => matches.take(n).collect(),
    }
}

/// Removes up to `request.amount` matching entries (0 = all) and returns
/// their texts in scan order.
///
/// Matching keys are collected in one pass before anything is removed, so
/// the position shifts caused by each removal cannot skip or repeat entries.
pub fn remove_matching(store: &mut FullTextStore, request: &TextRemove) -> Vec<String> {
    let matcher = TextMatcher::new(&request.query, request.strict_mode);
    let matching = store
        .entries()
        .iter()
        .filter(|entry| matcher.matches(&entry.text))
        .map(|entry| entry.key.clone());

    let keys: Vec<String> = match request.amount {
        0 => matching.collect(),
        n => matching.take(n).collect(),
    };

    keys.iter()
        .filter_map(|key| store.remove(key))
        .collect()
}
