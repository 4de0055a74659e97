//! Shared helpers for ranking frequency tables and clipping text

use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Rank a frequency map by count (highest first).
/// Equal counts fall back to key order so output is reproducible across runs.
pub fn rank_by_count(map: &BTreeMap<String, u64>) -> Vec<(&str, u64)> {
    let mut ranked: Vec<(&str, u64)> = map.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    // BTreeMap iteration is already key-ordered and sort_by_key is stable
    ranked.sort_by_key(|(_, count)| Reverse(*count));
    ranked
}

/// The highest-count entry, ties broken by the smallest key.
pub fn top_entry(map: &BTreeMap<String, u64>) -> Option<(&str, u64)> {
    rank_by_count(map).into_iter().next()
}

/// First `max_chars` characters of `text`, never splitting a UTF-8 sequence.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
