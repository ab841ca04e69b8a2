//! Tag normalization and autocomplete ordering.
//!
//! Tags reach storage from two places, the analyzer and direct user input,
//! and both pass through [`normalize_tags`] so the stored relation only ever
//! sees one shape: trimmed, lowercase, at most [`MAX_TAG_LENGTH`] characters,
//! unique per link (case-insensitive).

use std::collections::HashSet;

use serde::Serialize;

use crate::defaults::{MAX_TAG_LENGTH, TAG_SUGGESTION_LIMIT};

/// Normalize a single tag name. Returns `None` when nothing usable remains.
pub fn normalize_tag(raw: &str) -> Option<String> {
    let lowered = raw.trim().to_lowercase();
    let capped: String = lowered.chars().take(MAX_TAG_LENGTH).collect();
    let capped = capped.trim_end();
    if capped.is_empty() {
        None
    } else {
        Some(capped.to_string())
    }
}

/// Normalize a candidate tag list.
///
/// Entries that are blank after trimming are dropped, the rest are
/// lowercased and capped in length, duplicates (within `raw` and against
/// `existing`) are removed case-insensitively, and at most `limit` entries
/// are kept. Order of first appearance is preserved.
pub fn normalize_tags<S, E>(raw: &[S], existing: &[E], limit: usize) -> Vec<String>
where
    S: AsRef<str>,
    E: AsRef<str>,
{
    let mut seen: HashSet<String> = existing
        .iter()
        .filter_map(|t| normalize_tag(t.as_ref()))
        .collect();

    let mut out = Vec::new();
    for candidate in raw {
        if out.len() >= limit {
            break;
        }
        let Some(tag) = normalize_tag(candidate.as_ref()) else {
            continue;
        };
        if seen.insert(tag.clone()) {
            out.push(tag);
        }
    }
    out
}

/// Autocomplete result: favorites first, then other known tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagSuggestions {
    pub favorites: Vec<String>,
    pub others: Vec<String>,
}

/// Build autocomplete suggestions for a tag input.
///
/// With a non-empty query, favorites containing it come first, then the
/// remaining known tags containing it, each group capped at
/// [`TAG_SUGGESTION_LIMIT`]. With an empty query only favorites are offered.
/// Tags already attached to the link are never suggested.
pub fn suggest_tags<A, F, T>(query: &str, all_tags: &[A], favorites: &[F], attached: &[T]) -> TagSuggestions
where
    A: AsRef<str>,
    F: AsRef<str>,
    T: AsRef<str>,
{
    let search = query.trim().to_lowercase();
    let attached: HashSet<String> = attached.iter().map(|t| t.as_ref().to_lowercase()).collect();
    let favorite_set: HashSet<String> = favorites.iter().map(|t| t.as_ref().to_lowercase()).collect();

    let available_favorites = favorites
        .iter()
        .map(|t| t.as_ref())
        .filter(|t| !attached.contains(&t.to_lowercase()));

    if search.is_empty() {
        return TagSuggestions {
            favorites: available_favorites.map(str::to_string).collect(),
            others: Vec::new(),
        };
    }

    let favorites = available_favorites
        .filter(|t| t.to_lowercase().contains(&search))
        .take(TAG_SUGGESTION_LIMIT)
        .map(str::to_string)
        .collect();

    let others = all_tags
        .iter()
        .map(|t| t.as_ref())
        .filter(|t| {
            let lower = t.to_lowercase();
            lower.contains(&search) && !attached.contains(&lower) && !favorite_set.contains(&lower)
        })
        .take(TAG_SUGGESTION_LIMIT)
        .map(str::to_string)
        .collect();

    TagSuggestions { favorites, others }
}
