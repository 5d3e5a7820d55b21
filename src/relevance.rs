// src/relevance.rs
//! Preference ranking: keep items sharing a tag with the viewer's interests,
//! most overlap first.

use std::cmp::Reverse;

use crate::ingest::types::ContentItem;
use crate::profile::ViewerPreferences;

/// Number of item tags that are also viewer interests. Exact match.
pub fn relevance_count(item: &ContentItem, prefs: &ViewerPreferences) -> usize {
    item.tags
        .iter()
        .filter(|t| prefs.interests.contains(*t))
        .count()
}

/// Filter and order `items` for `prefs`. Input is left untouched.
///
/// Without preferences the input order is returned as-is. An empty interest
/// set matches nothing. Ties keep their relative order.
pub fn rank(items: &[ContentItem], prefs: Option<&ViewerPreferences>) -> Vec<ContentItem> {
    let Some(prefs) = prefs else {
        return items.to_vec();
    };

    let mut scored: Vec<(usize, &ContentItem)> = items
        .iter()
        .map(|i| (relevance_count(i, prefs), i))
        .filter(|(n, _)| *n > 0)
        .collect();
    // sort_by_key is stable
    scored.sort_by_key(|(n, _)| Reverse(*n));
    scored.into_iter().map(|(_, i)| i.clone()).collect()
}
