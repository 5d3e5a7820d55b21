// src/analyze/summary.rs
//! Local summary heuristic used whenever the remote client yields nothing.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ingest::types::{ContentItem, ContentKind};

/// Words that mark a sentence as describing what a measure does.
pub const LEGISLATIVE_KEYWORDS: [&str; 21] = [
    "shall",
    "authorize",
    "appropriate",
    "establish",
    "require",
    "provide",
    "create",
    "prohibit",
    "amend",
    "repeal",
    "direct",
    "ensure",
    "protect",
    "promote",
    "support",
    "fund",
    "grant",
    "implement",
    "develop",
    "expand",
    "improve",
];

/// Sentences shorter than this are ignored by the extractor.
const MIN_SENTENCE_CHARS: usize = 20;
const MAX_SENTENCES: usize = 3;
/// Length of the plain excerpt used when no sentence matches.
pub const EXCERPT_CHARS: usize = 180;

static SENTENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^.!?]+[.!?]*").unwrap());

fn has_keyword(sentence: &str) -> bool {
    let lower = sentence.to_lowercase();
    LEGISLATIVE_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Up to three keyword-bearing sentences from `text`, in order.
pub fn key_sentences(text: &str) -> Vec<String> {
    SENTENCE
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .filter(|s| s.chars().count() > MIN_SENTENCE_CHARS && has_keyword(s))
        .take(MAX_SENTENCES)
        .map(str::to_string)
        .collect()
}

fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= EXCERPT_CHARS {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(EXCERPT_CHARS).collect();
    format!("{}...", cut.trim_end())
}

fn lead_in(kind: ContentKind, title: &str) -> String {
    match kind {
        ContentKind::Bill => format!("This bill, \"{title}\", would:"),
        ContentKind::Ruling => format!("In \"{title}\", the court's decision:"),
        ContentKind::ExecutiveOrder => format!("This executive order, \"{title}\", directs:"),
        ContentKind::News => format!("Key points from \"{title}\":"),
    }
}

/// Deterministic summary derived from the item alone. Never empty.
pub fn fallback_summary(kind: ContentKind, title: &str, text: &str, source: &str) -> String {
    if text.trim().is_empty() {
        let label = kind.label();
        let article = if label.starts_with(['a', 'e', 'i', 'o', 'u']) {
            "an"
        } else {
            "a"
        };
        return format!(
            "\"{title}\" is {article} {label} from {source}; no further details are available yet."
        );
    }
    let sentences = key_sentences(text);
    if sentences.is_empty() {
        format!("Summary of \"{title}\": {}", excerpt(text))
    } else {
        format!("{} {}", lead_in(kind, title), sentences.join(" "))
    }
}

/// Convenience for a whole item: body is the short summary, else the title.
pub fn fallback_for_item(item: &ContentItem) -> String {
    let text = if item.short_summary.trim().is_empty() {
        item.title.as_str()
    } else {
        item.short_summary.as_str()
    };
    fallback_summary(item.kind, &item.title, text, &item.source_category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_sentence_is_extracted() {
        let s = fallback_summary(
            ContentKind::Bill,
            "Grants Act",
            "The agency shall establish new grant programs.",
            "Congress",
        );
        assert_eq!(
            s,
            "This bill, \"Grants Act\", would: The agency shall establish new grant programs."
        );
    }

    #[test]
    fn at_most_three_sentences() {
        let text = "Agencies shall report yearly to Congress. The board meets quarterly in public. \
                    States may apply for funding under this act. Counties shall appoint inspectors now. \
                    The state must protect wetlands too.";
        let got = key_sentences(text);
        assert_eq!(
            got,
            vec![
                "Agencies shall report yearly to Congress.",
                "States may apply for funding under this act.",
                "Counties shall appoint inspectors now.",
            ]
        );
    }

    #[test]
    fn short_sentences_are_ignored() {
        assert!(key_sentences("Fund it. Repeal that now!").is_empty());
    }

    #[test]
    fn excerpt_when_nothing_matches() {
        let text = "x".repeat(400);
        let s = fallback_summary(ContentKind::News, "Story", &text, "Wire");
        assert!(s.starts_with("Summary of \"Story\": "));
        assert!(s.ends_with("..."));
        assert!(s.contains(&"x".repeat(EXCERPT_CHARS)));
        assert!(!s.contains(&"x".repeat(EXCERPT_CHARS + 1)));
    }

    #[test]
    fn empty_text_still_yields_summary() {
        let s = fallback_summary(ContentKind::Ruling, "Doe v. Roe", "  ", "SCOTUS");
        assert!(!s.is_empty());
        assert!(s.contains("Doe v. Roe"));
        assert!(s.contains("SCOTUS"));
    }
}
