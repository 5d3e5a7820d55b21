// src/ingest/mod.rs
pub mod config;
pub mod providers;
pub mod retry;
pub mod seed;
pub mod tagging;
pub mod types;

use crate::ingest::types::{ContentItem, ContentKind, Lean};
use chrono::NaiveDate;
use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;
use std::collections::BTreeSet;

pub const UNTITLED: &str = "Untitled";

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "ingest_events_total",
            "Records normalized from providers."
        );
        describe_counter!(
            "ingest_malformed_total",
            "Provider records dropped during normalization."
        );
        describe_counter!(
            "ingest_provider_errors_total",
            "Provider fetch/parse errors."
        );
        describe_counter!(
            "ingest_fallback_total",
            "Sources replaced by their seed set."
        );
        describe_histogram!("ingest_parse_ms", "Provider parse time in milliseconds.");
        describe_counter!(
            "enrich_remote_total",
            "Summaries accepted from the text-generation service."
        );
        describe_counter!(
            "enrich_fallback_total",
            "Summaries derived locally."
        );
    });
}

/// Normalize text: decode entities, strip tags, collapse whitespace, trim.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // 5) Length cap: 4000 chars
    if out.chars().count() > 4000 {
        out = out.chars().take(4000).collect();
    }

    out
}

/// Stable id for records whose provider has no identifier of its own.
pub fn synthesize_id(kind: ContentKind, title: &str, full_text_ref: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update([0u8]);
    hasher.update(full_text_ref.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(kind.id_prefix().len() + 13);
    out.push_str(kind.id_prefix());
    out.push('-');
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Accepts `YYYY-MM-DD` and anything starting with it (RFC 3339 timestamps).
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let head = s.get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

pub fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

/// Provider-native fields before defaults are applied.
#[derive(Debug, Clone, Default)]
pub struct RawRecord {
    pub id: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub url: Option<String>,
    pub published: Option<NaiveDate>,
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub lean: Option<Lean>,
}

/// Per-provider defaults for missing fields.
#[derive(Debug, Clone)]
pub struct RecordDefaults<'a> {
    pub kind: ContentKind,
    pub homepage: &'a str,
    pub category: &'a str,
}

/// Apply documented defaults. Returns `None` only when the record has nothing
/// to identify it: no title, summary, upstream id or URL.
pub fn normalize_record(raw: RawRecord, defaults: &RecordDefaults<'_>) -> Option<ContentItem> {
    let title = raw.title.as_deref().map(normalize_text).unwrap_or_default();
    let short_summary = raw.summary.as_deref().map(normalize_text).unwrap_or_default();
    let upstream_id = raw
        .id
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let url = raw
        .url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty());
    if title.is_empty() && short_summary.is_empty() && upstream_id.is_none() && url.is_none() {
        counter!("ingest_malformed_total").increment(1);
        return None;
    }
    let title = if title.is_empty() {
        UNTITLED.to_string()
    } else {
        title
    };

    let full_text_ref = url.unwrap_or_else(|| defaults.homepage.to_string());
    let id =
        upstream_id.unwrap_or_else(|| synthesize_id(defaults.kind, &title, &full_text_ref));

    let mut tags: BTreeSet<String> = raw
        .tags
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    tags.extend(tagging::derive_tags(&format!("{title}. {short_summary}")));

    let source_category = raw
        .category
        .map(|c| normalize_text(&c))
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| defaults.category.to_string());

    Some(ContentItem {
        id,
        kind: defaults.kind,
        title,
        short_summary,
        generated_summary: String::new(),
        full_text_ref,
        published_at: raw.published.unwrap_or_else(today),
        tags,
        source_category,
        lean: raw.lean,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> RecordDefaults<'static> {
        RecordDefaults {
            kind: ContentKind::News,
            homepage: "https://newsapi.org",
            category: "NewsAPI",
        }
    }

    #[test]
    fn normalize_text_collapses_ws_and_entities() {
        let s = "  <p>Hello,&nbsp;&nbsp; world!</p>  ";
        let out = normalize_text(s);
        assert_eq!(out, "Hello, world!");
    }

    #[test]
    fn synthesized_ids_are_stable_and_prefixed() {
        let a = synthesize_id(ContentKind::Bill, "Budget Act", "https://x.test/1");
        let b = synthesize_id(ContentKind::Bill, "Budget Act", "https://x.test/1");
        let c = synthesize_id(ContentKind::Bill, "Budget Act", "https://x.test/2");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("bill-"));
        assert_eq!(a.len(), "bill-".len() + 12);
    }

    #[test]
    fn parse_date_accepts_plain_and_timestamps() {
        assert_eq!(
            parse_date("2024-03-15"),
            NaiveDate::from_ymd_opt(2024, 3, 15)
        );
        assert_eq!(
            parse_date("2024-03-15T10:00:00Z"),
            NaiveDate::from_ymd_opt(2024, 3, 15)
        );
        assert_eq!(parse_date("March 15"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let raw = RawRecord {
            summary: Some("Lawmakers met today.".into()),
            ..Default::default()
        };
        let item = normalize_record(raw, &defaults()).expect("summary alone is displayable");
        assert_eq!(item.title, UNTITLED);
        assert_eq!(item.full_text_ref, "https://newsapi.org");
        assert_eq!(item.source_category, "NewsAPI");
        assert_eq!(item.published_at, today());
        assert!(item.id.starts_with("news-"));
    }

    #[test]
    fn identified_record_without_text_is_untitled() {
        let raw = RawRecord {
            id: Some("eo-14999".into()),
            url: Some("https://www.federalregister.gov/d/2025-1".into()),
            ..Default::default()
        };
        let item = normalize_record(raw, &defaults()).expect("id and url identify the record");
        assert_eq!(item.id, "eo-14999");
        assert_eq!(item.title, UNTITLED);
        assert_eq!(item.short_summary, "");
        assert_eq!(item.full_text_ref, "https://www.federalregister.gov/d/2025-1");

        let url_only = RawRecord {
            title: Some("   ".into()),
            url: Some("https://x.test/a".into()),
            ..Default::default()
        };
        let item = normalize_record(url_only, &defaults()).unwrap();
        assert_eq!(item.title, UNTITLED);
        assert!(item.id.starts_with("news-"));
    }

    #[test]
    fn record_with_nothing_to_identify_it_is_dropped() {
        let raw = RawRecord {
            title: Some("   ".into()),
            summary: Some("<p></p>".into()),
            id: Some(" ".into()),
            url: Some("".into()),
            published: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..Default::default()
        };
        assert!(normalize_record(raw, &defaults()).is_none());
    }

    #[test]
    fn provider_tags_merge_with_derived_topics() {
        let raw = RawRecord {
            title: Some("Medicaid expansion clears committee".into()),
            tags: vec![" State Politics ".into(), "".into()],
            ..Default::default()
        };
        let item = normalize_record(raw, &defaults()).unwrap();
        assert!(item.tags.contains("State Politics"));
        assert!(item.tags.contains("Healthcare"));
        assert!(!item.tags.contains(""));
    }
}
