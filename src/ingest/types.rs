// src/ingest/types.rs
use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Category of a feed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentKind {
    News,
    Bill,
    Ruling,
    ExecutiveOrder,
}

impl ContentKind {
    pub const ALL: [ContentKind; 4] = [
        ContentKind::News,
        ContentKind::Bill,
        ContentKind::Ruling,
        ContentKind::ExecutiveOrder,
    ];

    /// Short prefix used for synthesized ids.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            ContentKind::News => "news",
            ContentKind::Bill => "bill",
            ContentKind::Ruling => "ruling",
            ContentKind::ExecutiveOrder => "eo",
        }
    }

    /// Human label used in summary lead-ins.
    pub fn label(&self) -> &'static str {
        match self {
            ContentKind::News => "news article",
            ContentKind::Bill => "bill",
            ContentKind::Ruling => "court ruling",
            ContentKind::ExecutiveOrder => "executive order",
        }
    }
}

/// Descriptive political lean label. Never used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lean {
    Left,
    Center,
    Right,
}

/// Unified record for a news article, bill, court ruling or executive order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    pub kind: ContentKind,
    pub title: String,
    #[serde(default)]
    pub short_summary: String,
    #[serde(default)]
    pub generated_summary: String,
    pub full_text_ref: String,
    pub published_at: NaiveDate,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub source_category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lean: Option<Lean>,
}

/// What went wrong while fetching one source. All variants map to the
/// "source unavailable" class: the pipeline substitutes seed data for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    Transport,
    HttpStatus,
    Timeout,
    MalformedResponse,
    Misconfigured,
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{source_name}: {message}")]
pub struct FetchError {
    pub source_name: String,
    pub kind: FetchErrorKind,
    pub http_status: Option<u16>,
    pub message: String,
}

impl FetchError {
    pub fn new(source_name: &str, kind: FetchErrorKind, message: impl Into<String>) -> Self {
        Self {
            source_name: source_name.to_string(),
            kind,
            http_status: None,
            message: message.into(),
        }
    }

    pub fn status(source_name: &str, status: u16) -> Self {
        Self {
            source_name: source_name.to_string(),
            kind: FetchErrorKind::HttpStatus,
            http_status: Some(status),
            message: format!("upstream responded with HTTP {status}"),
        }
    }

    pub fn timeout(source_name: &str) -> Self {
        Self::new(source_name, FetchErrorKind::Timeout, "request timed out")
    }

    pub fn malformed(source_name: &str, message: impl Into<String>) -> Self {
        Self::new(source_name, FetchErrorKind::MalformedResponse, message)
    }

    pub fn misconfigured(source_name: &str, message: impl Into<String>) -> Self {
        Self::new(source_name, FetchErrorKind::Misconfigured, message)
    }

    pub fn from_reqwest(source_name: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::timeout(source_name);
        }
        if let Some(status) = err.status() {
            return Self::status(source_name, status.as_u16());
        }
        Self::new(source_name, FetchErrorKind::Transport, err.to_string())
    }

    /// Transport failures, timeouts, throttling and server errors are worth
    /// another attempt; client errors and bad payloads are not.
    pub fn is_retryable(&self) -> bool {
        match self.kind {
            FetchErrorKind::Transport | FetchErrorKind::Timeout => true,
            FetchErrorKind::HttpStatus => {
                matches!(self.http_status, Some(s) if s == 429 || s >= 500)
            }
            FetchErrorKind::MalformedResponse | FetchErrorKind::Misconfigured => false,
        }
    }
}

#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    /// Fetch and normalize the provider's latest records, upstream order preserved.
    async fn fetch_latest(&self) -> Result<Vec<ContentItem>, FetchError>;
    fn name(&self) -> &str;
    fn kind(&self) -> ContentKind;
}
