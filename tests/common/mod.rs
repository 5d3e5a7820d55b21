// tests/common/mod.rs
//
// Shared helpers: in-process HTTP server, canned items and scripted sources.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use shuttle_axum::axum::Router;

use civic_feed::analyze::ai_adapter::DisabledClient;
use civic_feed::analyze::Enricher;
use civic_feed::ingest::retry::RetryPolicy;
use civic_feed::{ContentItem, ContentKind, FetchError, SourceProvider};

/// Serve `router` on an ephemeral local port; returns the base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        shuttle_axum::axum::serve(listener, router)
            .await
            .expect("serve test router");
    });
    format!("http://{addr}")
}

pub fn item(id: &str, kind: ContentKind, tags: &[&str]) -> ContentItem {
    ContentItem {
        id: id.to_string(),
        kind,
        title: format!("Item {id}"),
        short_summary: String::new(),
        generated_summary: String::new(),
        full_text_ref: "https://example.org".to_string(),
        published_at: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        source_category: "Test".to_string(),
        lean: None,
    }
}

/// Enricher that never leaves the process.
pub fn local_enricher() -> Enricher {
    Enricher::new(Arc::new(DisabledClient), 4, Duration::from_secs(1))
}

pub fn fast_retry() -> RetryPolicy {
    RetryPolicy::default()
        .with_attempts(2)
        .with_backoff(Duration::from_millis(1))
        .with_timeout(Duration::from_millis(500))
}

/// Returns its items on every call.
pub struct StaticSource {
    pub name: String,
    pub kind: ContentKind,
    pub items: Vec<ContentItem>,
}

impl StaticSource {
    pub fn new(name: &str, kind: ContentKind, items: Vec<ContentItem>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            items,
        }
    }
}

#[async_trait]
impl SourceProvider for StaticSource {
    async fn fetch_latest(&self) -> Result<Vec<ContentItem>, FetchError> {
        Ok(self.items.clone())
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn kind(&self) -> ContentKind {
        self.kind
    }
}

/// Fails with `status` for the first `failures` calls, then returns `items`.
pub struct FlakySource {
    pub name: String,
    pub kind: ContentKind,
    pub status: u16,
    pub failures: usize,
    pub items: Vec<ContentItem>,
    pub calls: Arc<AtomicUsize>,
}

impl FlakySource {
    /// Never recovers.
    pub fn failing(name: &str, kind: ContentKind, status: u16) -> Self {
        Self {
            name: name.to_string(),
            kind,
            status,
            failures: usize::MAX,
            items: Vec::new(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl SourceProvider for FlakySource {
    async fn fetch_latest(&self) -> Result<Vec<ContentItem>, FetchError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.failures {
            Err(FetchError::status(&self.name, self.status))
        } else {
            Ok(self.items.clone())
        }
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn kind(&self) -> ContentKind {
        self.kind
    }
}

/// Sleeps before answering.
pub struct SlowSource {
    pub name: String,
    pub kind: ContentKind,
    pub delay: Duration,
    pub items: Vec<ContentItem>,
}

#[async_trait]
impl SourceProvider for SlowSource {
    async fn fetch_latest(&self) -> Result<Vec<ContentItem>, FetchError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.items.clone())
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn kind(&self) -> ContentKind {
        self.kind
    }
}
