// src/analyze/mod.rs
//! Summary enrichment: remote synopsis under a concurrency ceiling, local
//! heuristic otherwise.

pub mod ai_adapter;
pub mod summary;

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use metrics::counter;
use tokio::sync::Semaphore;

use crate::analyze::ai_adapter::{build_client_from_config, DynAiClient, SummaryRequest};
use crate::config::ai::AiConfig;
use crate::ingest::types::ContentItem;

pub use crate::analyze::summary::{fallback_for_item, fallback_summary};

/// Remote output shorter than this is treated as a miss.
pub const MIN_REMOTE_CHARS: usize = 20;

/// Populates `generated_summary` on every item it sees.
pub struct Enricher {
    client: DynAiClient,
    permits: Arc<Semaphore>,
    timeout: Duration,
}

impl Enricher {
    pub fn new(client: DynAiClient, max_concurrency: usize, timeout: Duration) -> Self {
        Self {
            client,
            permits: Arc::new(Semaphore::new(max_concurrency.max(1))),
            timeout,
        }
    }

    pub fn from_config(cfg: &AiConfig) -> Self {
        let client = build_client_from_config(cfg);
        tracing::info!(
            provider = client.provider_name(),
            max_concurrency = cfg.max_concurrency,
            "summary enricher ready"
        );
        Self::new(
            client,
            cfg.max_concurrency,
            Duration::from_secs(cfg.timeout_secs),
        )
    }

    pub fn provider_name(&self) -> &'static str {
        self.client.provider_name()
    }

    async fn remote_summary(&self, item: &ContentItem) -> Option<String> {
        // Closed only if the enricher is dropped mid-run.
        let _permit = self.permits.acquire().await.ok()?;
        let req = SummaryRequest {
            kind: item.kind,
            title: &item.title,
            body: &item.short_summary,
        };
        match tokio::time::timeout(self.timeout, self.client.summarize(req)).await {
            Ok(out) => out,
            Err(_) => {
                tracing::debug!(id = %item.id, "summary request timed out");
                None
            }
        }
    }

    /// Never fails; the returned item always carries a non-empty summary.
    pub async fn enrich(&self, mut item: ContentItem) -> ContentItem {
        let remote = self
            .remote_summary(&item)
            .await
            .map(|s| s.trim().to_string())
            .filter(|s| s.chars().count() >= MIN_REMOTE_CHARS);

        item.generated_summary = match remote {
            Some(text) => {
                counter!("enrich_remote_total").increment(1);
                text
            }
            None => {
                counter!("enrich_fallback_total").increment(1);
                fallback_for_item(&item)
            }
        };
        item
    }

    /// Enrich a batch concurrently; output order matches input order.
    pub async fn enrich_all(&self, items: Vec<ContentItem>) -> Vec<ContentItem> {
        join_all(items.into_iter().map(|item| self.enrich(item))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::ai_adapter::{DisabledClient, MockClient};
    use crate::ingest::types::ContentKind;
    use chrono::NaiveDate;

    fn item(id: &str, summary: &str) -> ContentItem {
        ContentItem {
            id: id.into(),
            kind: ContentKind::Bill,
            title: "Grants Act".into(),
            short_summary: summary.into(),
            generated_summary: String::new(),
            full_text_ref: "https://example.org".into(),
            published_at: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            tags: Default::default(),
            source_category: "Congress".into(),
            lean: None,
        }
    }

    #[tokio::test]
    async fn remote_output_is_used_when_long_enough() {
        let e = Enricher::new(
            Arc::new(MockClient::new("A remote synopsis of reasonable length.")),
            2,
            Duration::from_secs(1),
        );
        let out = e.enrich(item("a", "whatever")).await;
        assert_eq!(out.generated_summary, "A remote synopsis of reasonable length.");
    }

    #[tokio::test]
    async fn short_remote_output_falls_back() {
        let e = Enricher::new(Arc::new(MockClient::new("too short")), 2, Duration::from_secs(1));
        let out = e
            .enrich(item("a", "The agency shall establish new grant programs."))
            .await;
        assert!(out
            .generated_summary
            .contains("The agency shall establish new grant programs."));
    }

    #[tokio::test]
    async fn batch_order_is_preserved() {
        let e = Enricher::new(Arc::new(DisabledClient), 1, Duration::from_secs(1));
        let out = e
            .enrich_all(vec![item("a", ""), item("b", ""), item("c", "")])
            .await;
        let ids: Vec<_> = out.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(out.iter().all(|i| !i.generated_summary.is_empty()));
    }
}
