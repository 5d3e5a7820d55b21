// src/ingest/providers/mod.rs
pub mod court_listener;
pub mod federal_register;
pub mod legiscan;
pub mod news_api;
pub mod outlet_rss;

use std::time::{Duration, Instant};

use metrics::{counter, histogram};

use crate::ingest::config::{ProviderKind, SourceConfig};
use crate::ingest::types::{FetchError, SourceProvider};

pub const USER_AGENT: &str = "civic-feed/0.1";

/// Shared HTTP client for all adapters; per-call timeout included.
pub fn build_http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(4).min(timeout))
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default http client");
            reqwest::Client::new()
        })
}

/// Send a request and read the body; non-2xx is an error carrying the status.
pub(crate) async fn send_for_text(
    source_name: &str,
    req: reqwest::RequestBuilder,
) -> Result<String, FetchError> {
    let resp = req.send().await.map_err(|e| {
        counter!("ingest_provider_errors_total").increment(1);
        tracing::warn!(error = %e, provider = source_name, "provider http error");
        FetchError::from_reqwest(source_name, &e)
    })?;
    let status = resp.status();
    if !status.is_success() {
        counter!("ingest_provider_errors_total").increment(1);
        return Err(FetchError::status(source_name, status.as_u16()));
    }
    resp.text()
        .await
        .map_err(|e| FetchError::from_reqwest(source_name, &e))
}

/// Same as [`send_for_text`], parsed as JSON.
pub(crate) async fn send_for_json(
    source_name: &str,
    req: reqwest::RequestBuilder,
) -> Result<serde_json::Value, FetchError> {
    let body = send_for_text(source_name, req).await?;
    serde_json::from_str(&body).map_err(|e| {
        counter!("ingest_provider_errors_total").increment(1);
        FetchError::malformed(source_name, format!("invalid json: {e}"))
    })
}

/// Telemetry shared by every adapter's parse step.
pub(crate) fn record_parse(t0: Instant, kept: usize) {
    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("ingest_parse_ms").record(ms);
    counter!("ingest_events_total").increment(kept as u64);
}

/// Build the adapters for one pipeline run. `viewer_location` supplies the
/// state for legislative sources that do not pin one.
pub fn build_providers(
    sources: &[SourceConfig],
    client: &reqwest::Client,
    viewer_location: Option<&str>,
) -> Vec<Box<dyn SourceProvider>> {
    sources
        .iter()
        .map(|cfg| -> Box<dyn SourceProvider> {
            match cfg.provider {
                ProviderKind::NewsApi => {
                    Box::new(news_api::NewsApiProvider::from_config(cfg, client.clone()))
                }
                ProviderKind::OutletRss => Box::new(outlet_rss::OutletRssProvider::from_config(
                    cfg,
                    client.clone(),
                )),
                ProviderKind::Legiscan => Box::new(legiscan::LegiscanProvider::from_config(
                    cfg,
                    client.clone(),
                    viewer_location,
                )),
                ProviderKind::CourtListener => Box::new(
                    court_listener::CourtListenerProvider::from_config(cfg, client.clone()),
                ),
                ProviderKind::FederalRegister => Box::new(
                    federal_register::FederalRegisterProvider::from_config(cfg, client.clone()),
                ),
            }
        })
        .collect()
}
