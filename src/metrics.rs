// src/metrics.rs
//! Prometheus exposition for the feed service.
//!
//! Series: ingest counters (`ingest_events_total`, `ingest_malformed_total`,
//! `ingest_provider_errors_total`, `ingest_fallback_total`), adapter parse
//! time in `ingest_parse_ms`, and `enrich_remote_total` /
//! `enrich_fallback_total` counting where summaries came from.

use anyhow::Context;
use axum::{routing::get, Router};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Handle to the installed recorder; render it through [`Metrics::router`].
pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Fails if one is already set.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        crate::ingest::ensure_metrics_described();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
