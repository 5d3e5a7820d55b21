//! Civic feed service: binary entrypoint.
//! Boots the Axum HTTP server with the feed runtime and the metrics exporter.

use std::sync::Arc;

use civic_feed::metrics::Metrics;
use civic_feed::FeedRuntime;
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default, JSON when `LOG_FORMAT=json`.
/// The platform may already own the global subscriber; that is fine.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("civic_feed=info,warn"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    let _ = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    // Recorder first so metric descriptions reach it.
    let metrics = match Metrics::init() {
        Ok(m) => Some(m),
        Err(e) => {
            tracing::warn!(error = ?e, "metrics exporter disabled");
            None
        }
    };

    let runtime = Arc::new(FeedRuntime::from_env()?);
    let mut router = civic_feed::router(runtime);
    if let Some(m) = metrics {
        router = router.merge(m.router());
    }

    Ok(router.into())
}
