// src/bootstrap.rs
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::info;

use crate::analyze::Enricher;
use crate::config::ai::AiConfig;
use crate::ingest::config::{load_sources_default, SourceConfig};
use crate::ingest::providers::{build_http_client, build_providers};
use crate::ingest::retry::RetryPolicy;
use crate::pipeline::{FeedOutcome, Pipeline};
use crate::profile::{DynProfileStore, InMemoryProfileStore, ViewerPreferences};

/// Everything a feed request needs, built once at process start and shared
/// by handle.
pub struct FeedRuntime {
    sources: Vec<SourceConfig>,
    http: reqwest::Client,
    pipeline: Pipeline,
    profiles: DynProfileStore,
}

impl FeedRuntime {
    pub fn new(
        sources: Vec<SourceConfig>,
        http: reqwest::Client,
        pipeline: Pipeline,
        profiles: DynProfileStore,
    ) -> Self {
        Self {
            sources,
            http,
            pipeline,
            profiles,
        }
    }

    /// Source list and AI settings from files/env, in-memory profile store.
    pub fn from_env() -> anyhow::Result<Self> {
        let sources = load_sources_default().context("loading feed sources")?;
        let ai = AiConfig::load_default().context("loading ai config")?;
        Ok(Self::from_parts(sources, &ai, Arc::new(InMemoryProfileStore::new())))
    }

    pub fn from_parts(sources: Vec<SourceConfig>, ai: &AiConfig, profiles: DynProfileStore) -> Self {
        let timeout = Duration::from_secs(ai.timeout_secs);
        info!(
            sources = sources.len(),
            ai_provider = %ai.provider,
            ai_enabled = ai.enabled,
            key_len = ai.api_key.len(),
            "feed runtime configured"
        );
        let pipeline = Pipeline::new(
            Enricher::from_config(ai),
            RetryPolicy::default().with_timeout(timeout),
        );
        Self::new(sources, build_http_client(timeout), pipeline, profiles)
    }

    pub fn profiles(&self) -> &DynProfileStore {
        &self.profiles
    }

    async fn prefs_for(&self, viewer: Option<&str>) -> Option<ViewerPreferences> {
        match viewer.map(str::trim).filter(|v| !v.is_empty()) {
            Some(id) => self.profiles.get_preferences(id).await,
            None => None,
        }
    }

    /// Assemble a feed for `viewer` (or an anonymous one).
    pub async fn feed_for(&self, viewer: Option<&str>) -> FeedOutcome {
        let prefs = self.prefs_for(viewer).await;
        let providers = build_providers(
            &self.sources,
            &self.http,
            prefs.as_ref().and_then(ViewerPreferences::location),
        );
        self.pipeline.run(&providers, prefs.as_ref()).await
    }
}
