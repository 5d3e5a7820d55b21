// src/config/ai.rs
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, path::PathBuf};

pub const ENV_AI_CONFIG_PATH: &str = "FEED_AI_CONFIG_PATH";
pub const ENV_ENRICH_CONCURRENCY: &str = "FEED_ENRICH_CONCURRENCY";
pub const ENV_TIMEOUT_SECS: &str = "FEED_TIMEOUT_SECS";

fn default_provider() -> String {
    "openai".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}
fn default_api_key() -> String {
    "ENV".to_string()
}
fn default_max_concurrency() -> usize {
    4
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_temperature() -> f32 {
    0.3
}
fn default_max_tokens() -> u32 {
    250
}
fn default_enabled() -> bool {
    true
}

/// Text-generation settings, loaded from `config/ai.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// "openai" | "mock" (case-insensitive)
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// "ENV" means: read from OPENAI_API_KEY. Empty means no credential.
    #[serde(default = "default_api_key")]
    pub api_key: String,
    /// Ceiling on concurrent summary requests.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Applies to every outbound call, source fetches included.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            provider: default_provider(),
            model: default_model(),
            endpoint: default_endpoint(),
            api_key: default_api_key(),
            max_concurrency: default_max_concurrency(),
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl AiConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading ai config from {}", path.display()))?;
        let cfg: AiConfig = serde_json::from_str(&data)
            .with_context(|| format!("parsing ai config {}", path.display()))?;
        Ok(cfg.resolved())
    }

    /// Env path, then `config/ai.json`, then defaults; env overrides applied last.
    pub fn load_default() -> anyhow::Result<Self> {
        let cfg = if let Ok(p) = env::var(ENV_AI_CONFIG_PATH) {
            Self::load_from_file(PathBuf::from(p))?
        } else {
            let p = PathBuf::from("config/ai.json");
            if p.exists() {
                Self::load_from_file(p)?
            } else {
                Self::default().resolved()
            }
        };
        Ok(cfg.with_env_overrides())
    }

    /// Normalize provider, resolve the credential and sanitize limits.
    pub fn resolved(mut self) -> Self {
        self.provider = self.provider.trim().to_lowercase();

        if self.api_key.trim().eq_ignore_ascii_case("env") {
            // A missing key is not fatal: summaries fall back to local text.
            self.api_key = env::var("OPENAI_API_KEY").unwrap_or_default();
            if self.api_key.trim().is_empty() && self.enabled {
                tracing::warn!("OPENAI_API_KEY not set; summaries will be derived locally");
            }
        }
        self.api_key = self.api_key.trim().to_string();

        self.max_concurrency = self.max_concurrency.max(1);
        self.timeout_secs = self.timeout_secs.max(1);
        if !(0.0..=2.0).contains(&self.temperature) {
            self.temperature = default_temperature();
        }
        self
    }

    fn with_env_overrides(mut self) -> Self {
        if let Some(n) = env::var(ENV_ENRICH_CONCURRENCY)
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
        {
            self.max_concurrency = n.max(1);
        }
        if let Some(secs) = env::var(ENV_TIMEOUT_SECS)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            self.timeout_secs = secs.max(1);
        }
        self
    }

    pub fn has_credential(&self) -> bool {
        !self.api_key.is_empty()
    }
}
