// src/ingest/config.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::types::ContentKind;

pub const ENV_SOURCES_PATH: &str = "FEED_SOURCES_PATH";

/// Which adapter a configured source uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    NewsApi,
    OutletRss,
    Legiscan,
    CourtListener,
    FederalRegister,
}

impl ProviderKind {
    pub fn content_kind(&self) -> ContentKind {
        match self {
            ProviderKind::NewsApi | ProviderKind::OutletRss => ContentKind::News,
            ProviderKind::Legiscan => ContentKind::Bill,
            ProviderKind::CourtListener => ContentKind::Ruling,
            ProviderKind::FederalRegister => ContentKind::ExecutiveOrder,
        }
    }

    pub fn default_name(&self) -> &'static str {
        match self {
            ProviderKind::NewsApi => "NewsAPI",
            ProviderKind::OutletRss => "RSS",
            ProviderKind::Legiscan => "LegiScan",
            ProviderKind::CourtListener => "CourtListener",
            ProviderKind::FederalRegister => "Federal Register",
        }
    }

    /// Default endpoint; RSS feeds have none and must be configured.
    pub fn default_endpoint(&self) -> Option<&'static str> {
        match self {
            ProviderKind::NewsApi => Some("https://newsapi.org/v2/top-headlines"),
            ProviderKind::OutletRss => None,
            ProviderKind::Legiscan => Some("https://api.legiscan.com/"),
            ProviderKind::CourtListener => {
                Some("https://www.courtlistener.com/api/rest/v4/search/")
            }
            ProviderKind::FederalRegister => {
                Some("https://www.federalregister.gov/api/v1/documents.json")
            }
        }
    }

    /// Generic homepage used when a record carries no document link.
    pub fn homepage(&self) -> &'static str {
        match self {
            ProviderKind::NewsApi => "https://newsapi.org",
            ProviderKind::OutletRss => "https://www.rssboard.org/rss-specification",
            ProviderKind::Legiscan => "https://legiscan.com",
            ProviderKind::CourtListener => "https://www.courtlistener.com",
            ProviderKind::FederalRegister => "https://www.federalregister.gov",
        }
    }
}

/// One configured source, as written in `config/sources.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub provider: ProviderKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Environment variable holding the credential; never the credential itself.
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default)]
    pub page_size: Option<u32>,
    /// US state for legislative sources; falls back to the viewer's location.
    #[serde(default)]
    pub state: Option<String>,
    /// Court filter for rulings (e.g. "scotus").
    #[serde(default)]
    pub court: Option<String>,
}

impl SourceConfig {
    pub fn new(provider: ProviderKind) -> Self {
        Self {
            provider,
            name: None,
            endpoint: None,
            api_key_env: None,
            page_size: None,
            state: None,
            court: None,
        }
    }

    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| self.provider.default_name().to_string())
    }

    pub fn page_size_or(&self, default: u32) -> u32 {
        self.page_size.unwrap_or(default).clamp(1, 100)
    }

    /// Resolve the credential from the environment; empty values count as missing.
    pub fn api_key(&self) -> Option<String> {
        let var = self.api_key_env.as_deref()?;
        std::env::var(var).ok().filter(|v| !v.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct SourcesFile {
    sources: Vec<SourceConfig>,
}

/// One adapter for each of the four content kinds.
pub fn default_sources() -> Vec<SourceConfig> {
    let mut news = SourceConfig::new(ProviderKind::NewsApi);
    news.api_key_env = Some("NEWS_API_KEY".into());
    let mut bills = SourceConfig::new(ProviderKind::Legiscan);
    bills.api_key_env = Some("LEGISCAN_API_KEY".into());
    let mut rulings = SourceConfig::new(ProviderKind::CourtListener);
    rulings.api_key_env = Some("COURTLISTENER_API_TOKEN".into());
    rulings.court = Some("scotus".into());
    let orders = SourceConfig::new(ProviderKind::FederalRegister);
    vec![news, bills, rulings, orders]
}

/// Load sources from an explicit path. Supports TOML or JSON formats.
pub fn load_sources_from(path: &Path) -> Result<Vec<SourceConfig>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading sources from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_sources(&content, ext.as_str())
}

/// Load sources using env var + fallbacks:
/// 1) $FEED_SOURCES_PATH
/// 2) config/sources.toml
/// 3) config/sources.json
/// 4) built-in defaults
pub fn load_sources_default() -> Result<Vec<SourceConfig>> {
    if let Ok(p) = std::env::var(ENV_SOURCES_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_sources_from(&pb);
        }
        return Err(anyhow!("{ENV_SOURCES_PATH} points to non-existent path"));
    }
    let toml_p = PathBuf::from("config/sources.toml");
    if toml_p.exists() {
        return load_sources_from(&toml_p);
    }
    let json_p = PathBuf::from("config/sources.json");
    if json_p.exists() {
        return load_sources_from(&json_p);
    }
    Ok(default_sources())
}

fn parse_sources(s: &str, hint_ext: &str) -> Result<Vec<SourceConfig>> {
    let parsed = if hint_ext == "json" {
        parse_json(s).or_else(|_| parse_toml(s))
    } else {
        parse_toml(s).or_else(|_| parse_json(s))
    };
    let sources = parsed.map_err(|_| anyhow!("unsupported sources format"))?;
    validate(&sources)?;
    Ok(sources)
}

fn parse_toml(s: &str) -> Result<Vec<SourceConfig>> {
    let v: SourcesFile = toml::from_str(s)?;
    Ok(v.sources)
}

/// JSON accepts either `{"sources": [...]}` or a bare array.
fn parse_json(s: &str) -> Result<Vec<SourceConfig>> {
    if let Ok(v) = serde_json::from_str::<SourcesFile>(s) {
        return Ok(v.sources);
    }
    Ok(serde_json::from_str::<Vec<SourceConfig>>(s)?)
}

fn validate(sources: &[SourceConfig]) -> Result<()> {
    for s in sources {
        if s.provider == ProviderKind::OutletRss
            && s.endpoint.as_deref().map(str::trim).unwrap_or_default().is_empty()
        {
            return Err(anyhow!(
                "source '{}' uses outlet_rss but has no endpoint",
                s.display_name()
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_and_json_formats_work() {
        let toml = r#"
[[sources]]
provider = "news_api"
api_key_env = "NEWS_API_KEY"
page_size = 10

[[sources]]
provider = "outlet_rss"
name = "Reuters Politics"
endpoint = "https://example.test/rss"
"#;
        let out = parse_sources(toml, "toml").unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].provider, ProviderKind::NewsApi);
        assert_eq!(out[0].page_size_or(20), 10);
        assert_eq!(out[1].display_name(), "Reuters Politics");

        let json = r#"[{"provider": "federal_register"}, {"provider": "legiscan", "state": "Ohio"}]"#;
        let out = parse_sources(json, "json").unwrap();
        assert_eq!(out[0].display_name(), "Federal Register");
        assert_eq!(out[1].state.as_deref(), Some("Ohio"));
    }

    #[test]
    fn rss_without_endpoint_is_rejected() {
        let toml = r#"
[[sources]]
provider = "outlet_rss"
"#;
        assert!(parse_sources(toml, "toml").is_err());
    }

    #[test]
    fn defaults_cover_every_kind() {
        let kinds: Vec<_> = default_sources()
            .iter()
            .map(|s| s.provider.content_kind())
            .collect();
        for k in ContentKind::ALL {
            assert!(kinds.contains(&k));
        }
    }

    #[test]
    fn page_size_is_clamped() {
        let mut s = SourceConfig::new(ProviderKind::NewsApi);
        s.page_size = Some(0);
        assert_eq!(s.page_size_or(20), 1);
        s.page_size = Some(1000);
        assert_eq!(s.page_size_or(20), 100);
    }
}
