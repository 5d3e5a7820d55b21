// src/ingest/providers/news_api.rs
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::ingest::config::{ProviderKind, SourceConfig};
use crate::ingest::providers::{record_parse, send_for_json};
use crate::ingest::types::{ContentItem, ContentKind, FetchError, SourceProvider};
use crate::ingest::{normalize_record, parse_date, RawRecord, RecordDefaults};

#[derive(Debug, Deserialize)]
struct Article {
    #[serde(default)]
    source: Option<ArticleSource>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArticleSource {
    name: Option<String>,
}

/// NewsAPI-style headline feed (`{"status": "ok", "articles": [...]}`).
pub struct NewsApiProvider {
    name: String,
    endpoint: String,
    api_key: Option<String>,
    page_size: u32,
    client: reqwest::Client,
}

impl NewsApiProvider {
    pub fn from_config(cfg: &SourceConfig, client: reqwest::Client) -> Self {
        Self {
            name: cfg.display_name(),
            endpoint: cfg
                .endpoint
                .clone()
                .or_else(|| ProviderKind::NewsApi.default_endpoint().map(str::to_string))
                .unwrap_or_default(),
            api_key: cfg.api_key(),
            page_size: cfg.page_size_or(20),
            client,
        }
    }

    /// Normalize a decoded response body. Records that fail to decode or carry
    /// nothing displayable are dropped.
    pub fn parse_response(name: &str, body: &Value) -> Result<Vec<ContentItem>, FetchError> {
        let t0 = std::time::Instant::now();
        if let Some(status) = body.get("status").and_then(Value::as_str) {
            if status != "ok" {
                let msg = body
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("upstream reported an error");
                return Err(FetchError::malformed(name, msg.to_string()));
            }
        }
        let articles = body
            .get("articles")
            .and_then(Value::as_array)
            .ok_or_else(|| FetchError::malformed(name, "missing 'articles' array"))?;

        let defaults = RecordDefaults {
            kind: ContentKind::News,
            homepage: ProviderKind::NewsApi.homepage(),
            category: name,
        };
        let mut out = Vec::with_capacity(articles.len());
        for raw in articles {
            let Ok(a) = serde_json::from_value::<Article>(raw.clone()) else {
                metrics::counter!("ingest_malformed_total").increment(1);
                continue;
            };
            // NewsAPI marks scrubbed entries with this literal title.
            if a.title.as_deref().map(str::trim) == Some("[Removed]") {
                metrics::counter!("ingest_malformed_total").increment(1);
                continue;
            }
            let rec = RawRecord {
                id: None,
                title: a.title,
                summary: a.description,
                url: a.url,
                published: a.published_at.as_deref().and_then(parse_date),
                tags: Vec::new(),
                category: a.source.and_then(|s| s.name),
                lean: None,
            };
            if let Some(item) = normalize_record(rec, &defaults) {
                out.push(item);
            }
        }
        record_parse(t0, out.len());
        Ok(out)
    }
}

#[async_trait]
impl SourceProvider for NewsApiProvider {
    async fn fetch_latest(&self) -> Result<Vec<ContentItem>, FetchError> {
        let Some(key) = self.api_key.as_deref() else {
            return Err(FetchError::misconfigured(&self.name, "missing api key"));
        };
        let req = self
            .client
            .get(&self.endpoint)
            .header("X-Api-Key", key)
            .query(&[
                ("country", "us".to_string()),
                ("pageSize", self.page_size.to_string()),
            ]);
        let body = send_for_json(&self.name, req).await?;
        Self::parse_response(&self.name, &body)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ContentKind {
        ContentKind::News
    }
}
