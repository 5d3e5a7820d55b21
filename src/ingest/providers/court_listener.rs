// src/ingest/providers/court_listener.rs
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::ingest::config::{ProviderKind, SourceConfig};
use crate::ingest::providers::{record_parse, send_for_json};
use crate::ingest::types::{ContentItem, ContentKind, FetchError, SourceProvider};
use crate::ingest::{normalize_record, parse_date, RawRecord, RecordDefaults};

#[derive(Debug, Deserialize)]
struct SearchHit {
    cluster_id: Option<u64>,
    #[serde(rename = "caseName")]
    case_name: Option<String>,
    court: Option<String>,
    #[serde(rename = "dateFiled")]
    date_filed: Option<String>,
    absolute_url: Option<String>,
    #[serde(default)]
    citation: Vec<String>,
    snippet: Option<String>,
    #[serde(default)]
    opinions: Vec<OpinionHit>,
}

#[derive(Debug, Deserialize)]
struct OpinionHit {
    snippet: Option<String>,
}

/// CourtListener opinion search (`type=o`), newest first.
pub struct CourtListenerProvider {
    name: String,
    endpoint: String,
    api_token: Option<String>,
    court: Option<String>,
    client: reqwest::Client,
}

impl CourtListenerProvider {
    pub fn from_config(cfg: &SourceConfig, client: reqwest::Client) -> Self {
        Self {
            name: cfg.display_name(),
            endpoint: cfg
                .endpoint
                .clone()
                .or_else(|| {
                    ProviderKind::CourtListener
                        .default_endpoint()
                        .map(str::to_string)
                })
                .unwrap_or_default(),
            api_token: cfg.api_key(),
            court: cfg.court.clone().filter(|c| !c.trim().is_empty()),
            client,
        }
    }

    pub fn parse_response(name: &str, body: &Value) -> Result<Vec<ContentItem>, FetchError> {
        let t0 = std::time::Instant::now();
        let results = body
            .get("results")
            .and_then(Value::as_array)
            .ok_or_else(|| FetchError::malformed(name, "missing 'results' array"))?;

        let homepage = ProviderKind::CourtListener.homepage();
        let defaults = RecordDefaults {
            kind: ContentKind::Ruling,
            homepage,
            category: name,
        };
        let mut out = Vec::with_capacity(results.len());
        for raw in results {
            let Ok(hit) = serde_json::from_value::<SearchHit>(raw.clone()) else {
                metrics::counter!("ingest_malformed_total").increment(1);
                continue;
            };
            let snippet = hit
                .snippet
                .filter(|s| !s.trim().is_empty())
                .or_else(|| hit.opinions.into_iter().find_map(|o| o.snippet))
                .filter(|s| !s.trim().is_empty());
            let summary = match (hit.citation.first(), snippet) {
                (Some(cite), Some(s)) => Some(format!("{cite}. {s}")),
                (None, Some(s)) => Some(s),
                (Some(cite), None) => Some(cite.clone()),
                (None, None) => None,
            };
            let rec = RawRecord {
                id: hit.cluster_id.map(|id| format!("ruling-{id}")),
                title: hit.case_name,
                summary,
                url: hit.absolute_url.map(|u| {
                    if u.starts_with("http") {
                        u
                    } else {
                        format!("{homepage}{u}")
                    }
                }),
                published: hit.date_filed.as_deref().and_then(parse_date),
                tags: Vec::new(),
                category: hit.court,
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
impl SourceProvider for CourtListenerProvider {
    async fn fetch_latest(&self) -> Result<Vec<ContentItem>, FetchError> {
        let mut query = vec![("type", "o"), ("order_by", "dateFiled desc")];
        if let Some(court) = self.court.as_deref() {
            query.push(("court", court));
        }
        let mut req = self.client.get(&self.endpoint).query(&query);
        // Anonymous access works at a lower rate limit.
        if let Some(token) = self.api_token.as_deref() {
            req = req.header("Authorization", format!("Token {token}"));
        }
        let body = send_for_json(&self.name, req).await?;
        Self::parse_response(&self.name, &body)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ContentKind {
        ContentKind::Ruling
    }
}
