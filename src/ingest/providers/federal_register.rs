// src/ingest/providers/federal_register.rs
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::ingest::config::{ProviderKind, SourceConfig};
use crate::ingest::providers::{record_parse, send_for_json};
use crate::ingest::types::{ContentItem, ContentKind, FetchError, SourceProvider};
use crate::ingest::{normalize_record, parse_date, RawRecord, RecordDefaults};

const FIELDS: [&str; 7] = [
    "document_number",
    "executive_order_number",
    "title",
    "abstract",
    "html_url",
    "publication_date",
    "signing_date",
];

#[derive(Debug, Deserialize)]
struct Document {
    document_number: Option<String>,
    executive_order_number: Option<Value>,
    title: Option<String>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    html_url: Option<String>,
    publication_date: Option<String>,
    signing_date: Option<String>,
}

/// Federal Register documents API filtered to executive orders. No credential.
pub struct FederalRegisterProvider {
    name: String,
    endpoint: String,
    page_size: u32,
    client: reqwest::Client,
}

impl FederalRegisterProvider {
    pub fn from_config(cfg: &SourceConfig, client: reqwest::Client) -> Self {
        Self {
            name: cfg.display_name(),
            endpoint: cfg
                .endpoint
                .clone()
                .or_else(|| {
                    ProviderKind::FederalRegister
                        .default_endpoint()
                        .map(str::to_string)
                })
                .unwrap_or_default(),
            page_size: cfg.page_size_or(10),
            client,
        }
    }

    pub fn parse_response(name: &str, body: &Value) -> Result<Vec<ContentItem>, FetchError> {
        let t0 = std::time::Instant::now();
        // An empty result page omits "results" entirely.
        let empty = Vec::new();
        let results = match body.get("results") {
            Some(v) => v
                .as_array()
                .ok_or_else(|| FetchError::malformed(name, "'results' is not an array"))?,
            None if body.get("count").is_some() => &empty,
            None => return Err(FetchError::malformed(name, "missing 'results' array")),
        };

        let defaults = RecordDefaults {
            kind: ContentKind::ExecutiveOrder,
            homepage: ProviderKind::FederalRegister.homepage(),
            category: name,
        };
        let mut out = Vec::with_capacity(results.len());
        for raw in results {
            let Ok(doc) = serde_json::from_value::<Document>(raw.clone()) else {
                metrics::counter!("ingest_malformed_total").increment(1);
                continue;
            };
            // The API returns the order number as a string or an integer.
            let eo_number = match &doc.executive_order_number {
                Some(Value::Number(n)) => Some(n.to_string()),
                Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
                _ => None,
            };
            let id = eo_number
                .map(|n| format!("eo-{n}"))
                .or_else(|| doc.document_number.map(|d| format!("eo-doc-{d}")));
            let rec = RawRecord {
                id,
                title: doc.title,
                summary: doc.abstract_text,
                url: doc.html_url,
                published: doc
                    .publication_date
                    .as_deref()
                    .and_then(parse_date)
                    .or_else(|| doc.signing_date.as_deref().and_then(parse_date)),
                tags: vec!["Federal Politics".to_string()],
                category: None,
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
impl SourceProvider for FederalRegisterProvider {
    async fn fetch_latest(&self) -> Result<Vec<ContentItem>, FetchError> {
        let mut query: Vec<(&str, String)> = vec![
            (
                "conditions[presidential_document_type]",
                "executive_order".to_string(),
            ),
            ("conditions[type][]", "PRESDOCU".to_string()),
            ("order", "newest".to_string()),
            ("per_page", self.page_size.to_string()),
        ];
        query.extend(FIELDS.iter().map(|f| ("fields[]", (*f).to_string())));
        let req = self.client.get(&self.endpoint).query(&query);
        let body = send_for_json(&self.name, req).await?;
        Self::parse_response(&self.name, &body)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ContentKind {
        ContentKind::ExecutiveOrder
    }
}
