// src/ingest/providers/legiscan.rs
//! LegiScan `getMasterList` adapter: current-session bills for one US state.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::ingest::config::{ProviderKind, SourceConfig};
use crate::ingest::providers::{record_parse, send_for_json};
use crate::ingest::types::{ContentItem, ContentKind, FetchError, Lean, SourceProvider};
use crate::ingest::{normalize_record, parse_date, RawRecord, RecordDefaults};

const STATES: [(&str, &str); 51] = [
    ("Alabama", "AL"),
    ("Alaska", "AK"),
    ("Arizona", "AZ"),
    ("Arkansas", "AR"),
    ("California", "CA"),
    ("Colorado", "CO"),
    ("Connecticut", "CT"),
    ("Delaware", "DE"),
    ("District of Columbia", "DC"),
    ("Florida", "FL"),
    ("Georgia", "GA"),
    ("Hawaii", "HI"),
    ("Idaho", "ID"),
    ("Illinois", "IL"),
    ("Indiana", "IN"),
    ("Iowa", "IA"),
    ("Kansas", "KS"),
    ("Kentucky", "KY"),
    ("Louisiana", "LA"),
    ("Maine", "ME"),
    ("Maryland", "MD"),
    ("Massachusetts", "MA"),
    ("Michigan", "MI"),
    ("Minnesota", "MN"),
    ("Mississippi", "MS"),
    ("Missouri", "MO"),
    ("Montana", "MT"),
    ("Nebraska", "NE"),
    ("Nevada", "NV"),
    ("New Hampshire", "NH"),
    ("New Jersey", "NJ"),
    ("New Mexico", "NM"),
    ("New York", "NY"),
    ("North Carolina", "NC"),
    ("North Dakota", "ND"),
    ("Ohio", "OH"),
    ("Oklahoma", "OK"),
    ("Oregon", "OR"),
    ("Pennsylvania", "PA"),
    ("Rhode Island", "RI"),
    ("South Carolina", "SC"),
    ("South Dakota", "SD"),
    ("Tennessee", "TN"),
    ("Texas", "TX"),
    ("Utah", "UT"),
    ("Vermont", "VT"),
    ("Virginia", "VA"),
    ("Washington", "WA"),
    ("West Virginia", "WV"),
    ("Wisconsin", "WI"),
    ("Wyoming", "WY"),
];

/// Two-letter code for a state name (case-insensitive). Codes pass through.
pub fn state_code(state: &str) -> Option<&'static str> {
    let s = state.trim();
    STATES
        .iter()
        .find(|(name, code)| name.eq_ignore_ascii_case(s) || code.eq_ignore_ascii_case(s))
        .map(|(_, code)| *code)
}

fn state_name(code: &str) -> &'static str {
    STATES
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(name, _)| *name)
        .unwrap_or("State")
}

/// Keyword lean label for a bill title. Descriptive only.
pub fn lean_for_title(title: &str) -> Lean {
    let t = title.to_lowercase();
    if t.contains("tax") || t.contains("regulation") || t.contains("environmental") {
        if t.contains("reduce") || t.contains("cut") {
            Lean::Right
        } else {
            Lean::Left
        }
    } else {
        Lean::Center
    }
}

#[derive(Debug, Deserialize)]
struct MasterListBill {
    bill_id: u64,
    number: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    last_action_date: Option<String>,
    status_date: Option<String>,
}

pub struct LegiscanProvider {
    name: String,
    endpoint: String,
    api_key: Option<String>,
    state: Option<String>,
    client: reqwest::Client,
}

impl LegiscanProvider {
    pub fn from_config(
        cfg: &SourceConfig,
        client: reqwest::Client,
        viewer_location: Option<&str>,
    ) -> Self {
        let state = cfg
            .state
            .clone()
            .or_else(|| viewer_location.map(str::to_string))
            .filter(|s| !s.trim().is_empty());
        Self {
            name: cfg.display_name(),
            endpoint: cfg
                .endpoint
                .clone()
                .or_else(|| ProviderKind::Legiscan.default_endpoint().map(str::to_string))
                .unwrap_or_default(),
            api_key: cfg.api_key(),
            state,
            client,
        }
    }

    pub fn parse_response(
        name: &str,
        code: &str,
        body: &Value,
    ) -> Result<Vec<ContentItem>, FetchError> {
        let t0 = std::time::Instant::now();
        if body.get("status").and_then(Value::as_str) != Some("OK") {
            let msg = body
                .pointer("/alert/message")
                .and_then(Value::as_str)
                .unwrap_or("status is not OK");
            return Err(FetchError::malformed(name, msg.to_string()));
        }
        let list = body
            .get("masterlist")
            .and_then(Value::as_object)
            .ok_or_else(|| FetchError::malformed(name, "missing 'masterlist' object"))?;

        // Bills sit under numeric keys; "session" and friends are metadata.
        let mut entries: Vec<(u64, &Value)> = list
            .iter()
            .filter_map(|(k, v)| k.parse::<u64>().ok().map(|n| (n, v)))
            .collect();
        entries.sort_by_key(|(n, _)| *n);

        let category = format!("{} Legislature", state_name(code));
        let defaults = RecordDefaults {
            kind: ContentKind::Bill,
            homepage: ProviderKind::Legiscan.homepage(),
            category: &category,
        };

        let mut out = Vec::with_capacity(entries.len());
        for (_, raw) in entries {
            if !raw.is_object() {
                continue;
            }
            let Ok(b) = serde_json::from_value::<MasterListBill>(raw.clone()) else {
                metrics::counter!("ingest_malformed_total").increment(1);
                continue;
            };
            let summary = b
                .description
                .filter(|d| !d.trim().is_empty() && Some(d) != b.title.as_ref())
                .or_else(|| b.number.clone());
            let lean = b.title.as_deref().map(lean_for_title);
            let rec = RawRecord {
                id: Some(format!("bill-{}", b.bill_id)),
                title: b.title,
                summary,
                url: b.url,
                published: b
                    .last_action_date
                    .as_deref()
                    .and_then(parse_date)
                    .or_else(|| b.status_date.as_deref().and_then(parse_date)),
                tags: vec!["State Politics".to_string()],
                category: None,
                lean,
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
impl SourceProvider for LegiscanProvider {
    async fn fetch_latest(&self) -> Result<Vec<ContentItem>, FetchError> {
        let Some(key) = self.api_key.as_deref() else {
            return Err(FetchError::misconfigured(&self.name, "missing api key"));
        };
        let Some(state) = self.state.as_deref() else {
            return Err(FetchError::misconfigured(&self.name, "no state configured"));
        };
        let Some(code) = state_code(state) else {
            return Err(FetchError::misconfigured(
                &self.name,
                format!("unknown state '{state}'"),
            ));
        };
        let req = self.client.get(&self.endpoint).query(&[
            ("key", key),
            ("op", "getMasterList"),
            ("state", code),
        ]);
        let body = send_for_json(&self.name, req).await?;
        Self::parse_response(&self.name, code, &body)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ContentKind {
        ContentKind::Bill
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn state_lookup_accepts_names_and_codes() {
        assert_eq!(state_code("Washington"), Some("WA"));
        assert_eq!(state_code("new york"), Some("NY"));
        assert_eq!(state_code("tx"), Some("TX"));
        assert_eq!(state_code("Atlantis"), None);
        assert_eq!(STATES.len(), 51);
    }

    #[test]
    fn lean_heuristic_matches_keywords() {
        assert_eq!(lean_for_title("Environmental Regulation Act"), Lean::Left);
        assert_eq!(lean_for_title("Act to reduce income tax"), Lean::Right);
        assert_eq!(lean_for_title("Library hours"), Lean::Center);
    }

    #[test]
    fn masterlist_keeps_numeric_order_and_skips_session() {
        let body = json!({
            "status": "OK",
            "masterlist": {
                "session": {"session_id": 2100, "session_name": "2024 Regular Session"},
                "10": {"bill_id": 30, "number": "HB3", "title": "Third", "url": "https://legiscan.test/3"},
                "0": {"bill_id": 10, "number": "HB1", "title": "School Lunch Funding",
                       "description": "Provides free school lunch.", "last_action_date": "2024-02-01"},
                "2": {"bill_id": "bad"},
                "1": {"bill_id": 20, "number": "HB2", "title": "Tax relief to cut property tax"}
            }
        });
        let items = LegiscanProvider::parse_response("LegiScan", "WA", &body).unwrap();
        let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["bill-10", "bill-20", "bill-30"]);
        assert_eq!(items[0].short_summary, "Provides free school lunch.");
        assert_eq!(items[0].source_category, "Washington Legislature");
        assert!(items[0].tags.contains("State Politics"));
        assert!(items[0].tags.contains("Education"));
        assert_eq!(items[1].short_summary, "HB2");
        assert_eq!(items[1].lean, Some(Lean::Right));
        assert_eq!(items[1].full_text_ref, "https://legiscan.com");
    }

    #[test]
    fn non_ok_status_is_an_error() {
        let body = json!({"status": "ERROR", "alert": {"message": "Invalid API key"}});
        let err = LegiscanProvider::parse_response("LegiScan", "WA", &body).unwrap_err();
        assert_eq!(err.message, "Invalid API key");
    }
}
