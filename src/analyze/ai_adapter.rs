//! AI adapter: text-generation client abstraction for item summaries.
//!
//! `AiClient` is the seam the enricher talks to. The OpenAI-compatible
//! provider speaks the chat-completions shape; the disabled and mock clients
//! never touch the network.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::ai::AiConfig;
use crate::ingest::types::ContentKind;

/// Upper bound on body text sent for summarization.
pub const MAX_BODY_CHARS: usize = 4000;

/// What the enricher asks a client to summarize.
#[derive(Debug, Clone, Copy)]
pub struct SummaryRequest<'a> {
    pub kind: ContentKind,
    pub title: &'a str,
    pub body: &'a str,
}

/// Trait object used by the enricher and tests.
pub trait AiClient: Send + Sync {
    /// Return a synopsis, or `None` on any failure.
    fn summarize<'a>(
        &'a self,
        req: SummaryRequest<'a>,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>>;
    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

pub type DynAiClient = Arc<dyn AiClient>;

/// Factory: build a client according to config and environment variables.
///
/// * If `AI_TEST_MODE=mock` or provider is `mock`, returns a deterministic mock client.
/// * Else if disabled or no credential, returns a disabled client (zero network calls).
/// * Else builds the OpenAI-compatible provider.
pub fn build_client_from_config(config: &AiConfig) -> DynAiClient {
    let mock_env = std::env::var("AI_TEST_MODE")
        .map(|v| v == "mock")
        .unwrap_or(false);
    if mock_env || config.provider == "mock" {
        return Arc::new(MockClient::new(
            "Mock synopsis: this item has been summarized for local development.",
        ));
    }

    if !config.enabled || !config.has_credential() {
        return Arc::new(DisabledClient);
    }

    match config.provider.as_str() {
        "openai" => Arc::new(OpenAiProvider::from_config(config)),
        other => {
            tracing::warn!(provider = other, "unsupported ai provider; summaries stay local");
            Arc::new(DisabledClient)
        }
    }
}

/// Instruction framing per content kind.
pub fn system_prompt(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Bill => {
            "You explain proposed legislation to ordinary voters. In 2-3 plain sentences, say what the bill would do and who it affects. Neutral tone, no opinions, no markdown."
        }
        ContentKind::Ruling => {
            "You explain court rulings to ordinary citizens. In 2-3 plain sentences, say what the court decided and its practical effect. Neutral tone, no opinions, no markdown."
        }
        ContentKind::ExecutiveOrder => {
            "You explain presidential executive orders to ordinary citizens. In 2-3 plain sentences, say what the order directs and which agencies or people it affects. Neutral tone, no opinions, no markdown."
        }
        ContentKind::News => {
            "You summarize civic news for busy readers. In 2-3 plain sentences, state the key facts. Neutral tone, no opinions, no markdown."
        }
    }
}

/// `Title: ..` plus the body, cut at [`MAX_BODY_CHARS`].
pub fn user_prompt(req: &SummaryRequest<'_>) -> String {
    let body: String = req.body.chars().take(MAX_BODY_CHARS).collect();
    if body.trim().is_empty() {
        format!("Title: {}", req.title)
    } else {
        format!("Title: {}\n\n{}", req.title, body)
    }
}

/// OpenAI-compatible chat-completions provider.
pub struct OpenAiProvider {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiProvider {
    pub fn from_config(config: &AiConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        let http = reqwest::Client::builder()
            .user_agent(crate::ingest::providers::USER_AGENT)
            .connect_timeout(Duration::from_secs(4).min(timeout))
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

impl AiClient for OpenAiProvider {
    fn summarize<'a>(
        &'a self,
        req: SummaryRequest<'a>,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(async move {
            if self.api_key.is_empty() {
                return None;
            }

            #[derive(Serialize)]
            struct Msg<'a> {
                role: &'a str,
                content: &'a str,
            }
            #[derive(Serialize)]
            struct Req<'a> {
                model: &'a str,
                messages: Vec<Msg<'a>>,
                temperature: f32,
                max_tokens: u32,
            }
            #[derive(Deserialize)]
            struct Resp {
                choices: Vec<Choice>,
            }
            #[derive(Deserialize)]
            struct Choice {
                message: ChoiceMsg,
            }
            #[derive(Deserialize)]
            struct ChoiceMsg {
                content: Option<String>,
            }

            let user = user_prompt(&req);
            let body = Req {
                model: &self.model,
                messages: vec![
                    Msg {
                        role: "system",
                        content: system_prompt(req.kind),
                    },
                    Msg {
                        role: "user",
                        content: &user,
                    },
                ],
                temperature: self.temperature,
                max_tokens: self.max_tokens,
            };

            let resp = match self
                .http
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    tracing::debug!(error = %e, "summary request failed");
                    return None;
                }
            };

            if !resp.status().is_success() {
                tracing::debug!(status = %resp.status(), "summary request rejected");
                return None;
            }
            let parsed: Resp = resp.json().await.ok()?;
            let content = parsed
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .unwrap_or_default();
            let cleaned = clean_summary(&content);
            if cleaned.is_empty() {
                None
            } else {
                Some(cleaned)
            }
        })
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

/// Returns `None` always; used when AI is disabled or no credential exists.
pub struct DisabledClient;

impl AiClient for DisabledClient {
    fn summarize<'a>(
        &'a self,
        _req: SummaryRequest<'a>,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(async { None })
    }

    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Fixed-answer client for tests/local runs.
#[derive(Clone)]
pub struct MockClient {
    pub fixed: String,
}

impl MockClient {
    pub fn new(fixed: impl Into<String>) -> Self {
        Self {
            fixed: fixed.into(),
        }
    }
}

impl AiClient for MockClient {
    fn summarize<'a>(
        &'a self,
        _req: SummaryRequest<'a>,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        let out = self.fixed.clone();
        Box::pin(async move { Some(out) })
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Collapse whitespace and cap at 1200 chars.
pub fn clean_summary(input: &str) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() > 1200 {
        collapsed.chars().take(1200).collect::<String>().trim_end().to_string()
    } else {
        collapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_prompt_truncates_body() {
        let long = "a".repeat(MAX_BODY_CHARS + 500);
        let req = SummaryRequest {
            kind: ContentKind::Bill,
            title: "T",
            body: &long,
        };
        let p = user_prompt(&req);
        assert_eq!(p.len(), "Title: T\n\n".len() + MAX_BODY_CHARS);
    }

    #[test]
    fn prompts_differ_per_kind() {
        let all: std::collections::HashSet<_> =
            ContentKind::ALL.iter().map(|k| system_prompt(*k)).collect();
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn clean_summary_collapses_whitespace() {
        assert_eq!(clean_summary("  a\n\n b\tc  "), "a b c");
    }

    #[serial_test::serial]
    #[test]
    fn missing_credential_builds_disabled_client() {
        std::env::remove_var("AI_TEST_MODE");
        let cfg = AiConfig {
            api_key: String::new(),
            ..AiConfig::default()
        };
        assert_eq!(build_client_from_config(&cfg).provider_name(), "disabled");
        let cfg = AiConfig {
            provider: "mock".into(),
            ..AiConfig::default()
        };
        assert_eq!(build_client_from_config(&cfg).provider_name(), "mock");
    }

    #[tokio::test]
    async fn disabled_client_returns_none() {
        let req = SummaryRequest {
            kind: ContentKind::News,
            title: "x",
            body: "y",
        };
        assert!(DisabledClient.summarize(req).await.is_none());
    }
}
