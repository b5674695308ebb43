//! Volcengine Ark API client (OpenAI-compatible chat completions).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ChatMessage, ChatResponse, TokenUsage, VisionClient};
use crate::error::{Error, Result};

/// Ark chat-completions client bound to one run's credentials.
///
/// Baseline contract: one synchronous call per request, no retry and no
/// per-request timeout.
pub struct ArkClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ArkClient {
    /// Create a new client against the given base URL (e.g.
    /// `https://ark.cn-beijing.volces.com/api/v3`).
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl VisionClient for ArkClient {
    async fn chat_completion(&self, model: &str, messages: &[ChatMessage]) -> Result<ChatResponse> {
        let request = ArkRequest {
            model: model.to_string(),
            messages: messages.to_vec(),
        };

        tracing::debug!(model, url = %self.completions_url(), "sending chat completion request");

        let response = self
            .client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            // Ark encrypts request/response bodies in transit when asked to.
            .header("x-is-encrypted", "true")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    Error::RemoteCall(format!("connection failed: {e}"))
                } else {
                    Error::RemoteCall(format!("request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(Error::RemoteCall(format!("HTTP {status}: {body}")));
        }

        let parsed: ArkResponse = serde_json::from_str(&body)
            .map_err(|e| Error::RemoteCall(format!("unparseable response: {e}, body: {body}")))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::RemoteCall("no choices in response".to_string()))?;

        let content = choice
            .message
            .content
            .ok_or_else(|| Error::RemoteCall("response message has no content".to_string()))?;

        Ok(ChatResponse {
            content,
            usage: parsed.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            }),
        })
    }
}

/// Ark API request format.
#[derive(Debug, Serialize)]
struct ArkRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

/// Ark API response format.
#[derive(Debug, Deserialize)]
struct ArkResponse {
    choices: Vec<ArkChoice>,
    #[serde(default)]
    usage: Option<ArkUsage>,
}

#[derive(Debug, Deserialize)]
struct ArkChoice {
    message: ArkMessage,
}

#[derive(Debug, Deserialize)]
struct ArkMessage {
    content: Option<String>,
}

/// Usage data (OpenAI-compatible).
#[derive(Debug, Deserialize)]
struct ArkUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}
