//! OpenAI-compatible chat completions client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::error::{ApiErrorKind, CompletionError};
use super::message::Message;
use super::{CompletionService, RequestOptions};
use crate::config::CompletionConfig;

/// Non-streaming `/v1/chat/completions` client with bearer auth.
#[derive(Clone)]
pub struct OpenAiClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    max_tokens: u32,
    temperature: f64,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize, Default)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

impl OpenAiClient {
    /// Build a client from configuration. The key is resolved now (config,
    /// then `OPENAI_API_KEY`); a missing key only fails at call time.
    ///
    /// # Errors
    ///
    /// Returns [`CompletionError::Config`] if the HTTP client cannot be built.
    pub fn new(config: &CompletionConfig) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CompletionError::Config(format!("http client: {e}")))?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            api_key: config.resolved_api_key(),
            client,
        })
    }

    /// Whether a usable key was found.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

/// Map a non-2xx body to a classified error.
fn map_http_error(status: u16, body: &str) -> CompletionError {
    let envelope: ErrorEnvelope = serde_json::from_str(body).unwrap_or_default();
    let error = envelope.error.unwrap_or_default();
    let kind = ApiErrorKind::classify(status, error.kind.as_deref(), error.code.as_deref());
    let message = error
        .message
        .unwrap_or_else(|| format!("Erro na API: {status}"));
    CompletionError::Api {
        status,
        kind,
        message,
    }
}

#[async_trait]
impl CompletionService for OpenAiClient {
    async fn complete(
        &self,
        messages: &[Message],
        options: &RequestOptions,
    ) -> Result<String, CompletionError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| CompletionError::Config("API key não configurada".into()))?;

        let body = ChatRequest {
            model: &options.model,
            messages,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
        };
        tracing::debug!(
            model = %options.model,
            messages = messages.len(),
            max_tokens = options.max_tokens,
            "completion request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("Accept", "application/json")
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&body)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        if !status.is_success() {
            let err = map_http_error(status.as_u16(), &text);
            tracing::warn!(status = status.as_u16(), error = %err, "completion request failed");
            return Err(err);
        }

        let parsed: ChatResponse =
            serde_json::from_str(&text).map_err(|e| CompletionError::Parse(e.to_string()))?;
        let reply = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(CompletionError::EmptyResponse)?;
        tracing::trace!(chars = reply.chars().count(), "completion reply");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn error_body_fields_drive_classification() {
        let body = r#"{"error":{"message":"You exceeded your current quota","type":"insufficient_quota","code":"insufficient_quota"}}"#;
        match map_http_error(429, body) {
            CompletionError::Api {
                status,
                kind,
                message,
            } => {
                assert_eq!(status, 429);
                assert_eq!(kind, ApiErrorKind::QuotaExceeded);
                assert!(message.contains("quota"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn non_json_error_body_gets_status_message() {
        match map_http_error(502, "<html>Bad Gateway</html>") {
            CompletionError::Api { kind, message, .. } => {
                assert_eq!(kind, ApiErrorKind::ServerError);
                assert_eq!(message, "Erro na API: 502");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn debug_redacts_key() {
        let config = CompletionConfig {
            api_key: Some("sk-secret".into()),
            ..Default::default()
        };
        let client = OpenAiClient::new(&config).expect("client");
        let dbg = format!("{client:?}");
        assert!(!dbg.contains("sk-secret"));
        assert!(client.has_api_key());
    }
}
