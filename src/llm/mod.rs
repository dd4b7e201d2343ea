//! Completion service access.
//!
//! [`CompletionService`] is the seam the dispatch pipeline talks to;
//! [`OpenAiClient`] implements it over any OpenAI-compatible
//! `/v1/chat/completions` endpoint.

pub mod error;
pub mod message;
pub mod openai;
pub mod vision;

pub use error::{ApiErrorKind, CompletionError};
pub use message::{Message, Role};
pub use openai::OpenAiClient;

use async_trait::async_trait;

use crate::config::CompletionConfig;

/// Generation parameters for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    /// Model identifier.
    pub model: String,
    /// Output token bound.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
}

impl RequestOptions {
    /// Chat replies.
    pub fn chat(config: &CompletionConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    /// Object identification on the vision model.
    pub fn vision(config: &CompletionConfig) -> Self {
        Self {
            model: config.vision_model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    /// High-fidelity document text extraction on the vision model.
    pub fn document(config: &CompletionConfig) -> Self {
        Self {
            model: config.vision_model.clone(),
            max_tokens: config.ocr_max_tokens,
            temperature: config.ocr_temperature,
        }
    }
}

/// A text/vision completion endpoint.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Send `messages` and return the first choice's text.
    async fn complete(
        &self,
        messages: &[Message],
        options: &RequestOptions,
    ) -> Result<String, CompletionError>;
}

/// Probe the service with a one-word prompt.
///
/// Returns `false` on any failure, including a missing key.
pub async fn validate_api_key(service: &dyn CompletionService, options: &RequestOptions) -> bool {
    match service.complete(&[Message::user("teste")], options).await {
        Ok(_) => true,
        Err(err) => {
            tracing::debug!(error = %err, "api key probe failed");
            false
        }
    }
}
