//! The text-generation service boundary.
//!
//! The conversion pipeline never talks to a provider directly; it goes
//! through the [`TextGenerator`] trait. Injecting the trait keeps the core
//! testable without network access and lets callers swap in any backend —
//! a different cloud provider, a local server, or a capturing stub.
//!
//! [`OpenAiGenerator`] is the bundled implementation. It speaks the OpenAI
//! chat-completions wire format, which also covers local OpenAI-compatible
//! servers (Ollama, vLLM, LM Studio) via [`OpenAiConfig::base_url`].

use crate::error::GenerateError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default chat-completions endpoint.
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model for recipe conversion.
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default sampling temperature. Low, so the model stays faithful to the
/// source recipe instead of inventing ingredients.
const DEFAULT_TEMPERATURE: f32 = 0.2;

/// A capability that turns a system prompt plus user text into generated text.
///
/// Implementations must be `Send + Sync` so a generator can be shared behind
/// an `Arc` between the library and a caller's own code.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short identifier used in log lines (e.g. "openai").
    fn name(&self) -> &str {
        "custom"
    }

    /// Produce the completion text for one request.
    ///
    /// One call per document; the library performs no retries (a transient
    /// failure surfaces to the caller or is recorded as a batch failure).
    async fn generate(&self, system_prompt: &str, user_text: &str)
        -> Result<String, GenerateError>;
}

// ── Wire types (OpenAI chat-completions format) ──────────────────────────

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
}

#[derive(Debug, Deserialize)]
struct WireResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireErrorResponse {
    error: WireErrorDetail,
}

#[derive(Debug, Deserialize)]
struct WireErrorDetail {
    message: String,
}

// ── OpenAI implementation ────────────────────────────────────────────────

/// Configuration for [`OpenAiGenerator`].
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Bearer credential sent with every request.
    pub api_key: String,
    /// Endpoint base, without the `/chat/completions` suffix.
    pub base_url: String,
    /// Model identifier, e.g. `gpt-4o-mini`.
    pub model: String,
    /// Sampling temperature (0.0–2.0).
    pub temperature: f32,
    /// Optional cap on generated tokens. `None` leaves it to the service.
    pub max_tokens: Option<u32>,
    /// Whole-request HTTP timeout in seconds.
    pub timeout_secs: u64,
}

impl OpenAiConfig {
    /// Config with the standard defaults for the given key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
            timeout_secs: 60,
        }
    }
}

/// [`TextGenerator`] backed by an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiGenerator {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiGenerator {
    /// Build a generator with its own HTTP client.
    pub fn new(config: OpenAiConfig) -> Result<Self, GenerateError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(
        &self,
        system_prompt: &str,
        user_text: &str,
    ) -> Result<String, GenerateError> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                WireMessage {
                    role: "system",
                    content: system_prompt,
                },
                WireMessage {
                    role: "user",
                    content: user_text,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        debug!(
            model = %self.config.model,
            prompt_bytes = system_prompt.len(),
            document_bytes = user_text.len(),
            "sending completion request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<WireErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(GenerateError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(GenerateError::EmptyCompletion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_omits_max_tokens_when_unset() {
        let request = ChatCompletionRequest {
            model: "gpt-4o-mini",
            messages: vec![WireMessage {
                role: "system",
                content: "spec",
            }],
            temperature: 0.2,
            max_tokens: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("max_tokens"));
        assert!(json.contains("\"temperature\":0.2"));
    }

    #[test]
    fn response_first_choice_content() {
        let json = r#"{
            "id": "chatcmpl-123",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": ">> servings: 4"}, "finish_reason": "stop"}
            ],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content);
        assert_eq!(content.as_deref(), Some(">> servings: 4"));
    }

    #[test]
    fn error_body_message_is_extracted() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        let parsed: WireErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error.message, "Incorrect API key provided");
    }

    #[test]
    fn endpoint_handles_trailing_slash() {
        let mut config = OpenAiConfig::new("sk-test");
        config.base_url = "http://localhost:11434/v1/".into();
        let generator = OpenAiGenerator::new(config).unwrap();
        assert_eq!(generator.endpoint(), "http://localhost:11434/v1/chat/completions");
    }

    #[test]
    fn default_config_matches_conversion_defaults() {
        let config = OpenAiConfig::new("sk-test");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert!(config.max_tokens.is_none());
    }
}
