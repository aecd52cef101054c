//! Async LLM client for fighter decisions
//!
//! Model-agnostic HTTP client. Speaks the Anthropic messages format and the
//! OpenAI-compatible chat format used by OpenRouter, DeepSeek and friends.
//! Every failure maps to `ProviderUnreachable`; the caller decides what to
//! do about it.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::warn;

use crate::core::error::{BrawlError, Result};

pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "z-ai/glm-4.6";

const MAX_TOKENS: u32 = 200;
const TEMPERATURE: f32 = 0.7;

/// Wire format spoken by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFormat {
    Anthropic,
    OpenAI,
}

/// Async LLM client for making API calls
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    api_format: ApiFormat,
    timeout: Duration,
    max_retries: u32,
}

impl LlmClient {
    /// Create a new LLM client with explicit configuration
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        let api_format = Self::detect_api_format(&api_url);
        let timeout = Duration::from_secs(10);
        Self {
            client: Self::build_http(timeout),
            api_key,
            api_url,
            model,
            api_format,
            timeout,
            max_retries: 2,
        }
    }

    fn build_http(timeout: Duration) -> Client {
        Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new())
    }

    /// Per-request HTTP timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self.client = Self::build_http(timeout);
        self
    }

    /// Retries after HTTP 429
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn api_format(&self) -> ApiFormat {
        self.api_format
    }

    /// Anthropic hosts get the messages API, everyone else chat completions
    fn detect_api_format(url: &str) -> ApiFormat {
        if url.contains("anthropic.com") || url.ends_with("/v1/messages") {
            ApiFormat::Anthropic
        } else {
            ApiFormat::OpenAI
        }
    }

    /// Create a client from environment variables
    ///
    /// Required: LLM_API_KEY or OPENROUTER_API_KEY
    /// Optional: LLM_API_URL (defaults to OpenRouter)
    /// Optional: LLM_MODEL (defaults to z-ai/glm-4.6)
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("LLM_API_KEY")
            .or_else(|_| std::env::var("OPENROUTER_API_KEY"))
            .map_err(|_| BrawlError::ProviderUnreachable("LLM_API_KEY not set".into()))?;
        let api_url = std::env::var("LLM_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());

        Ok(Self::new(api_key, api_url, model))
    }

    /// One completion: `system` sets the scene, `user` carries the fight state.
    /// Returns the model's raw text.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let response = self.send_with_retry(|| self.build_request(system, user)).await?;
        let text = match self.api_format {
            ApiFormat::Anthropic => {
                let body: wire::MessagesResponse = response.json().await.map_err(unreachable)?;
                body.content.into_iter().next().map(|block| block.text)
            }
            ApiFormat::OpenAI => {
                let body: wire::ChatResponse = response.json().await.map_err(unreachable)?;
                body.choices.into_iter().next().and_then(|choice| choice.message.content)
            }
        };
        text.filter(|t| !t.trim().is_empty())
            .ok_or_else(|| BrawlError::ProviderUnreachable("provider returned no text".into()))
    }

    fn build_request(&self, system: &str, user: &str) -> RequestBuilder {
        let post = self.client.post(&self.api_url).header("content-type", "application/json");
        match self.api_format {
            ApiFormat::Anthropic => post
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", "2023-06-01")
                .json(&wire::MessagesRequest {
                    model: &self.model,
                    max_tokens: MAX_TOKENS,
                    temperature: TEMPERATURE,
                    system,
                    messages: [wire::Turn { role: "user", content: user }],
                }),
            ApiFormat::OpenAI => post
                .bearer_auth(&self.api_key)
                .header("X-Title", "Syntax Brawlers")
                .json(&wire::ChatRequest {
                    model: &self.model,
                    max_tokens: MAX_TOKENS,
                    temperature: TEMPERATURE,
                    messages: [
                        wire::Turn { role: "system", content: system },
                        wire::Turn { role: "user", content: user },
                    ],
                }),
        }
    }

    /// Sends, backing off and retrying while the provider answers 429
    async fn send_with_retry(&self, build: impl Fn() -> RequestBuilder) -> Result<Response> {
        for attempt in 0..=self.max_retries {
            let response = build().send().await.map_err(unreachable)?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS && attempt < self.max_retries {
                let delay = Duration::from_millis(500 * u64::from(attempt + 1));
                warn!(attempt = attempt + 1, delay_ms = delay.as_millis() as u64, "rate limited by provider");
                tokio::time::sleep(delay).await;
                continue;
            }
            if !status.is_success() {
                let detail = response.text().await.unwrap_or_default();
                return Err(BrawlError::ProviderUnreachable(format!("HTTP {}: {}", status, detail.trim())));
            }
            return Ok(response);
        }
        Err(BrawlError::ProviderUnreachable("rate limited".into()))
    }
}

fn unreachable(err: reqwest::Error) -> BrawlError {
    BrawlError::ProviderUnreachable(err.to_string())
}

/// Request and response bodies for both chat formats
mod wire {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize)]
    pub struct Turn<'a> {
        pub role: &'a str,
        pub content: &'a str,
    }

    /// Anthropic messages API
    #[derive(Serialize)]
    pub struct MessagesRequest<'a> {
        pub model: &'a str,
        pub max_tokens: u32,
        pub temperature: f32,
        pub system: &'a str,
        pub messages: [Turn<'a>; 1],
    }

    #[derive(Deserialize)]
    pub struct MessagesResponse {
        pub content: Vec<TextBlock>,
    }

    #[derive(Deserialize)]
    pub struct TextBlock {
        pub text: String,
    }

    /// OpenAI-compatible chat completions (OpenRouter and friends)
    #[derive(Serialize)]
    pub struct ChatRequest<'a> {
        pub model: &'a str,
        pub max_tokens: u32,
        pub temperature: f32,
        pub messages: [Turn<'a>; 2],
    }

    #[derive(Deserialize)]
    pub struct ChatResponse {
        pub choices: Vec<ChatChoice>,
    }

    #[derive(Deserialize)]
    pub struct ChatChoice {
        pub message: ChatMessage,
    }

    #[derive(Deserialize)]
    pub struct ChatMessage {
        pub content: Option<String>,
    }
}
