// Ollama provider — analysis via a local or self-hosted Ollama server.
//
// Uses /api/chat with `format: "json"` and streaming off, so the reply is a
// single message whose content is the JSON analysis object.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::rate_limiter::RateLimiter;
use super::traits::{parse_json_response, AnalysisProvider, AnalysisResult, SYSTEM_PROMPT};
use crate::error::ProviderError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.2";

pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    rate_limiter: RateLimiter,
}

impl OllamaProvider {
    pub fn new(
        base_url: String,
        model: String,
        max_tokens: u32,
        temperature: f32,
        requests_per_second: f64,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            max_tokens,
            temperature,
            rate_limiter: RateLimiter::new(requests_per_second),
        })
    }

    async fn chat(&self, text: &str) -> Result<String, ProviderError> {
        self.rate_limiter.acquire().await;

        let request = OllamaChatRequest {
            model: &self.model,
            messages: vec![
                OllamaMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                OllamaMessage {
                    role: "user",
                    content: text,
                },
            ],
            stream: false,
            format: "json",
            options: OllamaOptions {
                temperature: self.temperature,
                num_predict: self.max_tokens,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("cannot reach Ollama: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Unavailable(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let reply: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(reply.message.content)
    }
}

#[async_trait]
impl AnalysisProvider for OllamaProvider {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn analyze(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult, ProviderError> {
        if text.trim().is_empty() {
            return Err(ProviderError::EmptyInput);
        }

        let content = tokio::select! {
            content = self.chat(text) => content?,
            _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
        };

        debug!(model = %self.model, "Ollama reply received");

        parse_json_response(&content)
    }

    fn is_available(&self) -> bool {
        !self.model.is_empty()
    }
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage<'a>>,
    stream: bool,
    format: &'static str,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaReplyMessage,
}

#[derive(Deserialize)]
struct OllamaReplyMessage {
    content: String,
}
