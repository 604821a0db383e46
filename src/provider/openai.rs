// OpenAI-compatible chat completions provider.
//
// Works against api.openai.com or any server exposing the same
// /chat/completions contract. The model is asked for a JSON object and the
// reply goes through the shared parser, so normalization is identical to
// every other provider.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::rate_limiter::RateLimiter;
use super::traits::{parse_json_response, AnalysisProvider, AnalysisResult, SYSTEM_PROMPT};
use crate::error::ProviderError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    rate_limiter: RateLimiter,
}

impl OpenAiProvider {
    pub fn new(
        api_key: String,
        base_url: String,
        model: String,
        max_tokens: u32,
        temperature: f32,
        requests_per_second: f64,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("knowledge-extractor/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            max_tokens,
            temperature,
            rate_limiter: RateLimiter::new(requests_per_second),
        })
    }

    async fn complete(&self, text: &str) -> Result<String, ProviderError> {
        self.rate_limiter.acquire().await;

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Unavailable(format!(
                "OpenAI returned {status}: {body}"
            )));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::InvalidResponse("no choices in completion".to_string()))
    }
}

#[async_trait]
impl AnalysisProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
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
            content = self.complete(text) => content?,
            _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
        };

        debug!(
            model = %self.model,
            response_chars = content.len(),
            "OpenAI completion received"
        );

        parse_json_response(&content)
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }
}

// --- Chat completions request/response types ---

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(api_key: &str) -> OpenAiProvider {
        OpenAiProvider::new(
            api_key.to_string(),
            "http://127.0.0.1:9/v1/".to_string(),
            DEFAULT_MODEL.to_string(),
            500,
            0.3,
            0.0,
        )
        .unwrap()
    }

    #[test]
    fn test_availability_tracks_api_key() {
        assert!(provider("sk-test").is_available());
        assert!(!provider("").is_available());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        assert_eq!(provider("k").base_url, "http://127.0.0.1:9/v1");
    }

    #[test]
    fn test_request_serializes_json_mode() {
        let request = ChatRequest {
            model: "m",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            max_tokens: 10,
            temperature: 0.0,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["response_format"]["type"], "json_object");
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[tokio::test]
    async fn test_blank_text_rejected_without_network() {
        let err = provider("k")
            .analyze("  ", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::EmptyInput));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unavailable() {
        // Port 9 (discard) is closed on test hosts, so the connect fails fast
        let err = provider("k")
            .analyze("some text", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(_)));
    }
}
