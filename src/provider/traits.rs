// Analysis provider trait — the swap-ready abstraction.
//
// A provider turns raw text into a summary, title, topics and sentiment.
// The default implementation is a local mock; OpenAI-compatible and Ollama
// backends are selected by configuration. Whatever the backend returns goes
// through the same normalization policy before anything else sees it.

use async_trait::async_trait;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::db::models::Sentiment;
use crate::error::ProviderError;

/// Substituted when a provider returns an empty summary.
pub const DEFAULT_SUMMARY: &str = "No summary available";
/// Substituted when a provider returns no topics.
pub const DEFAULT_TOPICS: [&str; 3] = ["general", "uncategorized", "text"];
pub const MAX_TOPICS: usize = 3;

/// Instructions sent to remote LLM backends. The response must be a bare
/// JSON object so it can go straight through `parse_json_response`.
pub(crate) const SYSTEM_PROMPT: &str = "You analyze text and respond with a single JSON object \
and nothing else. The object has exactly these fields: \
\"summary\" (one or two sentences), \
\"title\" (a short title, or an empty string if none fits), \
\"topics\" (an array of at most 3 short topic labels), \
\"sentiment\" (one of \"positive\", \"neutral\", \"negative\").";

/// The structured output of a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub summary: String,
    pub title: String,
    pub topics: Vec<String>,
    pub sentiment: Sentiment,
}

impl AnalysisResult {
    /// Apply the normalization policy: default summary when empty, default
    /// topics when none, at most three topics otherwise.
    ///
    /// Idempotent. Sentiment is already constrained by its type.
    pub fn normalize(mut self) -> Self {
        if self.summary.is_empty() {
            self.summary = DEFAULT_SUMMARY.to_string();
        }

        if self.topics.is_empty() {
            self.topics = DEFAULT_TOPICS.iter().map(|t| t.to_string()).collect();
        } else {
            self.topics.truncate(MAX_TOPICS);
        }

        self
    }
}

/// The loose shape a provider payload is parsed into before normalization.
/// Every field is optional so partial payloads still normalize.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAnalysis {
    summary: Option<String>,
    title: Option<String>,
    topics: Option<Vec<String>>,
    sentiment: Option<String>,
}

/// Parse a provider's raw JSON payload and normalize it.
///
/// Tolerates a surrounding markdown code fence, which chat models add
/// even when asked not to.
pub fn parse_json_response(content: &str) -> Result<AnalysisResult, ProviderError> {
    let body = strip_code_fence(content.trim());

    let raw: RawAnalysis = serde_json::from_str(body)
        .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

    let result = AnalysisResult {
        summary: raw.summary.unwrap_or_default(),
        title: raw.title.unwrap_or_default(),
        topics: raw.topics.unwrap_or_default(),
        sentiment: Sentiment::from_label(raw.sentiment.as_deref().unwrap_or_default()),
    };

    Ok(result.normalize())
}

fn strip_code_fence(content: &str) -> &str {
    let Some(rest) = content.strip_prefix("```") else {
        return content;
    };
    // Drop an optional language tag on the opening fence
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Trait for turning text into a structured analysis. Implementations are
/// async because the real backends are HTTP APIs.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Analyze one text.
    ///
    /// Fails with `EmptyInput` for blank text, `Unavailable` for upstream
    /// failures, `InvalidResponse` for unparseable payloads and `Cancelled`
    /// if `cancel` fires before the result is ready.
    async fn analyze(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult, ProviderError>;

    /// Cheap health probe. Never does network I/O.
    fn is_available(&self) -> bool;
}
