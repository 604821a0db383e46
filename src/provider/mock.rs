// Local mock provider — heuristic analysis with simulated latency and failures.
//
// Needs no API key and no network. The summary is the leading words of the
// input, topics are a fixed set, sentiment is random. Failure injection and
// latency are constructor parameters, and the RNG can be seeded so tests are
// deterministic.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::traits::{AnalysisProvider, AnalysisResult};
use crate::db::models::Sentiment;
use crate::error::ProviderError;

pub const DEFAULT_FAILURE_RATE: f64 = 0.1;
pub const DEFAULT_DELAY: Duration = Duration::from_millis(100);

const MOCK_TOPICS: [&str; 3] = ["technology", "innovation", "analysis"];
const SUMMARY_PREFIX: &str = "This text discusses ";
const MIN_SUMMARY_WORDS: usize = 5;
const MAX_SUMMARY_WORDS: usize = 20;

pub struct MockProvider {
    /// Probability in [0, 1] that a call fails with `Unavailable`
    failure_rate: f64,
    /// Simulated latency per call
    delay: Duration,
    rng: Mutex<StdRng>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new(DEFAULT_FAILURE_RATE, DEFAULT_DELAY)
    }
}

impl MockProvider {
    /// Create a mock seeded from the OS.
    pub fn new(failure_rate: f64, delay: Duration) -> Self {
        Self::from_rng(failure_rate, delay, StdRng::from_os_rng())
    }

    /// Create a mock with a fixed seed — same seed, same failures and sentiments.
    pub fn with_seed(failure_rate: f64, delay: Duration, seed: u64) -> Self {
        Self::from_rng(failure_rate, delay, StdRng::seed_from_u64(seed))
    }

    fn from_rng(failure_rate: f64, delay: Duration, rng: StdRng) -> Self {
        Self {
            failure_rate: failure_rate.clamp(0.0, 1.0),
            delay,
            rng: Mutex::new(rng),
        }
    }

    /// Draw the failure roll and the sentiment together so the lock is
    /// taken once per call.
    fn roll(&self) -> (bool, Sentiment) {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let fails = rng.random::<f64>() < self.failure_rate;
        let sentiment = Sentiment::ALL[rng.random_range(0..Sentiment::ALL.len())];
        (fails, sentiment)
    }
}

#[async_trait]
impl AnalysisProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn analyze(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult, ProviderError> {
        if text.trim().is_empty() {
            return Err(ProviderError::EmptyInput);
        }

        tokio::select! {
            _ = tokio::time::sleep(self.delay) => {}
            _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
        }

        let (fails, sentiment) = self.roll();
        if fails {
            return Err(ProviderError::Unavailable("mock failure".to_string()));
        }

        if cancel.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }

        let words: Vec<&str> = text.split_whitespace().collect();
        let result = AnalysisResult {
            summary: mock_summary(&words),
            title: mock_title(&words),
            topics: MOCK_TOPICS.iter().map(|t| t.to_string()).collect(),
            sentiment,
        };

        debug!(
            words = words.len(),
            sentiment = %result.sentiment,
            "Mock analysis complete"
        );

        Ok(result)
    }

    fn is_available(&self) -> bool {
        self.failure_rate < 1.0
    }
}

/// Roughly a tenth of the input, between 5 and 20 words, with an ellipsis.
fn mock_summary(words: &[&str]) -> String {
    let length = (words.len() / 10)
        .clamp(MIN_SUMMARY_WORDS, MAX_SUMMARY_WORDS)
        .min(words.len());
    format!("{SUMMARY_PREFIX}{}...", words[..length].join(" "))
}

/// First three words, title-cased. Empty unless there are at least four words.
fn mock_title(words: &[&str]) -> String {
    if words.len() <= 3 {
        return String::new();
    }
    words[..3]
        .iter()
        .map(|word| capitalize(word))
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reliable() -> MockProvider {
        MockProvider::with_seed(0.0, Duration::ZERO, 7)
    }

    #[tokio::test]
    async fn test_analyze_normal_text() {
        let provider = reliable();
        let text = "Artificial intelligence is transforming industries across the globe. \
                    From healthcare to finance, AI applications are improving efficiency.";
        let result = provider
            .analyze(text, &CancellationToken::new())
            .await
            .unwrap();
        assert!(result.summary.starts_with("This text discusses Artificial"));
        assert!(result.summary.ends_with("..."));
        assert_eq!(result.title, "Artificial Intelligence Is");
        assert_eq!(result.topics.len(), 3);
    }

    #[tokio::test]
    async fn test_blank_text_is_empty_input() {
        let provider = reliable();
        for text in ["", "   \n\t  "] {
            let err = provider
                .analyze(text, &CancellationToken::new())
                .await
                .unwrap_err();
            assert!(matches!(err, ProviderError::EmptyInput));
        }
    }

    #[tokio::test]
    async fn test_short_text_has_no_title() {
        let provider = reliable();
        let result = provider
            .analyze("This is test.", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result.title, "");
        assert_eq!(result.summary, "This text discusses This is test....");
    }

    #[tokio::test]
    async fn test_certain_failure() {
        let provider = MockProvider::with_seed(1.0, Duration::ZERO, 1);
        let err = provider
            .analyze("some text here", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(_)));
        assert!(!provider.is_available());
    }

    #[tokio::test]
    async fn test_cancelled_before_completion() {
        let provider = MockProvider::with_seed(0.0, Duration::from_secs(10), 1);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = provider.analyze("some text here", &cancel).await.unwrap_err();
        assert!(matches!(err, ProviderError::Cancelled));
    }

    #[tokio::test]
    async fn test_same_seed_same_sentiments() {
        let a = MockProvider::with_seed(0.0, Duration::ZERO, 42);
        let b = MockProvider::with_seed(0.0, Duration::ZERO, 42);
        let cancel = CancellationToken::new();
        for _ in 0..5 {
            let ra = a.analyze("one two three four", &cancel).await.unwrap();
            let rb = b.analyze("one two three four", &cancel).await.unwrap();
            assert_eq!(ra.sentiment, rb.sentiment);
        }
    }

    #[test]
    fn test_summary_length_bounds() {
        let long: Vec<&str> = std::iter::repeat("w").take(400).collect();
        let summary = mock_summary(&long);
        let body = summary
            .strip_prefix(SUMMARY_PREFIX)
            .and_then(|s| s.strip_suffix("..."))
            .unwrap();
        assert_eq!(body.split_whitespace().count(), MAX_SUMMARY_WORDS);

        let medium: Vec<&str> = std::iter::repeat("w").take(30).collect();
        let summary = mock_summary(&medium);
        let body = summary
            .strip_prefix(SUMMARY_PREFIX)
            .and_then(|s| s.strip_suffix("..."))
            .unwrap();
        assert_eq!(body.split_whitespace().count(), MIN_SUMMARY_WORDS);
    }
}
