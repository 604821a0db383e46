use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Which analysis provider to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderBackend {
    /// Local heuristic provider (default) — no API key, simulated latency
    Mock,
    /// OpenAI-compatible chat completions API — requires OPENAI_API_KEY
    OpenAi,
    /// Ollama server — local or self-hosted models
    Ollama,
}

impl ProviderBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderBackend::Mock => "mock",
            ProviderBackend::OpenAi => "openai",
            ProviderBackend::Ollama => "ollama",
        }
    }
}

impl FromStr for ProviderBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mock" => Ok(ProviderBackend::Mock),
            "openai" => Ok(ProviderBackend::OpenAi),
            "ollama" => Ok(ProviderBackend::Ollama),
            other => anyhow::bail!(
                "Unsupported LLM provider: {other:?}. Use one of: mock, openai, ollama."
            ),
        }
    }
}

impl std::fmt::Display for ProviderBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Central configuration loaded from environment variables.
///
/// All secrets come from env vars (never hardcoded). The .env file
/// is loaded automatically at startup via dotenvy.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database file (DB_PATH, default ./data/knowledge.db)
    pub db_path: String,
    /// Which provider to instantiate (LLM_PROVIDER, default mock)
    pub provider: ProviderBackend,
    /// Model name override for remote providers
    pub llm_model: Option<String>,
    /// Base URL override for remote providers
    pub llm_base_url: Option<String>,
    pub llm_max_tokens: u32,
    pub llm_temperature: f32,
    /// Outgoing request pacing for remote providers
    pub llm_requests_per_second: f64,
    pub openai_api_key: String,
    /// Probability that a mock call fails (MOCK_FAILURE_RATE, default 0.1)
    pub mock_failure_rate: f64,
    /// Simulated mock latency (MOCK_DELAY_MS, default 100)
    pub mock_delay: Duration,
    /// Fixed RNG seed for reproducible mock runs
    pub mock_seed: Option<u64>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// An unrecognized LLM_PROVIDER is an error here, so a bad selector
    /// stops the process at startup instead of surfacing per request.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. `load` passes the
    /// process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = match get("LLM_PROVIDER") {
            Some(name) => name.trim().parse()?,
            None => ProviderBackend::Mock,
        };

        Ok(Self {
            db_path: get("DB_PATH").unwrap_or_else(|| "./data/knowledge.db".to_string()),
            provider,
            llm_model: get("LLM_MODEL"),
            llm_base_url: get("LLM_BASE_URL"),
            llm_max_tokens: parse_or(get("LLM_MAX_TOKENS"), "LLM_MAX_TOKENS", 500)?,
            llm_temperature: parse_or(get("LLM_TEMPERATURE"), "LLM_TEMPERATURE", 0.3)?,
            llm_requests_per_second: parse_or(
                get("LLM_REQUESTS_PER_SECOND"),
                "LLM_REQUESTS_PER_SECOND",
                2.0,
            )?,
            openai_api_key: get("OPENAI_API_KEY").unwrap_or_default(),
            mock_failure_rate: parse_or(get("MOCK_FAILURE_RATE"), "MOCK_FAILURE_RATE", 0.1)?,
            mock_delay: Duration::from_millis(parse_or(get("MOCK_DELAY_MS"), "MOCK_DELAY_MS", 100)?),
            mock_seed: get("MOCK_SEED")
                .map(|s| s.trim().parse::<u64>().context("MOCK_SEED must be an unsigned integer"))
                .transpose()?,
        })
    }

    /// Validate that the chosen provider has what it needs.
    /// For OpenAI: the API key must be set. Mock and Ollama need nothing.
    pub fn require_provider(&self) -> Result<()> {
        match self.provider {
            ProviderBackend::OpenAi if self.openai_api_key.is_empty() => anyhow::bail!(
                "OPENAI_API_KEY not set. Add it to your .env file,\n\
                 or set LLM_PROVIDER=mock to use the local mock provider."
            ),
            _ => Ok(()),
        }
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.db_path, "./data/knowledge.db");
        assert_eq!(config.provider, ProviderBackend::Mock);
        assert_eq!(config.llm_max_tokens, 500);
        assert!((config.mock_failure_rate - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.mock_delay, Duration::from_millis(100));
        assert_eq!(config.mock_seed, None);
    }

    #[test]
    fn test_unknown_provider_is_fatal() {
        let err = config_from(&[("LLM_PROVIDER", "unknown")]).unwrap_err();
        assert!(err.to_string().contains("Unsupported LLM provider"));
    }

    #[test]
    fn test_blank_provider_means_mock() {
        let config = config_from(&[("LLM_PROVIDER", "  ")]).unwrap();
        assert_eq!(config.provider, ProviderBackend::Mock);
    }

    #[test]
    fn test_overrides_parsed() {
        let config = config_from(&[
            ("LLM_PROVIDER", "ollama"),
            ("DB_PATH", "/tmp/k.db"),
            ("MOCK_DELAY_MS", "5"),
            ("MOCK_SEED", "42"),
            ("LLM_TEMPERATURE", "0.9"),
        ])
        .unwrap();
        assert_eq!(config.provider, ProviderBackend::Ollama);
        assert_eq!(config.db_path, "/tmp/k.db");
        assert_eq!(config.mock_delay, Duration::from_millis(5));
        assert_eq!(config.mock_seed, Some(42));
        assert!((config.llm_temperature - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn test_bad_number_reports_key() {
        let err = config_from(&[("MOCK_FAILURE_RATE", "lots")]).unwrap_err();
        assert!(err.to_string().contains("MOCK_FAILURE_RATE"));
    }

    #[test]
    fn test_openai_requires_key() {
        let config = config_from(&[("LLM_PROVIDER", "openai")]).unwrap();
        assert!(config.require_provider().is_err());

        let config =
            config_from(&[("LLM_PROVIDER", "openai"), ("OPENAI_API_KEY", "sk-x")]).unwrap();
        assert!(config.require_provider().is_ok());
    }
}
