// Analysis providers — trait-based abstraction for swappable backends.
//
// The AnalysisProvider trait defines the interface. `create_provider` picks
// the implementation named by configuration; the rest of the pipeline only
// ever sees `Arc<dyn AnalysisProvider>`.

pub mod mock;
pub mod ollama;
pub mod openai;
pub mod rate_limiter;
pub mod traits;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::config::{Config, ProviderBackend};
pub use traits::{AnalysisProvider, AnalysisResult};

/// Instantiate the provider selected by `config.provider`.
pub fn create_provider(config: &Config) -> Result<Arc<dyn AnalysisProvider>> {
    config.require_provider()?;

    let provider: Arc<dyn AnalysisProvider> = match config.provider {
        ProviderBackend::Mock => Arc::new(match config.mock_seed {
            Some(seed) => mock::MockProvider::with_seed(
                config.mock_failure_rate,
                config.mock_delay,
                seed,
            ),
            None => mock::MockProvider::new(config.mock_failure_rate, config.mock_delay),
        }),
        ProviderBackend::OpenAi => Arc::new(openai::OpenAiProvider::new(
            config.openai_api_key.clone(),
            config
                .llm_base_url
                .clone()
                .unwrap_or_else(|| openai::DEFAULT_BASE_URL.to_string()),
            config
                .llm_model
                .clone()
                .unwrap_or_else(|| openai::DEFAULT_MODEL.to_string()),
            config.llm_max_tokens,
            config.llm_temperature,
            config.llm_requests_per_second,
        )?),
        ProviderBackend::Ollama => Arc::new(ollama::OllamaProvider::new(
            config
                .llm_base_url
                .clone()
                .unwrap_or_else(|| ollama::DEFAULT_BASE_URL.to_string()),
            config
                .llm_model
                .clone()
                .unwrap_or_else(|| ollama::DEFAULT_MODEL.to_string()),
            config.llm_max_tokens,
            config.llm_temperature,
            config.llm_requests_per_second,
        )?),
    };

    info!(provider = provider.name(), "Analysis provider ready");
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: &str, api_key: Option<&str>) -> Config {
        Config::from_lookup(|key| match key {
            "LLM_PROVIDER" => Some(provider.to_string()),
            "OPENAI_API_KEY" => api_key.map(str::to_string),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn test_factory_builds_each_backend() {
        assert_eq!(create_provider(&config("mock", None)).unwrap().name(), "mock");
        assert_eq!(
            create_provider(&config("openai", Some("sk-test"))).unwrap().name(),
            "openai"
        );
        assert_eq!(create_provider(&config("ollama", None)).unwrap().name(), "ollama");
    }

    #[test]
    fn test_factory_rejects_openai_without_key() {
        assert!(create_provider(&config("openai", None)).is_err());
    }
}
