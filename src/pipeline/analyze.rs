// Single-item analysis pipeline.
//
// provider analyze -> normalize -> local keyword extraction -> confidence
// scoring -> persist. Each run gets its own timeout. There are no retries:
// one provider or store failure ends the run.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{SubsecRound, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::analysis::{calculate_confidence, KeywordExtractor};
use crate::db::models::{AnalysisMetadata, AnalysisRecord};
use crate::db::AnalysisStore;
use crate::error::{AnalysisError, ProviderError};
use crate::provider::{AnalysisProvider, AnalysisResult};

/// Tunables for the pipeline. Defaults match the public contract.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Keywords stored per record
    pub keyword_count: usize,
    /// Provider time budget for a single-text analysis
    pub request_timeout: Duration,
    /// Provider time budget for each item of a batch
    pub item_timeout: Duration,
    pub max_batch_size: usize,
    /// Batch items allowed to run at the same time
    pub concurrency: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            keyword_count: 3,
            request_timeout: Duration::from_secs(45),
            item_timeout: Duration::from_secs(30),
            max_batch_size: 10,
            concurrency: 3,
        }
    }
}

/// Runs the analysis pipeline against a provider and a store.
///
/// Cheap to clone (every field is shared), so batch workers each take
/// their own copy into a spawned task.
#[derive(Clone)]
pub struct Analyzer {
    provider: Arc<dyn AnalysisProvider>,
    store: Arc<dyn AnalysisStore>,
    keywords: Arc<KeywordExtractor>,
    settings: PipelineSettings,
    shutdown: CancellationToken,
}

impl Analyzer {
    pub fn new(provider: Arc<dyn AnalysisProvider>, store: Arc<dyn AnalysisStore>) -> Self {
        Self::with_settings(provider, store, PipelineSettings::default())
    }

    pub fn with_settings(
        provider: Arc<dyn AnalysisProvider>,
        store: Arc<dyn AnalysisStore>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            provider,
            store,
            keywords: Arc::new(KeywordExtractor::new()),
            settings,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn provider(&self) -> &dyn AnalysisProvider {
        self.provider.as_ref()
    }

    pub fn store(&self) -> &Arc<dyn AnalysisStore> {
        &self.store
    }

    /// Cancelling this token cancels every in-flight provider call.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Analyze and persist one text.
    pub async fn analyze(&self, text: &str) -> Result<AnalysisRecord, AnalysisError> {
        self.run_item(text, self.settings.request_timeout).await
    }

    /// The full per-item pipeline with an explicit provider time budget.
    pub(crate) async fn run_item(
        &self,
        text: &str,
        timeout: Duration,
    ) -> Result<AnalysisRecord, AnalysisError> {
        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        let started = Instant::now();

        let result = self.call_provider(text, timeout).await?.normalize();
        let keywords = self
            .keywords
            .extract_keywords(text, self.settings.keyword_count);
        let confidence =
            calculate_confidence(text, &result.summary, &result.topics).clamp(0.0, 1.0);

        let AnalysisResult {
            summary,
            title,
            topics,
            sentiment,
        } = result;

        let record = AnalysisRecord {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            summary,
            metadata: AnalysisMetadata {
                title,
                topics,
                sentiment,
                keywords,
            },
            confidence,
            // Storage keeps microseconds; truncate so the record round-trips exactly
            created_at: Utc::now().trunc_subsecs(6),
            processing_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };

        self.store
            .save(&record)
            .await
            .map_err(AnalysisError::Persistence)?;

        info!(
            id = %record.id,
            provider = self.provider.name(),
            confidence = record.confidence,
            processing_ms = record.processing_ms,
            "Analysis stored"
        );

        Ok(record)
    }

    async fn call_provider(
        &self,
        text: &str,
        timeout: Duration,
    ) -> Result<AnalysisResult, ProviderError> {
        let cancel = self.shutdown.child_token();
        // Stop the provider's work if this future is dropped early
        let _guard = cancel.clone().drop_guard();

        match tokio::time::timeout(timeout, self.provider.analyze(text, &cancel)).await {
            Ok(result) => result,
            Err(_) => {
                debug!(?timeout, provider = self.provider.name(), "Provider call timed out");
                Err(ProviderError::Timeout(timeout))
            }
        }
    }
}
