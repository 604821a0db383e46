// Boundary layer — request/response shapes and the service facade.
//
// Callers (the CLI today) talk to `ExtractorService` in these types only.
// Every failure comes back as an `ErrorResponse` carrying one of the stable
// error codes, never as a raw internal error.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::db::models::{AnalysisMetadata, AnalysisRecord, SearchQuery, StoreStats};
use crate::db::AnalysisStore;
use crate::error::{AnalysisError, ErrorCode};
use crate::pipeline::{Analyzer, BatchFailure, BatchOutcome, PipelineSettings};
use crate::provider::AnalysisProvider;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchAnalyzeRequest {
    pub texts: Vec<String>,
}

/// Search filters as a caller supplies them. Missing values take defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
}

impl From<SearchParams> for SearchQuery {
    fn from(params: SearchParams) -> Self {
        SearchQuery {
            topic: params.topic,
            keyword: params.keyword,
            limit: params.limit.unwrap_or(0),
            offset: params.offset.unwrap_or(0),
        }
        .normalized()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub id: String,
    pub summary: String,
    pub metadata: AnalysisMetadata,
    pub confidence: f64,
}

impl From<&AnalysisRecord> for AnalyzeResponse {
    fn from(record: &AnalysisRecord) -> Self {
        Self {
            id: record.id.clone(),
            summary: record.summary.clone(),
            metadata: record.metadata.clone(),
            confidence: record.confidence,
        }
    }
}

/// One failed batch item on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchError {
    pub index: usize,
    pub error: String,
}

impl From<BatchFailure> for BatchError {
    fn from(failure: BatchFailure) -> Self {
        Self {
            index: failure.index,
            error: failure.reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchAnalyzeResponse {
    pub results: Vec<AnalyzeResponse>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<BatchError>,
}

impl From<BatchOutcome> for BatchAnalyzeResponse {
    fn from(outcome: BatchOutcome) -> Self {
        Self {
            results: outcome.successes.iter().map(AnalyzeResponse::from).collect(),
            failed: outcome.failures.into_iter().map(BatchError::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<AnalysisRecord>,
    pub count: usize,
    /// The query as actually executed, after defaults and caps
    pub query: SearchQuery,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: ErrorCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl From<&AnalysisError> for ErrorResponse {
    fn from(err: &AnalysisError) -> Self {
        let code = err.code();
        match err {
            AnalysisError::EmptyInput | AnalysisError::EmptyBatch => {
                ErrorResponse::new(err.to_string(), code)
            }
            AnalysisError::Provider(inner) if code == ErrorCode::EmptyInput => {
                ErrorResponse::new("Text cannot be empty", code).with_details(inner.to_string())
            }
            AnalysisError::Provider(inner) => {
                ErrorResponse::new("LLM service unavailable", code).with_details(inner.to_string())
            }
            AnalysisError::Persistence(inner) => {
                ErrorResponse::new("Failed to save analysis", code)
                    .with_details(format!("{inner:#}"))
            }
            AnalysisError::BatchTooLarge { max, .. } => {
                ErrorResponse::new(format!("Maximum {max} texts allowed per batch"), code)
                    .with_details(err.to_string())
            }
            AnalysisError::MalformedRequest(details) => {
                ErrorResponse::new("Invalid request format", code).with_details(details.clone())
            }
        }
    }
}

impl From<AnalysisError> for ErrorResponse {
    fn from(err: AnalysisError) -> Self {
        ErrorResponse::from(&err)
    }
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{} [{}]: {}", self.error, self.code, details),
            None => write!(f, "{} [{}]", self.error, self.code),
        }
    }
}

/// Parse a JSON request body. Shape errors become `INVALID_REQUEST`.
pub fn parse_request<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, ErrorResponse> {
    serde_json::from_str(body)
        .map_err(|e| ErrorResponse::from(AnalysisError::MalformedRequest(e.to_string())))
}

/// The service facade: one provider, one store, one pipeline.
#[derive(Clone)]
pub struct ExtractorService {
    analyzer: Analyzer,
}

impl ExtractorService {
    pub fn new(provider: Arc<dyn AnalysisProvider>, store: Arc<dyn AnalysisStore>) -> Self {
        Self {
            analyzer: Analyzer::new(provider, store),
        }
    }

    pub fn with_settings(
        provider: Arc<dyn AnalysisProvider>,
        store: Arc<dyn AnalysisStore>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            analyzer: Analyzer::with_settings(provider, store, settings),
        }
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    pub async fn analyze(&self, request: AnalyzeRequest) -> Result<AnalyzeResponse, ErrorResponse> {
        let record = self.analyzer.analyze(&request.text).await?;
        Ok(AnalyzeResponse::from(&record))
    }

    pub async fn analyze_batch(
        &self,
        request: BatchAnalyzeRequest,
    ) -> Result<BatchAnalyzeResponse, ErrorResponse> {
        let outcome = self.analyzer.run_batch(request.texts).await?;
        Ok(BatchAnalyzeResponse::from(outcome))
    }

    pub async fn search(&self, params: SearchParams) -> Result<SearchResponse, ErrorResponse> {
        let query = SearchQuery::from(params);
        let results = self.analyzer.store().search(&query).await.map_err(|e| {
            error!(error = %e, "Search failed");
            ErrorResponse::new("Search failed", ErrorCode::DbError).with_details(format!("{e:#}"))
        })?;

        Ok(SearchResponse {
            count: results.len(),
            results,
            query,
        })
    }

    pub async fn get(&self, id: &str) -> Result<Option<AnalysisRecord>, ErrorResponse> {
        self.analyzer.store().get(id).await.map_err(|e| {
            ErrorResponse::new("Lookup failed", ErrorCode::DbError).with_details(format!("{e:#}"))
        })
    }

    pub async fn stats(&self) -> Result<StoreStats, ErrorResponse> {
        self.analyzer.store().stats().await.map_err(|e| {
            ErrorResponse::new("Failed to read statistics", ErrorCode::DbError)
                .with_details(format!("{e:#}"))
        })
    }
}
