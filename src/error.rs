// Error taxonomy for the analysis pipeline.
//
// Providers report `ProviderError`; the pipeline wraps it (and storage
// failures) into `AnalysisError`. Every `AnalysisError` maps to one
// machine-readable `ErrorCode` for the boundary layer.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by an `AnalysisProvider`.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("empty input text")]
    EmptyInput,

    #[error("LLM service unavailable: {0}")]
    Unavailable(String),

    #[error("invalid JSON response from LLM: {0}")]
    InvalidResponse(String),

    #[error("analysis cancelled")]
    Cancelled,

    #[error("analysis timed out after {0:?}")]
    Timeout(Duration),
}

/// Failure of a pipeline run or a boundary precondition.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Text cannot be empty")]
    EmptyInput,

    #[error("Analysis failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Failed to save: {0:#}")]
    Persistence(anyhow::Error),

    #[error("No texts provided")]
    EmptyBatch,

    #[error("Maximum {max} texts allowed per batch, got {size}")]
    BatchTooLarge { size: usize, max: usize },

    #[error("Invalid request format: {0}")]
    MalformedRequest(String),
}

impl AnalysisError {
    /// The boundary code for this error.
    ///
    /// All provider failures share `LLM_UNAVAILABLE`; rate limits, network
    /// errors and unparseable payloads are not told apart at the boundary.
    pub fn code(&self) -> ErrorCode {
        match self {
            AnalysisError::EmptyInput | AnalysisError::EmptyBatch => ErrorCode::EmptyInput,
            AnalysisError::Provider(ProviderError::EmptyInput) => ErrorCode::EmptyInput,
            AnalysisError::Provider(_) => ErrorCode::LlmUnavailable,
            AnalysisError::Persistence(_) => ErrorCode::DbError,
            AnalysisError::BatchTooLarge { .. } => ErrorCode::BatchSizeExceeded,
            AnalysisError::MalformedRequest(_) => ErrorCode::InvalidRequest,
        }
    }
}

/// Machine-readable error codes returned to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    EmptyInput,
    LlmUnavailable,
    DbError,
    InvalidRequest,
    BatchSizeExceeded,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::EmptyInput => "EMPTY_INPUT",
            ErrorCode::LlmUnavailable => "LLM_UNAVAILABLE",
            ErrorCode::DbError => "DB_ERROR",
            ErrorCode::InvalidRequest => "INVALID_REQUEST",
            ErrorCode::BatchSizeExceeded => "BATCH_SIZE_EXCEEDED",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_failures_collapse_to_unavailable() {
        let cases = [
            ProviderError::Unavailable("boom".into()),
            ProviderError::InvalidResponse("bad".into()),
            ProviderError::Cancelled,
            ProviderError::Timeout(Duration::from_secs(30)),
        ];
        for err in cases {
            assert_eq!(AnalysisError::from(err).code(), ErrorCode::LlmUnavailable);
        }
    }

    #[test]
    fn test_empty_input_codes() {
        assert_eq!(AnalysisError::EmptyInput.code(), ErrorCode::EmptyInput);
        assert_eq!(AnalysisError::EmptyBatch.code(), ErrorCode::EmptyInput);
        assert_eq!(
            AnalysisError::from(ProviderError::EmptyInput).code(),
            ErrorCode::EmptyInput
        );
    }

    #[test]
    fn test_code_serializes_screaming_snake() {
        let json = serde_json::to_string(&ErrorCode::BatchSizeExceeded).unwrap();
        assert_eq!(json, "\"BATCH_SIZE_EXCEEDED\"");
        assert_eq!(ErrorCode::DbError.to_string(), "DB_ERROR");
    }
}
