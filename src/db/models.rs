// Data models — Rust structs that map to database rows.
//
// These are the types that flow through the application. They're separate
// from the database queries so other modules can use them without depending
// on rusqlite directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default page size for searches when the caller doesn't pick one.
pub const DEFAULT_SEARCH_LIMIT: u32 = 50;
/// Hard cap on a single search page.
pub const MAX_SEARCH_LIMIT: u32 = 100;

/// One persisted outcome of running the pipeline on a single text.
///
/// Records are append-only: created once, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: String,
    pub text: String,
    pub summary: String,
    /// Stored as a JSON blob in the `metadata` column
    pub metadata: AnalysisMetadata,
    /// Heuristic quality estimate, always within [0.0, 1.0]
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
    pub processing_ms: u64,
}

/// Structured metadata embedded in each record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub title: String,
    /// At most three, provider-supplied (or the default set)
    pub topics: Vec<String>,
    pub sentiment: Sentiment,
    /// Locally extracted, most frequent first
    pub keywords: Vec<String>,
}

/// Overall tone of a text. Anything a provider returns outside these three
/// values is coerced to `Neutral`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    /// Map a provider label to a sentiment. Unknown labels become `Neutral`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "positive" => Sentiment::Positive,
            "negative" => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Filters and paging for a search. Not stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub topic: Option<String>,
    pub keyword: Option<String>,
    pub limit: u32,
    pub offset: u32,
}

impl SearchQuery {
    /// Resolve defaults the way callers expect: a limit of 0 means the
    /// default page size, larger limits are capped, and blank filters are
    /// treated as absent.
    pub fn normalized(mut self) -> Self {
        if self.limit == 0 {
            self.limit = DEFAULT_SEARCH_LIMIT;
        }
        self.limit = self.limit.min(MAX_SEARCH_LIMIT);
        self.topic = self.topic.filter(|t| !t.is_empty());
        self.keyword = self.keyword.filter(|k| !k.is_empty());
        self
    }
}

/// Aggregate view over every stored record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_analyses: u64,
    pub average_confidence: f64,
    pub average_processing_ms: f64,
    pub last_analysis: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_from_label() {
        assert_eq!(Sentiment::from_label("positive"), Sentiment::Positive);
        assert_eq!(Sentiment::from_label("negative"), Sentiment::Negative);
        assert_eq!(Sentiment::from_label("neutral"), Sentiment::Neutral);
        assert_eq!(Sentiment::from_label("ecstatic"), Sentiment::Neutral);
        assert_eq!(Sentiment::from_label(""), Sentiment::Neutral);
    }

    #[test]
    fn test_sentiment_serializes_lowercase() {
        let json = serde_json::to_string(&Sentiment::Negative).unwrap();
        assert_eq!(json, "\"negative\"");
    }

    #[test]
    fn test_search_query_defaults_and_cap() {
        let q = SearchQuery::default().normalized();
        assert_eq!(q.limit, DEFAULT_SEARCH_LIMIT);
        assert_eq!(q.offset, 0);

        let q = SearchQuery {
            limit: 500,
            ..Default::default()
        }
        .normalized();
        assert_eq!(q.limit, MAX_SEARCH_LIMIT);
    }

    #[test]
    fn test_search_query_blank_filters_dropped() {
        let q = SearchQuery {
            topic: Some(String::new()),
            keyword: Some("rust".to_string()),
            ..Default::default()
        }
        .normalized();
        assert_eq!(q.topic, None);
        assert_eq!(q.keyword.as_deref(), Some("rust"));
    }
}
