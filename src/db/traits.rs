// Store trait — backend-agnostic async interface for analysis persistence.
//
// Implementor: SqliteStore (wraps rusqlite). Methods are async so a sync
// backend behind a mutex and a natively async one fit the same interface.
//
// Any failure here is a persistence failure; callers don't distinguish
// constraint violations from I/O errors.

use anyhow::Result;
use async_trait::async_trait;

use super::models::{AnalysisRecord, SearchQuery, StoreStats};

#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Count the number of user-created tables in the database.
    async fn table_count(&self) -> Result<i64>;

    /// Insert a new record. Never updates an existing row.
    async fn save(&self, record: &AnalysisRecord) -> Result<()>;

    /// Look up one record by id.
    async fn get(&self, id: &str) -> Result<Option<AnalysisRecord>>;

    /// Filtered, newest-first search. The query should already be normalized.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<AnalysisRecord>>;

    /// The most recent records, unfiltered.
    async fn recent(&self, limit: u32) -> Result<Vec<AnalysisRecord>>;

    /// Aggregate view across all records.
    async fn stats(&self) -> Result<StoreStats>;
}
