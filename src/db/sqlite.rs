// SqliteStore — rusqlite backend implementing the AnalysisStore trait.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is !Sync.
// Trait methods lock the mutex, do synchronous rusqlite work, and return.
// Concurrent batch items therefore write one at a time, which is all a
// single embedded database needs.

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::models::{AnalysisRecord, SearchQuery, StoreStats};
use super::traits::AnalysisStore;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// An in-memory store with the schema applied. Handy for tests and dry runs.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        super::schema::create_tables(&conn)?;
        Ok(Self::new(conn))
    }
}

#[async_trait]
impl AnalysisStore for SqliteStore {
    async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }

    async fn save(&self, record: &AnalysisRecord) -> Result<()> {
        let conn = self.conn.lock().await;
        super::queries::insert_analysis(&conn, record)
    }

    async fn get(&self, id: &str) -> Result<Option<AnalysisRecord>> {
        let conn = self.conn.lock().await;
        super::queries::get_analysis(&conn, id)
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<AnalysisRecord>> {
        let conn = self.conn.lock().await;
        super::queries::search_analyses(&conn, query)
    }

    async fn recent(&self, limit: u32) -> Result<Vec<AnalysisRecord>> {
        let conn = self.conn.lock().await;
        super::queries::recent_analyses(&conn, limit)
    }

    async fn stats(&self) -> Result<StoreStats> {
        let conn = self.conn.lock().await;
        super::queries::get_stats(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{AnalysisMetadata, Sentiment};
    use chrono::Utc;

    fn record(id: &str) -> AnalysisRecord {
        AnalysisRecord {
            id: id.to_string(),
            text: "Rust makes systems programming approachable".to_string(),
            summary: "A note on Rust".to_string(),
            metadata: AnalysisMetadata {
                title: "Rust Makes Systems".to_string(),
                topics: vec!["technology".to_string()],
                sentiment: Sentiment::Positive,
                keywords: vec!["rust".to_string()],
            },
            confidence: 0.7,
            created_at: Utc::now(),
            processing_ms: 12,
        }
    }

    #[tokio::test]
    async fn test_trait_save_and_recent() {
        let store = SqliteStore::in_memory().unwrap();
        store.save(&record("one")).await.unwrap();
        store.save(&record("two")).await.unwrap();

        let recent = store.recent(10).await.unwrap();
        assert_eq!(recent.len(), 2);
        // Same-microsecond inserts still come back newest first
        assert_eq!(recent[0].id, "two");
    }

    #[tokio::test]
    async fn test_trait_get_missing() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_trait_table_count() {
        let store = SqliteStore::in_memory().unwrap();
        assert_eq!(store.table_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_trait_stats_after_save() {
        let store = SqliteStore::in_memory().unwrap();
        store.save(&record("a")).await.unwrap();
        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_analyses, 1);
        assert!((stats.average_confidence - 0.7).abs() < 1e-9);
        assert!(stats.last_analysis.is_some());
    }
}
