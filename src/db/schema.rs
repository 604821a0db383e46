// Database schema — table creation and migrations.
//
// We use a simple version-based migration approach: a `schema_version` table
// tracks which migrations have run, and each migration is a function that
// executes SQL statements.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Create all tables if they don't exist yet.
///
/// This is idempotent — safe to call on every startup.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- One row per successful pipeline run. Rows are never updated.
        CREATE TABLE IF NOT EXISTS analyses (
            id TEXT PRIMARY KEY,               -- UUID v4
            text TEXT NOT NULL,
            summary TEXT NOT NULL,
            metadata TEXT NOT NULL,            -- JSON: title, topics, sentiment, keywords
            confidence REAL NOT NULL,          -- 0.0 to 1.0
            created_at TEXT NOT NULL,          -- RFC 3339, UTC, microseconds
            processing_ms INTEGER NOT NULL
        );

        -- Newest-first scans for search and stats
        CREATE INDEX IF NOT EXISTS idx_analyses_created_at
            ON analyses(created_at);

        -- Range scans over confidence
        CREATE INDEX IF NOT EXISTS idx_analyses_confidence
            ON analyses(confidence);
        ",
    )
    .context("Failed to create database tables")?;

    record_version(conn, 1)?;

    Ok(())
}

fn record_version(conn: &Connection, version: i64) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [version],
    )
    .with_context(|| format!("Failed to record schema version {version}"))?;
    Ok(())
}

/// Count the number of tables in the database (useful for init confirmation).
pub fn table_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}
