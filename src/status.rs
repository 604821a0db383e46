// System status display — shows DB size, provider readiness, aggregate stats.

use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use crate::db::models::StoreStats;
use crate::db::AnalysisStore;
use crate::provider::AnalysisProvider;

/// Everything `status` reports, in one serializable shape.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub db_path: String,
    pub db_size_bytes: Option<u64>,
    pub provider: String,
    pub provider_available: bool,
    pub stats: StoreStats,
}

/// Gather the status report.
pub async fn collect(
    store: &dyn AnalysisStore,
    provider: &dyn AnalysisProvider,
    db_path: &str,
) -> Result<StatusReport> {
    let db_size_bytes = std::fs::metadata(db_path).map(|m| m.len()).ok();
    let stats = store.stats().await?;

    Ok(StatusReport {
        db_path: db_path.to_string(),
        db_size_bytes,
        provider: provider.name().to_string(),
        provider_available: provider.is_available(),
        stats,
    })
}

/// Display system status to the terminal.
pub fn show(report: &StatusReport) {
    let file_size = report
        .db_size_bytes
        .map(format_bytes)
        .unwrap_or_else(|| "unknown".to_string());
    println!("Database: {} ({})", report.db_path, file_size);

    let availability = if report.provider_available {
        "ready"
    } else {
        "not configured"
    };
    println!("Provider: {} ({})", report.provider, availability);

    crate::output::terminal::display_stats(&report.stats);
}

/// Print the hint shown when no database exists yet.
pub fn show_uninitialized() {
    println!("Database: not initialized");
    println!("\nRun `knowledge-extractor init` to set up the database.");
}

pub fn database_exists(db_path: &str) -> bool {
    Path::new(db_path).exists()
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteStore;
    use crate::provider::mock::MockProvider;
    use std::time::Duration;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }

    #[tokio::test]
    async fn test_collect_empty_store() {
        let store = SqliteStore::in_memory().unwrap();
        let provider = MockProvider::with_seed(0.0, Duration::ZERO, 7);
        let report = collect(&store, &provider, "/nonexistent/knowledge.db")
            .await
            .unwrap();
        assert_eq!(report.provider, "mock");
        assert!(report.provider_available);
        assert!(report.db_size_bytes.is_none());
        assert_eq!(report.stats.total_analyses, 0);
    }
}
