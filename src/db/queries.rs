// Database queries — insert, lookup, search and aggregates for analyses.
//
// Every database interaction goes through this module. This keeps SQL
// contained in one place and gives the rest of the app clean Rust interfaces.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use super::models::{AnalysisMetadata, AnalysisRecord, SearchQuery, StoreStats};

const SELECT_COLUMNS: &str =
    "SELECT id, text, summary, metadata, confidence, created_at, processing_ms FROM analyses";

/// Insert a new analysis. Fails on a duplicate id — rows are never replaced.
pub fn insert_analysis(conn: &Connection, record: &AnalysisRecord) -> Result<()> {
    let metadata_json =
        serde_json::to_string(&record.metadata).context("Failed to serialize metadata")?;

    conn.execute(
        "INSERT INTO analyses (id, text, summary, metadata, confidence, created_at, processing_ms)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            record.id,
            record.text,
            record.summary,
            metadata_json,
            record.confidence,
            format_timestamp(&record.created_at),
            i64::try_from(record.processing_ms).unwrap_or(i64::MAX),
        ],
    )
    .context("Failed to insert analysis")?;

    Ok(())
}

/// Look up a single analysis by id.
pub fn get_analysis(conn: &Connection, id: &str) -> Result<Option<AnalysisRecord>> {
    let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE id = ?1"))?;
    let row = stmt.query_row(params![id], read_row).optional()?;
    row.map(StoredRow::into_record).transpose()
}

/// Search analyses, newest first.
///
/// - `topic` matches when one of the record's topics equals it, ignoring
///   ASCII case. Only the `topics` array is consulted.
/// - `keyword` is a substring match against text, summary OR the raw
///   metadata JSON, so it can also hit titles, keywords and topics.
///
/// Both filters combine with AND. `limit` and `offset` apply after ordering;
/// a zero limit means no limit (callers resolve defaults before this point).
pub fn search_analyses(conn: &Connection, query: &SearchQuery) -> Result<Vec<AnalysisRecord>> {
    let mut sql = format!("{SELECT_COLUMNS} WHERE 1=1");
    let mut args: Vec<Value> = Vec::new();

    if let Some(topic) = query.topic.as_deref().filter(|t| !t.is_empty()) {
        sql.push_str(
            " AND EXISTS (SELECT 1 FROM json_each(analyses.metadata, '$.topics') \
             WHERE json_each.value = ? COLLATE NOCASE)",
        );
        args.push(Value::Text(topic.to_string()));
    }

    if let Some(keyword) = query.keyword.as_deref().filter(|k| !k.is_empty()) {
        let pattern = contains_pattern(keyword);
        sql.push_str(
            " AND (text LIKE ? ESCAPE '\\' OR summary LIKE ? ESCAPE '\\' OR metadata LIKE ? ESCAPE '\\')",
        );
        for _ in 0..3 {
            args.push(Value::Text(pattern.clone()));
        }
    }

    // rowid breaks ties between rows written in the same microsecond
    sql.push_str(" ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?");
    args.push(Value::Integer(if query.limit > 0 {
        i64::from(query.limit)
    } else {
        -1
    }));
    args.push(Value::Integer(i64::from(query.offset)));

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(args), read_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to search analyses")?;

    rows.into_iter().map(StoredRow::into_record).collect()
}

/// The most recent analyses, with no filters.
pub fn recent_analyses(conn: &Connection, limit: u32) -> Result<Vec<AnalysisRecord>> {
    search_analyses(
        conn,
        &SearchQuery {
            limit,
            ..Default::default()
        },
    )
}

/// Count, averages and latest timestamp across all analyses.
pub fn get_stats(conn: &Connection) -> Result<StoreStats> {
    let (total, avg_confidence, avg_processing, last): (i64, Option<f64>, Option<f64>, Option<String>) =
        conn.query_row(
            "SELECT COUNT(*), AVG(confidence), AVG(processing_ms), MAX(created_at) FROM analyses",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;

    Ok(StoreStats {
        total_analyses: total.max(0) as u64,
        average_confidence: avg_confidence.unwrap_or(0.0),
        average_processing_ms: avg_processing.unwrap_or(0.0),
        last_analysis: last
            .filter(|s| !s.is_empty())
            .map(|s| parse_timestamp(&s))
            .transpose()?,
    })
}

// --- Row conversion ---

/// A row as SQLite hands it back, before JSON and timestamp decoding.
struct StoredRow {
    id: String,
    text: String,
    summary: String,
    metadata_json: String,
    confidence: f64,
    created_at: String,
    processing_ms: i64,
}

impl StoredRow {
    fn into_record(self) -> Result<AnalysisRecord> {
        let metadata: AnalysisMetadata = serde_json::from_str(&self.metadata_json)
            .with_context(|| format!("Failed to parse metadata for analysis {}", self.id))?;

        Ok(AnalysisRecord {
            created_at: parse_timestamp(&self.created_at)?,
            id: self.id,
            text: self.text,
            summary: self.summary,
            metadata,
            confidence: self.confidence,
            processing_ms: self.processing_ms.max(0) as u64,
        })
    }
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredRow> {
    Ok(StoredRow {
        id: row.get(0)?,
        text: row.get(1)?,
        summary: row.get(2)?,
        metadata_json: row.get(3)?,
        confidence: row.get(4)?,
        created_at: row.get(5)?,
        processing_ms: row.get(6)?,
    })
}

/// Fixed-width UTC timestamps sort lexicographically in time order.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("Invalid timestamp in database: {raw}"))?
        .with_timezone(&Utc))
}

/// `%needle%` with LIKE wildcards in the needle escaped, so user input is
/// matched literally.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
