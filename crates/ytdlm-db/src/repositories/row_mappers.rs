//! Row mapping helpers shared by the `SQLite` repositories.

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use ytdlm_core::{DownloadRecord, DownloadStatus, RepositoryError};

/// Columns selected for every record query, in mapping order.
pub const RECORD_COLUMNS: &str = "id, url, status, timestamp_requested, timestamp_downloaded, \
                                  final_filename, extractor, retries";

/// Format a timestamp for storage.
///
/// Fixed microsecond precision keeps lexical and chronological order equal.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Serialization(format!("Bad timestamp {raw:?}: {e}")))
}

/// Map any sqlx error to the port error.
///
/// Unique violations become `Constraint`; everything else means the
/// store is unusable and becomes `Storage`.
pub fn map_sqlx_error(e: sqlx::Error) -> RepositoryError {
    match e.as_database_error() {
        Some(db) if db.is_unique_violation() => RepositoryError::Constraint(db.to_string()),
        _ => RepositoryError::Storage(e.to_string()),
    }
}

fn map_column_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Storage(format!("Column read error: {e}"))
}

/// Parse a database row into a `DownloadRecord`.
pub fn row_to_record(row: &SqliteRow) -> Result<DownloadRecord, RepositoryError> {
    let status_str: String = row.try_get("status").map_err(map_column_error)?;
    let status = DownloadStatus::parse(&status_str)
        .ok_or_else(|| RepositoryError::Serialization(format!("Unknown status {status_str:?}")))?;

    let requested: String = row
        .try_get("timestamp_requested")
        .map_err(map_column_error)?;
    let downloaded: Option<String> = row
        .try_get("timestamp_downloaded")
        .map_err(map_column_error)?;
    let retries: i64 = row.try_get("retries").map_err(map_column_error)?;

    Ok(DownloadRecord {
        id: row.try_get("id").map_err(map_column_error)?,
        url: row.try_get("url").map_err(map_column_error)?,
        status,
        timestamp_requested: parse_timestamp(&requested)?,
        timestamp_downloaded: downloaded.as_deref().map(parse_timestamp).transpose()?,
        final_filename: row.try_get("final_filename").map_err(map_column_error)?,
        extractor: row.try_get("extractor").map_err(map_column_error)?,
        retries: u32::try_from(retries)
            .map_err(|_| RepositoryError::Serialization(format!("Bad retries value {retries}")))?,
    })
}
