//! `SQLite` implementation of the `DownloadRepository` trait.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use ytdlm_core::{
    DownloadRecord, DownloadRepository, DownloadStatus, InsertOutcome, QueueStats, RecordUpdate,
    RepositoryError,
};

use super::row_mappers::{RECORD_COLUMNS, format_timestamp, map_sqlx_error, row_to_record};

/// `SQLite` implementation of the `DownloadRepository` trait.
///
/// Uniqueness of `url` and the compare-and-swap claim are both enforced
/// inside single SQL statements, so any number of processes may share
/// the same database file.
pub struct SqliteDownloadRepository {
    pool: SqlitePool,
}

impl SqliteDownloadRepository {
    /// Create a new `SQLite` download repository.
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool (for testing only).
    #[cfg(test)]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Build the single `UPDATE` statement for `update`.
    ///
    /// Every value is bound; nothing from the caller is spliced into the SQL text.
    fn build_update(
        id: i64,
        expected: Option<DownloadStatus>,
        update: &RecordUpdate,
    ) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new("UPDATE downloads SET ");

        if update.is_empty() {
            qb.push("id = id");
        } else {
            let mut set = qb.separated(", ");
            if let Some(status) = update.status {
                set.push("status = ").push_bind_unseparated(status.as_str());
            }
            if let Some(ref ts) = update.timestamp_downloaded {
                set.push("timestamp_downloaded = ")
                    .push_bind_unseparated(ts.as_ref().map(format_timestamp));
            }
            if let Some(ref name) = update.final_filename {
                set.push("final_filename = ")
                    .push_bind_unseparated(name.clone());
            }
            if let Some(ref extractor) = update.extractor {
                set.push("extractor = ")
                    .push_bind_unseparated(extractor.clone());
            }
            if update.increment_retries {
                set.push("retries = retries + 1");
            }
        }

        qb.push(" WHERE id = ").push_bind(id);
        if let Some(expected) = expected {
            qb.push(" AND status = ").push_bind(expected.as_str());
        }
        qb
    }

    async fn fetch_where(
        &self,
        clause: &str,
        bind: Option<String>,
        limit: Option<u32>,
    ) -> Result<Vec<DownloadRecord>, RepositoryError> {
        let mut qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {RECORD_COLUMNS} FROM downloads"));
        if !clause.is_empty() {
            qb.push(" WHERE ").push(clause);
            if let Some(value) = bind {
                qb.push_bind(value);
            }
        }
        qb.push(" ORDER BY timestamp_requested ASC, id ASC");
        if let Some(limit) = limit {
            qb.push(" LIMIT ").push_bind(i64::from(limit));
        }

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        rows.iter().map(row_to_record).collect()
    }
}

/// Escape `LIKE` wildcards so a search pattern is matched literally.
fn escape_like(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len() + 2);
    escaped.push('%');
    for c in pattern.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl DownloadRepository for SqliteDownloadRepository {
    async fn insert(&self, url: &str) -> Result<InsertOutcome, RepositoryError> {
        let requested = format_timestamp(&Utc::now());

        // ON CONFLICT leaves the existing row alone and returns nothing.
        let created = sqlx::query(&format!(
            "INSERT INTO downloads (url, status, timestamp_requested, retries) \
             VALUES (?, 'pending', ?, 0) \
             ON CONFLICT(url) DO NOTHING \
             RETURNING {RECORD_COLUMNS}"
        ))
        .bind(url)
        .bind(&requested)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if let Some(row) = created {
            return Ok(InsertOutcome {
                record: row_to_record(&row)?,
                created: true,
            });
        }

        let existing = self.get_by_url(url).await?.ok_or_else(|| {
            RepositoryError::Constraint(format!("URL {url} conflicted but could not be read back"))
        })?;
        Ok(InsertOutcome {
            record: existing,
            created: false,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<DownloadRecord>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {RECORD_COLUMNS} FROM downloads WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(row_to_record).transpose()
    }

    async fn get_by_url(&self, url: &str) -> Result<Option<DownloadRecord>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {RECORD_COLUMNS} FROM downloads WHERE url = ?"
        ))
        .bind(url)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(row_to_record).transpose()
    }

    async fn get_by_status(
        &self,
        status: DownloadStatus,
        limit: Option<u32>,
    ) -> Result<Vec<DownloadRecord>, RepositoryError> {
        self.fetch_where("status = ", Some(status.as_str().to_string()), limit)
            .await
    }

    async fn list_all(&self, limit: Option<u32>) -> Result<Vec<DownloadRecord>, RepositoryError> {
        self.fetch_where("", None, limit).await
    }

    async fn find_by_url_pattern(
        &self,
        pattern: &str,
    ) -> Result<Vec<DownloadRecord>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {RECORD_COLUMNS} FROM downloads WHERE url LIKE ? ESCAPE '\\' \
             ORDER BY timestamp_requested ASC, id ASC"
        ))
        .bind(escape_like(pattern))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(row_to_record).collect()
    }

    async fn update_fields(&self, id: i64, update: &RecordUpdate) -> Result<bool, RepositoryError> {
        let result = Self::build_update(id, None, update)
            .build()
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn compare_and_update(
        &self,
        id: i64,
        expected: DownloadStatus,
        update: &RecordUpdate,
    ) -> Result<bool, RepositoryError> {
        let result = Self::build_update(id, Some(expected), update)
            .build()
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM downloads WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_by_status(&self, status: DownloadStatus) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM downloads WHERE status = ?")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(count.unsigned_abs())
    }

    async fn count_all(&self) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM downloads")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(count.unsigned_abs())
    }

    async fn status_counts(&self) -> Result<QueueStats, RepositoryError> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM downloads GROUP BY status")
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        let counts = rows
            .into_iter()
            .map(|(status, count)| {
                DownloadStatus::parse(&status)
                    .map(|s| (s, count.unsigned_abs()))
                    .ok_or_else(|| {
                        RepositoryError::Serialization(format!("Unknown status {status:?}"))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(QueueStats::from_counts(counts))
    }
}
