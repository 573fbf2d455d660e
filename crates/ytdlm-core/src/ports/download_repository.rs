//! Download repository trait definition.
//!
//! This port defines the persistence interface for download records.
//! Implementations must make `insert` and `compare_and_update` atomic
//! at the storage layer so several daemon processes can share one store.

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::{DownloadRecord, DownloadStatus, QueueStats, RecordUpdate};

/// Result of inserting a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertOutcome {
    /// The new record, or the existing one when the URL was already present.
    pub record: DownloadRecord,
    /// `false` when the URL already existed and nothing was written.
    pub created: bool,
}

/// Repository for download record persistence.
///
/// # Design Rules
///
/// - No `sqlx` types in signatures
/// - Point lookups return `Ok(None)` when absent
/// - Writes that target a missing id return `Ok(false)`, never an error
/// - State-machine rules belong in `QueueService`, not here
#[async_trait]
pub trait DownloadRepository: Send + Sync {
    /// Insert a new `pending` record for `url`.
    ///
    /// A duplicate URL is not an error: the existing record is returned
    /// with `created = false` and left untouched.
    async fn insert(&self, url: &str) -> Result<InsertOutcome, RepositoryError>;

    /// Get a record by id.
    async fn get_by_id(&self, id: i64) -> Result<Option<DownloadRecord>, RepositoryError>;

    /// Get a record by its exact URL.
    async fn get_by_url(&self, url: &str) -> Result<Option<DownloadRecord>, RepositoryError>;

    /// Records with `status`, oldest request first, ties broken by id.
    async fn get_by_status(
        &self,
        status: DownloadStatus,
        limit: Option<u32>,
    ) -> Result<Vec<DownloadRecord>, RepositoryError>;

    /// All records, oldest request first.
    async fn list_all(&self, limit: Option<u32>) -> Result<Vec<DownloadRecord>, RepositoryError>;

    /// Records whose URL contains `pattern` (case-insensitive substring).
    async fn find_by_url_pattern(
        &self,
        pattern: &str,
    ) -> Result<Vec<DownloadRecord>, RepositoryError>;

    /// Apply `update` unconditionally.
    ///
    /// Returns `false` when no record has that id.
    async fn update_fields(&self, id: i64, update: &RecordUpdate) -> Result<bool, RepositoryError>;

    /// Apply `update` only if the record's status is still `expected`.
    ///
    /// This is the compare-and-swap primitive. Returns `false` when the id is
    /// absent or the status has moved on; the caller decides which by re-reading.
    async fn compare_and_update(
        &self,
        id: i64,
        expected: DownloadStatus,
        update: &RecordUpdate,
    ) -> Result<bool, RepositoryError>;

    /// Delete a record. Returns `false` when no record has that id.
    async fn delete(&self, id: i64) -> Result<bool, RepositoryError>;

    /// Number of records with `status`.
    async fn count_by_status(&self, status: DownloadStatus) -> Result<u64, RepositoryError>;

    /// Number of records in the store.
    async fn count_all(&self) -> Result<u64, RepositoryError>;

    /// Count per status; statuses without rows report zero.
    async fn status_counts(&self) -> Result<QueueStats, RepositoryError>;
}
