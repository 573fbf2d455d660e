//! Queue service - the download lifecycle state machine.
//!
//! Every status change goes through this service. Each transition is a
//! single compare-and-swap write guarded by the expected source status, so
//! two workers can never both move the same record out of `pending`.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use crate::domain::{DownloadRecord, DownloadStatus, QueueStats, RecordUpdate};
use crate::ports::{DownloadRepository, RepositoryError};

/// Errors reported by queue operations.
#[derive(Debug, Error)]
pub enum QueueError {
    /// The targeted record does not exist (or vanished mid-operation).
    #[error("Download record {0} not found")]
    RecordNotFound(i64),

    /// The record's current status does not allow the requested change.
    #[error("Invalid transition for record {id}: {from} -> {to}")]
    InvalidTransition {
        id: i64,
        from: DownloadStatus,
        to: DownloadStatus,
    },

    /// The submitted URL is empty.
    #[error("Invalid URL: {0:?}")]
    InvalidUrl(String),

    /// The store failed. Not recoverable by the caller.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl QueueError {
    /// True for errors scoped to one record, which must not stop the daemon.
    #[must_use]
    pub const fn is_per_record(&self) -> bool {
        matches!(
            self,
            Self::RecordNotFound(_) | Self::InvalidTransition { .. } | Self::InvalidUrl(_)
        )
    }
}

/// Result of adding a URL to the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnqueueOutcome {
    pub record: DownloadRecord,
    pub already_existed: bool,
}

impl EnqueueOutcome {
    /// Human-readable summary shown after `add`.
    #[must_use]
    pub fn message(&self) -> String {
        if !self.already_existed {
            return format!("URL added to queue: {}", self.record.url);
        }

        let mut msg = format!(
            "URL already exists in queue: {}\nStatus: {}",
            self.record.url, self.record.status
        );
        if let Some(ref filename) = self.record.final_filename {
            msg.push_str("\nDownloaded file: ");
            msg.push_str(filename);
        }
        msg
    }
}

/// Service that owns the download state machine.
#[derive(Clone)]
pub struct QueueService {
    repo: Arc<dyn DownloadRepository>,
}

impl QueueService {
    /// Create a new queue service over the given repository.
    pub fn new(repo: Arc<dyn DownloadRepository>) -> Self {
        Self { repo }
    }

    /// Add a URL. Re-adding an existing URL returns the stored record unchanged.
    pub async fn enqueue(&self, url: &str) -> Result<EnqueueOutcome, QueueError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(QueueError::InvalidUrl(url.to_string()));
        }

        let outcome = self.repo.insert(url).await?;
        if outcome.created {
            tracing::info!(id = outcome.record.id, url, "URL added to queue");
        } else {
            tracing::info!(
                id = outcome.record.id,
                url,
                status = %outcome.record.status,
                "URL already queued"
            );
        }

        Ok(EnqueueOutcome {
            record: outcome.record,
            already_existed: !outcome.created,
        })
    }

    /// Pending records, oldest request first.
    pub async fn get_pending(&self, limit: Option<u32>) -> Result<Vec<DownloadRecord>, QueueError> {
        Ok(self
            .repo
            .get_by_status(DownloadStatus::Pending, limit)
            .await?)
    }

    /// Claim a pending record for download.
    ///
    /// Fails with `InvalidTransition` when another worker claimed it first.
    pub async fn mark_downloading(&self, id: i64) -> Result<DownloadRecord, QueueError> {
        self.transition(
            id,
            DownloadStatus::Pending,
            DownloadStatus::Downloading,
            &RecordUpdate::status(DownloadStatus::Downloading),
        )
        .await
    }

    /// Record a successful download.
    pub async fn mark_downloaded(
        &self,
        id: i64,
        final_filename: &str,
        extractor: &str,
    ) -> Result<DownloadRecord, QueueError> {
        let update = RecordUpdate::downloaded(final_filename, extractor, Utc::now());
        self.transition(
            id,
            DownloadStatus::Downloading,
            DownloadStatus::Downloaded,
            &update,
        )
        .await
    }

    /// Record a failed attempt and bump `retries`.
    ///
    /// Returns the updated record so the caller can apply its retry budget.
    pub async fn mark_failed(&self, id: i64) -> Result<DownloadRecord, QueueError> {
        self.transition(
            id,
            DownloadStatus::Downloading,
            DownloadStatus::Failed,
            &RecordUpdate::failed(),
        )
        .await
    }

    /// Move a failed record back to `pending`. `retries` is kept.
    pub async fn retry(&self, id: i64) -> Result<DownloadRecord, QueueError> {
        self.transition(
            id,
            DownloadStatus::Failed,
            DownloadStatus::Pending,
            &RecordUpdate::status(DownloadStatus::Pending),
        )
        .await
    }

    /// Requeue every failed record. Records that changed state concurrently are skipped.
    pub async fn retry_all_failed(&self) -> Result<Vec<DownloadRecord>, QueueError> {
        let failed = self.repo.get_by_status(DownloadStatus::Failed, None).await?;
        let mut requeued = Vec::with_capacity(failed.len());
        for record in failed {
            match self.retry(record.id).await {
                Ok(updated) => requeued.push(updated),
                Err(e) if e.is_per_record() => {}
                Err(e) => return Err(e),
            }
        }
        Ok(requeued)
    }

    /// Maintenance override: force any non-pending record back to `pending`.
    ///
    /// Clears `final_filename`, `timestamp_downloaded` and `extractor`;
    /// `retries` is kept. The daemon never calls this.
    pub async fn reset_for_redownload(&self, id: i64) -> Result<DownloadRecord, QueueError> {
        let current = self
            .repo
            .get_by_id(id)
            .await?
            .ok_or(QueueError::RecordNotFound(id))?;

        if current.status == DownloadStatus::Pending {
            return Err(self
                .reject(id, DownloadStatus::Pending, DownloadStatus::Pending)
                .await);
        }

        let record = self
            .apply(
                id,
                current.status,
                DownloadStatus::Pending,
                &RecordUpdate::reset_to_pending(),
            )
            .await?;
        tracing::info!(id, from = %current.status, "Record reset for redownload");
        Ok(record)
    }

    /// Delete a record. Returns `false` when it did not exist.
    pub async fn delete(&self, id: i64) -> Result<bool, QueueError> {
        let deleted = self.repo.delete(id).await?;
        if deleted {
            tracing::info!(id, "Record deleted");
        }
        Ok(deleted)
    }

    /// Get a record by id.
    pub async fn get(&self, id: i64) -> Result<Option<DownloadRecord>, QueueError> {
        Ok(self.repo.get_by_id(id).await?)
    }

    /// Get a record by exact URL.
    pub async fn find_by_url(&self, url: &str) -> Result<Option<DownloadRecord>, QueueError> {
        Ok(self.repo.get_by_url(url.trim()).await?)
    }

    /// Records with `status`, oldest first.
    pub async fn list(
        &self,
        status: DownloadStatus,
        limit: Option<u32>,
    ) -> Result<Vec<DownloadRecord>, QueueError> {
        Ok(self.repo.get_by_status(status, limit).await?)
    }

    /// Every record, oldest first.
    pub async fn list_all(&self, limit: Option<u32>) -> Result<Vec<DownloadRecord>, QueueError> {
        Ok(self.repo.list_all(limit).await?)
    }

    /// Records whose URL contains `pattern`.
    pub async fn search(&self, pattern: &str) -> Result<Vec<DownloadRecord>, QueueError> {
        Ok(self.repo.find_by_url_pattern(pattern).await?)
    }

    /// Records currently in `downloading`, including ones stranded by a crash.
    pub async fn get_in_progress(&self) -> Result<Vec<DownloadRecord>, QueueError> {
        Ok(self
            .repo
            .get_by_status(DownloadStatus::Downloading, None)
            .await?)
    }

    /// Number of pending records.
    pub async fn queue_length(&self) -> Result<u64, QueueError> {
        Ok(self.repo.count_by_status(DownloadStatus::Pending).await?)
    }

    /// Count per status over all records.
    pub async fn stats(&self) -> Result<QueueStats, QueueError> {
        Ok(self.repo.status_counts().await?)
    }

    /// Lifecycle transition: checked against
    /// [`DownloadStatus::can_transition_to`] before touching the store.
    async fn transition(
        &self,
        id: i64,
        from: DownloadStatus,
        to: DownloadStatus,
        update: &RecordUpdate,
    ) -> Result<DownloadRecord, QueueError> {
        if !from.can_transition_to(to) {
            tracing::warn!(id, %from, %to, "Transition not in the lifecycle");
            return Err(QueueError::InvalidTransition { id, from, to });
        }
        self.apply(id, from, to, update).await
    }

    /// Guarded write from `from`, then read back the updated record.
    async fn apply(
        &self,
        id: i64,
        from: DownloadStatus,
        to: DownloadStatus,
        update: &RecordUpdate,
    ) -> Result<DownloadRecord, QueueError> {
        if !self.repo.compare_and_update(id, from, update).await? {
            return Err(self.reject(id, from, to).await);
        }

        tracing::debug!(id, %from, %to, "Status transition");
        self.repo
            .get_by_id(id)
            .await?
            .ok_or(QueueError::RecordNotFound(id))
    }

    /// Work out why a guarded write touched no rows.
    async fn reject(&self, id: i64, expected: DownloadStatus, to: DownloadStatus) -> QueueError {
        match self.repo.get_by_id(id).await {
            Ok(None) => {
                tracing::warn!(id, %to, "Transition target not found");
                QueueError::RecordNotFound(id)
            }
            Ok(Some(current)) => {
                tracing::warn!(
                    id,
                    expected = %expected,
                    actual = %current.status,
                    %to,
                    "Rejected invalid status transition"
                );
                QueueError::InvalidTransition {
                    id,
                    from: current.status,
                    to,
                }
            }
            Err(e) => QueueError::Repository(e),
        }
    }
}
