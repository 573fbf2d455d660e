//! Polling download daemon.
//!
//! The daemon owns its queue, fetcher and configuration. It processes
//! pending records one at a time, oldest first, and sleeps only when a
//! poll finds nothing to do. Stopping is cooperative: the record in hand
//! always reaches a terminal transition before the loop exits.

mod worker;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use ytdlm_core::{DaemonConfig, DownloadRecord, MediaFetcherPort, QueueError, QueueService};

pub use worker::RecordOutcome;

/// Tally of one poll cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    /// Records taken from the pending batch (including skipped ones).
    pub processed: usize,
    pub downloaded: usize,
    pub requeued: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl CycleSummary {
    fn record(&mut self, outcome: RecordOutcome) {
        self.processed += 1;
        match outcome {
            RecordOutcome::Downloaded => self.downloaded += 1,
            RecordOutcome::Requeued => self.requeued += 1,
            RecordOutcome::Failed => self.failed += 1,
            RecordOutcome::Skipped => self.skipped += 1,
        }
    }

    /// True when the poll found no pending records.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.processed == 0
    }
}

/// Long-lived daemon process object.
pub struct DownloadDaemon {
    queue: QueueService,
    fetcher: Arc<dyn MediaFetcherPort>,
    config: DaemonConfig,
    shutdown: CancellationToken,
}

impl DownloadDaemon {
    /// Create a daemon. Nothing runs until [`run`](Self::run) or
    /// [`run_cycle`](Self::run_cycle) is awaited.
    pub fn new(
        queue: QueueService,
        fetcher: Arc<dyn MediaFetcherPort>,
        config: DaemonConfig,
    ) -> Self {
        Self {
            queue,
            fetcher,
            config,
            shutdown: CancellationToken::new(),
        }
    }

    /// Share an existing token, e.g. one already wired to signal handlers.
    #[must_use]
    pub fn with_shutdown_token(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Token that stops the daemon when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Ask the daemon to stop after the current record.
    pub fn stop(&self) {
        self.shutdown.cancel();
    }

    pub const fn config(&self) -> &DaemonConfig {
        &self.config
    }

    /// Process one batch of pending records.
    ///
    /// Stops early, between records, when shutdown is requested.
    pub async fn run_cycle(&self) -> Result<CycleSummary, QueueError> {
        let limit = u32::try_from(self.config.batch_size).unwrap_or(u32::MAX);
        let batch = self.queue.get_pending(Some(limit)).await?;
        let mut summary = CycleSummary::default();

        for record in &batch {
            if self.shutdown.is_cancelled() {
                tracing::info!(
                    remaining = batch.len() - summary.processed,
                    "Shutdown requested, leaving remaining records pending"
                );
                break;
            }
            summary.record(self.process_one(record).await?);
        }

        if !summary.is_idle() {
            tracing::info!(
                processed = summary.processed,
                downloaded = summary.downloaded,
                requeued = summary.requeued,
                failed = summary.failed,
                skipped = summary.skipped,
                "Cycle finished"
            );
        }
        Ok(summary)
    }

    /// Drive a single record through the lifecycle.
    pub async fn process_one(&self, record: &DownloadRecord) -> Result<RecordOutcome, QueueError> {
        worker::process_record(
            &self.queue,
            &self.fetcher,
            self.config.target_dir.clone(),
            self.config.max_retries,
            record,
        )
        .await
    }

    /// Poll until stopped.
    ///
    /// Store failures end the loop with an error; everything scoped to a
    /// single record is contained.
    pub async fn run(&self) -> Result<(), QueueError> {
        tracing::info!(
            target_dir = %self.config.target_dir.display(),
            poll_interval_secs = self.config.poll_interval.as_secs(),
            max_retries = self.config.max_retries,
            "Daemon started"
        );

        while !self.shutdown.is_cancelled() {
            let summary = self.run_cycle().await?;
            if !summary.is_idle() {
                continue;
            }

            tracing::debug!("No pending records, sleeping");
            tokio::select! {
                () = self.shutdown.cancelled() => {}
                () = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }

        tracing::info!("Daemon stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_tally() {
        let mut summary = CycleSummary::default();
        assert!(summary.is_idle());

        for outcome in [
            RecordOutcome::Downloaded,
            RecordOutcome::Requeued,
            RecordOutcome::Failed,
            RecordOutcome::Skipped,
            RecordOutcome::Downloaded,
        ] {
            summary.record(outcome);
        }

        assert_eq!(summary.processed, 5);
        assert_eq!(summary.downloaded, 2);
        assert_eq!(summary.requeued, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert!(!summary.is_idle());
    }
}
