//! Per-record download pipeline.
//!
//! Drives one record through claim, fetch and the terminal transition.
//! Errors scoped to the record are folded into a [`RecordOutcome`]; only
//! store failures escape.

use std::path::PathBuf;
use std::sync::Arc;

use ytdlm_core::{
    DownloadRecord, FetchError, FetchedMedia, MediaFetcherPort, QueueError, QueueService,
};

/// What happened to one record during a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Fetched and marked `downloaded`.
    Downloaded,
    /// Fetch failed with budget left; back to `pending`.
    Requeued,
    /// Fetch failed and the retry budget is spent.
    Failed,
    /// Lost the claim, or the record vanished or changed state mid-download.
    Skipped,
}

/// Fold a per-record queue error into `Skipped`, pass store errors through.
fn skip_on_record_error<T>(
    result: Result<T, QueueError>,
    id: i64,
    stage: &'static str,
) -> Result<Option<T>, QueueError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_per_record() => {
            tracing::info!(id, stage, error = %e, "Skipping record");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Run the fetcher in its own task so a panic becomes a failed attempt.
async fn fetch_isolated(
    fetcher: &Arc<dyn MediaFetcherPort>,
    url: &str,
    target_dir: PathBuf,
) -> Result<FetchedMedia, FetchError> {
    let fetcher = Arc::clone(fetcher);
    let url = url.to_string();
    tokio::spawn(async move { fetcher.fetch(&url, &target_dir).await })
        .await
        .unwrap_or_else(|join_err| Err(FetchError::Aborted(join_err.to_string())))
}

/// Process a single record.
pub async fn process_record(
    queue: &QueueService,
    fetcher: &Arc<dyn MediaFetcherPort>,
    target_dir: PathBuf,
    max_retries: u32,
    record: &DownloadRecord,
) -> Result<RecordOutcome, QueueError> {
    let id = record.id;

    if skip_on_record_error(queue.mark_downloading(id).await, id, "claim")?.is_none() {
        return Ok(RecordOutcome::Skipped);
    }
    tracing::info!(id, url = %record.url, "Downloading");

    match fetch_isolated(fetcher, &record.url, target_dir).await {
        Ok(media) => {
            let done = queue
                .mark_downloaded(id, &media.final_filename, &media.extractor)
                .await;
            if skip_on_record_error(done, id, "complete")?.is_none() {
                return Ok(RecordOutcome::Skipped);
            }
            tracing::info!(
                id,
                url = %record.url,
                file = %media.final_filename,
                extractor = %media.extractor,
                "Download complete"
            );
            Ok(RecordOutcome::Downloaded)
        }
        Err(err) => {
            tracing::warn!(id, url = %record.url, error = %err, "Download failed");

            let Some(failed) = skip_on_record_error(queue.mark_failed(id).await, id, "fail")?
            else {
                return Ok(RecordOutcome::Skipped);
            };

            if failed.retries >= max_retries {
                tracing::error!(
                    id,
                    url = %record.url,
                    retries = failed.retries,
                    "Retry budget exhausted, leaving record failed"
                );
                return Ok(RecordOutcome::Failed);
            }

            if skip_on_record_error(queue.retry(id).await, id, "retry")?.is_none() {
                return Ok(RecordOutcome::Skipped);
            }
            tracing::info!(
                id,
                retries = failed.retries,
                max_retries,
                "Requeued for retry"
            );
            Ok(RecordOutcome::Requeued)
        }
    }
}
