//! Add command handler.
//!
//! Queues a URL. With `--download` the record is processed right away
//! through the same path the daemon uses. An interrupt during that
//! download waits for it to finish and be recorded.

use anyhow::Result;
use ytdlm_core::DownloadStatus;
use ytdlm_download::RecordOutcome;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::shutdown;

/// Execute the add command.
///
/// # Errors
///
/// Fails on a blank URL, a store error, or when an immediate download
/// exhausts the retry budget.
pub async fn execute(ctx: &CliContext, url: &str, download: bool) -> Result<()> {
    let outcome = ctx.queue().enqueue(url).await.map_err(CliError::from)?;
    println!("{}", outcome.message());

    if !download {
        return Ok(());
    }

    let record = outcome.record;
    if record.status != DownloadStatus::Pending {
        println!("Nothing to download: record {} is {}.", record.id, record.status);
        return Ok(());
    }

    let daemon = ctx.build_daemon()?;
    let _listener = shutdown::listen(daemon.shutdown_token()).map_err(CliError::from)?;
    match daemon.process_one(&record).await.map_err(CliError::from)? {
        RecordOutcome::Downloaded => {
            let file = ctx
                .queue()
                .get(record.id)
                .await
                .map_err(CliError::from)?
                .and_then(|r| r.final_filename);
            println!("✅ Downloaded: {}", file.as_deref().unwrap_or("(unknown file)"));
        }
        RecordOutcome::Requeued => {
            println!("Download failed; the record stays queued for the daemon.");
        }
        RecordOutcome::Failed => {
            return Err(CliError::Core(format!(
                "Download of record {} failed and its retry budget is exhausted",
                record.id
            ))
            .into());
        }
        RecordOutcome::Skipped => {
            println!("Record {} was picked up by another worker.", record.id);
        }
    }
    Ok(())
}
