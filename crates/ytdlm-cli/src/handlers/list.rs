//! List command handler.

use anyhow::Result;
use ytdlm_core::DownloadStatus;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::print_record_table;

/// List records in `status` (or every record), oldest request first.
///
/// # Errors
///
/// Fails when the store cannot be read.
pub async fn execute(
    ctx: &CliContext,
    status: Option<DownloadStatus>,
    limit: Option<u32>,
) -> Result<()> {
    let records = match status {
        Some(status) => ctx.queue().list(status, limit).await,
        None => ctx.queue().list_all(limit).await,
    }
    .map_err(CliError::from)?;

    let label = status.map_or_else(String::new, |s| format!("{s} "));
    if records.is_empty() {
        println!("No {label}records.");
        return Ok(());
    }

    println!("Found {} {label}record(s):\n", records.len());
    print_record_table(&records);
    Ok(())
}
