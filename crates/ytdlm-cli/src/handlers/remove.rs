//! Remove command handler.
//!
//! Removes records from the queue. Downloaded files remain on disk.

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::handlers::batch_result;

/// Execute the remove command.
///
/// With `dry_run` the matching records are only listed.
///
/// # Errors
///
/// Fails on a store error, or when any of `ids` does not exist.
pub async fn execute(ctx: &CliContext, ids: &[i64], dry_run: bool) -> Result<()> {
    let mut failures = 0;
    for &id in ids {
        let Some(record) = ctx.queue().get(id).await.map_err(CliError::from)? else {
            failures += 1;
            println!("❌ {id}: no such record");
            continue;
        };

        if dry_run {
            println!("Would remove {id}: {} [{}]", record.url, record.status);
            continue;
        }

        if ctx.queue().delete(id).await.map_err(CliError::from)? {
            println!("✅ {id}: removed ({})", record.url);
        } else {
            failures += 1;
            println!("❌ {id}: no such record");
        }
    }
    batch_result("removed", failures, ids.len())?;
    Ok(())
}
