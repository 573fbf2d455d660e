//! Retry command handler.

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::handlers::batch_result;

/// Move failed records back to pending.
///
/// With `all_failed` every failed record is retried and `ids` is ignored.
/// Retrying does not reset the retry counter.
///
/// # Errors
///
/// Fails on a store error, or when any of `ids` is missing or not failed.
pub async fn execute(ctx: &CliContext, ids: &[i64], all_failed: bool) -> Result<()> {
    if all_failed {
        let retried = ctx.queue().retry_all_failed().await.map_err(CliError::from)?;
        println!("Queued {} failed record(s) for retry.", retried.len());
        return Ok(());
    }

    let mut failures = 0;
    for &id in ids {
        match ctx.queue().retry(id).await {
            Ok(record) => println!("✅ {id}: queued again ({})", record.url),
            Err(e) if e.is_per_record() => {
                failures += 1;
                println!("❌ {id}: {e}");
            }
            Err(e) => return Err(CliError::from(e).into()),
        }
    }
    batch_result("retried", failures, ids.len())?;
    Ok(())
}
