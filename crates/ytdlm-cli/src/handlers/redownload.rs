//! Redownload command handler.
//!
//! Resets records to pending and clears their download fields so the
//! daemon fetches them again. Files already on disk are left alone.

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::handlers::batch_result;

/// Execute the redownload command.
///
/// # Errors
///
/// Fails on a store error, or when any of `ids` is missing or already pending.
pub async fn execute(ctx: &CliContext, ids: &[i64]) -> Result<()> {
    let mut failures = 0;
    for &id in ids {
        match ctx.queue().reset_for_redownload(id).await {
            Ok(record) => println!("✅ {id}: reset to pending ({})", record.url),
            Err(e) if e.is_per_record() => {
                failures += 1;
                println!("❌ {id}: {e}");
            }
            Err(e) => return Err(CliError::from(e).into()),
        }
    }
    batch_result("reset", failures, ids.len())?;
    Ok(())
}
