//! Status command handler.

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{print_record_table, print_stats};

/// Print queue counts, plus any record currently downloading.
///
/// # Errors
///
/// Fails when the store cannot be read.
pub async fn execute(ctx: &CliContext) -> Result<()> {
    let stats = ctx.queue().stats().await.map_err(CliError::from)?;
    print_stats(&stats);

    let in_progress = ctx.queue().get_in_progress().await.map_err(CliError::from)?;
    if !in_progress.is_empty() {
        println!();
        println!("In progress:");
        print_record_table(&in_progress);
    }
    Ok(())
}
