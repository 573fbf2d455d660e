//! Search command handler.

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::print_record_table;

/// Show records whose URL contains `pattern`.
///
/// # Errors
///
/// Fails when the store cannot be read.
pub async fn execute(ctx: &CliContext, pattern: &str) -> Result<()> {
    let records = ctx.queue().search(pattern).await.map_err(CliError::from)?;

    if records.is_empty() {
        println!("No records match '{pattern}'.");
        return Ok(());
    }

    println!("Found {} record(s) matching '{pattern}':\n", records.len());
    print_record_table(&records);
    Ok(())
}
