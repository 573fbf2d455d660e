//! Command handlers.
//!
//! Handlers follow one pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<()>`
//! - Thin wrappers that call [`QueueService`](ytdlm_core::QueueService)
//!   or the daemon and format output for the terminal.
//!
//! Handlers never touch the store directly and hold no queue logic.
//! Commands that take several IDs keep going past a bad ID and report
//! the failures together at the end.

pub mod add;
pub mod daemon;
pub mod init;
pub mod list;
pub mod redownload;
pub mod remove;
pub mod retry;
pub mod search;
pub mod status;

use crate::error::CliError;

/// Fold per-ID failures into one error for the exit code.
pub(crate) fn batch_result(action: &str, failures: usize, total: usize) -> Result<(), CliError> {
    if failures == 0 {
        Ok(())
    } else {
        Err(CliError::Arguments(format!(
            "{failures} of {total} record(s) could not be {action}"
        )))
    }
}
