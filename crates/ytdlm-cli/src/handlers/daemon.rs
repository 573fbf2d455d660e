//! Daemon command handler.

use anyhow::Result;
use tracing::{info, warn};
use ytdlm_core::paths::{DirectoryCreationStrategy, ensure_directory};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::print_cycle_summary;
use crate::shutdown;

/// Run the download daemon until Ctrl-C / SIGTERM, or one cycle with `once`.
///
/// In both modes a shutdown signal lets the download in progress finish
/// before exiting; `once` then leaves the rest of the batch pending.
///
/// # Errors
///
/// Fails when yt-dlp cannot be located, the target directory is unusable,
/// or the store becomes unavailable.
pub async fn execute(ctx: &CliContext, once: bool) -> Result<()> {
    let daemon = ctx.build_daemon()?;
    ensure_directory(&daemon.config().target_dir, DirectoryCreationStrategy::AutoCreate)
        .map_err(CliError::from)?;

    let stuck = ctx.queue().get_in_progress().await.map_err(CliError::from)?;
    if !stuck.is_empty() {
        warn!(
            count = stuck.len(),
            "Records left in downloading state; use `redownload` to reset them"
        );
    }
    let pending = ctx.queue().queue_length().await.map_err(CliError::from)?;
    info!(pending, "Pending downloads");

    let _listener = shutdown::listen(daemon.shutdown_token()).map_err(CliError::from)?;

    if once {
        let summary = daemon.run_cycle().await.map_err(CliError::from)?;
        print_cycle_summary(&summary);
    } else {
        daemon.run().await.map_err(CliError::from)?;
    }
    Ok(())
}
