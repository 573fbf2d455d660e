//! Init command handler.

use std::path::Path;

use anyhow::Result;
use ytdlm_core::paths::persist_env_value;
use ytdlm_core::settings::keys;
use ytdlm_core::{create_default_config, load_config_from};

use crate::error::CliError;

/// Write a default configuration file, optionally pinning the target directory.
///
/// # Errors
///
/// Fails when the file exists and `force` is not set, or when it cannot be written.
pub fn execute(force: bool, target_dir: Option<&Path>) -> Result<()> {
    let path = create_default_config(force).map_err(CliError::from)?;

    if let Some(dir) = target_dir {
        let dir = std::path::absolute(dir).map_err(CliError::from)?;
        persist_env_value(keys::TARGET_DIR, &dir.to_string_lossy()).map_err(CliError::from)?;
    }

    let config = load_config_from(&path).map_err(CliError::from)?;
    println!("Configuration written to {}", path.display());
    println!();
    println!("  Target directory: {}", config.target_dir.display());
    println!("  Database:         {}", config.database_path.display());
    println!("  Poll interval:    {}s", config.poll_interval.as_secs());
    println!("  Max retries:      {}", config.max_retries);
    Ok(())
}
