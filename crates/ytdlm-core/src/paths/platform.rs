//! Platform-specific root directories.
//!
//! Every root honours an environment override first so tests and
//! portable installs can relocate state without touching the user's home.

use std::env;
use std::path::PathBuf;

use super::error::PathError;

/// Directory name used under each platform root.
pub const APP_DIR_NAME: &str = "yt-dl-manager";

/// Root directory for application data (database, logs).
///
/// Resolution order:
/// 1. `YTDLM_DATA_DIR` environment variable
/// 2. System local data directory (e.g., `~/.local/share/yt-dl-manager`)
///
/// The directory is not created here; callers that write into it do so.
pub fn data_root() -> Result<PathBuf, PathError> {
    if let Ok(path) = env::var("YTDLM_DATA_DIR") {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    let data_dir = dirs::data_local_dir().ok_or(PathError::NoDataDir)?;
    Ok(data_dir.join(APP_DIR_NAME))
}

/// Root directory for user configuration.
///
/// Resolution order:
/// 1. `YTDLM_CONFIG_DIR` environment variable
/// 2. System config directory (e.g., `~/.config/yt-dl-manager`)
pub fn config_root() -> Result<PathBuf, PathError> {
    if let Ok(path) = env::var("YTDLM_CONFIG_DIR") {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    let config_dir = dirs::config_dir().ok_or(PathError::NoConfigDir)?;
    Ok(config_dir.join(APP_DIR_NAME))
}

/// Directory that holds the rolling log files.
pub fn logs_dir() -> Result<PathBuf, PathError> {
    Ok(data_root()?.join("logs"))
}

/// Default download target: `<downloads>/yt-dl-manager`.
///
/// Falls back to `~/Downloads` when the platform reports no downloads dir.
pub fn default_target_dir() -> Result<PathBuf, PathError> {
    let downloads = dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .ok_or(PathError::NoDownloadDir)?;
    Ok(downloads.join(APP_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::test_utils::{ENV_LOCK, EnvVarGuard};

    #[test]
    fn test_data_root_honours_override() {
        let _guard = ENV_LOCK.lock().unwrap();
        let _env = EnvVarGuard::set("YTDLM_DATA_DIR", "/tmp/ytdlm-data");

        assert_eq!(data_root().unwrap(), PathBuf::from("/tmp/ytdlm-data"));
        assert_eq!(logs_dir().unwrap(), PathBuf::from("/tmp/ytdlm-data/logs"));
    }

    #[test]
    fn test_config_root_ignores_blank_override() {
        let _guard = ENV_LOCK.lock().unwrap();
        let _env = EnvVarGuard::set("YTDLM_CONFIG_DIR", "  ");

        if let Ok(root) = config_root() {
            assert!(root.ends_with(APP_DIR_NAME));
        }
    }
}
