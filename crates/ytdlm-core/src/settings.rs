//! Application configuration.
//!
//! Configuration lives in a dotenv-style file (`config.env`) inside the
//! user config directory. Process environment variables with the same
//! keys take precedence over the file, and built-in defaults fill the rest.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::paths::{self, PathError};

/// Default delay between daemon polls when the queue is empty.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Default number of failed attempts before a record stays `failed`.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default number of pending records fetched per daemon cycle.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Configuration keys, shared by the config file and the environment.
pub mod keys {
    pub const TARGET_DIR: &str = "YTDLM_TARGET_DIR";
    pub const DATABASE_PATH: &str = "YTDLM_DATABASE_PATH";
    pub const POLL_INTERVAL_SECS: &str = "YTDLM_POLL_INTERVAL_SECS";
    pub const MAX_RETRIES: &str = "YTDLM_MAX_RETRIES";
}

/// Errors raised while loading or writing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Failed to parse config file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Config file already exists at {0} (use --force to overwrite)")]
    AlreadyExists(PathBuf),

    #[error("Failed to write config file {path}: {reason}")]
    Write { path: PathBuf, reason: String },
}

/// Resolved application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory that downloads are written into.
    pub target_dir: PathBuf,
    /// Location of the `SQLite` store.
    pub database_path: PathBuf,
    /// Idle delay between polls.
    pub poll_interval: Duration,
    /// Automatic retry budget per record.
    pub max_retries: u32,
}

impl AppConfig {
    /// Defaults derived from the platform directories.
    pub fn defaults() -> Result<Self, ConfigError> {
        Ok(Self {
            target_dir: paths::default_target_dir()?,
            database_path: paths::database_path()?,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Resolve configuration from a value lookup, falling back to `defaults`.
    ///
    /// `lookup` receives one of the [`keys`] and returns the raw string, if any.
    pub fn resolve<F>(defaults: Self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let non_blank = |key| lookup(key).filter(|v: &String| !v.trim().is_empty());

        let target_dir = non_blank(keys::TARGET_DIR)
            .map_or(defaults.target_dir, |v| PathBuf::from(v.trim()));
        let database_path = non_blank(keys::DATABASE_PATH)
            .map_or(defaults.database_path, |v| PathBuf::from(v.trim()));

        let poll_interval = match non_blank(keys::POLL_INTERVAL_SECS) {
            Some(raw) => {
                let secs = parse_number::<u64>(keys::POLL_INTERVAL_SECS, &raw)?;
                if secs == 0 {
                    return Err(ConfigError::InvalidValue {
                        key: keys::POLL_INTERVAL_SECS,
                        value: raw,
                        reason: "must be at least 1 second".to_string(),
                    });
                }
                Duration::from_secs(secs)
            }
            None => defaults.poll_interval,
        };

        let max_retries = match non_blank(keys::MAX_RETRIES) {
            Some(raw) => parse_number::<u32>(keys::MAX_RETRIES, &raw)?,
            None => defaults.max_retries,
        };

        Ok(Self {
            target_dir,
            database_path,
            poll_interval,
            max_retries,
        })
    }

    /// Render the configuration as the contents of a config file.
    #[must_use]
    pub fn to_env_file(&self) -> String {
        format!(
            "# yt-dl-manager configuration\n\
             {}={}\n\
             {}={}\n\
             {}={}\n\
             {}={}\n",
            keys::TARGET_DIR,
            paths::quote_env_value(&self.target_dir.to_string_lossy()),
            keys::DATABASE_PATH,
            paths::quote_env_value(&self.database_path.to_string_lossy()),
            keys::POLL_INTERVAL_SECS,
            self.poll_interval.as_secs(),
            keys::MAX_RETRIES,
            self.max_retries,
        )
    }
}

fn parse_number<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
            reason: e.to_string(),
        })
}

/// Read a dotenv-style file into a map. A missing file yields an empty map.
pub fn read_config_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    if !path.exists() {
        return Ok(HashMap::new());
    }

    let iter = dotenvy::from_path_iter(path).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    iter.map(|item| {
        item.map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    })
    .collect()
}

/// Load configuration from `path`, with process environment overrides.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let file_values = read_config_file(path)?;
    let config = AppConfig::resolve(AppConfig::defaults()?, |key| {
        env::var(key).ok().or_else(|| file_values.get(key).cloned())
    })?;
    tracing::debug!(
        config_file = %path.display(),
        target_dir = %config.target_dir.display(),
        database = %config.database_path.display(),
        "Configuration loaded"
    );
    Ok(config)
}

/// Load configuration from the default config file location.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&paths::config_file_path()?)
}

/// Write a config file filled with defaults.
///
/// Refuses to replace an existing file unless `force` is set.
/// Returns the path that was written.
pub fn create_default_config(force: bool) -> Result<PathBuf, ConfigError> {
    let path = paths::config_file_path()?;
    write_config_file(&path, &AppConfig::defaults()?, force)?;
    Ok(path)
}

/// Write `config` to `path`, creating the parent directory when missing.
pub fn write_config_file(path: &Path, config: &AppConfig, force: bool) -> Result<(), ConfigError> {
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }
    paths::ensure_parent_dir(path)?;
    fs::write(path, config.to_env_file()).map_err(|e| ConfigError::Write {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    tracing::info!(path = %path.display(), "Wrote configuration file");
    Ok(())
}

/// Values consumed by the daemon loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonConfig {
    pub target_dir: PathBuf,
    pub poll_interval: Duration,
    pub max_retries: u32,
    pub batch_size: usize,
}

impl DaemonConfig {
    /// Daemon settings with default timings for `target_dir`.
    #[must_use]
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_dir: target_dir.into(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    #[must_use]
    pub const fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

impl From<&AppConfig> for DaemonConfig {
    fn from(config: &AppConfig) -> Self {
        Self::new(config.target_dir.clone())
            .with_poll_interval(config.poll_interval)
            .with_max_retries(config.max_retries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::test_utils::{ENV_LOCK, EnvVarGuard};
    use tempfile::tempdir;

    fn base() -> AppConfig {
        AppConfig {
            target_dir: PathBuf::from("/media"),
            database_path: PathBuf::from("/data/q.db"),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let config = AppConfig::resolve(base(), |_| None).unwrap();
        assert_eq!(config, base());
    }

    #[test]
    fn test_resolve_overrides() {
        let values: HashMap<&str, &str> = [
            (keys::TARGET_DIR, "/srv/videos"),
            (keys::POLL_INTERVAL_SECS, " 30 "),
            (keys::MAX_RETRIES, "0"),
            (keys::DATABASE_PATH, "   "),
        ]
        .into_iter()
        .collect();

        let config =
            AppConfig::resolve(base(), |key| values.get(key).map(|v| (*v).to_string())).unwrap();

        assert_eq!(config.target_dir, PathBuf::from("/srv/videos"));
        assert_eq!(config.database_path, PathBuf::from("/data/q.db"));
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.max_retries, 0);
    }

    #[test]
    fn test_resolve_rejects_bad_numbers() {
        let err = AppConfig::resolve(base(), |key| {
            (key == keys::MAX_RETRIES).then(|| "three".to_string())
        })
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: keys::MAX_RETRIES,
                ..
            }
        ));

        let err = AppConfig::resolve(base(), |key| {
            (key == keys::POLL_INTERVAL_SECS).then(|| "0".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_config_file_roundtrip() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nested").join("config.env");

        write_config_file(&path, &base(), false).unwrap();
        let values = read_config_file(&path).unwrap();
        assert_eq!(values.get(keys::TARGET_DIR).map(String::as_str), Some("/media"));
        assert_eq!(values.get(keys::MAX_RETRIES).map(String::as_str), Some("3"));

        let err = write_config_file(&path, &base(), false).unwrap_err();
        assert!(matches!(err, ConfigError::AlreadyExists(_)));
        write_config_file(&path, &base(), true).unwrap();
    }

    #[test]
    fn test_missing_config_file_is_empty() {
        let temp = tempdir().unwrap();
        let values = read_config_file(&temp.path().join("absent.env")).unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn test_load_config_env_beats_file() {
        let _guard = ENV_LOCK.lock().unwrap();
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.env");
        fs::write(&path, "YTDLM_MAX_RETRIES=7\nYTDLM_POLL_INTERVAL_SECS=2\n").unwrap();

        let _data = EnvVarGuard::set("YTDLM_DATA_DIR", temp.path().to_string_lossy().as_ref());
        let _retries = EnvVarGuard::set(keys::MAX_RETRIES, "1");
        let _poll = EnvVarGuard::unset(keys::POLL_INTERVAL_SECS);

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.database_path, temp.path().join("yt_dl_manager.db"));
    }

    #[test]
    fn test_daemon_config_from_app_config() {
        let daemon = DaemonConfig::from(&base());
        assert_eq!(daemon.target_dir, PathBuf::from("/media"));
        assert_eq!(daemon.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(daemon.batch_size, DEFAULT_BATCH_SIZE);
    }
}
