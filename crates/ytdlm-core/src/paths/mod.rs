//! Path utilities for yt-dl-manager data, config and download locations.
//!
//! This module provides the canonical path resolution for every component:
//! - Database location
//! - Configuration file
//! - Log directory
//! - Default download target
//!
//! OS-specific lookups are kept private in `platform`.

mod config;
mod database;
mod ensure;
mod error;
mod platform;

#[cfg(test)]
pub(crate) mod test_utils;

// Error type
pub use error::PathError;

// Platform roots
pub use platform::{APP_DIR_NAME, config_root, data_root, default_target_dir, logs_dir};

// Database
pub use database::{DATABASE_FILE_NAME, database_path};

// Directory operations
pub use ensure::{DirectoryCreationStrategy, ensure_directory, ensure_parent_dir, verify_writable};

// Configuration persistence
pub use config::{CONFIG_FILE_NAME, config_file_path, persist_env_value, quote_env_value};
