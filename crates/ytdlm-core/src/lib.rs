//! Core of yt-dl-manager: domain types, ports, the queue state machine,
//! configuration and path resolution.
//!
//! This crate has no storage or process code. `ytdlm-db` implements
//! [`DownloadRepository`] and `ytdlm-download` implements [`MediaFetcherPort`].

pub mod domain;
pub mod paths;
pub mod ports;
pub mod services;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{DownloadRecord, DownloadStatus, QueueStats, RecordUpdate, UnknownStatus};
pub use ports::{
    DownloadRepository, FetchError, FetchedMedia, InsertOutcome, MediaFetcherPort,
    RepositoryError,
};
pub use services::{EnqueueOutcome, QueueError, QueueService};
pub use settings::{
    AppConfig, ConfigError, DEFAULT_BATCH_SIZE, DEFAULT_MAX_RETRIES, DEFAULT_POLL_INTERVAL_SECS,
    DaemonConfig, create_default_config, load_config, load_config_from,
};

// Re-export path utilities
pub use paths::{
    PathError, config_file_path, config_root, data_root, database_path, default_target_dir,
    ensure_directory, logs_dir,
};
