//! Media fetcher port.
//!
//! The daemon hands a URL and a target directory to an implementation of
//! this trait and gets back the produced file and the extractor label.
//! Why a fetch failed is not interpreted by the core.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What a successful fetch produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedMedia {
    /// Path of the artifact, usually under `<target>/<extractor>/`.
    pub final_filename: String,
    /// Short lowercase source label, e.g. `youtube`.
    pub extractor: String,
}

/// Errors from a media fetcher. All variants are treated as a failed attempt.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The downloader executable could not be found.
    #[error("Downloader not installed: {0}")]
    NotInstalled(String),

    /// The downloader process could not be started.
    #[error("Failed to start downloader: {0}")]
    Spawn(String),

    /// The downloader ran and reported failure.
    #[error("Downloader exited with {}: {stderr}", describe_exit(.exit_code))]
    Failed {
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The downloader succeeded but its output could not be understood.
    #[error("Unexpected downloader output: {0}")]
    MalformedOutput(String),

    /// Local I/O error (target directory, pipes).
    #[error("I/O error: {0}")]
    Io(String),

    /// The fetch task died before producing a result.
    #[error("Fetch aborted: {0}")]
    Aborted(String),
}

fn describe_exit(code: &Option<i32>) -> String {
    code.map_or_else(|| "signal".to_string(), |c| format!("code {c}"))
}

/// Fetches one URL into a target directory.
#[async_trait]
pub trait MediaFetcherPort: Send + Sync {
    /// Download `url` into `target_dir`.
    async fn fetch(&self, url: &str, target_dir: &Path) -> Result<FetchedMedia, FetchError>;
}
