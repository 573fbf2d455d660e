//! Available subcommands.

use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};

use ytdlm_core::DownloadStatus;

/// Commands understood by `yt-dl-manager`.
#[derive(Subcommand)]
pub enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
        /// Directory downloads are saved into
        #[arg(long, value_name = "DIR")]
        target_dir: Option<PathBuf>,
    },

    /// Add a URL to the download queue
    Add {
        /// Media URL to queue
        url: String,
        /// Download it right away instead of waiting for the daemon
        #[arg(short, long)]
        download: bool,
    },

    /// Run the download daemon
    Daemon {
        /// Process the current pending batch once and exit
        #[arg(long)]
        once: bool,
    },

    /// Show queue counts per status
    Status,

    /// List records, optionally only those with one status
    List {
        /// Status to list (all records when omitted)
        #[arg(value_enum)]
        status: Option<StatusArg>,
        /// Maximum number of records to show
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Move failed records back to pending
    Retry {
        /// IDs of failed records to retry
        #[arg(required_unless_present = "failed", conflicts_with = "failed")]
        ids: Vec<i64>,
        /// Retry every failed record
        #[arg(long)]
        failed: bool,
    },

    /// Reset records to pending so they are downloaded again
    Redownload {
        /// IDs of records to reset
        #[arg(required = true)]
        ids: Vec<i64>,
    },

    /// Remove records from the queue (downloaded files stay on disk)
    Remove {
        /// IDs of records to remove
        #[arg(required = true)]
        ids: Vec<i64>,
        /// Show what would be removed without removing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Find records whose URL contains a pattern
    Search {
        /// Substring to look for
        pattern: String,
    },
}

/// Status names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Pending,
    Downloading,
    Downloaded,
    Failed,
}

impl From<StatusArg> for DownloadStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Pending => Self::Pending,
            StatusArg::Downloading => Self::Downloading,
            StatusArg::Downloaded => Self::Downloaded,
            StatusArg::Failed => Self::Failed,
        }
    }
}
