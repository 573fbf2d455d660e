//! Download side of yt-dl-manager.
//!
//! - [`YtDlpFetcher`] implements the core `MediaFetcherPort` by running
//!   the external `yt-dlp` executable.
//! - [`DownloadDaemon`] is the polling loop that drives pending records
//!   through the lifecycle.

pub mod daemon;
pub mod ytdlp;

pub use daemon::{CycleSummary, DownloadDaemon, RecordOutcome};
pub use ytdlp::{YTDLP_PATH_ENV, YtDlpFetcher};
