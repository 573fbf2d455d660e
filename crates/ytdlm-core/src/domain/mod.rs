//! Core domain types.
//!
//! These types represent the pure domain model, independent of any
//! infrastructure concerns (database, filesystem, external tools).

mod record;

pub use record::{
    DownloadRecord, DownloadStatus, QueueStats, RecordUpdate, UnknownStatus,
};
