//! Download record domain types.
//!
//! These types represent one tracked URL and its lifecycle state,
//! independent of how the store persists them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a download record.
///
/// ```text
/// pending ──► downloading ──► downloaded
///    ▲             │
///    └── failed ◄──┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadStatus {
    /// Queued, not yet attempted or ready for retry.
    Pending,
    /// Claimed by a daemon worker.
    Downloading,
    /// Artifact produced; terminal.
    Downloaded,
    /// Last attempt failed; terminal until retried.
    Failed,
}

impl DownloadStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::Downloading,
        Self::Downloaded,
        Self::Failed,
    ];

    /// Convert to string representation for database storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Downloading => "downloading",
            Self::Downloaded => "downloaded",
            Self::Failed => "failed",
        }
    }

    /// Parse from string representation.
    ///
    /// Unlike free-form status strings, unknown values are rejected.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "downloading" => Some(Self::Downloading),
            "downloaded" => Some(Self::Downloaded),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Whether the daemon is allowed to move a record from `self` to `next`.
    ///
    /// Only the transitions driven by the daemon loop are listed here;
    /// the maintenance reset is deliberately absent.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Downloading)
                | (Self::Downloading, Self::Downloaded | Self::Failed)
                | (Self::Failed, Self::Pending)
        )
    }
}

impl fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a status string is not one of the four known values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown download status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for DownloadStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(&s.trim().to_ascii_lowercase()).ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// One row per distinct URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRecord {
    pub id: i64,
    pub url: String,
    pub status: DownloadStatus,
    pub timestamp_requested: DateTime<Utc>,
    pub timestamp_downloaded: Option<DateTime<Utc>>,
    pub final_filename: Option<String>,
    pub extractor: Option<String>,
    pub retries: u32,
}

impl DownloadRecord {
    /// Check the terminal-field invariant.
    ///
    /// `downloaded` if and only if both `final_filename` and
    /// `timestamp_downloaded` are set.
    #[must_use]
    pub const fn terminal_fields_consistent(&self) -> bool {
        let has_terminal = self.final_filename.is_some() && self.timestamp_downloaded.is_some();
        let has_none = self.final_filename.is_none() && self.timestamp_downloaded.is_none();
        match self.status {
            DownloadStatus::Downloaded => has_terminal,
            _ => has_none,
        }
    }
}

/// Partial update applied to a single record.
///
/// `None` leaves a column untouched. For nullable columns,
/// `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordUpdate {
    pub status: Option<DownloadStatus>,
    pub timestamp_downloaded: Option<Option<DateTime<Utc>>>,
    pub final_filename: Option<Option<String>>,
    pub extractor: Option<Option<String>>,
    /// Adds one to `retries`. There is no way to write an absolute value.
    pub increment_retries: bool,
}

impl RecordUpdate {
    /// Update that only changes the status.
    #[must_use]
    pub fn status(status: DownloadStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// `downloading → downloaded` payload.
    #[must_use]
    pub fn downloaded(
        final_filename: impl Into<String>,
        extractor: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            status: Some(DownloadStatus::Downloaded),
            timestamp_downloaded: Some(Some(at)),
            final_filename: Some(Some(final_filename.into())),
            extractor: Some(Some(extractor.into())),
            increment_retries: false,
        }
    }

    /// `downloading → failed` payload.
    #[must_use]
    pub fn failed() -> Self {
        Self {
            status: Some(DownloadStatus::Failed),
            increment_retries: true,
            ..Self::default()
        }
    }

    /// Back to `pending` with every terminal field cleared.
    #[must_use]
    pub fn reset_to_pending() -> Self {
        Self {
            status: Some(DownloadStatus::Pending),
            timestamp_downloaded: Some(None),
            final_filename: Some(None),
            extractor: Some(None),
            increment_retries: false,
        }
    }

    /// True when applying the update would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.timestamp_downloaded.is_none()
            && self.final_filename.is_none()
            && self.extractor.is_none()
            && !self.increment_retries
    }
}

/// Record counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    pub pending: u64,
    pub downloading: u64,
    pub downloaded: u64,
    pub failed: u64,
}

impl QueueStats {
    /// Build stats from `(status, count)` pairs; missing statuses count as zero.
    pub fn from_counts(counts: impl IntoIterator<Item = (DownloadStatus, u64)>) -> Self {
        let mut stats = Self::default();
        for (status, count) in counts {
            *stats.slot_mut(status) += count;
        }
        stats
    }

    /// Count for one status.
    #[must_use]
    pub const fn get(&self, status: DownloadStatus) -> u64 {
        match status {
            DownloadStatus::Pending => self.pending,
            DownloadStatus::Downloading => self.downloading,
            DownloadStatus::Downloaded => self.downloaded,
            DownloadStatus::Failed => self.failed,
        }
    }

    /// Total number of records across all statuses.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.pending + self.downloading + self.downloaded + self.failed
    }

    const fn slot_mut(&mut self, status: DownloadStatus) -> &mut u64 {
        match status {
            DownloadStatus::Pending => &mut self.pending,
            DownloadStatus::Downloading => &mut self.downloading,
            DownloadStatus::Downloaded => &mut self.downloaded,
            DownloadStatus::Failed => &mut self.failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: DownloadStatus) -> DownloadRecord {
        DownloadRecord {
            id: 1,
            url: "https://x.test/a".to_string(),
            status,
            timestamp_requested: Utc::now(),
            timestamp_downloaded: None,
            final_filename: None,
            extractor: None,
            retries: 0,
        }
    }

    #[test]
    fn test_status_string_roundtrip() {
        for status in DownloadStatus::ALL {
            assert_eq!(DownloadStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(DownloadStatus::parse("queued"), None);
        assert_eq!("FAILED".parse::<DownloadStatus>(), Ok(DownloadStatus::Failed));
        assert!("done".parse::<DownloadStatus>().is_err());
    }

    #[test]
    fn test_allowed_transitions() {
        use DownloadStatus::{Downloaded, Downloading, Failed, Pending};

        assert!(Pending.can_transition_to(Downloading));
        assert!(Downloading.can_transition_to(Downloaded));
        assert!(Downloading.can_transition_to(Failed));
        assert!(Failed.can_transition_to(Pending));

        assert!(!Downloaded.can_transition_to(Downloading));
        assert!(!Downloaded.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Downloaded));
        assert!(!Failed.can_transition_to(Downloading));
    }

    #[test]
    fn test_terminal_fields_invariant() {
        let mut rec = record(DownloadStatus::Pending);
        assert!(rec.terminal_fields_consistent());

        rec.status = DownloadStatus::Downloaded;
        assert!(!rec.terminal_fields_consistent());

        rec.final_filename = Some("downloads/youtube/title.mp4".to_string());
        rec.timestamp_downloaded = Some(Utc::now());
        assert!(rec.terminal_fields_consistent());

        rec.status = DownloadStatus::Failed;
        assert!(!rec.terminal_fields_consistent());
    }

    #[test]
    fn test_record_update_builders() {
        assert!(RecordUpdate::default().is_empty());
        assert!(RecordUpdate::failed().increment_retries);

        let reset = RecordUpdate::reset_to_pending();
        assert_eq!(reset.status, Some(DownloadStatus::Pending));
        assert_eq!(reset.final_filename, Some(None));
        assert!(!reset.increment_retries);
    }

    #[test]
    fn test_stats_from_counts_fills_missing() {
        let stats = QueueStats::from_counts([
            (DownloadStatus::Pending, 2),
            (DownloadStatus::Failed, 1),
        ]);
        assert_eq!(stats.get(DownloadStatus::Pending), 2);
        assert_eq!(stats.get(DownloadStatus::Downloading), 0);
        assert_eq!(stats.total(), 3);
    }
}
