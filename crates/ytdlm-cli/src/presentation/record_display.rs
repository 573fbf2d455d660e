//! Rendering of queue records and counters.

use chrono::{DateTime, Local, Utc};
use ytdlm_core::{DownloadRecord, DownloadStatus, QueueStats};
use ytdlm_download::CycleSummary;

use super::tables::{format_optional, print_separator, truncate_string};

/// Local wall-clock rendering of a stored UTC timestamp.
#[must_use]
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Print records as a table, one row per record.
pub fn print_record_table(records: &[DownloadRecord]) {
    println!(
        "{:<6} {:<12} {:<7} {:<19} {:<50} File",
        "ID", "Status", "Retries", "Requested", "URL"
    );
    print_separator(120);

    for record in records {
        let file = format_optional(record.final_filename.as_ref(), "--");
        println!(
            "{:<6} {:<12} {:<7} {:<19} {:<50} {}",
            record.id,
            record.status.as_str(),
            record.retries,
            format_timestamp(&record.timestamp_requested),
            truncate_string(&record.url, 50),
            file
        );
    }
}

/// Print per-status counts and the total.
pub fn print_stats(stats: &QueueStats) {
    for status in DownloadStatus::ALL {
        println!("{:<12} {:>6}", status.as_str(), stats.get(status));
    }
    print_separator(19);
    println!("{:<12} {:>6}", "total", stats.total());
}

/// Print the result of one daemon cycle.
pub fn print_cycle_summary(summary: &CycleSummary) {
    if summary.is_idle() {
        println!("No pending downloads.");
        return;
    }
    println!(
        "Processed {}: {} downloaded, {} queued for retry, {} failed, {} skipped",
        summary.processed, summary.downloaded, summary.requeued, summary.failed, summary.skipped
    );
}
