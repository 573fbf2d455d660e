//! Shared CLI presentation utilities.
//!
//! Keep this module format-only: no queue logic.

pub mod record_display;
pub mod tables;

pub use record_display::{format_timestamp, print_cycle_summary, print_record_table, print_stats};
pub use tables::{format_optional, print_separator, truncate_string};
