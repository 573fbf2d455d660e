//! `yt-dl-manager` command-line adapter.
//!
//! The binary in `main.rs` parses arguments, initialises logging and
//! dispatches to [`handlers`]. Everything else (queue, store, fetcher)
//! is wired together once in [`bootstrap`].

#![deny(unsafe_code)]

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod parser;
pub mod presentation;
pub mod shutdown;

// Re-export primary types for convenient access
pub use bootstrap::{CliContext, bootstrap, bootstrap_with};
pub use commands::{Commands, StatusArg};
pub use error::CliError;
pub use parser::Cli;
