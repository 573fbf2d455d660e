//! `SQLite` persistence for yt-dl-manager.
//!
//! Provides the [`SqliteDownloadRepository`] implementation of the core
//! `DownloadRepository` port, schema setup, and composition helpers.

#![deny(unsafe_code)]

pub mod factory;
pub mod repositories;
pub mod setup;

// Re-export factory for convenient access
pub use factory::CoreFactory;

// Re-export TestDb for integration tests
#[cfg(any(test, feature = "test-utils"))]
pub use factory::TestDb;

// Re-export repository implementations
pub use repositories::SqliteDownloadRepository;

// Re-export setup functions for convenient access
pub use setup::{create_schema, setup_database};
#[cfg(any(test, feature = "test-utils"))]
pub use setup::setup_test_database;
