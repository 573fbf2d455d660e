//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `sqlx` types in any signature
//! - No process/filesystem implementation details
//! - Repository traits are narrow and row-oriented

pub mod download_repository;
pub mod media_fetcher;

use thiserror::Error;

pub use download_repository::{DownloadRepository, InsertOutcome};
pub use media_fetcher::{FetchError, FetchedMedia, MediaFetcherPort};

/// Domain-specific errors for repository operations.
///
/// This error type abstracts away storage implementation details (e.g., sqlx errors)
/// and provides a clean interface for services to handle storage failures.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Storage backend error (database unreachable, I/O failure, ...).
    #[error("Storage error: {0}")]
    Storage(String),

    /// A stored value could not be decoded into a domain type.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A constraint was violated (e.g., unique constraint).
    #[error("Constraint violation: {0}")]
    Constraint(String),
}
