//! Composition utilities for building the queue with an `SQLite` backend.
//!
//! This module provides construction helpers only; no domain logic.

use std::path::Path;
use std::sync::Arc;

use sqlx::SqlitePool;

use ytdlm_core::{DownloadRepository, QueueService};

use crate::repositories::SqliteDownloadRepository;
use crate::setup::setup_database;

/// Factory for creating repository instances with `SQLite` backends.
pub struct CoreFactory;

impl CoreFactory {
    /// Open (and initialize) the database file at `db_path`.
    pub async fn create_pool(db_path: &Path) -> anyhow::Result<SqlitePool> {
        setup_database(db_path).await
    }

    /// Create a download repository from a pool.
    pub fn download_repository(pool: SqlitePool) -> Arc<SqliteDownloadRepository> {
        Arc::new(SqliteDownloadRepository::new(pool))
    }

    /// Build a `QueueService` over an `SQLite` repository.
    pub fn build_queue(pool: SqlitePool) -> QueueService {
        let repo: Arc<dyn DownloadRepository> = Self::download_repository(pool);
        QueueService::new(repo)
    }
}

/// Test database helper for integration tests.
///
/// Provides an in-memory `SQLite` database with the production schema applied.
#[cfg(any(test, feature = "test-utils"))]
pub struct TestDb {
    pool: SqlitePool,
}

#[cfg(any(test, feature = "test-utils"))]
impl TestDb {
    /// Create a new in-memory test database with full schema.
    pub async fn new() -> anyhow::Result<Self> {
        let pool = crate::setup::setup_test_database().await?;
        Ok(Self { pool })
    }

    /// Get the pool for creating repositories.
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// A repository over this database.
    pub fn repository(&self) -> Arc<SqliteDownloadRepository> {
        CoreFactory::download_repository(self.pool.clone())
    }

    /// A queue service over this database.
    pub fn queue(&self) -> QueueService {
        CoreFactory::build_queue(self.pool.clone())
    }
}
