//! `SQLite` repository implementations.

pub mod row_mappers;
mod sqlite_download_repository;

pub use sqlite_download_repository::SqliteDownloadRepository;
