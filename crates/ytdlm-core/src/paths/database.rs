//! Database path resolution.

use std::path::PathBuf;

use super::error::PathError;
use super::platform::data_root;

/// File name of the `SQLite` database inside the data root.
pub const DATABASE_FILE_NAME: &str = "yt_dl_manager.db";

/// Default path of the download store.
///
/// The parent directory is created lazily when the database is opened.
pub fn database_path() -> Result<PathBuf, PathError> {
    Ok(data_root()?.join(DATABASE_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::test_utils::{ENV_LOCK, EnvVarGuard};

    #[test]
    fn test_database_path_lives_under_data_root() {
        let _guard = ENV_LOCK.lock().unwrap();
        let temp = tempfile::tempdir().unwrap();
        let _env = EnvVarGuard::set("YTDLM_DATA_DIR", temp.path().to_string_lossy().as_ref());

        let path = database_path().unwrap();
        assert_eq!(path, temp.path().join("yt_dl_manager.db"));
    }
}
