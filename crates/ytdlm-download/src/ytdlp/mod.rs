//! `yt-dlp` implementation of the media fetcher port.

mod exec;
pub mod protocol;

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use ytdlm_core::paths::{DirectoryCreationStrategy, ensure_directory};
use ytdlm_core::{FetchError, FetchedMedia, MediaFetcherPort};

pub use exec::{FORMAT_SELECTOR, OUTPUT_TEMPLATE, build_args};

/// Environment variable that points at a specific `yt-dlp` executable.
pub const YTDLP_PATH_ENV: &str = "YTDLM_YTDLP_PATH";

const PROGRAM_NAME: &str = "yt-dlp";

/// Runs the `yt-dlp` executable for each fetch.
#[derive(Debug, Clone)]
pub struct YtDlpFetcher {
    program: PathBuf,
    leading_args: Vec<OsString>,
}

impl YtDlpFetcher {
    /// Use an explicit executable path.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    /// Run `yt-dlp` through a launcher, e.g. `python3 -m yt_dlp`.
    pub fn with_launcher<I, A>(program: impl Into<PathBuf>, leading_args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        Self {
            program: program.into(),
            leading_args: leading_args.into_iter().map(Into::into).collect(),
        }
    }

    /// Find `yt-dlp`: `YTDLM_YTDLP_PATH` first, then `PATH`.
    pub fn locate() -> Result<Self, FetchError> {
        if let Ok(path) = env::var(YTDLP_PATH_ENV) {
            if !path.trim().is_empty() {
                return Ok(Self::with_program(path));
            }
        }

        which::which(PROGRAM_NAME)
            .map(Self::with_program)
            .map_err(|e| FetchError::NotInstalled(format!("{PROGRAM_NAME} not found on PATH: {e}")))
    }

    /// The executable this fetcher runs.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[async_trait]
impl MediaFetcherPort for YtDlpFetcher {
    async fn fetch(&self, url: &str, target_dir: &Path) -> Result<FetchedMedia, FetchError> {
        ensure_directory(target_dir, DirectoryCreationStrategy::AutoCreate)
            .map_err(|e| FetchError::Io(e.to_string()))?;

        let mut args = self.leading_args.clone();
        args.extend(build_args(url, target_dir));
        tracing::debug!(program = %self.program.display(), url, "Running yt-dlp");

        let stdout = exec::run(&self.program, &args).await?;
        protocol::parse_output(&stdout)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;

    /// A shell script standing in for yt-dlp, run through `/bin/sh`.
    fn fake(dir: &Path, body: &str) -> YtDlpFetcher {
        let path = dir.join("fake-yt-dlp.sh");
        fs::write(&path, format!("{body}\n")).unwrap();
        YtDlpFetcher::with_launcher("/bin/sh", [path])
    }

    #[tokio::test]
    async fn test_fetch_parses_result_line() {
        let temp = tempfile::tempdir().unwrap();
        let fetcher = fake(
            temp.path(),
            r#"echo "[youtube] noise"
echo '{"extractor": "Youtube", "filepath": "/media/youtube/title.mp4"}'"#,
        );
        let target = temp.path().join("media");

        let media = fetcher
            .fetch("https://x.test/a", &target)
            .await
            .unwrap();

        assert_eq!(media.extractor, "youtube");
        assert_eq!(media.final_filename, "/media/youtube/title.mp4");
        assert!(target.is_dir());
    }

    #[tokio::test]
    async fn test_fetch_reports_exit_status() {
        let temp = tempfile::tempdir().unwrap();
        let fetcher = fake(temp.path(), "echo 'ERROR: Unsupported URL' >&2\nexit 1");

        let err = fetcher
            .fetch("https://x.test/a", temp.path())
            .await
            .unwrap_err();

        match err {
            FetchError::Failed { exit_code, stderr } => {
                assert_eq!(exit_code, Some(1));
                assert_eq!(stderr, "ERROR: Unsupported URL");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_receives_url_after_separator() {
        let temp = tempfile::tempdir().unwrap();
        // Echo the final argument back as the file path.
        let fetcher = fake(
            temp.path(),
            r#"for last; do :; done
printf '{"extractor": "generic", "filepath": "%s"}\n' "$last""#,
        );

        let media = fetcher
            .fetch("https://x.test/clip", temp.path())
            .await
            .unwrap();
        assert_eq!(media.final_filename, "https://x.test/clip");
    }

    #[test]
    fn test_locate_prefers_env_override() {
        let _guard = ENV_LOCK.lock().unwrap();
        let previous = env::var(YTDLP_PATH_ENV).ok();
        set_env(YTDLP_PATH_ENV, Some("/opt/yt-dlp/bin/yt-dlp"));

        let fetcher = YtDlpFetcher::locate().unwrap();
        assert_eq!(fetcher.program(), Path::new("/opt/yt-dlp/bin/yt-dlp"));

        set_env(YTDLP_PATH_ENV, previous.as_deref());
    }

    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    #[allow(unsafe_code)]
    fn set_env(key: &str, value: Option<&str>) {
        unsafe {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }
}
