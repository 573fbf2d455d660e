//! Tracing setup for the binary.
//!
//! Logs go to stderr (stdout is reserved for command output) and to a
//! daily-rotated file under `<data dir>/logs`. `RUST_LOG` takes priority
//! over the `--verbose` default.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use ytdlm_core::paths::{DirectoryCreationStrategy, ensure_directory, logs_dir};

/// File name prefix for rotated log files.
pub const LOG_FILE_PREFIX: &str = "yt-dl-manager.log";

/// Default filter directive for the given verbosity.
#[must_use]
pub const fn default_directive(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}

/// Initialise the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be held
/// until the process exits. `None` means file logging is unavailable and
/// only stderr is used.
pub fn init(verbose: bool) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let file_writer = match logs_dir()
        .and_then(|dir| ensure_directory(&dir, DirectoryCreationStrategy::AutoCreate).map(|()| dir))
    {
        Ok(dir) => Some(tracing_appender::non_blocking(
            tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX),
        )),
        Err(e) => {
            eprintln!("File logging disabled: {e}");
            None
        }
    };

    let (file_layer, guard) = match file_writer {
        Some((writer, guard)) => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .compact(),
            ),
            Some(guard),
        ),
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .ok();

    guard
}
