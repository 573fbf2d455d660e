//! Operator interrupt handling.
//!
//! While a [`ShutdownListener`] is alive, SIGINT and SIGTERM no longer
//! terminate the process. They cancel the daemon's token instead, so the
//! record being downloaded still reaches `downloaded` or `failed`. yt-dlp
//! runs in its own process group and never sees a terminal Ctrl-C, so a
//! command that downloads without a listener would leave an orphan behind.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Installed signal handlers; dropping it stops forwarding to the token.
pub struct ShutdownListener {
    handle: JoinHandle<()>,
}

impl Drop for ShutdownListener {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Install the handlers now and cancel `token` on the first signal.
///
/// Registration happens before this returns, so a signal sent right
/// afterwards is already caught.
pub fn listen(token: CancellationToken) -> std::io::Result<ShutdownListener> {
    #[cfg(unix)]
    let handle = {
        use tokio::signal::unix::{SignalKind, signal};

        let mut interrupt = signal(SignalKind::interrupt())?;
        let mut terminate = signal(SignalKind::terminate())?;
        tokio::spawn(async move {
            tokio::select! {
                _ = interrupt.recv() => {}
                _ = terminate.recv() => {}
            }
            info!("Shutdown requested; finishing the current download");
            token.cancel();
        })
    };

    #[cfg(not(unix))]
    let handle = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested; finishing the current download");
            token.cancel();
        }
    });

    Ok(ShutdownListener { handle })
}
