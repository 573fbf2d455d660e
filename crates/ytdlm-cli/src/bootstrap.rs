//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter: configuration, the `SQLite` pool, the queue
//! service and the yt-dlp fetcher.

use std::sync::Arc;

use anyhow::Result;
use tracing::debug;
use ytdlm_core::{AppConfig, DaemonConfig, MediaFetcherPort, QueueService, load_config};
use ytdlm_db::CoreFactory;
use ytdlm_download::{DownloadDaemon, YtDlpFetcher};

use crate::error::CliError;

/// Fully composed application context for CLI commands.
pub struct CliContext {
    /// Effective configuration (defaults, config file, environment).
    pub config: AppConfig,
    /// The download queue.
    pub queue: QueueService,
    fetcher: Option<Arc<dyn MediaFetcherPort>>,
}

impl CliContext {
    /// Access the effective configuration.
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Access the queue service.
    pub const fn queue(&self) -> &QueueService {
        &self.queue
    }

    /// Use `fetcher` instead of locating yt-dlp on first use.
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Arc<dyn MediaFetcherPort>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// The media fetcher.
    ///
    /// yt-dlp is located lazily so commands that never download work
    /// without it installed.
    pub fn fetcher(&self) -> Result<Arc<dyn MediaFetcherPort>, CliError> {
        if let Some(fetcher) = &self.fetcher {
            return Ok(Arc::clone(fetcher));
        }
        let located = YtDlpFetcher::locate()?;
        debug!(program = %located.program().display(), "Using yt-dlp");
        Ok(Arc::new(located))
    }

    /// Daemon settings derived from the configuration.
    pub fn daemon_config(&self) -> DaemonConfig {
        DaemonConfig::from(&self.config)
    }

    /// Build a daemon over this context's queue and fetcher.
    pub fn build_daemon(&self) -> Result<DownloadDaemon, CliError> {
        Ok(DownloadDaemon::new(
            self.queue.clone(),
            self.fetcher()?,
            self.daemon_config(),
        ))
    }
}

/// Bootstrap the CLI application.
///
/// Loads configuration, opens (and if needed creates) the store and
/// assembles the queue service.
pub async fn bootstrap() -> Result<CliContext> {
    let config = load_config().map_err(CliError::from)?;
    let pool = CoreFactory::create_pool(&config.database_path)
        .await
        .map_err(|e| CliError::Database(format!("{e:#}")))?;
    debug!(database = %config.database_path.display(), "Store opened");

    let queue = CoreFactory::build_queue(pool);
    Ok(bootstrap_with(config, queue))
}

/// Bootstrap with an already-built queue (for testing).
pub fn bootstrap_with(config: AppConfig, queue: QueueService) -> CliContext {
    CliContext {
        config,
        queue,
        fetcher: None,
    }
}
