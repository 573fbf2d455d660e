//! CLI entry point.
//!
//! `init` runs before bootstrap because it writes the configuration that
//! bootstrap reads. Every other command gets a fully composed
//! [`CliContext`](ytdlm_cli::CliContext).

use std::process::ExitCode;

use clap::{CommandFactory, Parser};

use ytdlm_cli::{Cli, CliError, Commands, bootstrap, handlers, logging};

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let _log_guard = logging::init(cli.verbose);

    let Some(command) = cli.command else {
        // No command provided - show help
        return match Cli::command().print_help() {
            Ok(()) => ExitCode::SUCCESS,
            Err(_) => ExitCode::FAILURE,
        };
    };

    match run(command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            eprintln!("Error: {e:#}");
            ExitCode::from(u8::try_from(CliError::exit_code_for(&e)).unwrap_or(1))
        }
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    if let Commands::Init { force, target_dir } = &command {
        return handlers::init::execute(*force, target_dir.as_deref());
    }

    let ctx = bootstrap().await?;

    match command {
        Commands::Init { .. } => unreachable!("init runs before bootstrap"),
        Commands::Add { url, download } => handlers::add::execute(&ctx, &url, download).await,
        Commands::Daemon { once } => handlers::daemon::execute(&ctx, once).await,
        Commands::Status => handlers::status::execute(&ctx).await,
        Commands::List { status, limit } => {
            handlers::list::execute(&ctx, status.map(Into::into), limit).await
        }
        Commands::Retry { ids, failed } => handlers::retry::execute(&ctx, &ids, failed).await,
        Commands::Redownload { ids } => handlers::redownload::execute(&ctx, &ids).await,
        Commands::Remove { ids, dry_run } => {
            handlers::remove::execute(&ctx, &ids, dry_run).await
        }
        Commands::Search { pattern } => handlers::search::execute(&ctx, &pattern).await,
    }
}
