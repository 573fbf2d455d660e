//! Main CLI parser and top-level argument handling.

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the download queue manager.
#[derive(Parser)]
#[command(name = "yt-dl-manager")]
#[command(about = "Queue media URLs and download them with yt-dlp")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::StatusArg;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_verbose_after_subcommand() {
        let cli = Cli::parse_from(["yt-dl-manager", "status", "--verbose"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Commands::Status)));
    }

    #[test]
    fn test_add_with_download_flag() {
        let cli = Cli::parse_from(["yt-dl-manager", "add", "https://x.test/v", "--download"]);
        match cli.command {
            Some(Commands::Add { url, download }) => {
                assert_eq!(url, "https://x.test/v");
                assert!(download);
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_list_parses_status_and_limit() {
        let cli = Cli::parse_from(["yt-dl-manager", "list", "failed", "--limit", "5"]);
        match cli.command {
            Some(Commands::List { status, limit }) => {
                assert_eq!(status, Some(StatusArg::Failed));
                assert_eq!(limit, Some(5));
            }
            _ => panic!("expected list"),
        }

        let cli = Cli::parse_from(["yt-dl-manager", "list"]);
        assert!(matches!(
            cli.command,
            Some(Commands::List { status: None, limit: None })
        ));
    }

    #[test]
    fn test_list_rejects_unknown_status() {
        assert!(Cli::try_parse_from(["yt-dl-manager", "list", "queued"]).is_err());
    }

    #[test]
    fn test_retry_needs_ids_or_failed_flag() {
        assert!(Cli::try_parse_from(["yt-dl-manager", "retry"]).is_err());
        assert!(Cli::try_parse_from(["yt-dl-manager", "retry", "1", "--failed"]).is_err());

        let cli = Cli::parse_from(["yt-dl-manager", "retry", "--failed"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Retry { failed: true, ref ids }) if ids.is_empty()
        ));
    }

    #[test]
    fn test_remove_collects_ids() {
        let cli = Cli::parse_from(["yt-dl-manager", "remove", "3", "7", "--dry-run"]);
        match cli.command {
            Some(Commands::Remove { ids, dry_run }) => {
                assert_eq!(ids, [3, 7]);
                assert!(dry_run);
            }
            _ => panic!("expected remove"),
        }
    }
}
