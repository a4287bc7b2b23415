//! Command-line interface for the tipsheet prediction store.

pub mod commands;
pub mod id_resolver;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tipsheet")]
#[command(version)]
#[command(about = "Offline-first tracker for sports predictions", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file to load instead of .tipsheet/config.yaml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the .tipsheet directory and database
    Init(commands::init::InitArgs),
    /// Record a new prediction
    Add(commands::add::AddArgs),
    /// List recent predictions
    List(commands::list::ListArgs),
    /// Show one prediction in full
    Show(commands::show::ShowArgs),
    /// Pin, show, or clear the current prediction
    Current(commands::current::CurrentArgs),
    /// Delete a prediction
    Delete(commands::delete::DeleteArgs),
    /// Remove every prediction
    Clear(commands::clear::ClearArgs),
    /// Pull remote history and push the unsynced queue
    Sync(commands::sync::SyncArgs),
    /// Show store statistics
    Stats(commands::stats::StatsArgs),
    /// Watch live events, reconciliation, and sync in the foreground
    Watch(commands::watch::WatchArgs),
}

/// Print an error in the requested format and exit non-zero.
pub fn handle_error(err: &anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let payload = serde_json::json!({
            "success": false,
            "error": format!("{err:#}"),
        });
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&payload).unwrap_or_default()
        );
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_structure_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add_single() {
        let cli = Cli::try_parse_from([
            "tipsheet", "add", "Lakers win", "--probability", "0.6", "--league", "nba",
        ])
        .unwrap();
        assert!(!cli.json);
        match cli.command {
            Commands::Add(args) => {
                assert_eq!(args.factor.as_deref(), Some("Lakers win"));
                assert_eq!(args.probability, Some(0.6));
                assert_eq!(args.league.as_deref(), Some("nba"));
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_parse_add_rejects_factor_and_legs() {
        let result = Cli::try_parse_from([
            "tipsheet", "add", "Lakers win", "--leg", "Heat cover:0.5",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_global_json_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["tipsheet", "list", "--json"]).unwrap();
        assert!(cli.json);
    }

    #[test]
    fn test_parse_current_clear_conflicts_with_id() {
        let result = Cli::try_parse_from(["tipsheet", "current", "abc123", "--clear"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_watch_duration() {
        let cli = Cli::try_parse_from(["tipsheet", "watch", "--duration", "30"]).unwrap();
        match cli.command {
            Commands::Watch(args) => assert_eq!(args.duration, Some(30)),
            _ => panic!("expected watch"),
        }
    }
}
