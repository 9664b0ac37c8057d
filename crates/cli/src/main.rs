//! Vigil CLI - vigil command

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;
mod util;

/// Vigil - watch files and directories for changes
#[derive(Parser, Debug)]
#[command(name = "vigil")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/vigil/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Watch a file or directory and print changes as they happen
    Watch(WatchArgs),
    /// Poll files on an interval and print the ones that changed
    Poll(PollArgs),
    /// Show configuration
    Config {
        /// Print a commented example config
        #[arg(long, conflicts_with = "path")]
        example: bool,
        /// Print the config file location
        #[arg(long)]
        path: bool,
    },
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// File or directory to watch
    pub path: PathBuf,

    /// Include sub-directories
    #[arg(short, long)]
    pub recursive: bool,

    /// Event classes, e.g. "file_name,last_write" (default: from config)
    #[arg(long)]
    pub events: Option<String>,

    /// Coalesce repeated modifications within this window
    #[arg(long)]
    pub debounce_ms: Option<u64>,

    /// Print one JSON object per line
    #[arg(long)]
    pub json: bool,

    /// How often to drain pending notifications
    #[arg(long)]
    pub interval_ms: Option<u64>,
}

#[derive(Args, Debug)]
pub struct PollArgs {
    /// Files to poll
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Event classes to compare (default: from config)
    #[arg(long)]
    pub events: Option<String>,

    /// Poll interval
    #[arg(long)]
    pub interval_ms: Option<u64>,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli.config.clone().or_else(util::default_config_path);

    match cli.command {
        Commands::Watch(args) => {
            let config = util::load_config(config_path.as_deref())?;
            cmd::watch::run(args, config).await
        }
        Commands::Poll(args) => {
            let config = util::load_config(config_path.as_deref())?;
            cmd::poll::run(args, config).await
        }
        Commands::Config { example, path } => cmd::config::run(config_path.as_deref(), example, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_watch() {
        let cli = Cli::try_parse_from([
            "vigil", "-vv", "watch", "/tmp/x", "--recursive", "--events", "file_name,size", "--json",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Watch(args) => {
                assert_eq!(args.path, PathBuf::from("/tmp/x"));
                assert!(args.recursive);
                assert!(args.json);
                assert_eq!(args.events.as_deref(), Some("file_name,size"));
                assert_eq!(args.debounce_ms, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_poll_requires_paths() {
        assert!(Cli::try_parse_from(["vigil", "poll"]).is_err());

        let cli = Cli::try_parse_from(["vigil", "poll", "a", "b", "--interval-ms", "50"]).unwrap();
        match cli.command {
            Commands::Poll(args) => {
                assert_eq!(args.paths.len(), 2);
                assert_eq!(args.interval_ms, Some(50));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_config_flags_conflict() {
        assert!(Cli::try_parse_from(["vigil", "config", "--example", "--path"]).is_err());
        assert!(Cli::try_parse_from(["vigil", "--config", "c.toml", "config"]).is_ok());
    }
}
