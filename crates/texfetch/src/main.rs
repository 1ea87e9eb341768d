//! texfetch CLI - batch fetch ASTC textures and convert them to PNG.
//!
//! Reads a catalog of item ids, downloads each item's ASTC texture from the
//! CDN, runs it through the conversion service and writes a vertically
//! flipped `{id}.png` into the output directory. Items that already have a
//! PNG are skipped; items that fail are recorded in a JSON failure ledger.
//!
//! # Usage
//!
//! ```bash
//! # Process every item in ./OB52.json into ./IMAGE
//! texfetch run
//!
//! # Re-run only the items from the last failure ledger
//! texfetch run --retry-failed
//!
//! # View configuration
//! texfetch config show
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use texfetch_core::Config;

mod cli;
mod logging;

/// texfetch - batch ASTC to PNG texture fetcher.
#[derive(Parser, Debug)]
#[command(name = "texfetch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true, env = "TEXFETCH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch and convert every catalog item
    Run(cli::run::RunArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match &cli.config {
        Some(path) if path.exists() => Config::load_from(path)?,
        Some(path) => {
            eprintln!(
                "Warning: {} does not exist, using default configuration.",
                path.display()
            );
            Config::default()
        }
        None => match Config::load() {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "Warning: Failed to load config: {e}\n  \
                     Using default configuration. Check your config file with `texfetch config path`."
                );
                Config::default()
            }
        },
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("texfetch v{}", texfetch_core::VERSION);

    match cli.command {
        Commands::Run(args) => cli::run::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, config, cli.config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_run() {
        let cli = Cli::try_parse_from(["texfetch", "run"]).unwrap();
        assert!(!cli.verbose);
        assert!(cli.config.is_none());
        match cli.command {
            Commands::Run(args) => {
                assert!(args.workers.is_none());
                assert!(!args.overwrite);
                assert!(!args.retry_failed);
            }
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "texfetch",
            "run",
            "--workers",
            "5",
            "-v",
            "--config",
            "/tmp/texfetch.toml",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/texfetch.toml")));
        match cli.command {
            Commands::Run(args) => assert_eq!(args.workers, Some(5)),
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_config_init_force() {
        let cli = Cli::try_parse_from(["texfetch", "config", "init", "--force"]).unwrap();
        match cli.command {
            Commands::Config(args) => assert!(matches!(
                args.command,
                cli::config::ConfigCommand::Init { force: true }
            )),
            other => panic!("expected config, got {other:?}"),
        }
    }
}
