//! The `texfetch config` command.
//!
//! Every subcommand acts on the active config file: the `--config` path when
//! given, the platform default otherwise.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use texfetch_core::Config;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show {
        /// Print the built-in defaults instead
        #[arg(long)]
        defaults: bool,
    },

    /// Print the active config file path
    Path,

    /// Write the built-in defaults to the active config file
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate the configuration and print the resolved locations
    Check,
}

/// Execute the config command.
pub async fn execute(
    args: ConfigArgs,
    config: Config,
    explicit_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let path = active_path(explicit_path);

    match args.command {
        ConfigCommand::Show { defaults } => {
            let shown = if defaults { Config::default() } else { config };
            println!("{}", shown.to_toml()?);
        }

        ConfigCommand::Path => {
            let state = if path.exists() { "" } else { " (not created)" };
            println!("{}{state}", path.display());
        }

        ConfigCommand::Init { force } => {
            write_defaults(&path, force)?;
            tracing::info!("Config file written to {:?}", path);
            println!("Configuration initialized at: {}", path.display());
        }

        ConfigCommand::Check => {
            config.validate()?;
            println!("Config OK ({})", path.display());
            for line in describe(&config) {
                println!("  {line}");
            }
        }
    }

    Ok(())
}

fn active_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(Config::default_path)
}

/// Write `Config::default()` to `path`, refusing to clobber without `force`.
fn write_defaults(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at: {}\nUse --force to overwrite.",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, Config::default().to_toml()?)?;
    Ok(())
}

/// Resolved locations and limits a run would use.
fn describe(config: &Config) -> Vec<String> {
    vec![
        format!("catalog:  {}", config.catalog_path().display()),
        format!("output:   {}", config.output_dir().display()),
        format!("ledger:   {}", config.ledger_path().display()),
        format!("asset:    {}", config.endpoints.cdn_url_template),
        format!("convert:  {}", config.endpoints.convert_url),
        format!(
            "workers:  {} (existing files: {})",
            config.processing.workers, config.processing.overwrite
        ),
    ]
}
