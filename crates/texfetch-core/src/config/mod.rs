//! Configuration management for texfetch.
//!
//! Configuration is loaded from the platform config directory with defaults
//! matching the production CDN and conversion service. Every section is
//! `#[serde(default)]`, so a config file only needs the keys it changes.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for texfetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input/output file locations
    pub paths: PathsConfig,

    /// CDN and conversion service endpoints
    pub endpoints: EndpointConfig,

    /// Worker pool settings
    pub processing: ProcessingConfig,

    /// HTTP timeout, retry and pooling settings
    pub transport: TransportConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// - macOS: ~/Library/Application Support/com.texfetch.texfetch/config.toml
    /// - Linux: ~/.config/texfetch/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\texfetch\config\config.toml
    ///
    /// Falls back to ~/.texfetch/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "texfetch", "texfetch")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".texfetch").join("config.toml")
            })
    }

    /// Catalog path with ~ expanded.
    pub fn catalog_path(&self) -> PathBuf {
        expand(&self.paths.catalog)
    }

    /// Output directory with ~ expanded.
    pub fn output_dir(&self) -> PathBuf {
        expand(&self.paths.output_dir)
    }

    /// Failure ledger path with ~ expanded.
    pub fn ledger_path(&self) -> PathBuf {
        expand(&self.paths.failure_ledger)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

fn expand(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&path_str).into_owned())
}
