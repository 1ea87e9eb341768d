//! Sub-configuration structs with defaults matching the production endpoints.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// File locations for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// JSON catalog of items to process
    pub catalog: PathBuf,

    /// Directory receiving `{id}.png` artifacts
    pub output_dir: PathBuf,

    /// JSON ledger of items that failed in the most recent run
    pub failure_ledger: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            catalog: PathBuf::from("OB52.json"),
            output_dir: PathBuf::from("IMAGE"),
            failure_ledger: PathBuf::from("failed_items.json"),
        }
    }
}

/// Remote endpoints and the request identity the conversion service expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// CDN asset URL; `{id}` is replaced by the item identifier
    pub cdn_url_template: String,

    /// Conversion service upload URL
    pub convert_url: String,

    /// User-Agent header sent on every request
    pub user_agent: String,

    /// Origin header sent to the conversion service
    pub origin: String,

    /// Referer header sent to the conversion service
    pub referer: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            cdn_url_template:
                "https://dl.cdn.freefiremobile.com/live/ABHotUpdates/IconCDN/android/{id}_rgb.astc"
                    .to_string(),
            convert_url: "https://astc2png.deaddos.online/".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            origin: "https://astc2png.deaddos.online".to_string(),
            referer: "https://astc2png.deaddos.online/".to_string(),
        }
    }
}

impl EndpointConfig {
    /// Resolve the CDN URL for one item.
    pub fn asset_url(&self, id: &str) -> String {
        self.cdn_url_template.replace("{id}", id)
    }
}

/// What to do when `{id}.png` already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwritePolicy {
    /// Leave existing artifacts alone and make no network calls for them
    #[default]
    Skip,
    /// Always re-fetch and replace existing artifacts
    Overwrite,
}

impl std::fmt::Display for OverwritePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverwritePolicy::Skip => write!(f, "skip"),
            OverwritePolicy::Overwrite => write!(f, "overwrite"),
        }
    }
}

/// Worker pool and per-item behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Number of concurrent workers
    pub workers: usize,

    /// Existing-artifact policy
    pub overwrite: OverwritePolicy,

    /// Pause after a failed item, in milliseconds
    pub failure_cooldown_ms: u64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            workers: 20,
            overwrite: OverwritePolicy::Skip,
            failure_cooldown_ms: 1000,
        }
    }
}

/// HTTP transport settings, applied per worker client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,

    /// Retries after the first attempt for transient failures
    pub retries: u32,

    /// Backoff before the first retry; doubles on each further retry
    pub backoff_base_ms: u64,

    /// Idle connections kept per host
    pub pool_max_idle_per_host: usize,

    /// HTTP statuses treated as transient
    pub retry_statuses: Vec<u16>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 25_000,
            retries: 3,
            backoff_base_ms: 500,
            pool_max_idle_per_host: 100,
            retry_statuses: vec![429, 500, 502, 503, 504],
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
