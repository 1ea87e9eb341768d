//! Error types for the texfetch pipeline.
//!
//! Errors are split by layer: configuration and catalog errors are fatal and
//! stop a run before any item is dispatched, while [`StageError`] is local to a
//! single item. The `Display` text of a `StageError` is exactly the cause string
//! written to the failure ledger, so keep those messages short and stable.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for texfetch operations.
#[derive(Error, Debug)]
pub enum TexfetchError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Catalog loading errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Failure ledger read/write errors
    #[error("Ledger error for {path}: {message}")]
    Ledger { path: PathBuf, message: String },

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised while loading the item catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The catalog file does not exist
    #[error("{} not found!", .0.display())]
    NotFound(PathBuf),

    /// The catalog file exists but could not be read
    #[error("Failed to read catalog {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog is not a JSON array of objects
    #[error("Failed to parse catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Which remote call produced an HTTP status failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteStage {
    /// CDN asset download
    Asset,
    /// Conversion service upload
    Conversion,
}

impl std::fmt::Display for RemoteStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteStage::Asset => write!(f, "ASTC"),
            RemoteStage::Conversion => write!(f, "CONVERT"),
        }
    }
}

/// Per-item stage failures. Terminal for the item, never for the batch.
#[derive(Error, Debug)]
pub enum StageError {
    /// Connection failure or timeout that survived transport retries
    #[error("{stage} REQUEST FAILED: {message}")]
    Transport { stage: RemoteStage, message: String },

    /// Remote endpoint answered with a non-200 status
    #[error("{stage} HTTP {status}")]
    Http { stage: RemoteStage, status: u16 },

    /// CDN answered 200 with an empty body
    #[error("ASTC EMPTY BODY")]
    EmptyAsset,

    /// Item id cannot be used as a file name or URL segment
    #[error("INVALID ITEM ID")]
    UnsafeId,

    /// Conversion response carried no embedded PNG
    #[error("PNG DATA NOT FOUND")]
    PayloadNotFound,

    /// Embedded payload was not valid base64
    #[error("PNG DATA INVALID BASE64: {0}")]
    InvalidPayload(String),

    /// Payload bytes could not be decoded as an image
    #[error("IMAGE DECODE FAILED: {0}")]
    Decode(String),

    /// Flipped image could not be encoded
    #[error("IMAGE ENCODE FAILED: {0}")]
    Encode(String),

    /// Writing the artifact to disk failed
    #[error("WRITE FAILED for {path}: {message}")]
    Io { path: PathBuf, message: String },

    /// A worker's HTTP client could not be constructed
    #[error("HTTP CLIENT INIT FAILED: {0}")]
    ClientBuild(String),
}

/// Convenience type alias for texfetch results.
pub type Result<T> = std::result::Result<T, TexfetchError>;

/// Convenience type alias for per-item stage results.
pub type StageResult<T> = std::result::Result<T, StageError>;
