//! texfetch core - batch texture fetch-and-convert pipeline.
//!
//! For every item in a catalog, texfetch downloads an ASTC texture from a CDN,
//! uploads it to a conversion service, pulls the base64 PNG out of the HTML
//! response, flips it vertically and writes `{id}.png`.
//!
//! # Architecture
//!
//! ```text
//! Catalog → BatchController ─┬─ worker 0 ─┐
//!                            ├─ worker 1 ─┼─ ItemPipeline: fetch → convert → extract → finalize
//!                            └─ worker N ─┘        │
//!                                                  └─ failures → FailureSink → FailureLedger
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use texfetch_core::{load_catalog, BatchController, Config, FailureLedger};
//!
//! #[tokio::main]
//! async fn main() -> texfetch_core::Result<()> {
//!     let config = Config::load()?;
//!     let ids = load_catalog(&config.catalog_path())?;
//!     std::fs::create_dir_all(config.output_dir())?;
//!
//!     let controller = BatchController::new(&config);
//!     let summary = controller.run(ids, |outcome| println!("{outcome}")).await;
//!     FailureLedger::new(config.ledger_path()).persist(&summary.failures)?;
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod catalog;
pub mod config;
pub mod error;
pub mod fs;
pub mod ledger;
pub mod pipeline;
pub mod stages;
pub mod transport;
pub mod types;

pub use batch::BatchController;
pub use catalog::load_catalog;
pub use config::{Config, OverwritePolicy};
pub use error::{CatalogError, ConfigError, Result, StageError, TexfetchError};
pub use ledger::{FailureLedger, FailureSink, LedgerAction};
pub use pipeline::ItemPipeline;
pub use transport::TransportPool;
pub use types::{BatchSummary, FailureRecord, ItemId, ItemOutcome};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
