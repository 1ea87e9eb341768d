//! The four per-item stages, leaf to root:
//! - **fetch**: download the ASTC asset from the CDN
//! - **convert**: upload it to the conversion service
//! - **extract**: pull the base64 PNG out of the service's HTML
//! - **finalize**: decode, flip vertically, and write the PNG
//!
//! Each stage returns a [`StageResult`](crate::error::StageResult); the item
//! pipeline short-circuits on the first error.

pub mod convert;
pub mod extract;
pub mod fetch;
pub mod finalize;

pub use convert::convert_asset;
pub use extract::extract_png;
pub use fetch::fetch_asset;
pub use finalize::{finalize_png, flip_vertical};
