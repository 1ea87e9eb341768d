//! Embedded PNG extraction from the conversion service's HTML.

use std::sync::LazyLock;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use regex::Regex;

use crate::error::{StageError, StageResult};

static PNG_DATA_URI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"src="data:image/png;base64,([^"]+)""#).expect("valid data URI pattern")
});

/// Find the first `src="data:image/png;base64,..."` payload and decode it.
///
/// Later matches are ignored. Whitespace inside the payload (line-wrapped
/// data URIs) is dropped before decoding.
pub fn extract_png(body: &str) -> StageResult<Vec<u8>> {
    let payload = PNG_DATA_URI
        .captures(body)
        .and_then(|caps| caps.get(1))
        .ok_or(StageError::PayloadNotFound)?;

    let compact: Vec<u8> = payload
        .as_str()
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    BASE64
        .decode(compact)
        .map_err(|e| StageError::InvalidPayload(e.to_string()))
}
