//! Core data types shared by the pipeline, the batch controller and the CLI.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::Duration;

/// Catalog key naming one texture asset.
///
/// Numeric identifiers order numerically and before non-numeric ones, so
/// `"9"` sorts ahead of `"10"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Artifact file name for this item.
    pub fn png_file_name(&self) -> String {
        format!("{}.png", self.0)
    }

    /// File name used for the conversion upload.
    pub fn astc_file_name(&self) -> String {
        format!("{}.astc", self.0)
    }

    /// Whether the id can be used as a bare file stem and URL segment.
    ///
    /// Rejects empty ids, `.` and `..`, path separators, drive prefixes,
    /// URL delimiters and control characters.
    pub fn is_file_safe(&self) -> bool {
        !self.0.is_empty()
            && self.0 != "."
            && self.0 != ".."
            && !self
                .0
                .chars()
                .any(|c| matches!(c, '/' | '\\' | ':' | '?' | '#') || c.is_control())
    }

    fn numeric(&self) -> Option<u128> {
        self.0.parse().ok()
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Ord for ItemId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for ItemId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One entry of the failure ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    #[serde(rename = "itemID")]
    pub item_id: ItemId,

    /// Human-readable cause
    pub error: String,
}

/// Result of running one item through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Artifact already present; no network calls were made
    Skipped(ItemId),
    /// Artifact written
    Succeeded(ItemId),
    /// Some stage failed; the record was also pushed to the failure sink
    Failed(FailureRecord),
}

impl ItemOutcome {
    pub fn item_id(&self) -> &ItemId {
        match self {
            ItemOutcome::Skipped(id) | ItemOutcome::Succeeded(id) => id,
            ItemOutcome::Failed(record) => &record.item_id,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, ItemOutcome::Skipped(_))
    }
}

impl std::fmt::Display for ItemOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemOutcome::Skipped(id) => write!(f, "SKIPPED {}", id.png_file_name()),
            ItemOutcome::Succeeded(id) => write!(f, "UPDATED {}", id.png_file_name()),
            ItemOutcome::Failed(record) => write!(f, "FAILED {} | {}", record.item_id, record.error),
        }
    }
}

/// Aggregate result of one batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub succeeded: u64,
    pub failed: u64,
    pub skipped: u64,
    pub elapsed: Duration,

    /// Every failure recorded during the run, in no particular order
    pub failures: Vec<FailureRecord>,
}

impl BatchSummary {
    pub fn total(&self) -> u64 {
        self.succeeded + self.failed + self.skipped
    }

    /// Items actually processed (not skipped) per second.
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            (self.succeeded + self.failed) as f64 / secs
        } else {
            0.0
        }
    }

    pub(crate) fn tally(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Skipped(_) => self.skipped += 1,
            ItemOutcome::Succeeded(_) => self.succeeded += 1,
            ItemOutcome::Failed(_) => self.failed += 1,
        }
    }
}
