//! Failure collection during a run and the on-disk ledger afterwards.
//!
//! Workers push into a shared [`FailureSink`]. At the end of a run the
//! controller drains it and [`FailureLedger::persist`] replaces whatever the
//! previous run left behind: a new ledger when there were failures, no file
//! at all when there were none. Ledgers are never merged.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::TexfetchError;
use crate::fs::write_atomic;
use crate::types::{FailureRecord, ItemId};

/// Append-only failure collection shared by all workers.
#[derive(Debug, Clone, Default)]
pub struct FailureSink {
    records: Arc<Mutex<Vec<FailureRecord>>>,
}

impl FailureSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, record: FailureRecord) {
        self.lock().push(record);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Take every record collected so far.
    pub fn drain(&self) -> Vec<FailureRecord> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<FailureRecord>> {
        // Poison is ignored: a push either completed or never happened.
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// What `persist` did to the ledger file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerAction {
    /// Ledger written with this many records
    Written(usize),
    /// A previous ledger was deleted because the run had no failures
    Removed,
    /// No failures and no previous ledger
    Unchanged,
}

/// Reads and writes the JSON failure ledger.
pub struct FailureLedger {
    path: PathBuf,
}

impl FailureLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the ledger with `records`, or remove it if `records` is empty.
    ///
    /// Records are written sorted by item id, pretty-printed.
    pub fn persist(&self, records: &[FailureRecord]) -> Result<LedgerAction, TexfetchError> {
        if records.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path).map_err(|e| self.error(e))?;
                tracing::info!("Removed stale failure ledger {:?}", self.path);
                return Ok(LedgerAction::Removed);
            }
            return Ok(LedgerAction::Unchanged);
        }

        let mut sorted = records.to_vec();
        sorted.sort_by(|a, b| a.item_id.cmp(&b.item_id));
        let json = serde_json::to_string_pretty(&sorted)?;
        write_atomic(&self.path, json.as_bytes()).map_err(|e| self.error(e))?;
        tracing::info!("Wrote {} failure(s) to {:?}", sorted.len(), self.path);
        Ok(LedgerAction::Written(sorted.len()))
    }

    /// Load the records of a previous run. A missing ledger means no failures.
    pub fn load(&self) -> Result<Vec<FailureRecord>, TexfetchError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path).map_err(|e| self.error(e))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Item ids from the previous run's ledger, sorted and de-duplicated.
    ///
    /// Ids that are not safe as file names are skipped with a warning.
    pub fn failed_ids(&self) -> Result<Vec<ItemId>, TexfetchError> {
        let mut ids: Vec<ItemId> = self
            .load()?
            .into_iter()
            .map(|r| r.item_id)
            .filter(|id| {
                let safe = id.is_file_safe();
                if !safe {
                    tracing::warn!("Ignoring ledger entry {:?} in {:?}", id.as_str(), self.path);
                }
                safe
            })
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    fn error(&self, e: std::io::Error) -> TexfetchError {
        TexfetchError::Ledger {
            path: self.path.clone(),
            message: e.to_string(),
        }
    }
}
