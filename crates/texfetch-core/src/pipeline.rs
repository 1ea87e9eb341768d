//! Per-item orchestration: skip check, then fetch → convert → extract → finalize.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{Config, EndpointConfig, OverwritePolicy};
use crate::error::{StageError, StageResult};
use crate::ledger::FailureSink;
use crate::stages::{convert_asset, extract_png, fetch_asset, finalize_png};
use crate::transport::TransportPool;
use crate::types::{FailureRecord, ItemId, ItemOutcome};

/// Runs one item at a time on behalf of a worker.
///
/// Shared by all workers; each call names the calling worker so the right
/// HTTP client is used.
pub struct ItemPipeline {
    transport: TransportPool,
    endpoints: EndpointConfig,
    output_dir: PathBuf,
    overwrite: OverwritePolicy,
    cooldown: Duration,
    sink: FailureSink,
}

impl ItemPipeline {
    pub fn new(config: &Config, transport: TransportPool, sink: FailureSink) -> Self {
        Self {
            transport,
            endpoints: config.endpoints.clone(),
            output_dir: config.output_dir(),
            overwrite: config.processing.overwrite,
            cooldown: Duration::from_millis(config.processing.failure_cooldown_ms),
            sink,
        }
    }

    /// Where the artifact for `id` lives.
    pub fn destination(&self, id: &ItemId) -> PathBuf {
        self.output_dir.join(id.png_file_name())
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn transport(&self) -> &TransportPool {
        &self.transport
    }

    /// Process one item.
    ///
    /// Never fails: stage errors become [`ItemOutcome::Failed`], are pushed to
    /// the failure sink, and are followed by the failure cooldown.
    pub async fn process(&self, worker: usize, id: ItemId) -> ItemOutcome {
        if !id.is_file_safe() {
            return self.fail(worker, id, StageError::UnsafeId).await;
        }

        let dest = self.destination(&id);
        if self.overwrite == OverwritePolicy::Skip && dest.exists() {
            tracing::trace!("{id}: {:?} exists, skipping", dest);
            return ItemOutcome::Skipped(id);
        }

        match self.run_stages(worker, &id, dest).await {
            Ok(()) => {
                tracing::debug!("{id}: done (worker {worker})");
                ItemOutcome::Succeeded(id)
            }
            Err(e) => self.fail(worker, id, e).await,
        }
    }

    async fn fail(&self, worker: usize, id: ItemId, e: StageError) -> ItemOutcome {
        tracing::debug!("{id}: failed (worker {worker}): {e}");
        let record = FailureRecord {
            item_id: id,
            error: e.to_string(),
        };
        self.sink.push(record.clone());
        if !self.cooldown.is_zero() {
            tokio::time::sleep(self.cooldown).await;
        }
        ItemOutcome::Failed(record)
    }

    async fn run_stages(&self, worker: usize, id: &ItemId, dest: PathBuf) -> StageResult<()> {
        let client = self.transport.client(worker)?;

        let asset = fetch_asset(client, &self.endpoints, id).await?;
        let body = convert_asset(client, &self.endpoints, id, &asset).await?;
        drop(asset);

        let png = extract_png(&body)?;
        drop(body);

        finalize_png(png, dest).await
    }
}
