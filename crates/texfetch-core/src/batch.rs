//! Batch controller: a fixed pool of workers draining a FIFO queue of items.
//!
//! Items are queued in the order given (callers pass them sorted). Each worker
//! takes the next item, runs it to completion, reports the outcome and takes
//! another. Outcomes are delivered to the caller in arrival order, not queue
//! order.

use std::sync::Arc;
use std::time::Instant;

use futures_util::future::join_all;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinError;

use crate::config::Config;
use crate::ledger::FailureSink;
use crate::pipeline::ItemPipeline;
use crate::transport::TransportPool;
use crate::types::{BatchSummary, FailureRecord, ItemId, ItemOutcome};

/// Dispatches items across a bounded set of workers.
pub struct BatchController {
    pipeline: Arc<ItemPipeline>,
    workers: usize,
    sink: FailureSink,
}

impl BatchController {
    /// Build a controller, its transport pool and failure sink from `config`.
    pub fn new(config: &Config) -> Self {
        let workers = config.processing.workers.max(1);
        let sink = FailureSink::new();
        let transport =
            TransportPool::new(&config.transport, &config.endpoints.user_agent, workers);
        let pipeline = ItemPipeline::new(config, transport, sink.clone());
        Self {
            pipeline: Arc::new(pipeline),
            workers,
            sink,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn pipeline(&self) -> &ItemPipeline {
        &self.pipeline
    }

    /// Process every id and return the run summary.
    ///
    /// `on_outcome` is called once per item as it completes. The returned
    /// summary carries every failure recorded during this run.
    pub async fn run<F>(&self, ids: Vec<ItemId>, mut on_outcome: F) -> BatchSummary
    where
        F: FnMut(&ItemOutcome),
    {
        let start = Instant::now();
        let total = ids.len();
        tracing::info!("Dispatching {total} item(s) across {} worker(s)", self.workers);

        let (queue_tx, queue_rx) = mpsc::unbounded_channel::<ItemId>();
        for id in ids {
            // Receiver is alive until the workers below exit.
            let _ = queue_tx.send(id);
        }
        drop(queue_tx);
        let queue = Arc::new(Mutex::new(queue_rx));

        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<ItemOutcome>();
        let handles: Vec<_> = (0..self.workers.min(total))
            .map(|worker| {
                let queue = queue.clone();
                let pipeline = self.pipeline.clone();
                let sink = self.sink.clone();
                let done_tx = done_tx.clone();
                tokio::spawn(async move {
                    loop {
                        let next = queue.lock().await.recv().await;
                        let Some(id) = next else { break };
                        let item = {
                            let pipeline = pipeline.clone();
                            let id = id.clone();
                            tokio::spawn(async move { pipeline.process(worker, id).await })
                        };
                        let outcome = settle(id, item.await, &sink);
                        if done_tx.send(outcome).is_err() {
                            break;
                        }
                    }
                })
            })
            .collect();
        drop(done_tx);

        let mut summary = BatchSummary::default();
        while let Some(outcome) = done_rx.recv().await {
            summary.tally(&outcome);
            on_outcome(&outcome);
        }

        for result in join_all(handles).await {
            if let Err(e) = result {
                tracing::error!("Worker task panicked: {e}");
            }
        }

        summary.failures = self.sink.drain();
        summary.elapsed = start.elapsed();
        tracing::info!(
            "Batch finished in {:?}: {} succeeded, {} failed, {} skipped",
            summary.elapsed,
            summary.succeeded,
            summary.failed,
            summary.skipped
        );
        summary
    }
}

/// Turn a finished item task into an outcome. A task that panicked or was
/// cancelled still yields exactly one failure record.
fn settle(
    id: ItemId,
    joined: Result<ItemOutcome, JoinError>,
    sink: &FailureSink,
) -> ItemOutcome {
    match joined {
        Ok(outcome) => outcome,
        Err(e) => {
            let cause = if e.is_panic() { "WORKER PANIC" } else { "WORKER CANCELLED" };
            tracing::error!("{id}: item task failed: {e}");
            let record = FailureRecord {
                item_id: id,
                error: cause.to_string(),
            };
            sink.push(record.clone());
            ItemOutcome::Failed(record)
        }
    }
}
