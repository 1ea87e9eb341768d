//! Per-worker HTTP clients with transport-level retry.
//!
//! The pool holds one lazily-built [`HttpClient`] slot per worker. A worker
//! only ever touches its own slot, so clients (and their connection pools) are
//! never shared across workers. Retries here are transparent to the pipeline:
//! a failure that reaches a stage has already exhausted them.

pub mod retry;

use std::sync::OnceLock;
use std::time::Duration;

use crate::config::TransportConfig;
use crate::error::{RemoteStage, StageError, StageResult};

/// Pool of per-worker HTTP clients.
pub struct TransportPool {
    slots: Vec<OnceLock<HttpClient>>,
    config: TransportConfig,
    user_agent: String,
}

impl TransportPool {
    /// Create a pool with one empty slot per worker.
    pub fn new(config: &TransportConfig, user_agent: &str, workers: usize) -> Self {
        Self {
            slots: (0..workers).map(|_| OnceLock::new()).collect(),
            config: config.clone(),
            user_agent: user_agent.to_string(),
        }
    }

    /// Get the client owned by `worker`, building it on first use.
    pub fn client(&self, worker: usize) -> StageResult<&HttpClient> {
        let slot = self
            .slots
            .get(worker)
            .ok_or_else(|| StageError::ClientBuild(format!("no transport slot for worker {worker}")))?;
        if let Some(client) = slot.get() {
            return Ok(client);
        }

        let client = HttpClient::new(&self.config, &self.user_agent)?;
        tracing::debug!("Worker {worker}: HTTP client initialized");
        Ok(slot.get_or_init(|| client))
    }

    /// Number of worker slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of clients built so far.
    pub fn initialized(&self) -> usize {
        self.slots.iter().filter(|slot| slot.get().is_some()).count()
    }
}

/// A `reqwest::Client` plus the retry policy applied to every request.
#[derive(Debug)]
pub struct HttpClient {
    inner: reqwest::Client,
    retries: u32,
    backoff_base_ms: u64,
    retry_statuses: Vec<u16>,
}

impl HttpClient {
    /// Build a client sized for the configured connection pool and timeout.
    pub fn new(config: &TransportConfig, user_agent: &str) -> StageResult<Self> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let inner = reqwest::Client::builder()
            .user_agent(user_agent)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| StageError::ClientBuild(e.to_string()))?;

        Ok(Self {
            inner,
            retries: config.retries,
            backoff_base_ms: config.backoff_base_ms,
            retry_statuses: config.retry_statuses.clone(),
        })
    }

    /// Send a request, retrying connection failures, timeouts and transient
    /// statuses with exponential backoff.
    ///
    /// `build` is called once per attempt, so request bodies that cannot be
    /// cloned (multipart forms) are rebuilt each time. When retries run out on
    /// a transient status the last response is returned as-is and the caller
    /// decides what the status means.
    pub async fn send<F>(&self, stage: RemoteStage, build: F) -> StageResult<reqwest::Response>
    where
        F: Fn(&reqwest::Client) -> reqwest::RequestBuilder,
    {
        let mut attempt = 0u32;
        loop {
            match build(&self.inner).send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if attempt < self.retries
                        && retry::is_retryable_status(status, &self.retry_statuses)
                    {
                        self.pause(stage, attempt, &format!("HTTP {status}")).await;
                        attempt += 1;
                        continue;
                    }
                    return Ok(response);
                }
                Err(e) => {
                    if attempt < self.retries && retry::is_retryable_error(&e) {
                        self.pause(stage, attempt, &e.to_string()).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(StageError::Transport {
                        stage,
                        message: e.to_string(),
                    });
                }
            }
        }
    }

    async fn pause(&self, stage: RemoteStage, attempt: u32, cause: &str) {
        let delay = retry::backoff_duration(attempt, self.backoff_base_ms);
        tracing::warn!(
            "{stage} request failed ({cause}), retry {}/{} after {delay:?}",
            attempt + 1,
            self.retries
        );
        tokio::time::sleep(delay).await;
    }
}
