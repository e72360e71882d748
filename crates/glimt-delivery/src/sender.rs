//! Parallel batch delivery with retry accounting.
//!
//! The [`BatchSender`] takes one drained set of events, splits it into
//! size-bounded batches, and delivers them concurrently through an injected
//! [`Sink`]. All batch deliveries of one invocation are awaited before the
//! call returns, so the dispatcher's drain slot is only released once every
//! sub-batch has completed or failed.

use std::sync::Arc;

use glimt_core::PipelineEvent;
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{debug, error};

use crate::batch::split_into_batches;
use crate::error::Result;
use crate::{DEFAULT_MAX_BATCH_BYTES, DEFAULT_PARALLELISM, DEFAULT_RETRY_CEILING};

/// Destination that accepts delivered batches.
///
/// Implemented by the HTTP ingestion transport in production and by
/// recording sinks in tests. Any error fails every event in the batch for
/// that attempt.
#[async_trait::async_trait]
pub trait Sink<T>: Send + Sync {
    /// Delivers one batch. Called once per batch.
    async fn send(&self, batch: &[T]) -> Result<()>;
}

/// Delivery function invoked by the dispatcher with a drained event set.
///
/// Returns the events that should be re-queued for another attempt.
#[async_trait::async_trait]
pub trait Deliver<T>: Send + Sync {
    /// Delivers the drained events; returns the events to retry.
    async fn deliver(&self, events: Vec<T>) -> Vec<T>;
}

/// Configuration for the batch sender.
#[derive(Debug, Clone)]
pub struct SenderConfig {
    /// Number of concurrent batch deliveries per invocation.
    /// Non-positive values fall back to the default of 5.
    pub parallelism: usize,

    /// Maximum serialized payload per batch in bytes.
    pub max_batch_bytes: usize,

    /// Number of delivery failures after which an event is dropped.
    pub retry_ceiling: u32,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            parallelism: DEFAULT_PARALLELISM,
            max_batch_bytes: DEFAULT_MAX_BATCH_BYTES,
            retry_ceiling: DEFAULT_RETRY_CEILING,
        }
    }
}

/// Splits drained events into batches and delivers them concurrently.
pub struct BatchSender<T> {
    sink: Arc<dyn Sink<T>>,
    config: SenderConfig,
}

impl<T: PipelineEvent> BatchSender<T> {
    /// Creates a sender delivering through the given sink.
    pub fn new(sink: Arc<dyn Sink<T>>, config: SenderConfig) -> Self {
        Self { sink, config }
    }

    fn parallelism(&self) -> usize {
        if self.config.parallelism == 0 {
            DEFAULT_PARALLELISM
        } else {
            self.config.parallelism
        }
    }

    /// Delivers all events, fanning batches out under the parallelism bound.
    ///
    /// Returns the events whose batches failed and whose failure count is
    /// still below the retry ceiling. Events at the ceiling are dropped
    /// with an error log line; telemetry delivery is best-effort.
    pub async fn send_all(&self, events: Vec<T>) -> Vec<T> {
        if events.is_empty() {
            return Vec::new();
        }

        let batches = split_into_batches(events, self.config.max_batch_bytes);
        let slots = Arc::new(Semaphore::new(self.parallelism()));
        let mut tasks: JoinSet<Vec<T>> = JoinSet::new();

        for batch in batches {
            // The semaphore is never closed, so acquisition only fails if
            // the sender itself is torn down mid-call.
            let Ok(permit) = Arc::clone(&slots).acquire_owned().await else {
                break;
            };
            let sink = Arc::clone(&self.sink);
            let ceiling = self.config.retry_ceiling;
            tasks.spawn(async move {
                let failed = deliver_batch(sink.as_ref(), batch, ceiling).await;
                drop(permit);
                failed
            });
        }

        let mut retry = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(failed) => retry.extend(failed),
                Err(join_error) => {
                    error!(error = %join_error, "batch delivery task panicked");
                }
            }
        }
        retry
    }
}

#[async_trait::async_trait]
impl<T: PipelineEvent> Deliver<T> for BatchSender<T> {
    async fn deliver(&self, events: Vec<T>) -> Vec<T> {
        self.send_all(events).await
    }
}

/// Delivers one batch and applies the failure policy.
///
/// On sink error every event in the batch records a failure; events still
/// below the ceiling are returned for re-queueing, the rest are dropped.
async fn deliver_batch<T: PipelineEvent>(sink: &dyn Sink<T>, batch: Vec<T>, ceiling: u32) -> Vec<T> {
    match sink.send(&batch).await {
        Ok(()) => {
            debug!(events = batch.len(), "batch delivered");
            Vec::new()
        }
        Err(error) => {
            error!(error = %error, events = batch.len(), "batch delivery failed");
            let mut retry = Vec::with_capacity(batch.len());
            for mut event in batch {
                event.record_failure();
                if event.failure_count() < ceiling {
                    retry.push(event);
                } else {
                    error!(
                        failures = event.failure_count(),
                        "dropping event after repeated delivery failures"
                    );
                }
            }
            retry
        }
    }
}
