//! In-process sink with programmable failures.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

use glimt_delivery::{DeliveryError, Result, Sink};
use tokio::sync::Mutex;

struct SinkState<T> {
    batches: Vec<Vec<T>>,
    failures_remaining: u32,
    fail_always: bool,
}

/// Sink that records accepted batches and can be told to fail.
///
/// Failures are injected up front (`fail_next`, `fail_always`) and reported
/// as network errors, the same shape a real transport outage produces. An
/// optional per-send delay makes concurrency observable; the high-water
/// mark of simultaneous sends is tracked in `max_in_flight`.
pub struct RecordingSink<T> {
    state: Arc<Mutex<SinkState<T>>>,
    attempts: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    delay: Option<Duration>,
}

impl<T> Clone for RecordingSink<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            attempts: Arc::clone(&self.attempts),
            in_flight: Arc::clone(&self.in_flight),
            max_in_flight: Arc::clone(&self.max_in_flight),
            delay: self.delay,
        }
    }
}

impl<T> Default for RecordingSink<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RecordingSink<T> {
    /// Creates a sink that accepts everything.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SinkState {
                batches: Vec::new(),
                failures_remaining: 0,
                fail_always: false,
            })),
            attempts: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            delay: None,
        }
    }

    /// Adds an artificial delay to every send.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fails the next `count` sends before accepting again.
    pub async fn fail_next(&self, count: u32) {
        self.state.lock().await.failures_remaining = count;
    }

    /// Fails every send from now on.
    pub async fn fail_always(&self) {
        self.state.lock().await.fail_always = true;
    }

    /// Total send attempts, successful or not.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Highest number of sends observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl<T: Clone> RecordingSink<T> {
    /// Batches accepted so far, in completion order.
    pub async fn batches(&self) -> Vec<Vec<T>> {
        self.state.lock().await.batches.clone()
    }

    /// All accepted events, flattened in batch completion order.
    pub async fn delivered(&self) -> Vec<T> {
        self.state.lock().await.batches.iter().flatten().cloned().collect()
    }
}

#[async_trait::async_trait]
impl<T: Clone + Send + Sync> Sink<T> for RecordingSink<T> {
    async fn send(&self, batch: &[T]) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let result = {
            let mut state = self.state.lock().await;
            if state.fail_always {
                Err(DeliveryError::network("simulated sink outage"))
            } else if state.failures_remaining > 0 {
                state.failures_remaining -= 1;
                Err(DeliveryError::network("simulated sink failure"))
            } else {
                state.batches.push(batch.to_vec());
                Ok(())
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
