//! Dispatch loop draining the buffer on a timer or on command.
//!
//! One [`Dispatcher`] instance owns a buffer and a delivery function. Its
//! loop wakes on a flush timer, on explicit flush commands, or on an
//! external cancellation token. Timer drains run as helper tasks gated by a
//! drain-concurrency semaphore; saturated ticks are skipped rather than
//! queued, so a slow sink can never pile up an unbounded backlog of drains.
//!
//! Every terminal path (flush-and-wait, cancellation, all handles dropped)
//! waits for in-flight drains, performs one final drain to catch events
//! enqueued meanwhile, and marks the loop closed. The closed state is an
//! explicit `Open -> Closing -> Closed` machine guarded by one atomic, so
//! late `flush`/`flush_and_wait` callers short-circuit instead of racing a
//! closed channel.

use std::sync::{
    atomic::{AtomicU8, Ordering},
    Arc,
};

use glimt_core::PipelineEvent;
use tokio::sync::{mpsc, oneshot, Semaphore};
use tokio::time::MissedTickBehavior;
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing::{debug, warn};

use crate::buffer::EventBuffer;
use crate::sender::Deliver;
use crate::{DEFAULT_FLUSH_INTERVAL, DEFAULT_MAX_CONCURRENT_DRAINS};

const STATE_OPEN: u8 = 0;
const STATE_CLOSING: u8 = 1;
const STATE_CLOSED: u8 = 2;

/// Capacity of the command channel. Commands are coalescing by nature
/// (a pending flush drains everything), so a small buffer suffices.
const COMMAND_CHANNEL_CAPACITY: usize = 8;

/// Configuration for the dispatch loop.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Period of the flush timer.
    pub flush_interval: std::time::Duration,

    /// Maximum number of timer-triggered drains in flight at once.
    pub max_concurrent_drains: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            max_concurrent_drains: DEFAULT_MAX_CONCURRENT_DRAINS,
        }
    }
}

enum Command {
    Flush,
    FlushAndWait(oneshot::Sender<()>),
}

/// Control loop that drains one buffer through one delivery function.
///
/// Constructed together with its [`DispatcherHandle`]; the loop itself is
/// consumed by [`run`](Dispatcher::run), which the owner spawns as a task.
pub struct Dispatcher<T> {
    buffer: Arc<EventBuffer<T>>,
    deliver: Arc<dyn Deliver<T>>,
    config: DispatcherConfig,
    commands: mpsc::Receiver<Command>,
    drain_slots: Arc<Semaphore>,
    in_flight: TaskTracker,
    state: Arc<AtomicU8>,
    shutdown: CancellationToken,
}

/// Cheap-to-clone handle for feeding and controlling a [`Dispatcher`].
pub struct DispatcherHandle<T> {
    buffer: Arc<EventBuffer<T>>,
    commands: mpsc::Sender<Command>,
    state: Arc<AtomicU8>,
}

impl<T> Clone for DispatcherHandle<T> {
    fn clone(&self) -> Self {
        Self {
            buffer: Arc::clone(&self.buffer),
            commands: self.commands.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<T: PipelineEvent> Dispatcher<T> {
    /// Creates a dispatcher and its handle.
    ///
    /// The loop observes `shutdown` for cooperative cancellation: in-flight
    /// deliveries finish, a final drain runs, and the loop exits.
    pub fn new(
        buffer: Arc<EventBuffer<T>>,
        deliver: Arc<dyn Deliver<T>>,
        config: DispatcherConfig,
        shutdown: CancellationToken,
    ) -> (Self, DispatcherHandle<T>) {
        let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let state = Arc::new(AtomicU8::new(STATE_OPEN));

        let dispatcher = Self {
            buffer: Arc::clone(&buffer),
            deliver,
            drain_slots: Arc::new(Semaphore::new(config.max_concurrent_drains)),
            config,
            commands: rx,
            in_flight: TaskTracker::new(),
            state: Arc::clone(&state),
            shutdown,
        };
        let handle = DispatcherHandle { buffer, commands: tx, state };

        (dispatcher, handle)
    }

    /// Runs the dispatch loop until shutdown. Spawn this as a task.
    pub async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.config.flush_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        debug!(
            interval_ms = self.config.flush_interval.as_millis() as u64,
            max_concurrent_drains = self.config.max_concurrent_drains,
            "dispatcher started"
        );

        loop {
            tokio::select! {
                () = self.shutdown.cancelled() => {
                    debug!("cancellation requested, draining before exit");
                    self.finish().await;
                    return;
                }
                _ = ticker.tick() => {
                    self.spawn_drain();
                }
                command = self.commands.recv() => match command {
                    Some(Command::Flush) => {
                        drain_once(&self.buffer, self.deliver.as_ref()).await;
                    }
                    Some(Command::FlushAndWait(done)) => {
                        debug!("flush-and-wait requested, draining before exit");
                        self.finish().await;
                        let _ = done.send(());
                        return;
                    }
                    None => {
                        debug!("all dispatcher handles dropped, draining before exit");
                        self.finish().await;
                        return;
                    }
                }
            }
        }
    }

    /// Starts one timer drain if a drain slot is free; otherwise the tick
    /// is skipped. Only one generation of work per available slot.
    fn spawn_drain(&self) {
        match Arc::clone(&self.drain_slots).try_acquire_owned() {
            Ok(permit) => {
                let buffer = Arc::clone(&self.buffer);
                let deliver = Arc::clone(&self.deliver);
                self.in_flight.spawn(async move {
                    drain_once(&buffer, deliver.as_ref()).await;
                    drop(permit);
                });
            }
            Err(_) => {
                debug!("all drain slots busy, skipping tick");
            }
        }
    }

    /// Terminal sequence shared by every exit path: wait for in-flight
    /// drains, catch anything enqueued meanwhile, mark the loop closed.
    async fn finish(&mut self) {
        self.in_flight.close();
        self.in_flight.wait().await;
        drain_once(&self.buffer, self.deliver.as_ref()).await;
        self.state.store(STATE_CLOSED, Ordering::Release);
        debug!("dispatcher closed");
    }
}

impl<T: PipelineEvent> DispatcherHandle<T> {
    /// Enqueues an event for delivery, blocking while the buffer is full.
    pub async fn dispatch(&self, event: T) {
        self.buffer.enqueue(event).await;
    }

    /// Requests an immediate drain without waiting for it.
    ///
    /// A no-op once the loop is closing; a full command channel is also
    /// ignored, since a pending flush already covers the queued events.
    pub fn flush(&self) {
        if self.state.load(Ordering::Acquire) != STATE_OPEN {
            return;
        }
        let _ = self.commands.try_send(Command::Flush);
    }

    /// Drains everything and stops the loop, waiting for completion.
    ///
    /// Blocks until in-flight drains finish and one final drain has run.
    /// Idempotent: only the first caller transitions the loop to closing;
    /// later calls return promptly.
    pub async fn flush_and_wait(&self) {
        if self
            .state
            .compare_exchange(STATE_OPEN, STATE_CLOSING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        let (done_tx, done_rx) = oneshot::channel();
        if self.commands.send(Command::FlushAndWait(done_tx)).await.is_err() {
            // The loop already exited through cancellation and drained.
            return;
        }
        let _ = done_rx.await;
    }

    /// Whether the loop has terminated.
    pub fn is_closed(&self) -> bool {
        self.state.load(Ordering::Acquire) == STATE_CLOSED
    }
}

/// Drains the buffer once and re-queues whatever the delivery reports as
/// failed. Runs inside concurrency-limited workers, so the re-queue path
/// must never block: a full buffer drops the event instead.
async fn drain_once<T: PipelineEvent>(buffer: &EventBuffer<T>, deliver: &dyn Deliver<T>) {
    let events = buffer.drain_all().await;
    if events.is_empty() {
        return;
    }
    debug!(events = events.len(), "draining buffer");

    let retry = deliver.deliver(events).await;
    for event in retry {
        if !buffer.try_enqueue(event).await {
            warn!("buffer full, dropping event queued for retry");
        }
    }
}
