//! Asynchronous event delivery pipeline.
//!
//! This crate implements the buffering and delivery machinery of the Glimt
//! client: events are held in a byte-bounded in-memory buffer, drained on a
//! timer or on demand, partitioned into size-bounded batches, and pushed to
//! an injected sink with bounded concurrency and a bounded retry ceiling.
//!
//! # Architecture
//!
//! ```text
//! producer ──enqueue──▶ EventBuffer ──drain──▶ Dispatcher ──▶ BatchSender ──▶ Sink
//!      ▲                                                          │
//!      └───────────────── try_enqueue (failed events) ◀───────────┘
//! ```
//!
//! The [`Dispatcher`] owns the control loop: a flush timer whose ticks are
//! gated by a drain-concurrency semaphore, a command channel for explicit
//! flushes, and a cancellation token for external shutdown. The
//! [`BatchSender`] fans one drained set of events out into concurrent batch
//! deliveries and reports which events should be retried.
//!
//! Delivery is best-effort: events that keep failing past the retry ceiling
//! are dropped with an error log line, and a saturated buffer drops
//! re-queued events rather than blocking the loop.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::time::Duration;

pub mod batch;
pub mod buffer;
pub mod dispatcher;
pub mod error;
pub mod sender;

pub use batch::{estimated_size, split_into_batches};
pub use buffer::EventBuffer;
pub use dispatcher::{Dispatcher, DispatcherConfig, DispatcherHandle};
pub use error::{DeliveryError, Result};
pub use sender::{BatchSender, Deliver, SenderConfig, Sink};

/// Default buffer capacity in bytes (50 MiB).
pub const DEFAULT_BUFFER_CAPACITY: usize = 50 * 1024 * 1024;

/// Default maximum serialized batch payload in bytes (3 MiB).
pub const DEFAULT_MAX_BATCH_BYTES: usize = 3 * 1024 * 1024;

/// Default number of concurrent drains per dispatcher.
pub const DEFAULT_MAX_CONCURRENT_DRAINS: usize = 5;

/// Default number of concurrent batch deliveries per drain.
pub const DEFAULT_PARALLELISM: usize = 5;

/// Default number of delivery failures after which an event is dropped.
pub const DEFAULT_RETRY_CEILING: u32 = 3;

/// Default period of the dispatcher's flush timer.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(1);
