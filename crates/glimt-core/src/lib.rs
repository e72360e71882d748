//! Core domain models and ingestion event types.
//!
//! Provides the wire-format structs for the Glimt ingestion API, the
//! ingestion event envelope that flows through the delivery pipeline, and
//! the clock abstraction used to stamp events. All other crates depend on
//! these foundational types.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod events;
pub mod models;
pub mod time;

pub use error::{Error, Result};
pub use events::{new_event_id, IngestionBody, IngestionEvent, IngestionEventType, PipelineEvent};
pub use models::{Event, Generation, ObservationLevel, Score, Span, Trace, Usage, UsageUnit};
pub use time::{Clock, SystemClock, TestClock};
