//! Ingestion event envelope and the pipeline seam trait.
//!
//! Every record the facade produces is wrapped in an [`IngestionEvent`]
//! envelope before it enters the delivery pipeline. The envelope carries the
//! wire-level event kind, a fresh UUID, the stamped timestamp, and the domain
//! body. The [`PipelineEvent`] trait is the contract the delivery crate
//! requires of anything it buffers and retries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::{Event, Generation, Score, Span, Trace};

/// Wire-level kind tag of an ingestion event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IngestionEventType {
    /// A new trace.
    TraceCreate,
    /// A new span observation.
    SpanCreate,
    /// An update closing or amending a span.
    SpanUpdate,
    /// A new generation observation.
    GenerationCreate,
    /// An update closing or amending a generation.
    GenerationUpdate,
    /// A new score.
    ScoreCreate,
    /// A new point-in-time event.
    EventCreate,
}

impl std::fmt::Display for IngestionEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            Self::TraceCreate => "trace-create",
            Self::SpanCreate => "span-create",
            Self::SpanUpdate => "span-update",
            Self::GenerationCreate => "generation-create",
            Self::GenerationUpdate => "generation-update",
            Self::ScoreCreate => "score-create",
            Self::EventCreate => "event-create",
        };
        write!(f, "{tag}")
    }
}

/// Domain body carried by an ingestion event.
///
/// Serialized untagged: the envelope's `type` field tells the server how to
/// interpret the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IngestionBody {
    /// Trace body.
    Trace(Trace),
    /// Span body.
    Span(Span),
    /// Generation body.
    Generation(Generation),
    /// Score body.
    Score(Score),
    /// Event body.
    Event(Event),
}

/// One unit of telemetry awaiting delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionEvent {
    /// Unique envelope identifier, distinct from the body's own ID.
    pub id: String,
    /// Wire-level kind tag.
    #[serde(rename = "type")]
    pub event_type: IngestionEventType,
    /// When the event was recorded.
    pub timestamp: DateTime<Utc>,
    /// Arbitrary metadata attached to the envelope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    /// The domain record being ingested.
    pub body: IngestionBody,
    /// Delivery failures so far. Local bookkeeping, never sent.
    #[serde(skip)]
    pub failure_count: u32,
}

impl IngestionEvent {
    /// Creates an envelope with a fresh ID around the given body.
    pub fn new(event_type: IngestionEventType, timestamp: DateTime<Utc>, body: IngestionBody) -> Self {
        Self { id: new_event_id(), event_type, timestamp, metadata: None, body, failure_count: 0 }
    }
}

/// Contract between domain events and the generic delivery pipeline.
///
/// The pipeline estimates an event's cost from its serialized form, so
/// implementors must serialize; the failure counter drives the retry
/// ceiling after failed deliveries.
pub trait PipelineEvent: Serialize + Send + Sync + 'static {
    /// Number of delivery failures recorded for this event.
    fn failure_count(&self) -> u32;

    /// Records one more delivery failure.
    fn record_failure(&mut self);
}

impl PipelineEvent for IngestionEvent {
    fn failure_count(&self) -> u32 {
        self.failure_count
    }

    fn record_failure(&mut self) {
        self.failure_count += 1;
    }
}

/// Generates a fresh UUID v4 event identifier.
pub fn new_event_id() -> String {
    Uuid::new_v4().to_string()
}
