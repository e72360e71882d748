//! Glimt client SDK.
//!
//! Records traces, spans, generations, scores, and events, and ships them
//! asynchronously to the Glimt ingestion API. Recording is cheap: every
//! method stamps identifiers and a timestamp, then hands the event to a
//! background pipeline that buffers under a byte budget, batches by
//! serialized size, and delivers with bounded concurrency and bounded
//! retry. Delivery is best-effort; the recording call never learns about
//! delivery failures.
//!
//! # Example
//!
//! ```no_run
//! use glimt::{Config, Glimt, Trace};
//!
//! # async fn example() -> glimt::Result<()> {
//! let client = Glimt::new(Config::from_env()?)?;
//!
//! let trace = client.trace(Trace {
//!     name: Some("checkout".into()),
//!     ..Default::default()
//! }).await?;
//!
//! // ... record spans, generations, scores against the trace ...
//!
//! // Drain everything before the process exits.
//! client.shutdown().await;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod config;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

pub use client::IngestionClient;
pub use config::Config;
pub use glimt_core::{
    new_event_id, Clock, Error, Event, Generation, IngestionBody, IngestionEvent,
    IngestionEventType, ObservationLevel, Result, Score, Span, SystemClock, TestClock, Trace,
    Usage, UsageUnit,
};
pub use glimt_delivery::{DeliveryError, Sink};

use glimt_delivery::{
    BatchSender, Dispatcher, DispatcherConfig, DispatcherHandle, EventBuffer, SenderConfig,
};

/// Client handle recording telemetry and driving the delivery pipeline.
///
/// Cheap to clone; all clones feed the same buffer and dispatcher. Must be
/// created inside a tokio runtime, which the background dispatcher task is
/// spawned onto.
#[derive(Clone)]
pub struct Glimt {
    handle: DispatcherHandle<IngestionEvent>,
    clock: Arc<dyn Clock>,
    shutdown: CancellationToken,
}

impl Glimt {
    /// Creates a client that delivers to the configured ingestion API.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when credentials or host are missing
    /// or the HTTP transport cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        config.validate_for_transport()?;
        let sink = IngestionClient::new(&config)
            .map_err(|e| Error::configuration(e.to_string()))?;
        Ok(Self::with_sink(config, Arc::new(sink)))
    }

    /// Creates a client delivering through an arbitrary sink.
    ///
    /// This is the injection seam used by tests and by embedders that ship
    /// events somewhere other than the hosted API.
    pub fn with_sink(config: Config, sink: Arc<dyn Sink<IngestionEvent>>) -> Self {
        let buffer = Arc::new(EventBuffer::new(config.buffer_capacity));
        let sender = Arc::new(BatchSender::new(
            sink,
            SenderConfig {
                parallelism: config.parallelism,
                max_batch_bytes: config.max_batch_bytes,
                retry_ceiling: config.retry_ceiling,
            },
        ));
        let shutdown = CancellationToken::new();
        let (dispatcher, handle) = Dispatcher::new(
            buffer,
            sender,
            DispatcherConfig {
                flush_interval: config.flush_interval,
                max_concurrent_drains: config.max_concurrent_drains,
            },
            shutdown.clone(),
        );
        tokio::spawn(dispatcher.run());

        Self { handle, clock: Arc::new(SystemClock), shutdown }
    }

    /// Replaces the clock used for timestamping. Intended for tests.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Records a new trace. A missing ID is stamped with a fresh UUID.
    pub async fn trace(&self, trace: Trace) -> Result<Trace> {
        self.trace_with_time(trace, self.clock.now()).await
    }

    /// Records a new trace with an explicit timestamp.
    pub async fn trace_with_time(
        &self,
        mut trace: Trace,
        timestamp: DateTime<Utc>,
    ) -> Result<Trace> {
        ensure_id(&mut trace.id);
        self.record(IngestionEventType::TraceCreate, timestamp, IngestionBody::Trace(trace.clone()))
            .await;
        Ok(trace)
    }

    /// Records a new span.
    ///
    /// A span without a trace ID gets a trace created for it, named after
    /// the span. `parent_id` links the span under another observation.
    pub async fn span(&self, mut span: Span, parent_id: Option<&str>) -> Result<Span> {
        if is_missing(&span.trace_id) {
            span.trace_id = Some(self.create_trace(span.name.clone()).await?);
        }
        ensure_id(&mut span.id);
        if let Some(parent) = parent_id {
            span.parent_observation_id = Some(parent.to_string());
        }
        self.record(
            IngestionEventType::SpanCreate,
            self.clock.now(),
            IngestionBody::Span(span.clone()),
        )
        .await;
        Ok(span)
    }

    /// Records the end of a span.
    ///
    /// # Errors
    ///
    /// Fails when the span is missing its own ID or its trace ID.
    pub async fn span_end(&self, span: Span) -> Result<Span> {
        if is_missing(&span.id) {
            return Err(Error::MissingObservationId);
        }
        if is_missing(&span.trace_id) {
            return Err(Error::MissingTraceId);
        }
        self.record(
            IngestionEventType::SpanUpdate,
            self.clock.now(),
            IngestionBody::Span(span.clone()),
        )
        .await;
        Ok(span)
    }

    /// Records a new generation.
    ///
    /// A generation without a trace ID gets a trace created for it, named
    /// after the generation.
    pub async fn generation(
        &self,
        generation: Generation,
        parent_id: Option<&str>,
    ) -> Result<Generation> {
        self.generation_with_time(generation, parent_id, self.clock.now()).await
    }

    /// Records a new generation with an explicit timestamp.
    pub async fn generation_with_time(
        &self,
        mut generation: Generation,
        parent_id: Option<&str>,
        timestamp: DateTime<Utc>,
    ) -> Result<Generation> {
        if is_missing(&generation.trace_id) {
            generation.trace_id = Some(self.create_trace(generation.name.clone()).await?);
        }
        ensure_id(&mut generation.id);
        if let Some(parent) = parent_id {
            generation.parent_observation_id = Some(parent.to_string());
        }
        self.record(
            IngestionEventType::GenerationCreate,
            timestamp,
            IngestionBody::Generation(generation.clone()),
        )
        .await;
        Ok(generation)
    }

    /// Records the end of a generation.
    ///
    /// # Errors
    ///
    /// Fails when the generation is missing its own ID or its trace ID.
    pub async fn generation_end(&self, generation: Generation) -> Result<Generation> {
        self.generation_end_with_time(generation, self.clock.now()).await
    }

    /// Records the end of a generation with an explicit timestamp.
    ///
    /// # Errors
    ///
    /// Fails when the generation is missing its own ID or its trace ID.
    pub async fn generation_end_with_time(
        &self,
        generation: Generation,
        timestamp: DateTime<Utc>,
    ) -> Result<Generation> {
        if is_missing(&generation.id) {
            return Err(Error::MissingObservationId);
        }
        if is_missing(&generation.trace_id) {
            return Err(Error::MissingTraceId);
        }
        self.record(
            IngestionEventType::GenerationUpdate,
            timestamp,
            IngestionBody::Generation(generation.clone()),
        )
        .await;
        Ok(generation)
    }

    /// Records a score against a trace.
    ///
    /// # Errors
    ///
    /// Fails when the score is missing its trace ID.
    pub async fn score(&self, mut score: Score) -> Result<Score> {
        if is_missing(&score.trace_id) {
            return Err(Error::MissingTraceId);
        }
        ensure_id(&mut score.id);
        self.record(
            IngestionEventType::ScoreCreate,
            self.clock.now(),
            IngestionBody::Score(score.clone()),
        )
        .await;
        Ok(score)
    }

    /// Records a point-in-time event.
    ///
    /// An event without a trace ID gets a trace created for it, named after
    /// the event.
    pub async fn event(&self, mut event: Event, parent_id: Option<&str>) -> Result<Event> {
        if is_missing(&event.trace_id) {
            event.trace_id = Some(self.create_trace(event.name.clone()).await?);
        }
        ensure_id(&mut event.id);
        if let Some(parent) = parent_id {
            event.parent_observation_id = Some(parent.to_string());
        }
        self.record(
            IngestionEventType::EventCreate,
            self.clock.now(),
            IngestionBody::Event(event.clone()),
        )
        .await;
        Ok(event)
    }

    /// Requests an immediate flush without waiting for it.
    pub fn flush(&self) {
        self.handle.flush();
    }

    /// Drains every buffered event and stops the pipeline.
    ///
    /// Blocks until in-flight deliveries complete and a final drain has
    /// run. Idempotent; later calls return promptly. Events recorded after
    /// shutdown are accepted into the buffer but no longer delivered.
    pub async fn shutdown(&self) {
        self.handle.flush_and_wait().await;
    }

    /// Token that shuts the pipeline down when cancelled.
    ///
    /// Hand this to the application's shutdown machinery to tie the
    /// pipeline's drain-on-exit to process termination.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Wraps a body in an envelope and enqueues it, blocking while the
    /// buffer is saturated.
    async fn record(
        &self,
        event_type: IngestionEventType,
        timestamp: DateTime<Utc>,
        body: IngestionBody,
    ) {
        let event = IngestionEvent::new(event_type, timestamp, body);
        self.handle.dispatch(event).await;
    }

    /// Creates a trace for an observation recorded without one.
    async fn create_trace(&self, name: Option<String>) -> Result<String> {
        let trace = self.trace(Trace { name, ..Default::default() }).await?;
        trace.id.ok_or(Error::MissingTraceId)
    }
}

/// Stamps a fresh UUID when the ID is absent or empty.
fn ensure_id(id: &mut Option<String>) {
    if id.as_deref().is_none_or(str::is_empty) {
        *id = Some(new_event_id());
    }
}

fn is_missing(id: &Option<String>) -> bool {
    id.as_deref().is_none_or(str::is_empty)
}
