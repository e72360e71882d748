//! Wire-format structs for the ingestion API.
//!
//! These mirror the JSON bodies the ingestion endpoint accepts. Every field
//! is optional on the wire; `None` fields are omitted entirely. The structs
//! carry no behavior beyond serialization: the facade stamps IDs and
//! timestamps, and the delivery pipeline treats bodies as opaque payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Severity level attached to observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ObservationLevel {
    /// Diagnostic detail, normally hidden.
    Debug,
    /// Standard level for successful observations.
    Default,
    /// Noteworthy but non-failing condition.
    Warning,
    /// The observed operation failed.
    Error,
}

/// A trace: the root of one recorded interaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    /// Unique trace identifier; assigned by the client when missing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Wall-clock time the trace started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Human-readable trace name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// End-user identifier for grouping traces.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Free-form input payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    /// Free-form output payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    /// Session identifier for grouping traces.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Release identifier of the traced application.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    /// Version of the traced code path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Arbitrary metadata attached to the trace.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    /// Tags for filtering traces.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Whether the trace is publicly visible.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
}

/// A span: a timed observation within a trace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    /// Identifier of the owning trace.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// Human-readable span name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// When the span started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    /// Arbitrary metadata attached to the span.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    /// Free-form input payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    /// Free-form output payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    /// Severity level of the span.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<ObservationLevel>,
    /// Status message, typically set on warning or error levels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    /// Identifier of the parent observation, if nested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_observation_id: Option<String>,
    /// Version of the observed code path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Unique span identifier; assigned by the client when missing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// When the span ended.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

/// A generation: a model call observation with usage accounting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Generation {
    /// Identifier of the owning trace.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// Human-readable generation name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// When the model call started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    /// Arbitrary metadata attached to the generation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    /// Prompt or input payload sent to the model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    /// Completion or output payload returned by the model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    /// Severity level of the generation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<ObservationLevel>,
    /// Status message, typically set on warning or error levels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    /// Identifier of the parent observation, if nested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_observation_id: Option<String>,
    /// Version of the observed code path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Unique generation identifier; assigned by the client when missing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// When the model call completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// When the first completion token arrived, for streaming calls.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_start_time: Option<DateTime<Utc>>,
    /// Model identifier, e.g. a provider model name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Model invocation parameters (temperature, max tokens, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_parameters: Option<Value>,
    /// Token and cost accounting for the call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    /// Name of the prompt template used, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_name: Option<String>,
    /// Version of the prompt template used, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_version: Option<i32>,
}

/// Unit of measurement for usage figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UsageUnit {
    /// Character counts.
    Characters,
    /// Token counts.
    Tokens,
    /// Elapsed milliseconds.
    Milliseconds,
    /// Elapsed seconds.
    Seconds,
    /// Image counts.
    Images,
}

/// Token and cost accounting attached to a generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    /// Input units consumed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<i64>,
    /// Output units produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<i64>,
    /// Total units for the call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
    /// Unit the figures are expressed in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<UsageUnit>,
    /// Cost attributed to the input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_cost: Option<f64>,
    /// Cost attributed to the output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_cost: Option<f64>,
    /// Total cost of the call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<f64>,
    /// Prompt tokens consumed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<i64>,
    /// Completion tokens produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<i64>,
    /// Total tokens for the call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<i64>,
    /// Prompt tokens served from cache.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_cache_hit_tokens: Option<i64>,
    /// Prompt tokens missing the cache.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_cache_miss_tokens: Option<i64>,
    /// Prompt tokens written to cache.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_cache_write_tokens: Option<i64>,
    /// Reasoning tokens in the completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_reasoning_tokens: Option<i64>,
    /// Audio tokens in the completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_audio_tokens: Option<i64>,
}

/// A point-in-time event within a trace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Identifier of the owning trace.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// Human-readable event name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// When the event occurred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    /// Arbitrary metadata attached to the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    /// Free-form input payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    /// Free-form output payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    /// Severity level of the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<ObservationLevel>,
    /// Status message, typically set on warning or error levels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    /// Identifier of the parent observation, if nested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_observation_id: Option<String>,
    /// Version of the observed code path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Unique event identifier; assigned by the client when missing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// A score: a numeric evaluation attached to a trace or observation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    /// Unique score identifier; assigned by the client when missing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Identifier of the trace being scored. Required.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// Name of the score, e.g. the evaluation metric.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Numeric score value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// Identifier of the observation being scored, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation_id: Option<String>,
    /// Free-form comment explaining the score.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}
