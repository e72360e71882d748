//! Deterministic event fixtures.
//!
//! Events built here use a fixed timestamp so their serialized length is
//! stable, which capacity and batching tests depend on.

use chrono::{DateTime, TimeZone, Utc};
use glimt_core::{IngestionBody, IngestionEvent, IngestionEventType, Trace};
use glimt_delivery::estimated_size;

/// Fixed timestamp shared by all fixtures.
pub fn fixed_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

/// A minimal trace-create envelope with the given trace name.
pub fn trace_event(name: &str) -> IngestionEvent {
    IngestionEvent::new(
        IngestionEventType::TraceCreate,
        fixed_timestamp(),
        IngestionBody::Trace(Trace { name: Some(name.to_string()), ..Default::default() }),
    )
}

/// An envelope padded so its serialized form is exactly `target_bytes`.
///
/// Panics if `target_bytes` is smaller than the envelope's fixed overhead;
/// fixtures are test-only and a wrong target is a bug in the test.
pub fn sized_event(target_bytes: usize) -> IngestionEvent {
    // With an empty name, every added name character adds exactly one byte.
    let overhead = estimated_size(&trace_event(""));
    assert!(
        target_bytes >= overhead,
        "target of {target_bytes} bytes is below the envelope overhead of {overhead}"
    );

    let event = trace_event(&"x".repeat(target_bytes - overhead));
    debug_assert_eq!(estimated_size(&event), target_bytes);
    event
}
