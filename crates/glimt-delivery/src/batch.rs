//! Size estimation and batch splitting.
//!
//! Both the buffer's capacity accounting and the sender's batch budget are
//! measured against an event's canonical JSON form. Splitting is a pure
//! function over an ordered event list.

use serde::Serialize;

/// Cost charged for an event whose serialization fails.
///
/// Estimation must never fail an enqueue, so unserializable events are
/// charged a fixed conservative cost and delivery is still attempted.
pub const FALLBACK_EVENT_SIZE: usize = 1024;

/// Estimated cost of one event in bytes: the length of its JSON form.
pub fn estimated_size<T: Serialize>(event: &T) -> usize {
    match serde_json::to_vec(event) {
        Ok(bytes) => bytes.len(),
        Err(_) => FALLBACK_EVENT_SIZE,
    }
}

/// Partitions `events` into consecutive batches of at most `max_bytes`
/// serialized payload each.
///
/// Events are walked in order and accumulated while the running size stays
/// within the budget. An event that alone exceeds `max_bytes` is placed in
/// a batch of its own rather than dropped. Concatenating the returned
/// batches reproduces the input exactly; no batch is empty.
pub fn split_into_batches<T: Serialize>(events: Vec<T>, max_bytes: usize) -> Vec<Vec<T>> {
    let mut batches = Vec::new();
    let mut current: Vec<T> = Vec::new();
    let mut current_bytes = 0usize;

    for event in events {
        let cost = estimated_size(&event);
        if !current.is_empty() && current_bytes + cost > max_bytes {
            batches.push(std::mem::take(&mut current));
            current_bytes = 0;
        }
        current_bytes += cost;
        current.push(event);
    }

    if !current.is_empty() {
        batches.push(current);
    }
    batches
}
