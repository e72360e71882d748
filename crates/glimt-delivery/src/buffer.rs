//! Byte-bounded in-memory event buffer.
//!
//! A FIFO queue whose capacity is measured in estimated serialized bytes
//! rather than item count. Producers block cooperatively when the buffer is
//! saturated; the dispatcher drains it atomically. One buffer instance is
//! shared between the producing facade and the dispatch loop.

use std::collections::VecDeque;

use serde::Serialize;
use tokio::sync::{Mutex, Notify};

use crate::batch::estimated_size;
use crate::DEFAULT_BUFFER_CAPACITY;

struct Entry<T> {
    event: T,
    cost: usize,
}

struct Inner<T> {
    entries: VecDeque<Entry<T>>,
    bytes: usize,
}

/// FIFO event buffer bounded by cumulative estimated serialized size.
///
/// The size invariant is exact: each entry's cost is recorded at admission
/// and subtracted on removal. A single event larger than the whole capacity
/// is still admitted into an empty buffer, so one oversized event can never
/// wedge its producer permanently.
pub struct EventBuffer<T> {
    inner: Mutex<Inner<T>>,
    space_freed: Notify,
    capacity: usize,
}

impl<T: Serialize> EventBuffer<T> {
    /// Creates a buffer with the given capacity in bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner { entries: VecDeque::new(), bytes: 0 }),
            space_freed: Notify::new(),
            capacity,
        }
    }

    /// Creates a buffer with the default 50 MiB capacity.
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY)
    }

    /// Returns the configured capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends an event, waiting until the buffer has room for it.
    ///
    /// Blocks (cooperatively) while admitting the event would push the
    /// running size past capacity and at least one other event is already
    /// queued. An event is always admitted into an empty buffer, even when
    /// its own size exceeds the capacity.
    pub async fn enqueue(&self, event: T) {
        let cost = estimated_size(&event);
        loop {
            // Register for the wakeup before checking, so a drain between
            // the check and the await cannot be missed.
            let notified = self.space_freed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut inner = self.inner.lock().await;
                if inner.entries.is_empty() || inner.bytes + cost <= self.capacity {
                    inner.bytes += cost;
                    inner.entries.push_back(Entry { event, cost });
                    return;
                }
            }

            notified.await;
        }
    }

    /// Appends an event only if it can be admitted without waiting.
    ///
    /// Returns whether the event was accepted. This is the re-queue path
    /// for failed deliveries: it must never block, so a saturated buffer
    /// rejects the event instead.
    pub async fn try_enqueue(&self, event: T) -> bool {
        let cost = estimated_size(&event);
        let mut inner = self.inner.lock().await;
        if inner.entries.is_empty() || inner.bytes + cost <= self.capacity {
            inner.bytes += cost;
            inner.entries.push_back(Entry { event, cost });
            true
        } else {
            false
        }
    }

    /// Removes and returns the oldest event, or `None` when empty.
    pub async fn dequeue(&self) -> Option<T> {
        let mut inner = self.inner.lock().await;
        let entry = inner.entries.pop_front()?;
        inner.bytes = inner.bytes.saturating_sub(entry.cost);
        drop(inner);

        self.space_freed.notify_waiters();
        Some(entry.event)
    }

    /// Atomically removes and returns every queued event in FIFO order.
    ///
    /// Resets the running size to zero and wakes all blocked producers.
    pub async fn drain_all(&self) -> Vec<T> {
        let mut inner = self.inner.lock().await;
        let entries = std::mem::take(&mut inner.entries);
        inner.bytes = 0;
        drop(inner);

        if !entries.is_empty() {
            self.space_freed.notify_waiters();
        }
        entries.into_iter().map(|entry| entry.event).collect()
    }

    /// Discards every queued event.
    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        inner.entries.clear();
        inner.bytes = 0;
        drop(inner);

        self.space_freed.notify_waiters();
    }

    /// Number of queued events.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    /// Whether the buffer holds no events.
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.entries.is_empty()
    }

    /// Current estimated size of all queued events in bytes.
    pub async fn size(&self) -> usize {
        self.inner.lock().await.bytes
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    use serde::Serialize;

    use super::*;

    /// Event whose serialized form is exactly `target` bytes long.
    #[derive(Debug, Clone, Serialize, PartialEq)]
    struct Blob {
        data: String,
    }

    fn blob(target: usize) -> Blob {
        let overhead = serde_json::to_vec(&Blob { data: String::new() }).unwrap().len();
        Blob { data: "x".repeat(target.saturating_sub(overhead)) }
    }

    #[tokio::test]
    async fn drain_returns_events_in_enqueue_order() {
        let buffer = EventBuffer::new(1024);
        for i in 0..5 {
            buffer.enqueue(blob(20 + i)).await;
        }

        let drained = buffer.drain_all().await;
        let sizes: Vec<usize> = drained.iter().map(|b| estimated_size(b)).collect();
        assert_eq!(sizes, vec![20, 21, 22, 23, 24]);
        assert_eq!(buffer.len().await, 0);
        assert_eq!(buffer.size().await, 0);
    }

    #[tokio::test]
    async fn size_tracks_admitted_events() {
        let buffer = EventBuffer::new(1024);
        buffer.enqueue(blob(100)).await;
        buffer.enqueue(blob(50)).await;
        assert_eq!(buffer.size().await, 150);

        buffer.dequeue().await;
        assert_eq!(buffer.size().await, 50);
    }

    #[tokio::test]
    async fn oversized_event_admitted_into_empty_buffer() {
        let buffer = EventBuffer::new(100);
        buffer.enqueue(blob(500)).await;

        assert_eq!(buffer.len().await, 1);
        assert_eq!(buffer.size().await, 500);
    }

    #[tokio::test]
    async fn try_enqueue_rejects_when_full() {
        let buffer = EventBuffer::new(100);
        assert!(buffer.try_enqueue(blob(500)).await); // empty buffer always admits
        assert!(!buffer.try_enqueue(blob(40)).await);

        buffer.drain_all().await;
        assert!(buffer.try_enqueue(blob(40)).await);
    }

    #[tokio::test]
    async fn dequeue_on_empty_returns_none() {
        let buffer = EventBuffer::<Blob>::new(100);
        assert!(buffer.dequeue().await.is_none());
    }

    #[tokio::test]
    async fn enqueue_blocks_until_dequeue_frees_capacity() {
        let buffer = Arc::new(EventBuffer::new(100));
        buffer.enqueue(blob(40)).await;
        buffer.enqueue(blob(40)).await;

        let done = Arc::new(AtomicBool::new(false));
        let task = tokio::spawn({
            let buffer = Arc::clone(&buffer);
            let done = Arc::clone(&done);
            async move {
                buffer.enqueue(blob(40)).await;
                done.store(true, Ordering::SeqCst);
            }
        });

        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
        assert!(!done.load(Ordering::SeqCst), "third enqueue should be blocked");
        assert_eq!(buffer.len().await, 2);

        buffer.dequeue().await;
        task.await.unwrap();
        assert!(done.load(Ordering::SeqCst));
        assert_eq!(buffer.len().await, 2);
        assert_eq!(buffer.size().await, 80);
    }

    #[tokio::test]
    async fn enqueue_blocks_until_drain_frees_capacity() {
        let buffer = Arc::new(EventBuffer::new(100));
        buffer.enqueue(blob(60)).await;
        buffer.enqueue(blob(40)).await;

        let task = tokio::spawn({
            let buffer = Arc::clone(&buffer);
            async move { buffer.enqueue(blob(80)).await }
        });

        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
        assert_eq!(buffer.len().await, 2);

        let drained = buffer.drain_all().await;
        assert_eq!(drained.len(), 2);

        task.await.unwrap();
        assert_eq!(buffer.len().await, 1);
        assert_eq!(buffer.size().await, 80);
    }
}
