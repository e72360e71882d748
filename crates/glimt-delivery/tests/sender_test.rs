//! Batch sender behavior: retry accounting, batching, and bounded parallelism.

use std::sync::Arc;
use std::time::Duration;

use glimt_core::IngestionEvent;
use glimt_delivery::{BatchSender, SenderConfig};
use glimt_testing::{fixtures, RecordingSink};

#[tokio::test]
async fn successful_delivery_returns_nothing_to_retry() {
    let sink = Arc::new(RecordingSink::<IngestionEvent>::new());
    let sender = BatchSender::new(sink.clone(), SenderConfig::default());

    let events = vec![fixtures::trace_event("a"), fixtures::trace_event("b")];
    let retry = sender.send_all(events).await;

    assert!(retry.is_empty());
    assert_eq!(sink.delivered().await.len(), 2);
}

#[tokio::test]
async fn empty_input_sends_no_batches() {
    let sink = Arc::new(RecordingSink::<IngestionEvent>::new());
    let sender = BatchSender::new(sink.clone(), SenderConfig::default());

    let retry = sender.send_all(Vec::new()).await;

    assert!(retry.is_empty());
    assert!(sink.batches().await.is_empty());
}

#[tokio::test]
async fn failed_batch_returns_events_with_incremented_counters() {
    let sink = Arc::new(RecordingSink::<IngestionEvent>::new());
    sink.fail_next(1).await;
    let sender = BatchSender::new(sink.clone(), SenderConfig::default());

    let retry = sender.send_all(vec![fixtures::trace_event("a")]).await;

    assert_eq!(retry.len(), 1);
    assert_eq!(retry[0].failure_count, 1);
}

#[tokio::test]
async fn events_at_retry_ceiling_are_dropped() {
    let sink = Arc::new(RecordingSink::<IngestionEvent>::new());
    sink.fail_always().await;
    let sender = BatchSender::new(sink.clone(), SenderConfig::default());

    let mut events = vec![fixtures::trace_event("a")];
    for expected_remaining in [1, 1, 0] {
        events = sender.send_all(events).await;
        assert_eq!(events.len(), expected_remaining);
    }
    assert!(sink.delivered().await.is_empty());
}

#[tokio::test]
async fn oversized_event_is_still_sent_alone() {
    let sink = Arc::new(RecordingSink::<IngestionEvent>::new());
    let config = SenderConfig { max_batch_bytes: 256, ..Default::default() };
    let sender = BatchSender::new(sink.clone(), config);

    let retry = sender.send_all(vec![fixtures::sized_event(4096)]).await;

    assert!(retry.is_empty());
    let batches = sink.batches().await;
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallelism_bounds_concurrent_batch_deliveries() {
    let sink = Arc::new(RecordingSink::<IngestionEvent>::new().with_delay(Duration::from_millis(25)));
    let config =
        SenderConfig { parallelism: 2, max_batch_bytes: 600, ..Default::default() };
    let sender = BatchSender::new(sink.clone(), config);

    // Eight ~500 byte events with a 600 byte budget: one batch each.
    let events: Vec<_> = (0..8).map(|_| fixtures::sized_event(500)).collect();
    let retry = sender.send_all(events).await;

    assert!(retry.is_empty());
    assert_eq!(sink.batches().await.len(), 8);
    assert!(sink.max_in_flight() <= 2, "at most two deliveries may run at once");
}

#[tokio::test]
async fn zero_parallelism_falls_back_to_default() {
    let sink = Arc::new(RecordingSink::<IngestionEvent>::new());
    let config = SenderConfig { parallelism: 0, ..Default::default() };
    let sender = BatchSender::new(sink.clone(), config);

    let retry = sender.send_all(vec![fixtures::trace_event("a")]).await;
    assert!(retry.is_empty());
    assert_eq!(sink.delivered().await.len(), 1);
}
