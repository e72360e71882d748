//! Dispatcher control-loop behavior: timer drains, explicit flush, cancellation.

use std::sync::Arc;
use std::time::Duration;

use glimt_core::IngestionEvent;
use glimt_delivery::{
    BatchSender, Dispatcher, DispatcherConfig, DispatcherHandle, EventBuffer, SenderConfig, Sink,
};
use glimt_testing::{fixtures, RecordingSink};
use tokio_util::sync::CancellationToken;

fn pipeline(
    sink: Arc<RecordingSink<IngestionEvent>>,
    config: DispatcherConfig,
) -> (Arc<EventBuffer<IngestionEvent>>, DispatcherHandle<IngestionEvent>, CancellationToken) {
    let buffer = Arc::new(EventBuffer::with_default_capacity());
    let sink: Arc<dyn Sink<IngestionEvent>> = sink;
    let sender = Arc::new(BatchSender::new(sink, SenderConfig::default()));
    let shutdown = CancellationToken::new();
    let (dispatcher, handle) =
        Dispatcher::new(Arc::clone(&buffer), sender, config, shutdown.clone());
    tokio::spawn(dispatcher.run());
    (buffer, handle, shutdown)
}

fn slow_timer_config() -> DispatcherConfig {
    // Keep the timer out of the way so tests drive drains explicitly.
    DispatcherConfig { flush_interval: Duration::from_secs(3600), ..Default::default() }
}

#[tokio::test(start_paused = true)]
async fn timer_tick_drains_buffer() {
    let sink = Arc::new(RecordingSink::new());
    let config =
        DispatcherConfig { flush_interval: Duration::from_millis(100), ..Default::default() };
    let (_buffer, handle, _shutdown) = pipeline(Arc::clone(&sink), config);

    handle.dispatch(fixtures::trace_event("tick")).await;
    tokio::time::sleep(Duration::from_millis(250)).await;

    assert_eq!(sink.delivered().await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn flush_and_wait_delivers_everything_and_closes() {
    let sink = Arc::new(RecordingSink::new());
    let (buffer, handle, _shutdown) = pipeline(Arc::clone(&sink), slow_timer_config());

    for i in 0..5 {
        handle.dispatch(fixtures::trace_event(&format!("e{i}"))).await;
    }
    handle.flush_and_wait().await;

    assert_eq!(sink.delivered().await.len(), 5);
    assert!(buffer.is_empty().await);
    assert!(handle.is_closed());
}

#[tokio::test(start_paused = true)]
async fn flush_and_wait_is_idempotent_after_close() {
    let sink = Arc::new(RecordingSink::new());
    let (_buffer, handle, _shutdown) = pipeline(Arc::clone(&sink), slow_timer_config());

    handle.dispatch(fixtures::trace_event("once")).await;
    handle.flush_and_wait().await;
    handle.flush_and_wait().await;
    handle.flush();

    assert_eq!(sink.delivered().await.len(), 1);
    assert!(handle.is_closed());
}

#[tokio::test(start_paused = true)]
async fn cancellation_drains_before_exit() {
    let sink = Arc::new(RecordingSink::new());
    let (buffer, handle, shutdown) = pipeline(Arc::clone(&sink), slow_timer_config());

    handle.dispatch(fixtures::trace_event("late")).await;
    shutdown.cancel();

    // Wait for the loop to observe the token and run its final drain.
    for _ in 0..100 {
        if handle.is_closed() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert!(handle.is_closed());
    assert!(buffer.is_empty().await);
    assert_eq!(sink.delivered().await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_events_are_requeued_and_retried() {
    let sink = Arc::new(RecordingSink::new());
    sink.fail_next(1).await;
    let (_buffer, handle, _shutdown) = pipeline(Arc::clone(&sink), slow_timer_config());

    handle.dispatch(fixtures::trace_event("retry-me")).await;
    handle.flush();
    handle.flush_and_wait().await;

    // First drain failed, second succeeded with the re-queued event.
    assert_eq!(sink.attempts(), 2);
    assert_eq!(sink.delivered().await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn events_past_retry_ceiling_never_resent() {
    let sink = Arc::new(RecordingSink::new());
    sink.fail_always().await;
    let (buffer, handle, _shutdown) = pipeline(Arc::clone(&sink), slow_timer_config());

    handle.dispatch(fixtures::trace_event("doomed")).await;
    for _ in 0..3 {
        handle.flush();
    }
    handle.flush_and_wait().await;

    // Three failing drains exhaust the ceiling; the final drain finds
    // an empty buffer and nothing is ever delivered.
    assert!(buffer.is_empty().await);
    assert!(sink.delivered().await.is_empty());
}
