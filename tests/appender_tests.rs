//! Integration tests for the appender, client worker and drain coordinator
//!
//! These tests verify:
//! - Translation of events into captures end to end
//! - Drain accounting across success, failure and dropped captures
//! - Shutdown waiters shared by several appenders
//! - Events flowing in from `tracing` through the layer
//! - The crate's own diagnostics never feeding back into the layer

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing_sentry_sink::capture::{CaptureRequest, ExceptionCapture, LogEntry, MessageCapture};
use tracing_sentry_sink::client::SentryClient;
use tracing_sentry_sink::error::SinkError;
use tracing_sentry_sink::layout::Layout;
use tracing_sentry_sink::sink::CaptureSink;
use tracing_sentry_sink::{
    DrainCoordinator, ErrorLike, Level, LogEvent, LogValue, SentryAppender, SentryLayer, Severity,
};
use tracing_subscriber::layer::SubscriberExt;

/// Records every capture; optionally waits for a permit before answering
/// and optionally fails.
#[derive(Default)]
struct RecordingSink {
    captured: Mutex<Vec<CaptureRequest>>,
    gate: Option<Arc<Semaphore>>,
    fail: bool,
}

impl RecordingSink {
    fn gated(gate: Arc<Semaphore>) -> Self {
        RecordingSink {
            gate: Some(gate),
            ..Default::default()
        }
    }

    fn failing() -> Self {
        RecordingSink {
            fail: true,
            ..Default::default()
        }
    }

    fn captured(&self) -> Vec<CaptureRequest> {
        self.captured.lock().clone()
    }

    async fn record(&self, request: CaptureRequest) -> Result<(), SinkError> {
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("semaphore closed").forget();
        }
        self.captured.lock().push(request);
        if self.fail {
            Err(SinkError::Other("backend unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CaptureSink for RecordingSink {
    async fn capture_exception(&self, capture: &ExceptionCapture) -> Result<(), SinkError> {
        self.record(CaptureRequest::Exception(capture.clone())).await
    }

    async fn capture_message(&self, capture: &MessageCapture) -> Result<(), SinkError> {
        self.record(CaptureRequest::Message(capture.clone())).await
    }
}

fn appender_with(
    sink: Arc<RecordingSink>,
    layout: Option<Arc<dyn Layout>>,
    min_level: Option<Level>,
    drain: Arc<DrainCoordinator>,
) -> SentryAppender {
    let (client, _handle) = SentryClient::new(sink, 16);
    SentryAppender::new(Arc::new(client), layout, min_level, drain)
}

fn counter_waiter(counter: &Arc<AtomicUsize>) -> Box<dyn FnOnce() + Send> {
    let counter = Arc::clone(counter);
    Box::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    })
}

#[tokio::test]
async fn test_error_event_becomes_exception_capture() {
    let sink = Arc::new(RecordingSink::default());
    let drain = Arc::new(DrainCoordinator::new());
    let layout: Arc<dyn Layout> =
        Arc::new(|event: &LogEvent| format!("[{}] {}", event.category_name, event.data[0]));
    let appender = appender_with(Arc::clone(&sink), Some(layout), None, Arc::clone(&drain));

    let err = ErrorLike::new("ConnectionError", "refused");
    let event = LogEvent::new(
        Level::Error,
        "db",
        vec!["connection failed".into(), err.clone().into()],
    );

    let delivery = appender.append(&event).expect("event should be reported");
    assert_eq!(drain.in_flight(), 1);
    delivery.await.expect("delivery should succeed");
    assert_eq!(drain.in_flight(), 0);

    let captured = sink.captured();
    assert_eq!(captured.len(), 1);
    let CaptureRequest::Exception(capture) = &captured[0] else {
        panic!("expected exception capture, got {:?}", captured[0]);
    };
    assert_eq!(capture.error, err);
    assert_eq!(capture.rendered_message, "[db] connection failed");
    assert_eq!(capture.metadata.severity, Severity::Error);
    assert_eq!(capture.metadata.logger, "db");
    assert_eq!(
        capture.metadata.log_entry,
        Some(LogEntry {
            template: "connection failed".to_string(),
            params: vec![LogValue::Error(err)],
        })
    );
}

#[tokio::test]
async fn test_plain_event_becomes_message_capture() {
    let sink = Arc::new(RecordingSink::default());
    let drain = Arc::new(DrainCoordinator::new());
    let appender = appender_with(Arc::clone(&sink), None, None, drain);

    let event = LogEvent::new(Level::Info, "api", vec!["request ok".into()]);
    appender.append(&event).unwrap().await.unwrap();

    let captured = sink.captured();
    let CaptureRequest::Message(capture) = &captured[0] else {
        panic!("expected message capture");
    };
    assert_eq!(capture.message, "request ok");
    assert_eq!(capture.metadata.severity, Severity::Info);
    assert!(capture.metadata.log_entry.is_none());
}

#[tokio::test]
async fn test_filtered_event_is_not_counted() {
    let sink = Arc::new(RecordingSink::default());
    let drain = Arc::new(DrainCoordinator::new());
    let appender = appender_with(Arc::clone(&sink), None, Some(Level::Warn), Arc::clone(&drain));

    let event = LogEvent::new(Level::Info, "api", vec!["chatty".into()]);
    assert!(appender.append(&event).is_none());
    assert_eq!(drain.in_flight(), 0);

    drain.drained().await;
    assert!(sink.captured().is_empty());
}

#[tokio::test]
async fn test_failed_delivery_still_acknowledges() {
    let sink = Arc::new(RecordingSink::failing());
    let drain = Arc::new(DrainCoordinator::new());
    let appender = appender_with(Arc::clone(&sink), None, None, Arc::clone(&drain));

    let event = LogEvent::new(Level::Fatal, "core", vec!["disk gone".into()]);
    let result = appender.append(&event).unwrap().await;

    assert!(matches!(result, Err(SinkError::Other(_))));
    assert_eq!(drain.in_flight(), 0);
    assert_eq!(appender.client().failed_events.load(Ordering::Relaxed), 1);
    assert_eq!(sink.captured().len(), 1);
}

#[tokio::test]
async fn test_shutdown_waits_for_pending_captures() {
    let gate = Arc::new(Semaphore::new(0));
    let sink = Arc::new(RecordingSink::gated(Arc::clone(&gate)));
    let drain = Arc::new(DrainCoordinator::new());
    let appender = appender_with(Arc::clone(&sink), None, None, Arc::clone(&drain));

    let deliveries: Vec<_> = (0..3)
        .map(|i| {
            let event = LogEvent::new(Level::Error, "jobs", vec![format!("job {} failed", i).into()]);
            appender.append(&event).unwrap()
        })
        .collect();
    assert_eq!(drain.in_flight(), 3);

    let fired = Arc::new(AtomicUsize::new(0));
    appender.shutdown(Some(counter_waiter(&fired)));
    assert_eq!(drain.pending_waiters(), 1);

    gate.add_permits(2);
    let mut deliveries = deliveries.into_iter();
    deliveries.next().unwrap().await.unwrap();
    deliveries.next().unwrap().await.unwrap();
    assert_eq!(drain.in_flight(), 1);
    assert_eq!(fired.load(Ordering::SeqCst), 0);

    gate.add_permits(1);
    deliveries.next().unwrap().await.unwrap();
    assert_eq!(drain.in_flight(), 0);
    assert_eq!(fired.load(Ordering::SeqCst), 1);

    // Idle again: new waiters fire immediately.
    appender.shutdown(Some(counter_waiter(&fired)));
    assert_eq!(fired.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_full_channel_drops_and_acknowledges() {
    let gate = Arc::new(Semaphore::new(0));
    let sink = Arc::new(RecordingSink::gated(Arc::clone(&gate)));
    let drain = Arc::new(DrainCoordinator::new());
    let appender = appender_with(Arc::clone(&sink), None, None, Arc::clone(&drain));

    // The worker has not run yet, so exactly 16 captures fit in the channel.
    let event = LogEvent::new(Level::Error, "burst", vec!["overload".into()]);
    let queued: Vec<_> = (0..16).map(|_| appender.append(&event).unwrap()).collect();
    let overflow = appender.append(&event).unwrap();

    assert!(matches!(overflow.await, Err(SinkError::ChannelFull)));
    assert_eq!(drain.in_flight(), 16);
    assert_eq!(appender.client().dropped_events.load(Ordering::Relaxed), 1);

    gate.add_permits(16);
    for delivery in queued {
        delivery.await.unwrap();
    }
    drain.drained().await;
    assert_eq!(sink.captured().len(), 16);
}

#[tokio::test]
async fn test_shared_coordinator_drains_all_destinations() {
    let gate = Arc::new(Semaphore::new(0));
    let slow = Arc::new(RecordingSink::gated(Arc::clone(&gate)));
    let fast = Arc::new(RecordingSink::default());
    let drain = Arc::new(DrainCoordinator::new());

    let first = appender_with(Arc::clone(&fast), None, None, Arc::clone(&drain));
    let second = appender_with(Arc::clone(&slow), None, None, Arc::clone(&drain));

    let event = LogEvent::new(Level::Warn, "multi", vec!["both".into()]);
    let fast_delivery = first.append(&event).unwrap();
    let slow_delivery = second.append(&event).unwrap();

    let fired = Arc::new(AtomicUsize::new(0));
    drain.request_shutdown(Some(counter_waiter(&fired)));

    fast_delivery.await.unwrap();
    assert_eq!(drain.in_flight(), 1);
    assert_eq!(fired.load(Ordering::SeqCst), 0);

    gate.add_permits(1);
    slow_delivery.await.unwrap();
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[derive(Debug, thiserror::Error)]
#[error("connection refused")]
struct ConnectError;

#[tokio::test]
async fn test_tracing_events_flow_through_layer() {
    let sink = Arc::new(RecordingSink::default());
    let drain = Arc::new(DrainCoordinator::new());
    let appender = appender_with(Arc::clone(&sink), None, Some(Level::Warn), Arc::clone(&drain));
    let layer = SentryLayer::new(appender);
    let reported = Arc::clone(&layer.reported_events);
    let subscriber = tracing_subscriber::registry().with(layer);

    tracing::subscriber::with_default(subscriber, || {
        let err = ConnectError;
        tracing::info!("below threshold");
        tracing::warn!(user_id = 42, "slow login");
        tracing::error!(error = &err as &(dyn std::error::Error + 'static), "connection failed");
        tracing::error!(target: "tracing_sentry_sink::client", "internal");
    });

    drain.drained().await;
    assert_eq!(reported.load(Ordering::Relaxed), 2);

    let captured = sink.captured();
    assert_eq!(captured.len(), 2);

    let CaptureRequest::Message(warning) = &captured[0] else {
        panic!("expected message capture");
    };
    assert_eq!(warning.message, "slow login");
    assert_eq!(warning.metadata.severity, Severity::Warning);
    assert_eq!(warning.metadata.logger, "appender_tests");
    assert_eq!(
        warning.metadata.log_entry.as_ref().unwrap().params,
        vec![LogValue::Json(serde_json::json!({"user_id": 42}))]
    );

    let CaptureRequest::Exception(failure) = &captured[1] else {
        panic!("expected exception capture");
    };
    assert_eq!(failure.error.kind, "ConnectError");
    assert_eq!(failure.error.message, "connection refused");
    assert_eq!(failure.rendered_message, "connection failed");
    assert_eq!(failure.metadata.severity, Severity::Error);
}

#[tokio::test]
async fn test_own_diagnostics_are_never_captured() {
    let gate = Arc::new(Semaphore::new(0));
    let sink = Arc::new(RecordingSink::gated(Arc::clone(&gate)));
    let drain = Arc::new(DrainCoordinator::new());
    let appender = appender_with(Arc::clone(&sink), None, None, Arc::clone(&drain));
    let dropped = Arc::clone(&appender.client().dropped_events);
    // An empty ignore list must not expose this crate's own targets.
    let layer = SentryLayer::new(appender).with_ignored_targets(Vec::<String>::new());
    let reported = Arc::clone(&layer.reported_events);
    let subscriber = tracing_subscriber::registry().with(layer);
    let fired = Arc::new(AtomicUsize::new(0));

    tracing::subscriber::with_default(subscriber, || {
        // Logs "shutdown requested" while a capture is pending.
        drain.on_dispatch();
        drain.request_shutdown(Some(counter_waiter(&fired)));
        drain.on_acknowledged();
        // Logs the unpaired acknowledgment warning.
        drain.on_acknowledged();

        // The worker has not run yet, so the 17th capture overflows the
        // channel and logs "dropping capture".
        for i in 0..17 {
            tracing::error!(attempt = i, "job failed");
        }
    });

    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert_eq!(reported.load(Ordering::Relaxed), 17);
    assert_eq!(dropped.load(Ordering::Relaxed), 1);
    assert_eq!(drain.in_flight(), 16);

    gate.add_permits(16);
    drain.drained().await;
    let captured = sink.captured();
    assert_eq!(captured.len(), 16);
    assert!(captured.iter().all(|c| c.logger() == "appender_tests"));
}
