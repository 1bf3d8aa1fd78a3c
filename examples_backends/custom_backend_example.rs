use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};
use tracing_sentry_sink::{
    capture::{ExceptionCapture, MessageCapture},
    config::{configure_sink, AppenderConfig},
    error::SinkError,
    init::{init_tracing_with_config, shutdown, LayerConfig},
    sink::CaptureSink,
    DrainCoordinator, Level,
};

/// Example of integrating a completely custom backend by implementing
/// the `CaptureSink` trait directly. Imagine this talks to some in-house
/// error tracker for which this crate does not provide a built-in sink.
struct MyErrorTracker;

#[async_trait]
impl CaptureSink for MyErrorTracker {
    async fn capture_exception(&self, capture: &ExceptionCapture) -> Result<(), SinkError> {
        // Here you would call your own client library for the tracker.
        // For the sake of example we just print the capture.
        println!(
            "[my-tracker] {} {}: {} ({})",
            capture.metadata.severity, capture.metadata.logger, capture.error, capture.rendered_message
        );
        Ok(())
    }

    async fn capture_message(&self, capture: &MessageCapture) -> Result<(), SinkError> {
        println!(
            "[my-tracker] {} {}: {}",
            capture.metadata.severity, capture.metadata.logger, capture.message
        );
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("simulated failure")]
struct SimulatedError;

#[tokio::main]
async fn main() {
    let mut config = AppenderConfig::new("http://unused@localhost/0");
    config.level = Some(Level::Warn);

    let sink: Arc<dyn CaptureSink> = Arc::new(MyErrorTracker);
    let (appender, _handle) = configure_sink(&config, sink, DrainCoordinator::global());
    init_tracing_with_config(appender, LayerConfig::default()).expect("install subscriber");

    info!("custom backend example started");
    let err = SimulatedError;
    error!(error = &err as &(dyn std::error::Error + 'static), "request failed");

    let (tx, rx) = tokio::sync::oneshot::channel();
    shutdown(Some(Box::new(move || {
        let _ = tx.send(());
    })));
    let _ = rx.await;
}
