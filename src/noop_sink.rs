use crate::capture::{ExceptionCapture, MessageCapture};
use crate::error::SinkError;
use crate::sink::CaptureSink;
use async_trait::async_trait;

/// A sink that accepts and drops every capture.
///
/// Useful for measuring the overhead of the appender itself without any
/// network I/O, and for tests that only care about drain accounting.
#[derive(Clone, Default)]
pub struct NoopSink;

#[async_trait]
impl CaptureSink for NoopSink {
    async fn capture_exception(&self, _capture: &ExceptionCapture) -> Result<(), SinkError> {
        Ok(())
    }

    async fn capture_message(&self, _capture: &MessageCapture) -> Result<(), SinkError> {
        Ok(())
    }
}
