use crate::capture::{CaptureRequest, ExceptionCapture, MessageCapture};
use crate::error::SinkError;
use async_trait::async_trait;

/// Asynchronous destination for [`CaptureRequest`]s.
///
/// Implementations are responsible for transporting captures to a concrete
/// backend (the Sentry HTTP API, a test recorder, etc). The
/// [`SentryClient`](crate::client::SentryClient) worker calls these methods
/// from a background task and never awaits them on the application thread.
#[async_trait]
pub trait CaptureSink: Send + Sync {
    /// Report an error together with the rendered message of its event.
    ///
    /// **Returns**
    /// - `Ok(())` if the backend accepted the capture.
    /// - `Err(..)` if delivery failed. The failure is reported on the
    ///   capture's [`Delivery`](crate::client::Delivery) and is not retried.
    async fn capture_exception(&self, capture: &ExceptionCapture) -> Result<(), SinkError>;

    /// Report a plain message.
    async fn capture_message(&self, capture: &MessageCapture) -> Result<(), SinkError>;

    /// Route a request to the matching capture method.
    async fn send(&self, request: &CaptureRequest) -> Result<(), SinkError> {
        match request {
            CaptureRequest::Exception(capture) => self.capture_exception(capture).await,
            CaptureRequest::Message(capture) => self.capture_message(capture).await,
        }
    }

    /// Flush any buffered captures, if the backend implements buffering.
    ///
    /// Default implementation is a no-op.
    async fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }
}
