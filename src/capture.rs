use crate::event::{ErrorLike, LogValue};
use crate::level::Severity;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Structured form of a templated message, kept next to the rendered text
/// whenever an event carried more than one data entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub template: String,
    pub params: Vec<LogValue>,
}

/// Metadata attached to every capture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptureMetadata {
    /// When the event was logged, not when it is sent.
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub logger: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_entry: Option<LogEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExceptionCapture {
    pub error: ErrorLike,
    pub metadata: CaptureMetadata,
    /// Layout output for the whole event.
    pub rendered_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageCapture {
    pub message: String,
    pub metadata: CaptureMetadata,
}

/// What the backend is asked to do with one log event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CaptureRequest {
    Exception(ExceptionCapture),
    Message(MessageCapture),
}

impl CaptureRequest {
    pub fn metadata(&self) -> &CaptureMetadata {
        match self {
            CaptureRequest::Exception(capture) => &capture.metadata,
            CaptureRequest::Message(capture) => &capture.metadata,
        }
    }

    pub fn severity(&self) -> Severity {
        self.metadata().severity
    }

    pub fn logger(&self) -> &str {
        &self.metadata().logger
    }

    pub fn log_entry(&self) -> Option<&LogEntry> {
        self.metadata().log_entry.as_ref()
    }

    /// Human-readable text of the capture, regardless of variant.
    pub fn rendered_message(&self) -> &str {
        match self {
            CaptureRequest::Exception(capture) => &capture.rendered_message,
            CaptureRequest::Message(capture) => &capture.message,
        }
    }

    pub fn is_exception(&self) -> bool {
        matches!(self, CaptureRequest::Exception(_))
    }
}
