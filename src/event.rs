use crate::level::Level;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::error::Error;
use std::fmt;

/// A single log event as seen by the appender.
///
/// `data[0]` is conventionally the message (or a message template) and any
/// further entries are parameters. Errors may appear anywhere in `data`.
#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub category_name: String,
    pub data: Vec<LogValue>,
}

impl LogEvent {
    pub fn new(level: Level, category_name: impl Into<String>, data: Vec<LogValue>) -> Self {
        LogEvent {
            timestamp: Utc::now(),
            level,
            category_name: category_name.into(),
            data,
        }
    }
}

/// One entry of [`LogEvent::data`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LogValue {
    Text(String),
    Json(serde_json::Value),
    Error(ErrorLike),
}

impl LogValue {
    pub fn as_error(&self) -> Option<&ErrorLike> {
        match self {
            LogValue::Error(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.as_error().is_some()
    }
}

impl fmt::Display for LogValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogValue::Text(s) => f.write_str(s),
            LogValue::Json(serde_json::Value::String(s)) => f.write_str(s),
            LogValue::Json(v) => write!(f, "{}", v),
            LogValue::Error(err) => write!(f, "{}", err),
        }
    }
}

impl From<&str> for LogValue {
    fn from(s: &str) -> Self {
        LogValue::Text(s.to_string())
    }
}

impl From<String> for LogValue {
    fn from(s: String) -> Self {
        LogValue::Text(s)
    }
}

impl From<serde_json::Value> for LogValue {
    fn from(v: serde_json::Value) -> Self {
        LogValue::Json(v)
    }
}

impl From<ErrorLike> for LogValue {
    fn from(err: ErrorLike) -> Self {
        LogValue::Error(err)
    }
}

/// Owned snapshot of an error taken while the event is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorLike {
    /// Type name of the error, best effort.
    pub kind: String,
    pub message: String,
    /// `Display` output of each `source()`, outermost first.
    pub chain: Vec<String>,
}

impl ErrorLike {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        ErrorLike {
            kind: kind.into(),
            message: message.into(),
            chain: Vec::new(),
        }
    }

    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.chain.push(cause.into());
        self
    }

    /// Capture an error and its source chain.
    ///
    /// `dyn Error` does not expose a type name, so `kind` is taken from the
    /// leading identifier of the `Debug` output (`Os { .. }` gives `Os`,
    /// `ParseIntError { .. }` gives `ParseIntError`) and falls back to
    /// `"Error"`.
    pub fn from_error(err: &(dyn Error + 'static)) -> Self {
        let debug = format!("{:?}", err);
        let kind: String = debug
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == ':')
            .collect();
        let kind = if kind.is_empty() || !kind.starts_with(|c: char| c.is_alphabetic()) {
            "Error".to_string()
        } else {
            kind
        };

        let mut chain = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            chain.push(cause.to_string());
            source = cause.source();
        }

        ErrorLike {
            kind,
            message: err.to_string(),
            chain,
        }
    }
}

impl fmt::Display for ErrorLike {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}
