use crate::backend::Dsn;
use crate::capture::{CaptureMetadata, ExceptionCapture, MessageCapture};
use crate::error::SinkError;
use crate::event::ErrorLike;
use crate::sink::CaptureSink;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Map, Value};
use std::time::Duration;

/// Client identifier sent in the auth header and the `sdk` block.
pub const CLIENT_NAME: &str = concat!("tracing-sentry-sink/", env!("CARGO_PKG_VERSION"));

/// Request timeout used when `timeout_ms` is not set.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Option keys copied onto every event payload.
const EVENT_OPTION_KEYS: &[&str] = &["environment", "release", "dist", "server_name", "tags", "extra"];

/// Sentry implementation of [`CaptureSink`] using the HTTP store endpoint.
///
/// `options` come straight from configuration. Keys listed in
/// `EVENT_OPTION_KEYS` are merged into every event; `timeout_ms` sets the
/// request timeout (default [`DEFAULT_TIMEOUT`]). Other keys are ignored.
#[derive(Clone)]
pub struct HttpSink {
    client: Client,
    dsn: Dsn,
    options: Map<String, Value>,
    timeout: Duration,
}

impl HttpSink {
    /// Construct a new sink for `dsn`.
    ///
    /// **Returns**
    /// - `Err(..)` if the underlying HTTP client could not be built.
    pub fn new(dsn: Dsn, options: Map<String, Value>) -> Result<Self, reqwest::Error> {
        let timeout = options
            .get("timeout_ms")
            .and_then(Value::as_u64)
            .map_or(DEFAULT_TIMEOUT, Duration::from_millis);
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            dsn,
            options,
            timeout,
        })
    }

    pub fn dsn(&self) -> &Dsn {
        &self.dsn
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn base_payload(&self, message: &str, metadata: &CaptureMetadata) -> Map<String, Value> {
        let mut payload = Map::new();
        for key in EVENT_OPTION_KEYS {
            if let Some(value) = self.options.get(*key) {
                payload.insert((*key).to_string(), value.clone());
            }
        }
        payload.insert("event_id".into(), json!(format!("{:032x}", rand::random::<u128>())));
        payload.insert("timestamp".into(), json!(metadata.timestamp.to_rfc3339()));
        payload.insert("platform".into(), json!("other"));
        payload.insert("level".into(), json!(metadata.severity));
        payload.insert("logger".into(), json!(metadata.logger));
        payload.insert("message".into(), json!(message));
        if let Some(entry) = &metadata.log_entry {
            payload.insert(
                "logentry".into(),
                json!({
                    "message": entry.template,
                    "params": entry.params,
                    "formatted": message,
                }),
            );
        }
        payload.insert(
            "sdk".into(),
            json!({
                "name": "tracing-sentry-sink",
                "version": env!("CARGO_PKG_VERSION"),
            }),
        );
        payload
    }

    async fn post(&self, payload: Map<String, Value>) -> Result<(), SinkError> {
        let body = serde_json::to_vec(&payload)?;
        let resp = self
            .client
            .post(self.dsn.store_url())
            .header("X-Sentry-Auth", self.dsn.auth_header(CLIENT_NAME))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await?;

        if resp.status().is_success() {
            Ok(())
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_else(|_| "<no body>".to_string());
            Err(SinkError::Status { status, body })
        }
    }
}

/// Sentry wants the innermost cause first and the reported error last.
fn exception_values(error: &ErrorLike) -> Value {
    let mut values: Vec<Value> = error
        .chain
        .iter()
        .rev()
        .map(|cause| json!({ "type": "Error", "value": cause }))
        .collect();
    values.push(json!({ "type": error.kind, "value": error.message }));
    json!({ "values": values })
}

#[async_trait]
impl CaptureSink for HttpSink {
    async fn capture_exception(&self, capture: &ExceptionCapture) -> Result<(), SinkError> {
        let mut payload = self.base_payload(&capture.rendered_message, &capture.metadata);
        payload.insert("exception".into(), exception_values(&capture.error));
        self.post(payload).await
    }

    async fn capture_message(&self, capture: &MessageCapture) -> Result<(), SinkError> {
        let payload = self.base_payload(&capture.message, &capture.metadata);
        self.post(payload).await
    }
}
