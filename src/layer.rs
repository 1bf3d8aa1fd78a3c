use crate::appender::SentryAppender;
use crate::event::{ErrorLike, LogEvent, LogValue};
use crate::level::Level;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// Events from this crate are never reported, whatever the ignore list says.
/// Its diagnostics are emitted while capturing and would feed back into it.
const OWN_TARGET: &str = "tracing_sentry_sink";

/// Default ignore list: the HTTP stack the sink drives.
pub const DEFAULT_IGNORED_TARGETS: &[&str] = &[
    "reqwest",
    "hyper",
    "h2",
    "rustls",
];

/// `tracing_subscriber` layer that turns events into [`LogEvent`]s and
/// hands them to one or more [`SentryAppender`]s.
///
/// The event target becomes the category name, the `message` field becomes
/// `data[0]`, fields recorded as errors become [`LogValue::Error`] and every
/// other field becomes a `{name: value}` JSON parameter. `tracing` has no
/// fatal level, so `ERROR` is the highest level this layer produces.
pub struct SentryLayer {
    appenders: Vec<SentryAppender>,
    ignored_targets: Vec<String>,
    /// Total events seen by the layer (before filtering by level).
    pub total_events: Arc<AtomicU64>,
    /// Events handed to at least one appender.
    pub reported_events: Arc<AtomicU64>,
}

impl SentryLayer {
    pub fn new(appender: SentryAppender) -> Self {
        Self {
            appenders: vec![appender],
            ignored_targets: DEFAULT_IGNORED_TARGETS.iter().map(|t| t.to_string()).collect(),
            total_events: Arc::new(AtomicU64::new(0)),
            reported_events: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Report to an additional destination as well.
    pub fn with_appender(mut self, appender: SentryAppender) -> Self {
        self.appenders.push(appender);
        self
    }

    /// Replace the list of target prefixes that are never reported. This
    /// crate's own targets stay ignored.
    pub fn with_ignored_targets<I, T>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.ignored_targets = targets.into_iter().map(Into::into).collect();
        self
    }

    fn is_ignored(&self, target: &str) -> bool {
        matches_prefix(target, OWN_TARGET)
            || self
                .ignored_targets
                .iter()
                .any(|prefix| matches_prefix(target, prefix))
    }

    fn wants(&self, level: Level) -> bool {
        self.appenders
            .iter()
            .any(|a| a.min_level().map_or(true, |min| level >= min))
    }
}

fn matches_prefix(target: &str, prefix: &str) -> bool {
    target == prefix
        || target
            .strip_prefix(prefix)
            .map_or(false, |rest| rest.starts_with("::"))
}

impl<S> Layer<S> for SentryLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);

        let meta = event.metadata();
        let level = Level::from(*meta.level());
        if !self.wants(level) || self.is_ignored(meta.target()) {
            return;
        }

        let mut message: Option<String> = None;
        let mut params = Vec::new();
        let mut visitor = FieldVisitor {
            message: &mut message,
            params: &mut params,
        };
        event.record(&mut visitor);

        let mut data = Vec::with_capacity(params.len() + 1);
        if let Some(message) = message {
            data.push(LogValue::Text(message));
        }
        data.extend(params);

        let log_event = LogEvent::new(level, meta.target(), data);
        let mut reported = false;
        for appender in &self.appenders {
            reported |= appender.append(&log_event).is_some();
        }
        if reported {
            self.reported_events.fetch_add(1, Ordering::Relaxed);
        }
    }
}

pub struct FieldVisitor<'a> {
    pub message: &'a mut Option<String>,
    pub params: &'a mut Vec<LogValue>,
}

impl<'a> FieldVisitor<'a> {
    fn push(&mut self, field: &Field, value: serde_json::Value) {
        let mut map = serde_json::Map::new();
        map.insert(field.name().to_string(), value);
        self.params.push(LogValue::Json(serde_json::Value::Object(map)));
    }
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.push(field, serde_json::Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push(field, serde_json::Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push(field, serde_json::Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push(field, serde_json::Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push(field, serde_json::Value::from(value));
    }

    fn record_error(&mut self, _field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.params.push(LogValue::Error(ErrorLike::from_error(value)));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.push(field, serde_json::Value::String(format!("{:?}", value)));
        }
    }
}
