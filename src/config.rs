use crate::appender::SentryAppender;
use crate::backend::{make_sink, parse_dsn};
use crate::client::SentryClient;
use crate::drain::DrainCoordinator;
use crate::env::{
    env_or, SENTRY_BUFFER_ENV, SENTRY_DSN_ENV, SENTRY_ENVIRONMENT_ENV, SENTRY_LEVEL_ENV,
    SENTRY_RELEASE_ENV,
};
use crate::error::ConfigError;
use crate::layout::LayoutConfig;
use crate::level::Level;
use crate::sink::CaptureSink;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

fn default_channel_buffer() -> usize {
    1024
}

/// Appender configuration.
///
/// ```json
/// {
///   "dsn": "https://key@o0.ingest.sentry.io/42",
///   "options": { "environment": "production" },
///   "layout": { "type": "pattern", "pattern": "%c - %m" },
///   "level": "WARN"
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct AppenderConfig {
    /// Destination of the captures.
    pub dsn: String,
    /// Backend settings, passed to the sink unmodified.
    #[serde(default)]
    pub options: Map<String, Value>,
    #[serde(default)]
    pub layout: Option<LayoutConfig>,
    /// Minimum level to report; everything is reported when unset.
    #[serde(default)]
    pub level: Option<Level>,
    /// Captures queued before new ones are dropped.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer: usize,
}

impl AppenderConfig {
    pub fn new(dsn: impl Into<String>) -> Self {
        AppenderConfig {
            dsn: dsn.into(),
            options: Map::new(),
            layout: None,
            level: None,
            channel_buffer: default_channel_buffer(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build a config from `SENTRY_*` environment variables.
    ///
    /// `SENTRY_DSN` is required. `SENTRY_ENVIRONMENT` and `SENTRY_RELEASE`
    /// become the matching options. An unparsable `SENTRY_LEVEL` or
    /// `SENTRY_CHANNEL_BUFFER` is an error; empty values are treated as unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let dsn = std::env::var(SENTRY_DSN_ENV).map_err(|_| ConfigError::MissingEnv(SENTRY_DSN_ENV))?;
        let mut config = AppenderConfig::new(dsn);

        let level = env_or(SENTRY_LEVEL_ENV, "");
        if !level.is_empty() {
            let level = level.parse().map_err(|message| ConfigError::InvalidEnv {
                key: SENTRY_LEVEL_ENV,
                message,
            })?;
            config.level = Some(level);
        }
        let buffer = env_or(SENTRY_BUFFER_ENV, "");
        if !buffer.is_empty() {
            config.channel_buffer =
                buffer
                    .trim()
                    .parse::<usize>()
                    .map_err(|e| ConfigError::InvalidEnv {
                        key: SENTRY_BUFFER_ENV,
                        message: format!("'{}': {}", buffer, e),
                    })?;
        }
        for (env, key) in [
            (SENTRY_ENVIRONMENT_ENV, "environment"),
            (SENTRY_RELEASE_ENV, "release"),
        ] {
            let value = env_or(env, "");
            if !value.is_empty() {
                config.options.insert(key.to_string(), Value::String(value));
            }
        }
        Ok(config)
    }
}

/// Build an appender from configuration, reporting to the HTTP sink for
/// `config.dsn` and counting on the process-wide coordinator.
///
/// Must be called from within a Tokio runtime. The returned handle belongs
/// to the client's background task.
pub fn configure(config: &AppenderConfig) -> Result<(SentryAppender, JoinHandle<()>), ConfigError> {
    configure_with(config, DrainCoordinator::global())
}

/// Same as [`configure`] with an explicit coordinator.
pub fn configure_with(
    config: &AppenderConfig,
    drain: Arc<DrainCoordinator>,
) -> Result<(SentryAppender, JoinHandle<()>), ConfigError> {
    let dsn = parse_dsn(&config.dsn)?;
    let sink = make_sink(&dsn, &config.options)?;
    debug!(dsn = %dsn, level = ?config.level, "configured sentry appender");
    Ok(configure_sink(config, sink, drain))
}

/// Build an appender around an existing sink. `config.dsn` is not used.
pub fn configure_sink(
    config: &AppenderConfig,
    sink: Arc<dyn CaptureSink>,
    drain: Arc<DrainCoordinator>,
) -> (SentryAppender, JoinHandle<()>) {
    let (client, handle) = SentryClient::new(sink, config.channel_buffer);
    let layout = config.layout.as_ref().map(LayoutConfig::build);
    let appender = SentryAppender::new(Arc::new(client), layout, config.level, drain);
    (appender, handle)
}
