/// Environment variable names used by this crate for convenient
/// configuration of the appender from services.
///
/// These are purely helpers; see [`AppenderConfig::from_env`](crate::config::AppenderConfig::from_env).

/// Sentry DSN, e.g. `https://key@o0.ingest.sentry.io/42`.
pub const SENTRY_DSN_ENV: &str = "SENTRY_DSN";

/// Optional minimum level (`ALL`, `TRACE`, ... `FATAL`).
pub const SENTRY_LEVEL_ENV: &str = "SENTRY_LEVEL";

/// Optional environment name attached to every capture.
pub const SENTRY_ENVIRONMENT_ENV: &str = "SENTRY_ENVIRONMENT";

/// Optional release attached to every capture.
pub const SENTRY_RELEASE_ENV: &str = "SENTRY_RELEASE";

/// Optional capture channel size.
pub const SENTRY_BUFFER_ENV: &str = "SENTRY_CHANNEL_BUFFER";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
