/// Error type returned when parsing a DSN.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum DsnError {
    #[error("DSN is missing a scheme")]
    MissingScheme,

    #[error("unsupported DSN scheme: {0}")]
    UnsupportedScheme(String),

    #[error("DSN is missing a public key")]
    MissingPublicKey,

    #[error("DSN is missing a host")]
    MissingHost,

    #[error("invalid host in DSN: {0}")]
    InvalidHost(String),

    #[error("invalid port in DSN: {0}")]
    InvalidPort(String),

    #[error("DSN is missing a project id")]
    MissingProjectId,
}

/// Error type returned when building a sink from configuration.
#[derive(thiserror::Error, Debug)]
pub enum BackendBuildError {
    #[error("http feature is not enabled")]
    HttpFeatureDisabled,

    #[cfg(feature = "http")]
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Error type returned by [`configure`](crate::config::configure) and the
/// config loaders.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid DSN: {0}")]
    Dsn(#[from] DsnError),

    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),

    #[error("invalid value for {key}: {message}")]
    InvalidEnv { key: &'static str, message: String },

    #[error(transparent)]
    Backend(#[from] BackendBuildError),

    #[error("failed to install subscriber: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Error type for a single capture delivery.
#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("capture channel full, capture dropped")]
    ChannelFull,

    #[error("capture worker stopped before delivery")]
    WorkerGone,

    #[error("backend rejected capture with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[cfg(feature = "http")]
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}
