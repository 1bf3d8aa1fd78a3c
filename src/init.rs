use crate::appender::SentryAppender;
use crate::config::{configure, AppenderConfig};
use crate::drain::{DrainCoordinator, Waiter};
use crate::error::ConfigError;
use crate::layer::SentryLayer;
use tokio::task::JoinHandle;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Subscriber options.
///
/// **Fields**
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt::Layer` is added
///   next to [`SentryLayer`] so events are also printed to the console.
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub enable_stdout: bool,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            enable_stdout: true,
        }
    }
}

/// Install a global `tracing` subscriber that reports through `appender`.
///
/// **Effects**
///
/// This installs a [`Registry`] combined with [`SentryLayer`] as the global
/// default subscriber, so all `tracing` events in the process are observed
/// by the layer.
pub fn init_tracing_with_config(
    appender: SentryAppender,
    config: LayerConfig,
) -> Result<(), ConfigError> {
    let layer = SentryLayer::new(appender);

    // The fmt layer changes the subscriber type, so build it in two variants.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(())
}

/// Configure an appender from `config` and install it with
/// [`LayerConfig::default`].
///
/// This is the recommended entrypoint for typical services. Must be called
/// from within a Tokio runtime.
pub fn init_tracing(config: &AppenderConfig) -> Result<JoinHandle<()>, ConfigError> {
    let (appender, handle) = configure(config)?;
    init_tracing_with_config(appender, LayerConfig::default())?;
    Ok(handle)
}

/// Run `callback` once every capture made through the process-wide
/// coordinator is acknowledged. Runs immediately when nothing is in flight.
pub fn shutdown(callback: Option<Waiter>) {
    DrainCoordinator::global().request_shutdown(callback);
}

/// Wait until every capture made through the process-wide coordinator is
/// acknowledged. There is no timeout; wrap in `tokio::time::timeout` if the
/// backend may hang.
pub async fn shutdown_and_wait() {
    DrainCoordinator::global().drained().await;
}
