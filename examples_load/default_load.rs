use std::sync::Arc;
use std::time::Instant;
use tracing::error;

use tracing_sentry_sink::config::{configure_sink, AppenderConfig};
use tracing_sentry_sink::init::{init_tracing_with_config, shutdown_and_wait, LayerConfig};
use tracing_sentry_sink::noop_sink::NoopSink;
use tracing_sentry_sink::DrainCoordinator;

#[tokio::main]
async fn main() {
    let config = AppenderConfig::new("http://unused@localhost/0");
    let (appender, _handle) =
        configure_sink(&config, Arc::new(NoopSink::default()), DrainCoordinator::global());
    let client_dropped = Arc::clone(&appender.client().dropped_events);
    init_tracing_with_config(appender, LayerConfig { enable_stdout: false })
        .expect("install subscriber");

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        error!(iteration = i, "default load test error");
    }

    let elapsed = start.elapsed();
    println!("default config: sent {} events in {:?} (~{:.0} ev/s), {} dropped",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64(),
        client_dropped.load(std::sync::atomic::Ordering::Relaxed),
    );

    // Wait for the worker to acknowledge everything that was queued
    shutdown_and_wait().await;
}
