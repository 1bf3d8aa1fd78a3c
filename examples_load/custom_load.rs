use std::sync::Arc;
use std::time::Instant;
use tokio::time::{timeout, Duration};
use tracing::{error, warn};

use tracing_sentry_sink::config::{configure_sink, AppenderConfig};
use tracing_sentry_sink::init::{init_tracing_with_config, shutdown_and_wait, LayerConfig};
use tracing_sentry_sink::layout::LayoutConfig;
use tracing_sentry_sink::noop_sink::NoopSink;
use tracing_sentry_sink::{DrainCoordinator, Level};

#[tokio::main]
async fn main() {
    let mut config = AppenderConfig::new("http://unused@localhost/0");
    config.channel_buffer = 50_000;
    config.level = Some(Level::Warn);
    config.layout = Some(LayoutConfig::Pattern {
        pattern: "%d %p %c %m".to_string(),
    });

    let (appender, _handle) =
        configure_sink(&config, Arc::new(NoopSink::default()), DrainCoordinator::global());
    init_tracing_with_config(appender, LayerConfig { enable_stdout: false })
        .expect("install subscriber");

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        if i % 2 == 0 {
            error!(iteration = i, "custom load test error");
        } else {
            warn!(iteration = i, "custom load test warning");
        }
    }

    let elapsed = start.elapsed();
    println!("custom config: sent {} events in {:?} (~{:.0} ev/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );

    if timeout(Duration::from_secs(5), shutdown_and_wait()).await.is_err() {
        println!("captures still in flight after 5s");
    }
}
