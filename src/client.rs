use crate::capture::CaptureRequest;
use crate::drain::InFlight;
use crate::error::SinkError;
use crate::sink::CaptureSink;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

struct Job {
    request: CaptureRequest,
    ticket: InFlight,
    done: oneshot::Sender<Result<(), SinkError>>,
}

/// Backend client that hands [`CaptureRequest`]s to a [`CaptureSink`]
/// through a bounded channel drained by a background task.
///
/// Each capture travels with its [`InFlight`] ticket; the worker drops the
/// ticket once the sink returns, so success and failure both count as
/// acknowledged.
pub struct SentryClient {
    sender: mpsc::Sender<Job>,
    /// Captures the sink accepted.
    pub sent_events: Arc<AtomicU64>,
    /// Captures the sink rejected.
    pub failed_events: Arc<AtomicU64>,
    /// Dropped because the channel was full or the worker was gone.
    pub dropped_events: Arc<AtomicU64>,
}

impl SentryClient {
    /// Create a client and spawn the background task that feeds `sink`.
    ///
    /// Must be called from within a Tokio runtime. A minimal `buffer` of 16
    /// is enforced.
    pub fn new(sink: Arc<dyn CaptureSink>, buffer: usize) -> (Self, JoinHandle<()>) {
        let buffer = buffer.max(16);
        let (tx, mut rx) = mpsc::channel::<Job>(buffer);

        let sent_events = Arc::new(AtomicU64::new(0));
        let failed_events = Arc::new(AtomicU64::new(0));
        let dropped_events = Arc::new(AtomicU64::new(0));

        let sent_events_bg = Arc::clone(&sent_events);
        let failed_events_bg = Arc::clone(&failed_events);

        let handle = tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                let Job { request, ticket, done } = job;
                let result = sink.send(&request).await;
                match &result {
                    Ok(()) => {
                        sent_events_bg.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(e) => {
                        failed_events_bg.fetch_add(1, Ordering::Relaxed);
                        warn!(error = %e, logger = request.logger(), "capture delivery failed");
                    }
                }
                drop(ticket);
                let _ = done.send(result);
            }
            if let Err(e) = sink.flush().await {
                warn!(error = %e, "capture sink flush failed");
            }
            debug!("capture worker stopped");
        });

        (
            Self {
                sender: tx,
                sent_events,
                failed_events,
                dropped_events,
            },
            handle,
        )
    }

    /// Queue a capture without blocking.
    ///
    /// If the channel is full or the worker has stopped, the capture and its
    /// ticket are dropped right away and the returned [`Delivery`] resolves
    /// to an error.
    pub fn dispatch(&self, request: CaptureRequest, ticket: InFlight) -> Delivery {
        let (done, rx) = oneshot::channel();
        let job = Job { request, ticket, done };

        if let Err(e) = self.sender.try_send(job) {
            self.dropped_events.fetch_add(1, Ordering::Relaxed);
            let (job, error) = match e {
                mpsc::error::TrySendError::Full(job) => (job, SinkError::ChannelFull),
                mpsc::error::TrySendError::Closed(job) => (job, SinkError::WorkerGone),
            };
            warn!(error = %error, "dropping capture");
            let Job { ticket, done, .. } = job;
            drop(ticket);
            let _ = done.send(Err(error));
        }

        Delivery { rx }
    }
}

/// Completion handle for one dispatched capture.
///
/// Resolves once the sink has answered. Dropping it does not cancel the
/// delivery.
#[must_use = "a Delivery does nothing unless awaited; dropping it is fine"]
pub struct Delivery {
    rx: oneshot::Receiver<Result<(), SinkError>>,
}

impl Future for Delivery {
    type Output = Result<(), SinkError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|result| result.unwrap_or(Err(SinkError::WorkerGone)))
    }
}
