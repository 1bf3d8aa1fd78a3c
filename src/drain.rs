use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Callback released once no capture is in flight.
pub type Waiter = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct DrainState {
    in_flight: usize,
    waiters: Vec<Waiter>,
}

/// Tracks captures that were handed to a backend but not yet acknowledged,
/// and releases shutdown waiters once that count drops to zero.
///
/// One coordinator is usually shared by every appender in the process so
/// that shutdown waits for all destinations together. Tests construct their
/// own instance.
#[derive(Default)]
pub struct DrainCoordinator {
    state: Mutex<DrainState>,
}

static GLOBAL: OnceLock<Arc<DrainCoordinator>> = OnceLock::new();

impl DrainCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide coordinator used by [`configure`](crate::config::configure)
    /// and [`shutdown`](crate::init::shutdown).
    pub fn global() -> Arc<DrainCoordinator> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(DrainCoordinator::new())))
    }

    /// Record that one capture was dispatched.
    pub fn on_dispatch(&self) {
        self.state.lock().in_flight += 1;
    }

    /// Record that one capture was acknowledged, successfully or not.
    ///
    /// An acknowledgment with nothing in flight is a pairing bug in the
    /// caller; the count stays at zero and a warning is emitted.
    pub fn on_acknowledged(&self) {
        let released = {
            let mut state = self.state.lock();
            if state.in_flight == 0 {
                None
            } else {
                state.in_flight -= 1;
                if state.in_flight == 0 {
                    Some(std::mem::take(&mut state.waiters))
                } else {
                    Some(Vec::new())
                }
            }
        };
        match released {
            Some(waiters) => release(waiters),
            None => warn!("capture acknowledged with no capture in flight, ignoring"),
        }
    }

    /// Ask to be notified once every in-flight capture is acknowledged.
    ///
    /// With nothing in flight, `callback` and every waiter queued earlier run
    /// immediately, in registration order. Otherwise `callback` is queued and
    /// runs when the count reaches zero. Waiters run on the thread that
    /// releases them, after the internal lock is dropped.
    pub fn request_shutdown(&self, callback: Option<Waiter>) {
        let (released, in_flight, waiting) = {
            let mut state = self.state.lock();
            if let Some(cb) = callback {
                state.waiters.push(cb);
            }
            if state.in_flight == 0 {
                (std::mem::take(&mut state.waiters), 0, 0)
            } else {
                (Vec::new(), state.in_flight, state.waiters.len())
            }
        };
        if in_flight > 0 {
            debug!(in_flight, waiters = waiting, "shutdown requested, waiting for captures to drain");
        }
        release(released);
    }

    /// Resolves once nothing is in flight.
    pub async fn drained(&self) {
        let (tx, rx) = oneshot::channel();
        self.request_shutdown(Some(Box::new(move || {
            let _ = tx.send(());
        })));
        let _ = rx.await;
    }

    /// Dispatch a capture and get the ticket that acknowledges it on drop.
    pub fn begin(self: &Arc<Self>) -> InFlight {
        self.on_dispatch();
        InFlight {
            coordinator: Arc::clone(self),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.state.lock().in_flight
    }

    pub fn pending_waiters(&self) -> usize {
        self.state.lock().waiters.len()
    }
}

fn release(waiters: Vec<Waiter>) {
    for waiter in waiters {
        waiter();
    }
}

/// Completion ticket for one dispatched capture.
///
/// Dropping the ticket acknowledges the capture exactly once, whether the
/// delivery succeeded, failed, or never left the process.
#[must_use = "dropping the ticket acknowledges the capture immediately"]
pub struct InFlight {
    coordinator: Arc<DrainCoordinator>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.coordinator.on_acknowledged();
    }
}
