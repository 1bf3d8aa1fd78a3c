use crate::client::{Delivery, SentryClient};
use crate::drain::{DrainCoordinator, Waiter};
use crate::event::LogEvent;
use crate::layout::{Layout, PassThroughLayout};
use crate::level::Level;
use crate::translate::{is_reportable, translate};
use std::sync::Arc;

/// Appender that reports log events through a [`SentryClient`].
///
/// Every reported event is counted on the shared [`DrainCoordinator`] until
/// the client acknowledges it.
#[derive(Clone)]
pub struct SentryAppender {
    client: Arc<SentryClient>,
    layout: Arc<dyn Layout>,
    min_level: Option<Level>,
    drain: Arc<DrainCoordinator>,
}

impl SentryAppender {
    /// **Parameters**
    /// - `client`: backend client the captures are dispatched to.
    /// - `layout`: renders the event message; defaults to
    ///   [`PassThroughLayout`].
    /// - `min_level`: events below this level are ignored.
    /// - `drain`: coordinator shared with every other appender that must be
    ///   drained on shutdown.
    pub fn new(
        client: Arc<SentryClient>,
        layout: Option<Arc<dyn Layout>>,
        min_level: Option<Level>,
        drain: Arc<DrainCoordinator>,
    ) -> Self {
        Self {
            client,
            layout: layout.unwrap_or_else(|| Arc::new(PassThroughLayout)),
            min_level,
            drain,
        }
    }

    /// Report one event.
    ///
    /// Returns the completion handle of the dispatched capture, or `None` if
    /// the event was below the minimum level. Never fails; delivery errors
    /// surface on the returned [`Delivery`].
    pub fn append(&self, event: &LogEvent) -> Option<Delivery> {
        if !is_reportable(event, self.min_level) {
            return None;
        }
        let message = self.layout.format(event);
        let request = translate(event, self.min_level, &message)?;
        let ticket = self.drain.begin();
        Some(self.client.dispatch(request, ticket))
    }

    pub fn min_level(&self) -> Option<Level> {
        self.min_level
    }

    pub fn client(&self) -> &SentryClient {
        &self.client
    }

    pub fn drain(&self) -> &Arc<DrainCoordinator> {
        &self.drain
    }

    /// Request shutdown on this appender's coordinator.
    pub fn shutdown(&self, callback: Option<Waiter>) {
        self.drain.request_shutdown(callback);
    }
}
