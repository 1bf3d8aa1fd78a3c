pub mod level;
pub mod event;
pub mod capture;
pub mod translate;
pub mod drain;
pub mod error;
pub mod layout;
pub mod sink;
pub mod client;
pub mod appender;
pub mod layer;
pub mod backend;

#[cfg(feature = "http")]
pub mod http;

pub mod config;
pub mod env;
pub mod init;
pub mod noop_sink;

pub use appender::SentryAppender;
pub use capture::{CaptureRequest, ExceptionCapture, MessageCapture};
pub use drain::DrainCoordinator;
pub use event::{ErrorLike, LogEvent, LogValue};
pub use init::{shutdown, shutdown_and_wait};
pub use layer::SentryLayer;
pub use level::{Level, Severity};
pub use translate::translate;
