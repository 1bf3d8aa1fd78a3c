use crate::capture::{CaptureMetadata, CaptureRequest, ExceptionCapture, LogEntry, MessageCapture};
use crate::event::LogEvent;
use crate::level::Level;

/// Whether `event` passes the optional minimum level.
pub fn is_reportable(event: &LogEvent, min_level: Option<Level>) -> bool {
    match min_level {
        Some(min) => event.level.is_greater_than_or_equal_to(min),
        None => true,
    }
}

/// Turn one log event into at most one capture request.
///
/// **Parameters**
/// - `event`: the event to report.
/// - `min_level`: events strictly below this level produce nothing.
/// - `rendered_message`: layout output for `event`.
///
/// **Returns**
/// - `None` if the event is filtered out.
/// - `Some(CaptureRequest::Exception(..))` if any data entry is an error.
///   Only the first error in `data` order becomes the captured error; the
///   others stay visible through the log entry parameters.
/// - `Some(CaptureRequest::Message(..))` otherwise.
pub fn translate(
    event: &LogEvent,
    min_level: Option<Level>,
    rendered_message: &str,
) -> Option<CaptureRequest> {
    if !is_reportable(event, min_level) {
        return None;
    }

    let log_entry = match event.data.split_first() {
        Some((template, params)) if !params.is_empty() => Some(LogEntry {
            template: template.to_string(),
            params: params.to_vec(),
        }),
        _ => None,
    };

    let metadata = CaptureMetadata {
        timestamp: event.timestamp,
        severity: event.level.severity(),
        logger: event.category_name.clone(),
        log_entry,
    };

    let first_error = event.data.iter().find_map(|value| value.as_error());

    Some(match first_error {
        Some(error) => CaptureRequest::Exception(ExceptionCapture {
            error: error.clone(),
            metadata,
            rendered_message: rendered_message.to_string(),
        }),
        None => CaptureRequest::Message(MessageCapture {
            message: rendered_message.to_string(),
            metadata,
        }),
    })
}
