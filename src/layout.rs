use crate::event::LogEvent;
use serde::Deserialize;
use std::sync::Arc;

/// Renders a human-readable string from a [`LogEvent`].
pub trait Layout: Send + Sync {
    fn format(&self, event: &LogEvent) -> String;
}

impl<F> Layout for F
where
    F: Fn(&LogEvent) -> String + Send + Sync,
{
    fn format(&self, event: &LogEvent) -> String {
        self(event)
    }
}

/// Passes the first data entry through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughLayout;

impl Layout for PassThroughLayout {
    fn format(&self, event: &LogEvent) -> String {
        event
            .data
            .first()
            .map(|value| value.to_string())
            .unwrap_or_default()
    }
}

/// `[timestamp] [LEVEL] category - message`
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicLayout;

impl Layout for BasicLayout {
    fn format(&self, event: &LogEvent) -> String {
        format!(
            "[{}] [{}] {} - {}",
            event.timestamp.to_rfc3339(),
            event.level,
            event.category_name,
            joined_data(event)
        )
    }
}

/// Layout driven by a pattern string.
///
/// Recognized tokens: `%d` timestamp (RFC 3339), `%p` level, `%c` category,
/// `%m` message, `%n` newline, `%%` a literal percent sign. Anything else is
/// copied as is.
#[derive(Debug, Clone)]
pub struct PatternLayout {
    pattern: String,
}

impl PatternLayout {
    pub fn new(pattern: impl Into<String>) -> Self {
        PatternLayout {
            pattern: pattern.into(),
        }
    }
}

impl Layout for PatternLayout {
    fn format(&self, event: &LogEvent) -> String {
        let mut out = String::with_capacity(self.pattern.len() + 32);
        let mut chars = self.pattern.chars();
        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('d') => out.push_str(&event.timestamp.to_rfc3339()),
                Some('p') => out.push_str(event.level.as_str()),
                Some('c') => out.push_str(&event.category_name),
                Some('m') => out.push_str(&joined_data(event)),
                Some('n') => out.push('\n'),
                Some('%') => out.push('%'),
                Some(other) => {
                    out.push('%');
                    out.push(other);
                }
                None => out.push('%'),
            }
        }
        out
    }
}

fn joined_data(event: &LogEvent) -> String {
    event
        .data
        .iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Layout selection as it appears in configuration: `{"type": "...", ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LayoutConfig {
    MessagePassThrough,
    Basic,
    Pattern { pattern: String },
}

impl LayoutConfig {
    pub fn build(&self) -> Arc<dyn Layout> {
        match self {
            LayoutConfig::MessagePassThrough => Arc::new(PassThroughLayout),
            LayoutConfig::Basic => Arc::new(BasicLayout),
            LayoutConfig::Pattern { pattern } => Arc::new(PatternLayout::new(pattern.clone())),
        }
    }
}
