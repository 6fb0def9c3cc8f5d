//! Console message capture.
//!
//! Each page records what the application logs to the browser console. The
//! scenario harness dumps the error-level entries when a scenario fails, so
//! a front-end exception shows up next to the timeout it caused.

use chromiumoxide::cdp::js_protocol::runtime::{ConsoleApiCalledType, EventConsoleApiCalled};
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

/// Severity of a console message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConsoleLevel {
    /// `console.log()`
    Log,
    /// `console.info()`
    Info,
    /// `console.warn()`
    Warning,
    /// `console.error()`
    Error,
    /// `console.debug()`
    Debug,
    /// Anything else (`table`, `trace`, ...)
    Other,
}

impl From<&ConsoleApiCalledType> for ConsoleLevel {
    fn from(kind: &ConsoleApiCalledType) -> Self {
        match kind {
            ConsoleApiCalledType::Log => ConsoleLevel::Log,
            ConsoleApiCalledType::Info => ConsoleLevel::Info,
            ConsoleApiCalledType::Warning => ConsoleLevel::Warning,
            ConsoleApiCalledType::Error => ConsoleLevel::Error,
            ConsoleApiCalledType::Debug => ConsoleLevel::Debug,
            _ => ConsoleLevel::Other,
        }
    }
}

/// A captured console message.
#[derive(Debug, Clone, Serialize)]
pub struct ConsoleMessage {
    /// Severity level.
    pub level: ConsoleLevel,
    /// Arguments joined with spaces; non-string arguments print as `<object>`.
    pub text: String,
    /// Capture time.
    pub timestamp: SystemTime,
    /// `url:line:column` of the calling frame, when known.
    pub source: Option<String>,
}

impl ConsoleMessage {
    /// Creates a message stamped with the current time.
    #[must_use]
    pub fn new(level: ConsoleLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
            timestamp: SystemTime::now(),
            source: None,
        }
    }
}

impl From<&EventConsoleApiCalled> for ConsoleMessage {
    fn from(event: &EventConsoleApiCalled) -> Self {
        let text = event
            .args
            .iter()
            .map(|arg| {
                arg.value
                    .as_ref()
                    .and_then(|v| v.as_str())
                    .unwrap_or("<object>")
            })
            .collect::<Vec<_>>()
            .join(" ");

        let source = event
            .stack_trace
            .as_ref()
            .and_then(|trace| trace.call_frames.first())
            .map(|frame| format!("{}:{}:{}", frame.url, frame.line_number, frame.column_number));

        Self {
            source,
            ..ConsoleMessage::new(ConsoleLevel::from(&event.r#type), text)
        }
    }
}

/// Shared, append-only console log for one page.
///
/// Cloning shares the same buffer; the CDP listener task holds one clone.
#[derive(Debug, Clone, Default)]
pub struct ConsoleCapture {
    messages: Arc<Mutex<Vec<ConsoleMessage>>>,
}

impl ConsoleCapture {
    /// Creates an empty capture.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // A poisoned lock means a test already panicked; keep the data anyway.
    pub(crate) fn push(&self, message: ConsoleMessage) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
    }

    /// Snapshot of all messages in arrival order.
    #[must_use]
    pub fn messages(&self) -> Vec<ConsoleMessage> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages at exactly `level`.
    #[must_use]
    pub fn messages_with_level(&self, level: ConsoleLevel) -> Vec<ConsoleMessage> {
        self.messages()
            .into_iter()
            .filter(|m| m.level == level)
            .collect()
    }

    /// Error-level messages.
    #[must_use]
    pub fn errors(&self) -> Vec<ConsoleMessage> {
        self.messages_with_level(ConsoleLevel::Error)
    }

    /// Number of error-level messages.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|m| m.level == ConsoleLevel::Error)
            .count()
    }

    /// Drops everything captured so far.
    pub fn clear(&self) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Total number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True if nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
