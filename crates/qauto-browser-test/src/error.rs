//! Error types for browser operations.
//!
//! The page objects only ever see one failure that matters in practice: an
//! element or text that never reaches the expected state. Everything else
//! (launch, CDP connection, script errors) is infrastructure noise that
//! still needs enough context to debug a red CI run.

use std::time::Duration;
use thiserror::Error;

/// The main error type for all browser operations.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// Failed to launch the browser process.
    ///
    /// This typically occurs when Chrome/Chromium is not installed,
    /// or when there are permission issues with the executable.
    #[error("failed to launch browser: {reason}")]
    LaunchFailed {
        /// Human-readable reason for the launch failure
        reason: String,
        /// Optional underlying error that caused the failure
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Failed to talk to the browser over the DevTools protocol.
    #[error("CDP connection failed: {0}")]
    ConnectionFailed(String),

    /// Navigation to a URL failed.
    #[error("navigation to '{url}' failed: {reason}")]
    NavigationFailed {
        /// The URL that failed to load
        url: String,
        /// Reason for the navigation failure
        reason: String,
    },

    /// A wait condition was not satisfied within the timeout.
    ///
    /// Every waiting primitive (selector, text, visibility, actionability)
    /// reports through this variant.
    #[error("wait condition '{condition}' timed out after {timeout:?}{}", last_error_suffix(.last_error.as_deref()))]
    WaitTimeout {
        /// Description of the condition that timed out
        condition: String,
        /// How long we waited before timing out
        timeout: Duration,
        /// The most recent probe error, if the last attempts were failing
        last_error: Option<String>,
    },

    /// A strict locator matched more than one element.
    #[error("locator {locator} resolved to {count} elements")]
    StrictModeViolation {
        /// Display form of the locator
        locator: String,
        /// Number of matching elements
        count: usize,
    },

    /// A resolved element disappeared before it could be acted on.
    #[error("element for {0} is no longer attached to the page")]
    ElementDetached(String),

    /// JavaScript execution in the page context failed.
    #[error("JavaScript execution failed: {0}")]
    ScriptExecutionFailed(String),

    /// An operation was attempted on a closed browser instance.
    #[error("browser instance is already closed")]
    AlreadyClosed,

    /// Wraps errors from the chromiumoxide library.
    #[error("chromiumoxide error: {0}")]
    ChromiumOxide(#[from] chromiumoxide::error::CdpError),

    /// Generic I/O errors (screenshots, artifacts).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BrowserError {
    /// Returns true for the timeout class of failures.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, BrowserError::WaitTimeout { .. })
    }
}

fn last_error_suffix(last_error: Option<&str>) -> String {
    last_error
        .map(|e| format!(" (last error: {e})"))
        .unwrap_or_default()
}

/// A specialized Result type for browser operations.
pub type Result<T> = std::result::Result<T, BrowserError>;
