//! Error types for the page objects and the scenario harness.

use qauto_browser_test::BrowserError;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PomError>;

/// Problems with the suite configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("BASE_URL is not set; point it at the qauto deployment under test")]
    MissingBaseUrl,

    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

/// Failure of a page-object step or a whole scenario.
#[derive(Debug, Error)]
pub enum PomError {
    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A negative expectation did not hold (something that must not be
    /// visible was).
    #[error("assertion failed: {0}")]
    Assertion(String),

    #[error("scenario '{name}' exceeded its {timeout:?} budget")]
    ScenarioTimeout { name: String, timeout: Duration },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PomError {
    /// True for element/text waits and whole-scenario timeouts.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            PomError::Browser(e) => e.is_timeout(),
            PomError::ScenarioTimeout { .. } => true,
            _ => false,
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError::Invalid(Box::new(e))
    }
}
