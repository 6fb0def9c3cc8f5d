//! Logging setup for scenario runs.
//!
//! The page objects and the browser layer only emit `tracing` events. The
//! harness installs a subscriber once per test binary; `RUST_LOG` always
//! wins over the configured level.

use serde::{Deserialize, Serialize};
use std::sync::Once;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Default verbosity when `RUST_LOG` is not set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// No logging output
    #[serde(alias = "off")]
    Silent,
    /// Only errors
    Error,
    /// Errors and warnings
    #[serde(alias = "warning")]
    Warn,
    /// Scenario boundaries, retries and failures (default)
    #[default]
    Info,
    /// Every page primitive
    Debug,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Silent => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "off" => Ok(LogLevel::Silent),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            other => Err(format!("invalid log level: {other}")),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_filter())
    }
}

/// Installs the global subscriber. Later calls are no-ops.
pub fn init_logging(level: LogLevel) {
    INIT.call_once(|| {
        let filter = EnvFilter::builder()
            .with_default_directive(level.as_filter().parse().unwrap())
            .from_env_lossy();

        // try_init: the test harness may already own the global default.
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_target(false).with_test_writer())
            .try_init();
    });
}
