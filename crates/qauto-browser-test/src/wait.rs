//! Polling waits with a deadline.
//!
//! Every page primitive that needs an element or a piece of text to reach
//! some state goes through [`poll_until`]. A probe is retried at a fixed
//! interval until it yields a value, reports a hard error, or the deadline
//! passes; the last case surfaces as [`BrowserError::WaitTimeout`].

use crate::error::{BrowserError, Result};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::trace;

/// Default timeout for assertion-style waits (5 seconds).
pub const DEFAULT_EXPECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default timeout for actions and navigation (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default poll interval for checking conditions (100ms).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Configuration for wait operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    /// Maximum time to wait for the condition.
    pub timeout: Duration,

    /// How often to check if the condition is satisfied.
    pub poll_interval: Duration,
}

impl WaitConfig {
    /// Creates a new wait configuration.
    #[must_use]
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    /// Creates a config with custom timeout and default poll interval.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(timeout, DEFAULT_POLL_INTERVAL)
    }

    /// The default used by visibility assertions.
    #[must_use]
    pub fn expect() -> Self {
        Self::with_timeout(DEFAULT_EXPECT_TIMEOUT)
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_POLL_INTERVAL)
    }
}

/// Errors that end a wait immediately instead of being retried.
fn is_fatal(error: &BrowserError) -> bool {
    matches!(
        error,
        BrowserError::StrictModeViolation { .. } | BrowserError::AlreadyClosed
    )
}

/// Polls `probe` until it yields `Some`, with timeout.
///
/// Probe errors are treated as transient (the page may be mid-navigation)
/// except for strict-mode violations and a closed browser, which fail
/// the wait right away.
///
/// # Errors
///
/// Returns `WaitTimeout` if the probe never yields a value in time. When
/// the final attempts were failing, the timeout carries the last error.
pub async fn poll_until<T, F, Fut>(probe: F, config: WaitConfig, description: &str) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let start = Instant::now();
    let mut last_error = None;

    loop {
        match probe().await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => last_error = None,
            Err(e) if is_fatal(&e) => return Err(e),
            Err(e) => {
                trace!("transient error while waiting for {description}: {e}");
                last_error = Some(e.to_string());
            }
        }

        if start.elapsed() >= config.timeout {
            return Err(BrowserError::WaitTimeout {
                condition: description.to_string(),
                timeout: config.timeout,
                last_error,
            });
        }

        sleep(config.poll_interval).await;
    }
}

/// Waits for a condition that returns a `Result<bool>`.
///
/// # Errors
///
/// Returns `WaitTimeout` if the condition never holds in time.
pub async fn wait_for_result<F, Fut>(condition: F, config: WaitConfig, description: &str) -> Result<()>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    poll_until(
        || {
            let check = condition();
            async move { Ok(check.await?.then_some(())) }
        },
        config,
        description,
    )
    .await
}

/// Waits for an infallible condition to become true.
///
/// # Errors
///
/// Returns `WaitTimeout` if the condition never holds in time.
pub async fn wait_for<F, Fut>(condition: F, config: WaitConfig, description: &str) -> Result<()>
where
    F: Fn() -> Fut,
    Fut: Future<Output = bool>,
{
    wait_for_result(
        || {
            let check = condition();
            async move { Ok(check.await) }
        },
        config,
        description,
    )
    .await
}
