//! Scenario runner.
//!
//! Each attempt of a scenario gets its own Chrome process and a fresh
//! browsing context, so scenarios share no cookies or storage and can run
//! as parallel `#[tokio::test]`s. A failed attempt leaves a screenshot
//! and the page's console errors behind, then the whole scenario is
//! retried as configured.

use crate::base::{BasePage, Timeouts};
use crate::config::SuiteConfig;
use crate::error::{PomError, Result};
use crate::logging::init_logging;
use crate::registration::RegistrationPage;
use qauto_browser_test::{AppServer, BrowserContext, Page, TestBrowser};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Instrument, error, info, info_span, warn};

/// Configuration plus the application every scenario runs against.
#[derive(Debug, Clone)]
pub struct Suite {
    config: SuiteConfig,
    app: Arc<dyn AppServer>,
}

impl Suite {
    /// Loads [`SuiteConfig`], installs logging and targets `BASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns a config error when the configuration is malformed or
    /// `BASE_URL` is unset.
    pub fn from_env() -> Result<Self> {
        let config = SuiteConfig::load()?;
        let app = config.app()?;
        Ok(Self::new(config, Arc::new(app)))
    }

    /// Uses an explicit application, e.g. a local fixture server.
    #[must_use]
    pub fn new(config: SuiteConfig, app: Arc<dyn AppServer>) -> Self {
        init_logging(config.log_level);
        Self { config, app }
    }

    #[must_use]
    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    #[must_use]
    pub fn app(&self) -> &dyn AppServer {
        self.app.as_ref()
    }

    /// Runs `scenario` until it passes or the retries are used up.
    ///
    /// # Errors
    ///
    /// Returns the error of the last attempt.
    pub async fn run<F, Fut>(&self, name: &str, scenario: F) -> Result<()>
    where
        F: Fn(Session) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let attempts = self.config.retries() + 1;
        let mut attempt = 1;
        loop {
            let outcome = self
                .run_once(name, attempt, &scenario)
                .instrument(info_span!("scenario", name, attempt))
                .await;
            match outcome {
                Ok(()) => {
                    info!("passed");
                    return Ok(());
                }
                Err(e) if attempt < attempts => {
                    warn!(error = %e, "attempt {attempt}/{attempts} failed, retrying");
                    attempt += 1;
                }
                Err(e) => {
                    error!(error = %e, "failed after {attempts} attempt(s)");
                    return Err(e);
                }
            }
        }
    }

    async fn run_once<F, Fut>(&self, name: &str, attempt: u32, scenario: &F) -> Result<()>
    where
        F: Fn(Session) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let browser = Arc::new(TestBrowser::launch(self.config.browser_config()).await?);
        let outcome = self.drive(name, attempt, &browser, scenario).await;
        if let Err(e) = browser.close().await {
            warn!("closing browser: {e}");
        }
        outcome
    }

    async fn drive<F, Fut>(
        &self,
        name: &str,
        attempt: u32,
        browser: &Arc<TestBrowser>,
        scenario: &F,
    ) -> Result<()>
    where
        F: Fn(Session) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let context = browser.new_context().await?;
        let page = match context.new_page().await {
            Ok(page) => Arc::new(page),
            Err(e) => {
                let _ = context.close().await;
                return Err(e.into());
            }
        };

        let session = Session {
            browser: Arc::clone(browser),
            page: Arc::clone(&page),
            app: Arc::clone(&self.app),
            timeouts: Timeouts::from(&self.config),
        };

        let budget = self.config.scenario_timeout();
        let outcome = match tokio::time::timeout(budget, scenario(session)).await {
            Ok(result) => result,
            Err(_) => Err(PomError::ScenarioTimeout {
                name: name.to_string(),
                timeout: budget,
            }),
        };

        if outcome.is_err() {
            self.record_failure(name, attempt, &page).await;
        }

        drop(page);
        if let Err(e) = context.close().await {
            warn!("closing browser context: {e}");
        }
        outcome
    }

    async fn record_failure(&self, name: &str, attempt: u32, page: &Page) {
        for message in page.console().errors() {
            warn!(console = %message.text, "page logged an error");
        }

        if !self.config.screenshot_on_failure {
            return;
        }
        match self.save_screenshot(name, attempt, page).await {
            Ok(path) => info!(path = %path.display(), "saved failure screenshot"),
            Err(e) => warn!("could not save failure screenshot: {e}"),
        }
    }

    async fn save_screenshot(&self, name: &str, attempt: u32, page: &Page) -> Result<PathBuf> {
        let png = page.screenshot().await?;
        tokio::fs::create_dir_all(&self.config.output_dir).await?;
        let path = self
            .config
            .output_dir
            .join(format!("{}-attempt{attempt}.png", artifact_stem(name)));
        tokio::fs::write(&path, png).await?;
        Ok(path)
    }
}

/// File-name-safe form of a scenario name.
fn artifact_stem(name: &str) -> String {
    let mut stem = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            stem.push(c.to_ascii_lowercase());
        } else if !stem.ends_with('-') {
            stem.push('-');
        }
    }
    let stem = stem.trim_matches('-');
    if stem.is_empty() {
        "scenario".to_string()
    } else {
        stem.to_string()
    }
}

/// What a scenario gets to work with: one page in a fresh context.
#[derive(Debug, Clone)]
pub struct Session {
    browser: Arc<TestBrowser>,
    page: Arc<Page>,
    app: Arc<dyn AppServer>,
    timeouts: Timeouts,
}

impl Session {
    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }

    #[must_use]
    pub fn app(&self) -> &dyn AppServer {
        self.app.as_ref()
    }

    #[must_use]
    pub fn base_page(&self) -> BasePage<'_> {
        BasePage::new(&self.page, self.app.as_ref(), self.timeouts)
    }

    #[must_use]
    pub fn registration_page(&self) -> RegistrationPage<'_> {
        RegistrationPage::new(self.base_page())
    }

    /// Opens a second, isolated browsing context in the same browser.
    ///
    /// The context shares nothing with the session's own page. Close it
    /// with [`IsolatedSession::close`].
    ///
    /// # Errors
    ///
    /// Returns a browser error if Chrome refuses the context or the page.
    pub async fn open_context(&self) -> Result<IsolatedSession> {
        let context = self.browser.new_context().await?;
        let page = match context.new_page().await {
            Ok(page) => page,
            Err(e) => {
                let _ = context.close().await;
                return Err(e.into());
            }
        };
        Ok(IsolatedSession {
            context,
            page,
            app: Arc::clone(&self.app),
            timeouts: self.timeouts,
        })
    }
}

/// A page in its own browsing context, opened from a [`Session`].
#[derive(Debug)]
pub struct IsolatedSession {
    context: BrowserContext,
    page: Page,
    app: Arc<dyn AppServer>,
    timeouts: Timeouts,
}

impl IsolatedSession {
    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }

    #[must_use]
    pub fn registration_page(&self) -> RegistrationPage<'_> {
        RegistrationPage::new(BasePage::new(&self.page, self.app.as_ref(), self.timeouts))
    }

    /// Closes the page and disposes of the context.
    ///
    /// # Errors
    ///
    /// Returns a browser error if Chrome fails to dispose of the context.
    pub async fn close(self) -> Result<()> {
        self.page.close().await?;
        self.context.close().await?;
        Ok(())
    }
}
