//! Browser lifecycle and isolated browsing contexts.
//!
//! `TestBrowser` owns the Chrome process. Pages come either from the
//! default context or from a [`BrowserContext`], an incognito-like session
//! with its own cookies and storage. A scenario that needs a guaranteed
//! clean session opens a context and closes it when done.
//!
//! # Resource Safety
//!
//! Dropping `TestBrowser` without `close()` still kills Chrome through
//! chromiumoxide's own Drop, but it is logged since a graceful close is
//! expected at the end of every scenario.

use crate::error::{BrowserError, Result};
use crate::page::Page;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams, GetTargetsParams,
};
use chromiumoxide::handler::viewport::Viewport;
use futures::StreamExt;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// HTTP basic-auth credentials sent with every request of a page.
#[derive(Clone, PartialEq, Eq)]
pub struct HttpCredentials {
    /// User name.
    pub username: String,
    /// Password.
    pub password: String,
}

impl HttpCredentials {
    /// Creates a credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Value of the `Authorization` header.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        let token = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {token}")
    }
}

impl fmt::Debug for HttpCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Configuration for launching a test browser.
#[derive(Debug, Clone)]
pub struct TestBrowserConfig {
    /// Run in headless mode (default: true unless the `visible` feature is on).
    pub headless: bool,

    /// Browser window size (default: 1280x720, the desktop Chrome viewport).
    pub window_size: (u32, u32),

    /// Additional Chrome arguments.
    pub args: Vec<String>,

    /// Chrome executable path (None = auto-detect).
    pub chrome_path: Option<String>,

    /// Basic-auth credentials applied to every new page.
    pub http_credentials: Option<HttpCredentials>,
}

impl TestBrowserConfig {
    /// Creates a new config with defaults for headless testing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets headless mode explicitly.
    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Sets a custom window size.
    #[must_use]
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width, height);
        self
    }

    /// Adds additional Chrome arguments.
    #[must_use]
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args.extend(args);
        self
    }

    /// Uses a specific Chrome binary.
    #[must_use]
    pub fn with_chrome_path(mut self, path: impl Into<String>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    /// Sends basic-auth credentials with every request.
    #[must_use]
    pub fn with_http_credentials(mut self, credentials: HttpCredentials) -> Self {
        self.http_credentials = Some(credentials);
        self
    }

    fn to_browser_config(&self) -> Result<BrowserConfig> {
        let (width, height) = self.window_size;
        // chromiumoxide defaults to headless with an 800x600 viewport.
        let mut config = BrowserConfig::builder()
            .window_size(width, height)
            .viewport(Viewport {
                width,
                height,
                ..Viewport::default()
            });

        if !self.headless {
            config = config.with_head();
        }

        // A per-launch profile directory keeps parallel scenarios from
        // tripping over Chrome's ProcessSingleton lock.
        let user_data_dir =
            std::env::temp_dir().join(format!("qauto-browser-{}", uuid::Uuid::new_v4()));
        config = config.arg(format!("--user-data-dir={}", user_data_dir.display()));

        for arg in &self.args {
            config = config.arg(arg.clone());
        }

        if let Some(path) = &self.chrome_path {
            config = config.chrome_executable(path.clone());
        }

        config.build().map_err(|e| BrowserError::LaunchFailed {
            reason: format!("invalid browser configuration: {e}"),
            source: None,
        })
    }
}

impl Default for TestBrowserConfig {
    fn default() -> Self {
        Self {
            headless: !cfg!(feature = "visible"),
            window_size: (1280, 720),
            args: vec![
                // Only for isolated CI/containers; never browse untrusted content with this.
                "--no-sandbox".to_string(),
                "--disable-dev-shm-usage".to_string(),
            ],
            chrome_path: None,
            http_credentials: None,
        }
    }
}

type SharedBrowser = Arc<Mutex<Option<Browser>>>;

/// A managed browser instance.
///
/// # Example
///
/// ```ignore
/// let browser = TestBrowser::launch(TestBrowserConfig::default()).await?;
/// let context = browser.new_context().await?;
/// let page = context.new_page().await?;
/// page.navigate("https://qauto.example.net").await?;
/// context.close().await?;
/// browser.close().await?;
/// ```
pub struct TestBrowser {
    inner: SharedBrowser,
    credentials: Option<HttpCredentials>,
}

impl TestBrowser {
    /// Launches Chrome and starts driving its CDP event stream.
    ///
    /// # Errors
    ///
    /// Returns `LaunchFailed` if Chrome is not installed, not executable,
    /// or fails to start.
    pub async fn launch(config: TestBrowserConfig) -> Result<Self> {
        debug!(?config, "launching browser");

        let browser_config = config.to_browser_config()?;

        let (browser, mut handler) =
            Browser::launch(browser_config)
                .await
                .map_err(|e| BrowserError::LaunchFailed {
                    reason: "failed to launch Chrome process".to_string(),
                    source: Some(Box::new(e)),
                })?;

        // chromiumoxide only makes progress while the handler is polled.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!("browser handler error: {e}");
                }
            }
        });

        debug!("browser launched");

        Ok(Self {
            inner: Arc::new(Mutex::new(Some(browser))),
            credentials: config.http_credentials,
        })
    }

    /// Opens a page in the default browsing context.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyClosed` if the browser has been closed.
    pub async fn new_page(&self) -> Result<Page> {
        open_page(&self.inner, "about:blank", self.credentials.as_ref()).await
    }

    /// Creates an isolated browsing context.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyClosed` if the browser has been closed, or a CDP
    /// error if Chrome refuses the context.
    pub async fn new_context(&self) -> Result<BrowserContext> {
        let guard = self.inner.lock().await;
        let browser = guard.as_ref().ok_or(BrowserError::AlreadyClosed)?;

        let id = browser
            .execute(CreateBrowserContextParams::default())
            .await?
            .result
            .browser_context_id;
        debug!(context = ?id, "browser context created");

        Ok(BrowserContext {
            id,
            browser: Arc::clone(&self.inner),
            credentials: self.credentials.clone(),
            disposed: false,
        })
    }

    /// Closes the browser and waits for Chrome to exit.
    ///
    /// Closing twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the browser fails to close gracefully.
    pub async fn close(&self) -> Result<()> {
        if let Some(mut browser) = self.inner.lock().await.take() {
            debug!("closing browser");
            browser
                .close()
                .await
                .map_err(|e| BrowserError::ConnectionFailed(e.to_string()))?;
            // Reap the child so it does not linger as a zombie.
            if let Err(e) = browser.wait().await {
                warn!("failed to wait for Chrome to exit: {e}");
            }
        }
        Ok(())
    }

    /// Number of open tabs across all browsing contexts.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyClosed` if the browser has been closed.
    pub async fn page_count(&self) -> Result<usize> {
        let guard = self.inner.lock().await;
        let browser = guard.as_ref().ok_or(BrowserError::AlreadyClosed)?;
        let targets = browser
            .execute(GetTargetsParams::default())
            .await?
            .result
            .target_infos;
        Ok(targets.iter().filter(|t| t.r#type == "page").count())
    }

    /// Returns true if the browser has been closed.
    pub async fn is_closed(&self) -> bool {
        self.inner.lock().await.is_none()
    }
}

impl fmt::Debug for TestBrowser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestBrowser")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl Drop for TestBrowser {
    fn drop(&mut self) {
        let still_open = self
            .inner
            .try_lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false);
        if still_open && Arc::strong_count(&self.inner) == 1 {
            warn!("TestBrowser dropped without close(); Chrome is killed on drop");
        }
    }
}

/// An isolated browsing context (separate cookies, storage and cache).
pub struct BrowserContext {
    id: BrowserContextId,
    browser: SharedBrowser,
    credentials: Option<HttpCredentials>,
    disposed: bool,
}

impl BrowserContext {
    /// Opens a page inside this context.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyClosed` if the owning browser has been closed.
    pub async fn new_page(&self) -> Result<Page> {
        let target = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(self.id.clone())
            .build()
            .map_err(BrowserError::ConnectionFailed)?;
        open_page(&self.browser, target, self.credentials.as_ref()).await
    }

    /// Disposes the context, closing all of its pages.
    ///
    /// # Errors
    ///
    /// Returns a CDP error if Chrome fails to dispose the context.
    pub async fn close(mut self) -> Result<()> {
        self.disposed = true;
        let guard = self.browser.lock().await;
        // Closing the browser already took every context with it.
        let Some(browser) = guard.as_ref() else {
            return Ok(());
        };
        browser
            .execute(DisposeBrowserContextParams::new(self.id.clone()))
            .await?;
        debug!(context = ?self.id, "browser context disposed");
        Ok(())
    }
}

impl fmt::Debug for BrowserContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrowserContext").field("id", &self.id).finish()
    }
}

impl Drop for BrowserContext {
    fn drop(&mut self) {
        if !self.disposed {
            warn!(context = ?self.id, "BrowserContext dropped without close(); it lives until the browser exits");
        }
    }
}

async fn open_page(
    browser: &SharedBrowser,
    target: impl Into<CreateTargetParams>,
    credentials: Option<&HttpCredentials>,
) -> Result<Page> {
    let chrome_page = {
        let guard = browser.lock().await;
        let browser = guard.as_ref().ok_or(BrowserError::AlreadyClosed)?;
        browser
            .new_page(target)
            .await
            .map_err(|e| BrowserError::ConnectionFailed(e.to_string()))?
    };

    let page = Page::new(chrome_page);
    if let Some(credentials) = credentials {
        page.set_http_credentials(credentials).await?;
    }
    Ok(page)
}
