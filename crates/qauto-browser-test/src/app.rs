//! Where the application under test lives.
//!
//! The suite never starts the web application; it only needs to turn
//! page-relative paths into absolute URLs. [`AppServer`] is the seam for
//! that, and [`RemoteApp`] is the implementation for an already deployed
//! environment such as the one named by `BASE_URL`.

use std::fmt;

/// A running web application the browser can be pointed at.
pub trait AppServer: Send + Sync {
    /// Base URL without a trailing slash (e.g. `https://qauto.example.net`).
    fn base_url(&self) -> &str;

    /// Joins `path` onto the base URL.
    ///
    /// ```
    /// use qauto_browser_test::{AppServer, RemoteApp};
    ///
    /// let app = RemoteApp::new("https://qauto.example.net/");
    /// assert_eq!(app.url("/"), "https://qauto.example.net/");
    /// assert_eq!(app.url("panel/garage"), "https://qauto.example.net/panel/garage");
    /// ```
    fn url(&self, path: &str) -> String {
        let base = self.base_url().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

impl fmt::Debug for dyn AppServer + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppServer")
            .field("base_url", &self.base_url())
            .finish()
    }
}

/// An externally deployed application reached by URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteApp {
    base_url: String,
}

impl RemoteApp {
    /// Creates the handle, dropping any trailing slash from `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl AppServer for RemoteApp {
    fn base_url(&self) -> &str {
        &self.base_url
    }
}
