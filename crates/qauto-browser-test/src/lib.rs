//! # qauto-browser-test
//!
//! Headless Chrome primitives for page-object tests, built on chromiumoxide.
//!
//! This crate is the only place that talks to the browser. Page objects
//! describe *what* to find with a [`Locator`] and *how long* to wait with a
//! [`WaitConfig`]; [`Page`] turns that into CDP calls.
//!
//! ## Architecture
//!
//! - **TestBrowser**: owns the Chrome process
//! - **BrowserContext**: isolated session (cookies, storage) inside a browser
//! - **Page**: one tab; navigation, waits, clicks, typing, focus/blur
//! - **Locator / TextMatch**: CSS, role+name or text targets, strict by default
//! - **WaitConfig**: timeout and poll interval for every waiting primitive
//! - **ConsoleCapture**: what the application logged to the console
//! - **AppServer**: base URL of the application under test
//!
//! ## Example Usage
//!
//! ```ignore
//! use qauto_browser_test::{AriaRole, Locator, TestBrowser, TestBrowserConfig, TextMatch, WaitConfig};
//!
//! #[tokio::test]
//! async fn opens_sign_up() -> Result<(), Box<dyn std::error::Error>> {
//!     let browser = TestBrowser::launch(TestBrowserConfig::default()).await?;
//!     let context = browser.new_context().await?;
//!     let page = context.new_page().await?;
//!
//!     page.navigate("https://qauto.example.net").await?;
//!     let sign_up = Locator::role(AriaRole::Button, TextMatch::regex_ci("sign up")?);
//!     page.click(&sign_up, WaitConfig::default()).await?;
//!     page.wait_for_selector("#signupName", WaitConfig::expect()).await?;
//!
//!     context.close().await?;
//!     browser.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Testing Strategy
//!
//! 1. **Unit tests**: locator filtering, text matching, waits (no browser)
//! 2. **Integration tests**: real Chrome against data-URL pages
//!
//! Run with `cargo test` (unit) or `cargo test -- --ignored` (integration).

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod browser;
pub mod console;
pub mod error;
pub mod locator;
pub mod page;
pub mod wait;

pub use app::{AppServer, RemoteApp};
pub use browser::{BrowserContext, HttpCredentials, TestBrowser, TestBrowserConfig};
pub use console::{ConsoleCapture, ConsoleLevel, ConsoleMessage};
pub use error::{BrowserError, Result};
pub use locator::{AriaRole, Candidate, Locator, TextMatch, normalize_whitespace};
pub use page::{LoadState, Page};
pub use wait::{DEFAULT_EXPECT_TIMEOUT, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT, WaitConfig};
