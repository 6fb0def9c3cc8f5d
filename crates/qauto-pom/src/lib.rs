//! # qauto-pom
//!
//! Page objects and a scenario harness for end-to-end tests of the qauto
//! registration form.
//!
//! ## Layers
//!
//! - [`BasePage`]: navigation, waits, visibility assertions and field
//!   interactions over one browser page
//! - [`RegistrationPage`]: the sign-up modal, built on a `BasePage`
//! - [`Field`], [`Control`], [`Message`]: where things are and what the
//!   form says
//! - [`TEST_DATA`], [`RegistrationInput`], [`generate_unique_email`]:
//!   scenario inputs
//! - [`Suite`] / [`Session`]: one browser and a fresh context per
//!   attempt, scenario timeout, retries, failure screenshots
//! - [`SuiteConfig`]: defaults, `qauto.toml`, `QAUTO_*` and the deployment
//!   variables `BASE_URL`, `HTTP_USER`, `HTTP_PASSWORD`, `CI`
//!
//! ## Example
//!
//! ```ignore
//! use qauto_pom::{Message, Suite, TEST_DATA, generate_unique_email};
//!
//! #[tokio::test]
//! #[ignore] // Requires Chrome and BASE_URL
//! async fn registers() -> qauto_pom::Result<()> {
//!     let suite = Suite::from_env()?;
//!     suite
//!         .run("registers", |session| async move {
//!             let page = session.registration_page();
//!             page.open().await?;
//!             page.complete_registration(&TEST_DATA.valid_user.with_email(generate_unique_email()))
//!                 .await?;
//!             page.expect_success_message().await
//!         })
//!         .await
//! }
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod base;
pub mod config;
pub mod data;
pub mod email;
pub mod error;
pub mod harness;
pub mod logging;
pub mod messages;
pub mod registration;
pub mod selectors;

pub use base::{BasePage, Timeouts};
pub use config::{CONFIG_FILE, SuiteConfig};
pub use data::{RegistrationInput, TEST_DATA, TestData, ValidUser};
pub use email::{EMAIL_PREFIX, generate_unique_email, generate_unique_email_with_prefix};
pub use error::{ConfigError, PomError, Result};
pub use harness::{IsolatedSession, Session, Suite};
pub use logging::{LogLevel, init_logging};
pub use messages::{Message, MessageText, PASSWORD_COMPLEXITY};
pub use registration::{RegistrationPage, SUBMIT_RESPONSE_TIMEOUT};
pub use selectors::{Control, Field};
