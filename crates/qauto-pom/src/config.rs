//! Suite configuration.
//!
//! Sources, lowest priority first:
//!
//! 1. built-in defaults
//! 2. `qauto.toml` in the working directory (optional)
//! 3. `QAUTO_*` environment variables (`QAUTO_HEADED=true`, `QAUTO_RETRIES=1`, ...)
//! 4. the deployment variables `BASE_URL`, `HTTP_USER`, `HTTP_PASSWORD`, `CI`

use crate::error::ConfigError;
use crate::logging::LogLevel;
use figment::{
    Figment,
    providers::{Env, Format as _, Serialized, Toml},
};
use qauto_browser_test::{HttpCredentials, RemoteApp, TestBrowserConfig, WaitConfig};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Config file looked up in the working directory.
pub const CONFIG_FILE: &str = "qauto.toml";

/// Retries per scenario when running under CI.
const CI_RETRIES: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Root of the deployment under test.
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub http_user: Option<String>,

    #[serde(default)]
    pub http_password: Option<String>,

    /// Set by CI providers; any value but empty, `0` or `false` counts.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub ci: bool,

    /// Show the browser window.
    pub headed: bool,

    /// Chrome binary to launch instead of the one chromiumoxide detects.
    #[serde(default)]
    pub chrome_path: Option<String>,

    /// Budget for one scenario attempt, setup and teardown included.
    pub scenario_timeout_ms: u64,

    /// Default wait for visibility assertions.
    pub expect_timeout_ms: u64,

    /// Default wait for an element to become actionable, and for navigation.
    pub action_timeout_ms: u64,

    /// Extra attempts after a failed scenario. `None` picks 2 under CI, else 0.
    #[serde(default)]
    pub retries: Option<u32>,

    /// Where failure screenshots go.
    pub output_dir: PathBuf,

    pub screenshot_on_failure: bool,

    pub log_level: LogLevel,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            http_user: None,
            http_password: None,
            ci: false,
            headed: false,
            chrome_path: None,
            scenario_timeout_ms: 30_000,
            expect_timeout_ms: 5_000,
            action_timeout_ms: 30_000,
            retries: None,
            output_dir: PathBuf::from("test-results"),
            screenshot_on_failure: true,
            log_level: LogLevel::Info,
        }
    }
}

impl SuiteConfig {
    /// The layered figment this config is extracted from.
    #[must_use]
    pub fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed("QAUTO_"))
            .merge(Env::raw().only(&["BASE_URL", "HTTP_USER", "HTTP_PASSWORD", "CI"]))
    }

    /// Loads the configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if a source has the wrong shape.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment())
    }

    /// Extracts from a caller-supplied figment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if a source has the wrong shape.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        Ok(figment.extract()?)
    }

    /// The deployment under test, with any trailing slash removed.
    ///
    /// # Errors
    ///
    /// Returns `MissingBaseUrl` when `BASE_URL` is unset or blank.
    pub fn app(&self) -> Result<RemoteApp, ConfigError> {
        match self.base_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(RemoteApp::new(url)),
            _ => Err(ConfigError::MissingBaseUrl),
        }
    }

    /// Basic-auth credentials, used only when both halves are set.
    #[must_use]
    pub fn http_credentials(&self) -> Option<HttpCredentials> {
        let user = self.http_user.as_deref().filter(|s| !s.is_empty());
        let password = self.http_password.as_deref().filter(|s| !s.is_empty());
        match (user, password) {
            (Some(user), Some(password)) => Some(HttpCredentials::new(user, password)),
            (None, None) => None,
            _ => {
                warn!("only one of HTTP_USER and HTTP_PASSWORD is set; sending no credentials");
                None
            }
        }
    }

    /// Launch settings for the scenario browser.
    #[must_use]
    pub fn browser_config(&self) -> TestBrowserConfig {
        let mut config = TestBrowserConfig::new();
        if self.headed {
            config = config.headless(false);
        }
        if let Some(path) = &self.chrome_path {
            config = config.with_chrome_path(path);
        }
        if let Some(credentials) = self.http_credentials() {
            config = config.with_http_credentials(credentials);
        }
        config
    }

    #[must_use]
    pub fn retries(&self) -> u32 {
        self.retries.unwrap_or(if self.ci { CI_RETRIES } else { 0 })
    }

    #[must_use]
    pub fn scenario_timeout(&self) -> Duration {
        Duration::from_millis(self.scenario_timeout_ms)
    }

    #[must_use]
    pub fn expect_wait(&self) -> WaitConfig {
        WaitConfig::with_timeout(Duration::from_millis(self.expect_timeout_ms))
    }

    #[must_use]
    pub fn action_wait(&self) -> WaitConfig {
        WaitConfig::with_timeout(Duration::from_millis(self.action_timeout_ms))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
    Text(String),
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(n) => n != 0,
        Flag::Text(s) => {
            let s = s.trim();
            !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false"))
        }
    })
}
