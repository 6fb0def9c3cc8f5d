//! Primitive page operations shared by every page object.
//!
//! [`BasePage`] binds a browser [`Page`] to the application under test and
//! to the suite's default timeouts. Assertions wait up to the expect
//! timeout; clicks, typing and navigation wait up to the action timeout.

use crate::config::SuiteConfig;
use crate::error::Result;
use qauto_browser_test::{AppServer, AriaRole, LoadState, Locator, Page, TextMatch, WaitConfig};
use tracing::debug;

/// Default waits for assertions and for actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub expect: WaitConfig,
    pub action: WaitConfig,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            expect: WaitConfig::expect(),
            action: WaitConfig::default(),
        }
    }
}

impl From<&SuiteConfig> for Timeouts {
    fn from(config: &SuiteConfig) -> Self {
        Self {
            expect: config.expect_wait(),
            action: config.action_wait(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BasePage<'a> {
    page: &'a Page,
    app: &'a dyn AppServer,
    timeouts: Timeouts,
}

impl<'a> BasePage<'a> {
    #[must_use]
    pub fn new(page: &'a Page, app: &'a dyn AppServer, timeouts: Timeouts) -> Self {
        Self {
            page,
            app,
            timeouts,
        }
    }

    /// The underlying browser page.
    #[must_use]
    pub fn page(&self) -> &'a Page {
        self.page
    }

    #[must_use]
    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    /// Opens `path` relative to the base URL and waits for DOMContentLoaded.
    pub async fn goto(&self, path: &str) -> Result<()> {
        let url = self.app.url(path);
        self.page
            .goto(&url, LoadState::DomContentLoaded, self.timeouts.action)
            .await?;
        Ok(())
    }

    /// Waits until an element matching `selector` is visible.
    pub async fn wait_for_element(&self, selector: &str) -> Result<()> {
        self.wait_for_element_within(selector, self.timeouts.expect).await
    }

    pub async fn wait_for_element_within(&self, selector: &str, config: WaitConfig) -> Result<()> {
        self.page.wait_for_selector(selector, config).await?;
        Ok(())
    }

    /// Waits until some element showing `text` is visible.
    pub async fn wait_for_text(&self, text: &TextMatch) -> Result<()> {
        self.page.wait_for_text(text, self.timeouts.expect).await?;
        Ok(())
    }

    pub async fn expect_element_visible(&self, selector: &str) -> Result<()> {
        self.expect_visible(&Locator::css(selector), self.timeouts.expect).await
    }

    /// Asserts that exactly one element shows `text` and that it is visible.
    pub async fn expect_text_visible(&self, text: &TextMatch) -> Result<()> {
        self.expect_visible(&Locator::text(text.clone()), self.timeouts.expect).await
    }

    pub async fn expect_visible(&self, locator: &Locator, config: WaitConfig) -> Result<()> {
        debug!(%locator, "expecting visible");
        self.page.expect_visible(locator, config).await?;
        Ok(())
    }

    pub async fn click_element(&self, selector: &str) -> Result<()> {
        self.page
            .click(&Locator::css(selector), self.timeouts.action)
            .await?;
        Ok(())
    }

    /// Clicks the single element with `role` whose accessible name matches.
    pub async fn click_by_role(&self, role: AriaRole, name: &TextMatch) -> Result<()> {
        self.page
            .click(&Locator::role(role, name.clone()), self.timeouts.action)
            .await?;
        Ok(())
    }

    /// Replaces the value of an input.
    pub async fn fill_field(&self, selector: &str, value: &str) -> Result<()> {
        self.page
            .fill(&Locator::css(selector), value, self.timeouts.action)
            .await?;
        Ok(())
    }

    pub async fn focus_field(&self, selector: &str) -> Result<()> {
        self.page
            .focus(&Locator::css(selector), self.timeouts.action)
            .await?;
        Ok(())
    }

    pub async fn blur_field(&self, selector: &str) -> Result<()> {
        self.page
            .blur(&Locator::css(selector), self.timeouts.action)
            .await?;
        Ok(())
    }

    /// `textContent` of the element, once it is attached.
    pub async fn get_text(&self, selector: &str) -> Result<String> {
        Ok(self
            .page
            .text_content(&Locator::css(selector), self.timeouts.action)
            .await?)
    }

    /// Current visibility, without waiting.
    pub async fn is_element_visible(&self, selector: &str) -> Result<bool> {
        Ok(self.page.is_visible(&Locator::css(selector)).await?)
    }
}
