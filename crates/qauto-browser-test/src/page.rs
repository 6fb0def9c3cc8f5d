//! Page-level navigation, waits and element actions.
//!
//! Every primitive here waits before it acts: the target is re-resolved
//! until it reaches the required state (attached, visible) or the wait
//! times out with [`BrowserError::WaitTimeout`]. Nothing is retried after
//! an action has been dispatched.

use crate::browser::HttpCredentials;
use crate::console::{ConsoleCapture, ConsoleMessage};
use crate::error::{BrowserError, Result};
use crate::locator::{Candidate, Locator, TextMatch};
use crate::wait::{WaitConfig, poll_until, wait_for_result};
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams as NetworkEnableParams, Headers, SetExtraHttpHeadersParams,
};
use chromiumoxide::cdp::js_protocol::runtime::EventConsoleApiCalled;
use chromiumoxide::element::Element;
use chromiumoxide::page::Page as ChromePage;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::debug;

/// Collects everything matching a CSS query with the data locators filter on.
///
/// Kept as a plain expression (not a function literal) so chromiumoxide
/// evaluates it with `Runtime.evaluate` and returns the result by value.
const SNAPSHOT_SCRIPT: &str = r#"
Array.from(document.querySelectorAll(__QUERY__)).map((el, index, all) => {
  let up = el.parentElement;
  while (up && all.indexOf(up) < 0) {
    up = up.parentElement;
  }
  const style = window.getComputedStyle(el);
  const rect = el.getBoundingClientRect();
  const label = el.getAttribute('aria-label');
  const labelledBy = el.getAttribute('aria-labelledby');
  let name = el.textContent ?? '';
  if (label) {
    name = label;
  } else if (labelledBy) {
    name = labelledBy.split(/\s+/)
      .map((id) => document.getElementById(id)?.textContent ?? '')
      .join(' ');
  } else if (el instanceof HTMLInputElement) {
    name = el.value || el.placeholder || '';
  }
  return {
    index,
    text: el.textContent ?? '',
    name,
    visible: style.visibility !== 'hidden' && rect.width > 0 && rect.height > 0,
    parent: up ? all.indexOf(up) : null,
  };
})
"#;

fn snapshot_script(query: &str) -> Result<String> {
    // JSON-encode the query so quotes or backticks in it cannot break out.
    let query = serde_json::to_string(query)
        .map_err(|e| BrowserError::ScriptExecutionFailed(e.to_string()))?;
    Ok(SNAPSHOT_SCRIPT.trim().replace("__QUERY__", &query))
}

/// Page lifecycle state to wait for after navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// `DOMContentLoaded` has fired (`readyState` is past `loading`).
    #[default]
    DomContentLoaded,
    /// The `load` event has fired (`readyState` is `complete`).
    Load,
}

impl LoadState {
    fn is_reached(self, ready_state: &str) -> bool {
        match self {
            LoadState::DomContentLoaded => matches!(ready_state, "interactive" | "complete"),
            LoadState::Load => ready_state == "complete",
        }
    }
}

/// A browser tab with console capture and locator-based actions.
#[derive(Debug)]
pub struct Page {
    inner: ChromePage,
    console: ConsoleCapture,
    console_task: JoinHandle<()>,
}

impl Page {
    /// Wraps a chromiumoxide page and starts console capture.
    pub(crate) fn new(page: ChromePage) -> Self {
        let console = ConsoleCapture::new();
        let sink = console.clone();
        let listener = page.clone();
        let console_task = tokio::spawn(async move {
            if let Ok(mut events) = listener.event_listener::<EventConsoleApiCalled>().await {
                while let Some(event) = events.next().await {
                    sink.push(ConsoleMessage::from(&*event));
                }
            }
        });

        Self {
            inner: page,
            console,
            console_task,
        }
    }

    /// Console messages logged by the page so far.
    #[must_use]
    pub fn console(&self) -> &ConsoleCapture {
        &self.console
    }

    /// Sends basic-auth credentials with every request from this page.
    ///
    /// # Errors
    ///
    /// Returns a CDP error if the Network domain rejects the headers.
    pub async fn set_http_credentials(&self, credentials: &HttpCredentials) -> Result<()> {
        self.inner.execute(NetworkEnableParams::default()).await?;
        let headers = Headers::new(serde_json::json!({
            "Authorization": credentials.authorization_header(),
        }));
        self.inner
            .execute(SetExtraHttpHeadersParams::new(headers))
            .await?;
        Ok(())
    }

    /// Navigates to an absolute URL and waits for the `load` event.
    ///
    /// # Errors
    ///
    /// Returns `NavigationFailed` if the page fails to load.
    pub async fn navigate(&self, url: &str) -> Result<()> {
        self.goto(url, LoadState::Load, WaitConfig::default()).await
    }

    /// Navigates to an absolute URL and waits for `state`.
    ///
    /// # Errors
    ///
    /// Returns `NavigationFailed` if the request fails, or `WaitTimeout` if
    /// the page never reaches `state`.
    pub async fn goto(&self, url: &str, state: LoadState, config: WaitConfig) -> Result<()> {
        debug!(url, ?state, "navigating");
        self.inner
            .goto(url)
            .await
            .map_err(|e| BrowserError::NavigationFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        self.wait_for_load(state, config).await
    }

    /// Waits until `document.readyState` reaches `state`.
    ///
    /// # Errors
    ///
    /// Returns `WaitTimeout` if the state is not reached in time.
    pub async fn wait_for_load(&self, state: LoadState, config: WaitConfig) -> Result<()> {
        let page = &self.inner;
        wait_for_result(
            move || async move {
                let result = page
                    .evaluate("document.readyState")
                    .await
                    .map_err(|e| BrowserError::ScriptExecutionFailed(e.to_string()))?;
                Ok(result
                    .value()
                    .and_then(|v| v.as_str())
                    .is_some_and(|s| state.is_reached(s)))
            },
            config,
            &format!("load state {state:?}"),
        )
        .await
    }

    /// Executes JavaScript in the page and deserializes the result.
    ///
    /// # Errors
    ///
    /// Returns an error if execution fails or the result does not deserialize.
    pub async fn evaluate<T>(&self, script: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let result = self
            .inner
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::ScriptExecutionFailed(e.to_string()))?;

        result
            .into_value()
            .map_err(|e| BrowserError::ScriptExecutionFailed(e.to_string()))
    }

    /// Snapshots the elements behind `locator`'s base query.
    async fn snapshot(&self, locator: &Locator) -> Result<Vec<Candidate>> {
        self.evaluate(&snapshot_script(locator.query())?).await
    }

    /// Resolves `locator` once, without waiting.
    async fn resolve(&self, locator: &Locator) -> Result<Option<Candidate>> {
        let candidates = self.snapshot(locator).await?;
        Ok(locator.select(&candidates)?.cloned())
    }

    /// Waits for `locator` to be visible and returns its element handle.
    async fn actionable(&self, locator: &Locator, config: WaitConfig) -> Result<Element> {
        poll_until(
            move || async move {
                let Some(candidate) = self.resolve(locator).await? else {
                    return Ok(None);
                };
                if !candidate.visible {
                    return Ok(None);
                }
                let element = self
                    .inner
                    .find_elements(locator.query())
                    .await?
                    .into_iter()
                    .nth(candidate.index)
                    .ok_or_else(|| BrowserError::ElementDetached(locator.to_string()))?;
                Ok(Some(element))
            },
            config,
            &format!("{locator} to be visible"),
        )
        .await
    }

    /// Waits for `locator` to resolve to a visible element.
    ///
    /// # Errors
    ///
    /// Returns `WaitTimeout` if the element never becomes visible, or
    /// `StrictModeViolation` if the locator matches several elements.
    pub async fn expect_visible(&self, locator: &Locator, config: WaitConfig) -> Result<()> {
        poll_until(
            move || async move {
                Ok(self
                    .resolve(locator)
                    .await?
                    .filter(|c| c.visible)
                    .map(|_| ()))
            },
            config,
            &format!("{locator} to be visible"),
        )
        .await
    }

    /// Waits for `locator` to be hidden or detached.
    ///
    /// # Errors
    ///
    /// Returns `WaitTimeout` if the element stays visible.
    pub async fn expect_hidden(&self, locator: &Locator, config: WaitConfig) -> Result<()> {
        poll_until(
            move || async move {
                let visible = self.resolve(locator).await?.is_some_and(|c| c.visible);
                Ok((!visible).then_some(()))
            },
            config,
            &format!("{locator} to be hidden"),
        )
        .await
    }

    /// Waits for a CSS selector to match a visible element.
    ///
    /// # Errors
    ///
    /// Returns `WaitTimeout` if no visible element matches in time.
    pub async fn wait_for_selector(&self, selector: &str, config: WaitConfig) -> Result<()> {
        self.expect_visible(&Locator::css(selector).first(), config)
            .await
    }

    /// Waits for an element whose text matches to become visible.
    ///
    /// # Errors
    ///
    /// Returns `WaitTimeout` if no such text shows up in time.
    pub async fn wait_for_text(&self, text: &TextMatch, config: WaitConfig) -> Result<()> {
        self.expect_visible(&Locator::text(text.clone()).first(), config)
            .await
    }

    /// Current visibility of `locator`, without waiting.
    ///
    /// # Errors
    ///
    /// Returns `StrictModeViolation` for an ambiguous strict locator.
    pub async fn is_visible(&self, locator: &Locator) -> Result<bool> {
        Ok(self.resolve(locator).await?.is_some_and(|c| c.visible))
    }

    /// Number of elements `locator` matches right now.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot script fails.
    pub async fn count(&self, locator: &Locator) -> Result<usize> {
        let candidates = self.snapshot(locator).await?;
        Ok(locator.filter(&candidates).len())
    }

    /// Number of matches that are visible right now. Ignores strictness.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot script fails.
    pub async fn visible_count(&self, locator: &Locator) -> Result<usize> {
        let candidates = self.snapshot(locator).await?;
        Ok(locator.filter(&candidates).iter().filter(|c| c.visible).count())
    }

    /// Waits for the element to be attached and returns its `textContent`.
    ///
    /// # Errors
    ///
    /// Returns `WaitTimeout` if nothing matches in time.
    pub async fn text_content(&self, locator: &Locator, config: WaitConfig) -> Result<String> {
        poll_until(
            move || async move { Ok(self.resolve(locator).await?.map(|c| c.text)) },
            config,
            &format!("{locator} to be attached"),
        )
        .await
    }

    /// Scrolls the element into view and clicks its center.
    ///
    /// # Errors
    ///
    /// Returns `WaitTimeout` if the element never becomes visible.
    pub async fn click(&self, locator: &Locator, config: WaitConfig) -> Result<()> {
        let element = self.actionable(locator, config).await?;
        debug!(%locator, "click");
        element.click().await?;
        Ok(())
    }

    /// Focuses the element, clears it and types `value`.
    ///
    /// # Errors
    ///
    /// Returns `WaitTimeout` if the element never becomes visible.
    pub async fn fill(&self, locator: &Locator, value: &str, config: WaitConfig) -> Result<()> {
        let element = self.actionable(locator, config).await?;
        debug!(%locator, "fill");
        element.focus().await?;
        element
            .call_js_fn(
                "function() { this.value = ''; this.dispatchEvent(new Event('input', { bubbles: true })); }",
                false,
            )
            .await?;
        if !value.is_empty() {
            element.type_str(value).await?;
        }
        Ok(())
    }

    /// Gives the element keyboard focus.
    ///
    /// # Errors
    ///
    /// Returns `WaitTimeout` if the element never becomes visible.
    pub async fn focus(&self, locator: &Locator, config: WaitConfig) -> Result<()> {
        let element = self.actionable(locator, config).await?;
        debug!(%locator, "focus");
        element.focus().await?;
        Ok(())
    }

    /// Removes keyboard focus from the element, firing `blur`.
    ///
    /// # Errors
    ///
    /// Returns `WaitTimeout` if the element never becomes visible.
    pub async fn blur(&self, locator: &Locator, config: WaitConfig) -> Result<()> {
        let element = self.actionable(locator, config).await?;
        debug!(%locator, "blur");
        element.call_js_fn("function() { this.blur(); }", false).await?;
        Ok(())
    }

    /// Returns the current page URL.
    ///
    /// # Errors
    ///
    /// Returns an error if script execution fails.
    pub async fn url(&self) -> Result<String> {
        self.evaluate("window.location.href").await
    }

    /// Returns the page title.
    ///
    /// # Errors
    ///
    /// Returns an error if script execution fails.
    pub async fn title(&self) -> Result<String> {
        self.evaluate("document.title").await
    }

    /// Takes a full-page PNG screenshot.
    ///
    /// # Errors
    ///
    /// Returns an error if screenshot capture fails.
    pub async fn screenshot(&self) -> Result<Vec<u8>> {
        let params = chromiumoxide::page::ScreenshotParams::builder()
            .full_page(true)
            .build();
        self.inner
            .screenshot(params)
            .await
            .map_err(|e| BrowserError::ScriptExecutionFailed(e.to_string()))
    }

    /// Stops console capture and closes the tab.
    ///
    /// # Errors
    ///
    /// Returns an error if Chrome refuses to close the target.
    pub async fn close(self) -> Result<()> {
        self.console_task.abort();
        // The listener holds a page handle until it has actually stopped.
        let _ = self.console_task.await;
        debug!("closing page");
        self.inner.close().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_state_thresholds() {
        assert!(!LoadState::DomContentLoaded.is_reached("loading"));
        assert!(LoadState::DomContentLoaded.is_reached("interactive"));
        assert!(LoadState::DomContentLoaded.is_reached("complete"));
        assert!(!LoadState::Load.is_reached("interactive"));
        assert!(LoadState::Load.is_reached("complete"));
    }

    #[test]
    fn snapshot_query_is_json_escaped() {
        let script = snapshot_script(r#"'); alert('xss');//"#).unwrap();
        assert!(script.starts_with(r#"Array.from(document.querySelectorAll("'); alert('xss');//"))"#));
        assert!(!script.contains("__QUERY__"));
    }
}
