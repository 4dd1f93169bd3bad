use crate::scrapers::types::ScrapeConfig;
use anyhow::{Context, Result};
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How often the tab URL is re-read while waiting on a redirect
const URL_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// One headless Chrome session with a single tab shared by every request
pub struct BrowserSession {
    // Owns the Chrome process; dropping it ends the session
    _browser: Browser,
    tab: Arc<Tab>,
}

impl BrowserSession {
    /// Launch Chrome and open the tab all navigation goes through
    pub fn launch(config: &ScrapeConfig) -> Result<Self> {
        info!(
            "Launching {} Chrome...",
            if config.headless { "headless" } else { "headful" }
        );

        let options = LaunchOptions::default_builder()
            .headless(config.headless)
            .sandbox(false)
            .args(vec![OsStr::new("--disable-dev-shm-usage")])
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(options).context("Failed to launch Chrome browser")?;
        let tab = browser.new_tab().context("Failed to open browser tab")?;

        Ok(Self {
            _browser: browser,
            tab,
        })
    }

    /// Navigate the shared tab and block until the navigation commits
    pub fn goto(&self, url: &str) -> Result<()> {
        debug!("Navigating to {}", url);
        self.tab
            .navigate_to(url)
            .with_context(|| format!("Failed to navigate to {url}"))?;
        self.tab
            .wait_until_navigated()
            .with_context(|| format!("Navigation to {url} did not complete"))?;
        Ok(())
    }

    /// Wait for `selector` to appear, up to `timeout`
    ///
    /// Returns false when the element never showed up; callers fall back to
    /// a fixed settle delay in that case.
    pub fn wait_for(&self, selector: &str, timeout: Duration) -> bool {
        match self.tab.wait_for_element_with_custom_timeout(selector, timeout) {
            Ok(_) => true,
            Err(e) => {
                debug!("No '{}' within {:?}: {}", selector, timeout, e);
                false
            }
        }
    }

    /// Fixed settle delay for pages without a waitable element
    pub fn settle(&self, delay: Duration) {
        thread::sleep(delay);
    }

    /// Capture the rendered page HTML
    pub fn html(&self) -> Result<String> {
        let result = self
            .tab
            .evaluate("document.documentElement.outerHTML", false)
            .context("Failed to capture page HTML")?;

        match result.value {
            Some(value) => Ok(value.as_str().unwrap_or("").to_string()),
            None => {
                warn!("Could not get HTML from page");
                Ok(String::new())
            }
        }
    }

    /// Current URL of the shared tab, after any client-side redirects
    pub fn current_url(&self) -> String {
        self.tab.get_url()
    }

    /// Poll the tab URL until `matches` accepts it or `budget` runs out
    pub fn wait_for_url<F>(&self, matches: F, budget: Duration) -> Option<String>
    where
        F: Fn(&str) -> bool,
    {
        let deadline = Instant::now() + budget;
        loop {
            let url = self.current_url();
            if matches(&url) {
                return Some(url);
            }
            if Instant::now() >= deadline {
                return None;
            }
            thread::sleep(URL_POLL_INTERVAL);
        }
    }
}
