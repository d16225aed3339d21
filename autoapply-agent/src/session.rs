//! The browser seam used by every agent step.
//!
//! Element-level calls (`is_visible`, `click`, `fill`, `links`) never fail:
//! timeouts and lookup errors come back as `false` or an empty list.
//! Navigation, page text and tab management return errors, which the run loop
//! turns into a skipped candidate.
use anyhow::Result;
use async_trait::async_trait;
use autoapply_common::Locator;
use autoapply_config::{BrowserConfig, PacingConfig};
use autoapply_drivers::browser::driver::{BrowserDriver, DriverOptions};
use tracing::debug;

/// A link harvested from a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub text: String,
    pub href: Option<String>,
}

#[async_trait]
pub trait SessionDriver: Send {
    async fn navigate(&mut self, url: &str) -> Result<()>;
    async fn current_url(&mut self) -> Result<String>;
    async fn page_text(&mut self) -> Result<String>;
    async fn is_visible(&mut self, locator: &Locator) -> bool;
    async fn click(&mut self, locator: &Locator) -> bool;
    /// Replace the contents of the first visible match with `value`.
    async fn fill(&mut self, locator: &Locator, value: &str) -> bool;
    async fn links(&mut self, locator: &Locator) -> Vec<PageLink>;
    /// Open an isolated page context for one job and focus it.
    async fn open_context(&mut self) -> Result<()>;
    /// Close the context opened by [`open_context`](Self::open_context).
    async fn close_context(&mut self) -> Result<()>;
    /// Sleep somewhere in `min_ms..=max_ms`.
    async fn pause(&mut self, min_ms: u64, max_ms: u64);
}

/// [`SessionDriver`] backed by a real WebDriver browser.
pub struct FantocciniSession {
    driver: BrowserDriver,
}

impl FantocciniSession {
    pub async fn connect(browser: &BrowserConfig, pacing: &PacingConfig) -> Result<Self> {
        let driver = BrowserDriver::connect(DriverOptions {
            webdriver_url: browser.webdriver_url.clone(),
            headless: browser.headless,
            stealth_profile: browser.stealth,
            element_timeout: pacing.element_timeout(),
        })
        .await?;
        Ok(Self { driver })
    }

    /// End the browser session.
    pub async fn shutdown(self) -> Result<()> {
        self.driver.close().await
    }
}

#[async_trait]
impl SessionDriver for FantocciniSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.driver.page().goto(url).await
    }

    async fn current_url(&mut self) -> Result<String> {
        self.driver.page().get_url().await
    }

    async fn page_text(&mut self) -> Result<String> {
        self.driver.page().body_text().await
    }

    async fn is_visible(&mut self, locator: &Locator) -> bool {
        self.driver.page().first_displayed(locator).await.is_some()
    }

    async fn click(&mut self, locator: &Locator) -> bool {
        let Some(element) = self.driver.page().first_displayed(locator).await else {
            return false;
        };
        match element.click().await {
            Ok(()) => true,
            Err(err) => {
                debug!(target: "browser.locator", %locator, error = %err, "click failed");
                false
            }
        }
    }

    async fn fill(&mut self, locator: &Locator, value: &str) -> bool {
        let Some(element) = self.driver.page().first_displayed(locator).await else {
            return false;
        };
        let typed = async {
            element.clear().await?;
            element.type_str(value).await
        };
        match typed.await {
            Ok(()) => true,
            Err(err) => {
                debug!(target: "browser.locator", %locator, error = %err, "fill failed");
                false
            }
        }
    }

    async fn links(&mut self, locator: &Locator) -> Vec<PageLink> {
        let mut links = Vec::new();
        for element in self.driver.page().find_all(locator).await {
            let href = element.get_attribute("href").await.ok().flatten();
            let text = element.get_inner_text().await.unwrap_or_default();
            links.push(PageLink { text, href });
        }
        links
    }

    async fn open_context(&mut self) -> Result<()> {
        self.driver.open_tab().await
    }

    async fn close_context(&mut self) -> Result<()> {
        self.driver.close_tab().await
    }

    async fn pause(&mut self, min_ms: u64, max_ms: u64) {
        self.driver
            .behavioral_engine
            .random_delay(min_ms, max_ms)
            .await;
    }
}
