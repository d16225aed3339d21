use crate::browser::{
    behavioral::BehavioralEngine,
    fingerprint::{pick_session_profile, UserAgentProfile},
    page::BrowserPage,
    stealth::build_stealth_arguments,
};
use anyhow::{Context, Result};
use autoapply_common::StealthProfile;
use fantoccini::{wd::WindowHandle, Client, ClientBuilder};
use serde_json::json;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};
use webdriver::capabilities::Capabilities;

/// How to reach and launch the browser.
#[derive(Debug, Clone)]
pub struct DriverOptions {
    /// WebDriver endpoint, e.g. `http://localhost:9515` for chromedriver.
    pub webdriver_url: String,
    pub headless: bool,
    pub stealth_profile: StealthProfile,
    /// Upper bound on every element wait.
    pub element_timeout: Duration,
}

/// Wrapper around a `fantoccini` WebDriver client with stealth launch
/// arguments and per-job tab management.
pub struct BrowserDriver {
    pub client: Client,
    pub behavioral_engine: BehavioralEngine,
    pub user_agent: UserAgentProfile,
    pub stealth_profile: StealthProfile,
    element_timeout: Duration,
    main_window: Option<WindowHandle>,
}

impl BrowserDriver {
    /// Start a browser session on a running WebDriver service.
    pub async fn connect(opts: DriverOptions) -> Result<Self> {
        let user_agent = pick_session_profile(opts.stealth_profile);
        let args = build_stealth_arguments(opts.stealth_profile, &user_agent, opts.headless);

        let mut caps = Capabilities::new();
        caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&opts.webdriver_url)
            .await
            .with_context(|| format!("failed to open WebDriver session at {}", opts.webdriver_url))?;

        info!(
            target: "browser.session",
            webdriver_url = %opts.webdriver_url,
            headless = opts.headless,
            stealth = ?opts.stealth_profile,
            platform = %user_agent.platform,
            "browser session started"
        );

        Ok(Self {
            client,
            behavioral_engine: BehavioralEngine::new(),
            user_agent,
            stealth_profile: opts.stealth_profile,
            element_timeout: opts.element_timeout,
            main_window: None,
        })
    }

    /// A page handle for whichever window is currently focused.
    pub fn page(&self) -> BrowserPage {
        BrowserPage {
            client: self.client.clone(),
            stealth_profile: self.stealth_profile,
            user_agent: self.user_agent.clone(),
            behavioral_engine: self.behavioral_engine.clone(),
            element_timeout: self.element_timeout,
        }
    }

    /// Open a fresh tab and focus it. Pair with [`close_tab`](Self::close_tab).
    pub async fn open_tab(&mut self) -> Result<()> {
        let main = self.client.window().await?;
        let created = self.client.new_window(true).await?;
        self.client.switch_to_window(created.handle).await?;
        self.main_window = Some(main);
        debug!(target: "browser.session", "tab opened");
        Ok(())
    }

    /// Close the focused tab and return focus to the window that opened it.
    ///
    /// Focus is restored even when the close fails, so the next
    /// [`open_tab`](Self::open_tab) starts from a live window.
    pub async fn close_tab(&mut self) -> Result<()> {
        let main = self.main_window.take();
        let client = &self.client;
        close_then_refocus(
            client.close_window(),
            main.map(move |handle| client.switch_to_window(handle)),
        )
        .await?;
        debug!(target: "browser.session", "tab closed");
        Ok(())
    }

    /// Close the underlying browser session.
    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        info!(target: "browser.session", "browser session closed");
        Ok(())
    }
}

/// Run `close`, then `refocus` regardless of how the close went. The first
/// error wins.
async fn close_then_refocus<E1, E2>(
    close: impl Future<Output = std::result::Result<(), E1>>,
    refocus: Option<impl Future<Output = std::result::Result<(), E2>>>,
) -> Result<()>
where
    anyhow::Error: From<E1> + From<E2>,
{
    let closed = close.await.map_err(anyhow::Error::from);
    let refocused = match refocus {
        Some(refocus) => refocus.await.map_err(anyhow::Error::from),
        None => Ok(()),
    };
    if let Err(err) = &closed {
        debug!(target: "browser.session", error = %err, "tab close failed");
    }
    closed.context("failed to close tab")?;
    refocused.context("failed to return to the main window")
}
