#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use autoapply_agent::session::{PageLink, SessionDriver};
use autoapply_common::Locator;
use autoapply_common::observability::{LogConfig, LogFormat};
use autoapply_config::{
    ApplyConfig, BrowserConfig, Credentials, PacingConfig, SelectorCatalog, SiteConfig,
};

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "autoapply-tests",
            log_dir: Some(std::env::temp_dir().join("autoapply-tests")),
            emit_stderr: true,
            format: if std::env::var("AUTOAPPLY_LOG_FORMAT")
                .map(|raw| raw.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false)
            {
                LogFormat::Json
            } else {
                LogFormat::Text
            },
            default_filter: "debug",
        };

        autoapply_common::observability::init_logging(config).unwrap_or_default()
    });
}

pub const BASE: &str = "https://jobs.example.com";
pub const LOGIN_URL: &str = "https://jobs.example.com/login";

pub fn posting_url(id: u32) -> String {
    format!("{BASE}/jobs/view/{id}/")
}

pub fn catalog() -> SelectorCatalog {
    SelectorCatalog {
        username: vec![Locator::css("#username")],
        password: vec![Locator::css("#password")],
        sign_in: vec![Locator::css("button[type='submit']")],
        job_links: vec![
            Locator::css("a.job-card"),
            Locator::css("a[href*='/jobs/view/']"),
        ],
        apply: vec![Locator::css("button.apply"), Locator::text("Easy Apply")],
        phone: vec![Locator::css("input.phone")],
        progress: vec![
            Locator::text("Submit application"),
            Locator::text("Review"),
            Locator::text("Next"),
        ],
        dismiss: vec![Locator::css("button.dismiss")],
        confirmation_texts: vec!["Application sent".to_string()],
    }
}

pub fn site() -> SiteConfig {
    SiteConfig {
        base_url: BASE.to_string(),
        ..SiteConfig::default()
    }
}

pub fn config(max_applications: u32) -> ApplyConfig {
    ApplyConfig {
        email: Some("me@example.com".into()),
        password: Some("hunter2".into()),
        keywords: "Rust Engineer".into(),
        location: "Remote".into(),
        max_applications,
        webhook_url: None,
        phone: Some("5551234".into()),
        browser: BrowserConfig::default(),
        site: site(),
        pacing: PacingConfig::immediate(),
        selectors: catalog(),
    }
}

pub fn credentials() -> Credentials {
    Credentials {
        email: "me@example.com".into(),
        password: "hunter2".into(),
    }
}

/// One scripted page: what is visible, what accepts clicks, the body text and
/// the links each locator yields.
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    pub visible: HashSet<Locator>,
    pub clickable: HashSet<Locator>,
    pub text: String,
    pub links: HashMap<Locator, Vec<PageLink>>,
    /// `page_text` fails on this page.
    pub broken_text: bool,
}

impl FakePage {
    pub fn login_form() -> Self {
        Self {
            visible: [Locator::css("#username"), Locator::css("#password")]
                .into_iter()
                .collect(),
            clickable: [Locator::css("button[type='submit']")].into_iter().collect(),
            ..Self::default()
        }
    }

    /// A posting whose flow submits and shows a confirmation.
    pub fn easy_apply() -> Self {
        Self {
            visible: [Locator::css("input.phone")].into_iter().collect(),
            clickable: [
                Locator::text("Easy Apply"),
                Locator::text("Submit application"),
                Locator::css("button.dismiss"),
            ]
            .into_iter()
            .collect(),
            text: "Senior Rust Engineer\nApplication sent to Acme".into(),
            ..Self::default()
        }
    }

    /// A posting with no in-page apply control.
    pub fn external_only() -> Self {
        Self {
            text: "Apply on company website".into(),
            ..Self::default()
        }
    }

    /// Apply opens, but no progress control ever accepts a click.
    pub fn stuck() -> Self {
        Self {
            clickable: [Locator::css("button.apply")].into_iter().collect(),
            text: "Please answer the screening questions".into(),
            ..Self::default()
        }
    }

    /// Apply control is shown but refuses clicks.
    pub fn unclickable() -> Self {
        Self {
            visible: [Locator::css("button.apply")].into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn results(links: Vec<PageLink>) -> Self {
        Self {
            links: [(Locator::css("a[href*='/jobs/view/']"), links)]
                .into_iter()
                .collect(),
            ..Self::default()
        }
    }
}

pub fn link(title: &str, href: &str) -> PageLink {
    PageLink {
        text: title.to_string(),
        href: Some(href.to_string()),
    }
}

/// A [`SessionDriver`] over scripted pages that records every interaction.
#[derive(Debug, Default)]
pub struct FakeSite {
    pages: HashMap<String, FakePage>,
    current: Option<String>,
    /// Reported by `current_url` once set, e.g. a post-login redirect.
    pub landing_url: Option<String>,
    pub fail_open_context: bool,
    pub navigations: Vec<String>,
    pub clicks: Vec<Locator>,
    pub fills: Vec<(Locator, String)>,
    pub pauses: Vec<(u64, u64)>,
    pub opened: usize,
    pub closed: usize,
    open_depth: usize,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, page: FakePage) -> Self {
        self.pages.insert(url.into(), page);
        self
    }

    /// Login form plus a results page for any search URL.
    pub fn signed_in_search(links: Vec<PageLink>) -> Self {
        Self::new()
            .with_page(LOGIN_URL, FakePage::login_form())
            .with_page(SEARCH_PREFIX, FakePage::results(links))
    }

    fn page(&self) -> Option<&FakePage> {
        let current = self.current.as_deref()?;
        self.pages.get(current).or_else(|| {
            current
                .starts_with(SEARCH_PREFIX)
                .then(|| self.pages.get(SEARCH_PREFIX))
                .flatten()
        })
    }

    pub fn visited(&self, url: &str) -> bool {
        self.navigations.iter().any(|u| u == url)
    }

    pub fn contexts_balanced(&self) -> bool {
        self.open_depth == 0 && self.opened == self.closed
    }
}

pub const SEARCH_PREFIX: &str = "https://jobs.example.com/jobs/search/";

#[async_trait]
impl SessionDriver for FakeSite {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.navigations.push(url.to_string());
        let known = self.pages.contains_key(url) || url.starts_with(SEARCH_PREFIX);
        if !known {
            self.current = None;
            bail!("net::ERR_NAME_NOT_RESOLVED at {url}");
        }
        self.current = Some(url.to_string());
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String> {
        self.landing_url
            .clone()
            .or_else(|| self.current.clone())
            .ok_or_else(|| anyhow!("no page loaded"))
    }

    async fn page_text(&mut self) -> Result<String> {
        match self.page() {
            Some(page) if page.broken_text => bail!("stale element reference"),
            Some(page) => Ok(page.text.clone()),
            None => bail!("no page loaded"),
        }
    }

    async fn is_visible(&mut self, locator: &Locator) -> bool {
        self.page()
            .is_some_and(|p| p.visible.contains(locator) || p.clickable.contains(locator))
    }

    async fn click(&mut self, locator: &Locator) -> bool {
        let hit = self.page().is_some_and(|p| p.clickable.contains(locator));
        if hit {
            self.clicks.push(locator.clone());
        }
        hit
    }

    async fn fill(&mut self, locator: &Locator, value: &str) -> bool {
        let hit = self.page().is_some_and(|p| p.visible.contains(locator));
        if hit {
            self.fills.push((locator.clone(), value.to_string()));
        }
        hit
    }

    async fn links(&mut self, locator: &Locator) -> Vec<PageLink> {
        self.page()
            .and_then(|p| p.links.get(locator).cloned())
            .unwrap_or_default()
    }

    async fn open_context(&mut self) -> Result<()> {
        if self.fail_open_context {
            bail!("could not open a new window");
        }
        self.opened += 1;
        self.open_depth += 1;
        Ok(())
    }

    async fn close_context(&mut self) -> Result<()> {
        if self.open_depth == 0 {
            bail!("no context to close");
        }
        self.closed += 1;
        self.open_depth -= 1;
        Ok(())
    }

    async fn pause(&mut self, min_ms: u64, max_ms: u64) {
        self.pauses.push((min_ms, max_ms));
    }
}
