//! Loader for run configuration: built-in defaults, an optional YAML file,
//! `AUTOAPPLY_`-prefixed environment variables and CLI overrides.
//!
//! Precedence, lowest first: struct defaults, YAML files (in the order they
//! were attached), environment, overrides. Nested keys use `__` in the
//! environment, e.g. `AUTOAPPLY_BROWSER__HEADLESS=false`. String values may
//! reference other variables as `${VAR}`; unresolved or blank optional values
//! count as unset.
use autoapply_common::{ApplyError, StealthProfile};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

mod catalog;

pub use catalog::SelectorCatalog;
pub use config::ConfigError;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "AUTOAPPLY";
pub const CONFIG_FILE_NAME: &str = "autoapply.yaml";
/// Value typed into an optional phone field when none is configured.
pub const DEFAULT_PHONE_PLACEHOLDER: &str = "0000000000";

#[derive(Debug, Clone, Deserialize)]
pub struct ApplyConfig {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_keywords")]
    pub keywords: String,
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default = "default_max_applications")]
    pub max_applications: u32,
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub selectors: SelectorCatalog,
}

fn default_keywords() -> String {
    "AI Engineer".into()
}
fn default_location() -> String {
    "Remote".into()
}
fn default_max_applications() -> u32 {
    5
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub webdriver_url: String,
    pub headless: bool,
    pub stealth: StealthProfile,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".into(),
            headless: true,
            stealth: StealthProfile::Balanced,
        }
    }
}

/// One extra query parameter appended to the search URL.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QueryParam {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub base_url: String,
    pub login_path: String,
    pub search_path: String,
    pub search_params: Vec<QueryParam>,
    /// Upper bound on candidates harvested from one results page.
    pub max_candidates: usize,
    /// URL fragments that indicate a security challenge after sign-in.
    pub challenge_markers: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.linkedin.com".into(),
            login_path: "/login".into(),
            search_path: "/jobs/search/".into(),
            search_params: vec![QueryParam {
                name: "f_AL".into(),
                value: "true".into(),
            }],
            max_candidates: 25,
            challenge_markers: vec!["checkpoint".into(), "challenge".into()],
        }
    }
}

/// Settle delays and element timeouts, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub navigation_settle_ms: u64,
    pub login_settle_ms: u64,
    pub apply_settle_ms: u64,
    pub step_settle_ms: u64,
    pub between_jobs_min_ms: u64,
    pub between_jobs_max_ms: u64,
    pub element_timeout_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            navigation_settle_ms: 3_000,
            login_settle_ms: 5_000,
            apply_settle_ms: 2_000,
            step_settle_ms: 1_500,
            between_jobs_min_ms: 2_000,
            between_jobs_max_ms: 5_000,
            element_timeout_ms: 3_000,
        }
    }
}

impl PacingConfig {
    /// No waiting at all; used by tests and dry runs against fakes.
    pub fn immediate() -> Self {
        Self {
            navigation_settle_ms: 0,
            login_settle_ms: 0,
            apply_settle_ms: 0,
            step_settle_ms: 0,
            between_jobs_min_ms: 0,
            between_jobs_max_ms: 0,
            element_timeout_ms: 0,
        }
    }

    pub fn element_timeout(&self) -> Duration {
        Duration::from_millis(self.element_timeout_ms)
    }
}

/// Sign-in credentials. `Debug` never prints the password.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl ApplyConfig {
    /// Both credentials, or the name of the first missing one.
    pub fn credentials(&self) -> Result<Credentials, ApplyError> {
        let email = self
            .email
            .clone()
            .ok_or(ApplyError::MissingCredential("email"))?;
        let password = self
            .password
            .clone()
            .ok_or(ApplyError::MissingCredential("password"))?;
        Ok(Credentials { email, password })
    }

    pub fn phone_or_placeholder(&self) -> &str {
        self.phone.as_deref().unwrap_or(DEFAULT_PHONE_PLACEHOLDER)
    }

    fn expand_and_normalize(mut self) -> Self {
        for s in [
            &mut self.keywords,
            &mut self.location,
            &mut self.browser.webdriver_url,
            &mut self.site.base_url,
        ] {
            expand_env_in_string(s);
        }
        for opt in [
            &mut self.email,
            &mut self.password,
            &mut self.webhook_url,
            &mut self.phone,
        ] {
            *opt = opt.take().and_then(|mut s| {
                expand_env_in_string(&mut s);
                let s = s.trim().to_string();
                (!s.is_empty() && !s.contains("${")).then_some(s)
            });
        }
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.pacing.between_jobs_min_ms > self.pacing.between_jobs_max_ms {
            return Err(ConfigError::Message(format!(
                "pacing.between_jobs_min_ms ({}) exceeds pacing.between_jobs_max_ms ({})",
                self.pacing.between_jobs_min_ms, self.pacing.between_jobs_max_ms
            )));
        }
        if self.selectors.apply.is_empty() || self.selectors.job_links.is_empty() {
            return Err(ConfigError::Message(
                "selectors.apply and selectors.job_links need at least one candidate".into(),
            ));
        }
        Ok(())
    }
}

fn expand_env_in_string(s: &mut String) {
    if !s.contains('$') {
        return;
    }
    let mut cur = std::mem::take(s);
    for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
        let expanded = match shellexpand::env(&cur) {
            Ok(cow) => cow.into_owned(),
            Err(_) => cur.clone(),
        };
        if expanded == cur {
            break;
        }
        cur = expanded;
    }
    *s = cur;
}

/// Candidate locations for the YAML file when `--config` is not given,
/// lowest precedence first.
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("autoapply").join(CONFIG_FILE_NAME));
    }
    paths.push(PathBuf::from(CONFIG_FILE_NAME));
    paths
}

/// Builder hiding the `config` crate wiring.
pub struct ApplyConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    read_env: bool,
}

impl Default for ApplyConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplyConfigLoader {
    /// Start with no files; `AUTOAPPLY_` environment overrides are applied on
    /// [`load`](Self::load).
    ///
    /// ```
    /// use autoapply_config::ApplyConfigLoader;
    ///
    /// let cfg = ApplyConfigLoader::new()
    ///     .without_env()
    ///     .with_yaml_str("keywords: Rust Developer\nmax_applications: 3")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(cfg.keywords, "Rust Developer");
    /// assert_eq!(cfg.location, "Remote");
    /// assert_eq!(cfg.max_applications, 3);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
            read_env: true,
        }
    }

    /// Attach a file that must exist; the format is inferred from the suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is silently skipped when missing.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Attach every path from [`default_config_paths`] as optional.
    pub fn with_default_files(self) -> Self {
        default_config_paths()
            .into_iter()
            .fold(self, |loader, path| loader.with_optional_file(path))
    }

    /// Merge an inline YAML snippet.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Force a value regardless of every other source (used for CLI flags).
    ///
    /// ```
    /// use autoapply_config::ApplyConfigLoader;
    ///
    /// let cfg = ApplyConfigLoader::new()
    ///     .without_env()
    ///     .with_yaml_str("max_applications: 9")
    ///     .with_override("max_applications", 1_i64)
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    /// assert_eq!(cfg.max_applications, 1);
    /// ```
    pub fn with_override<V: Into<config::Value>>(
        mut self,
        key: &str,
        value: V,
    ) -> Result<Self, ConfigError> {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Skip the environment source (tests and doc examples).
    pub fn without_env(mut self) -> Self {
        self.read_env = false;
        self
    }

    /// Merge all sources, expand `${VAR}` placeholders and validate.
    pub fn load(self) -> Result<ApplyConfig, ConfigError> {
        let mut builder = self.builder;
        if self.read_env {
            builder = builder.add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            );
        }

        let cfg: ApplyConfig = builder.build()?.try_deserialize()?;
        let cfg = cfg.expand_and_normalize();
        cfg.validate()?;

        tracing::debug!(
            target: "config",
            keywords = %cfg.keywords,
            location = %cfg.location,
            max_applications = cfg.max_applications,
            has_email = cfg.email.is_some(),
            has_password = cfg.password.is_some(),
            has_webhook = cfg.webhook_url.is_some(),
            "configuration loaded"
        );
        Ok(cfg)
    }
}
