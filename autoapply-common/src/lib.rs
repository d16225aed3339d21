//! Common types and utilities shared across autoapply crates.
//!
//! This crate defines the run data model, locator descriptors, observability
//! helpers, and the shared error type used throughout the workspace. It stays
//! dependency-light so every crate can depend on it.
//!
//! # Overview
//!
//! - [`model`]: job candidates, attempt outcomes and the run summary
//! - [`Locator`]: a single candidate locator from the selector catalog
//! - [`StealthProfile`]: how aggressively the browser hides automation
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`ApplyError`] and [`Result`]: shared error handling
//!
//! # Examples
//!
//! ```rust
//! use autoapply_common::model::{AttemptOutcome, JobCandidate, RunState, SkipReason};
//!
//! let mut state = RunState::default();
//! let job = JobCandidate::new("Rust Engineer", "https://jobs.example.com/view/1");
//! state.record(AttemptOutcome::skipped(job, SkipReason::NoEasyApply));
//!
//! let summary = state.into_summary("Rust", "Remote");
//! assert_eq!(summary.total_tried(), 1);
//! assert_eq!(summary.skipped()[0].reason.to_string(), "No Easy Apply");
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod model;
pub mod observability;

/// A candidate locator for one on-page element.
///
/// Serialized externally tagged so catalogs read naturally in YAML:
///
/// ```yaml
/// apply:
///   - css: "button.jobs-apply-button"
///   - text: "Easy Apply"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locator {
    /// A CSS selector.
    Css(String),
    /// A button or link whose normalized visible text contains this string.
    Text(String),
    /// A raw XPath expression.
    Xpath(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "css={s}"),
            Locator::Text(s) => write!(f, "text={s}"),
            Locator::Xpath(s) => write!(f, "xpath={s}"),
        }
    }
}

/// Levels of stealth applied to the browser session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StealthProfile {
    Lightweight,
    #[default]
    Balanced,
    Maximum,
}

/// Error types used across the autoapply system.
#[derive(thiserror::Error, Debug)]
pub enum ApplyError {
    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required credential was not provided.
    #[error("Missing required credential: {0}")]
    MissingCredential(&'static str),

    /// The sign-in form could not be completed.
    #[error("Login failed: {0}")]
    Login(String),

    /// A driver (browser, network, etc.) reported an error.
    #[error("Driver error: {0}")]
    Driver(#[from] anyhow::Error),

    /// The run report could not be delivered.
    #[error("Webhook error: {0}")]
    Webhook(String),
}

/// Convenient alias for results that use [`ApplyError`].
pub type Result<T> = std::result::Result<T, ApplyError>;
