//! The apply agent: everything between "a browser session exists" and
//! "a run summary was reported".
//!
//! - [`session`]: the [`SessionDriver`](session::SessionDriver) seam and its fantoccini implementation
//! - [`selectors`]: ordered fallback resolution over catalog candidates
//! - [`login`]: sign-in form
//! - [`search`]: search URL construction and result harvesting
//! - [`attempt`]: the per-job apply state machine
//! - [`run`]: the capped run loop producing a [`RunSummary`](autoapply_common::model::RunSummary)
//! - [`report`]: stdout rendering and best-effort webhook delivery

pub mod attempt;
pub mod login;
pub mod report;
pub mod run;
pub mod search;
pub mod selectors;
pub mod session;
