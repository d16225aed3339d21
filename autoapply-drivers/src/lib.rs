//! Driver layer for browser automation.
//!
//! This crate exposes the WebDriver session and page/element helpers used by
//! the apply agent. Every element lookup waits a bounded time and degrades to
//! "not found" instead of failing.
//!
//! - [`browser::driver::BrowserDriver`]: WebDriver client wrapper with tab management
//! - [`browser::page::BrowserPage`]: navigation and element queries
//! - [`browser::locator`]: catalog locators translated to WebDriver queries
//! - [`browser::behavioral::BehavioralEngine`]: human-like timings and typing
//! - [`browser::stealth`]: launch arguments and JS evasions
pub mod browser;
