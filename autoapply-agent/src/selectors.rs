//! Ordered fallback over catalog candidates.
//!
//! Candidates are tried strictly in catalog order; the first success wins.
//! Running out of candidates is a normal negative answer.
use crate::session::SessionDriver;
use autoapply_common::Locator;
use tracing::debug;

/// The first candidate with a visible match, if any.
pub async fn first_visible_match<'c, S>(
    session: &mut S,
    candidates: &'c [Locator],
) -> Option<&'c Locator>
where
    S: SessionDriver + ?Sized,
{
    for candidate in candidates {
        if session.is_visible(candidate).await {
            debug!(target: "apply.selectors", %candidate, "visible match");
            return Some(candidate);
        }
    }
    None
}

/// Click the first candidate that accepts a click.
pub async fn click_first_match<S>(session: &mut S, candidates: &[Locator]) -> bool
where
    S: SessionDriver + ?Sized,
{
    for candidate in candidates {
        if session.click(candidate).await {
            debug!(target: "apply.selectors", %candidate, "clicked");
            return true;
        }
    }
    false
}

/// Fill the first visible candidate with `value`.
pub async fn fill_first_match<S>(session: &mut S, candidates: &[Locator], value: &str) -> bool
where
    S: SessionDriver + ?Sized,
{
    match first_visible_match(session, candidates).await {
        Some(candidate) => session.fill(candidate, value).await,
        None => false,
    }
}
