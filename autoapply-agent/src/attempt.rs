//! Per-job apply attempt as an explicit state machine.
//!
//! ```text
//! Discovered -> Evaluating -> NotApplicable                      (Skipped: No Easy Apply)
//!                          -> ApplyUnclickable                   (Skipped: Apply button not clickable)
//!                          -> ApplyOpened -> FormFilled -> Submitted     (Applied)
//!                                                       -> SubmitFailed  (Skipped: Could not submit)
//! ```
//!
//! Errors from navigation or page reads abort the attempt; the run loop
//! records them as `Skipped("Error: ..")`.
use crate::selectors::{click_first_match, fill_first_match, first_visible_match};
use crate::session::SessionDriver;
use anyhow::{Context, Result};
use autoapply_common::model::{AttemptOutcome, JobCandidate, SkipReason};
use autoapply_config::{PacingConfig, SelectorCatalog};
use tracing::{debug, info};

/// Passes over the progress controls; the second covers a review step that
/// only appears after the first submit-like click.
const PROGRESS_PASSES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Discovered,
    Evaluating,
    NotApplicable,
    ApplyUnclickable,
    ApplyOpened,
    FormFilled,
    Submitted,
    SubmitFailed,
}

impl AttemptState {
    pub fn is_terminal(self) -> bool {
        self.skip_reason().is_some() || self == AttemptState::Submitted
    }

    fn skip_reason(self) -> Option<SkipReason> {
        match self {
            AttemptState::NotApplicable => Some(SkipReason::NoEasyApply),
            AttemptState::ApplyUnclickable => Some(SkipReason::ApplyNotClickable),
            AttemptState::SubmitFailed => Some(SkipReason::CouldNotSubmit),
            _ => None,
        }
    }

    /// The outcome a terminal state maps to; `None` while still in progress.
    pub fn outcome(self, job: &JobCandidate) -> Option<AttemptOutcome> {
        if self == AttemptState::Submitted {
            return Some(AttemptOutcome::applied(job.clone()));
        }
        self.skip_reason()
            .map(|reason| AttemptOutcome::skipped(job.clone(), reason))
    }
}

/// Everything an attempt reads but never changes.
#[derive(Debug, Clone, Copy)]
pub struct AttemptContext<'a> {
    pub catalog: &'a SelectorCatalog,
    pub pacing: &'a PacingConfig,
    /// Typed into an optional phone field.
    pub phone: &'a str,
}

pub struct ApplyAttempt<'a, S: ?Sized> {
    session: &'a mut S,
    ctx: AttemptContext<'a>,
    job: &'a JobCandidate,
    state: AttemptState,
    progress_clicks: usize,
}

impl<'a, S> ApplyAttempt<'a, S>
where
    S: SessionDriver + ?Sized,
{
    pub fn new(session: &'a mut S, ctx: AttemptContext<'a>, job: &'a JobCandidate) -> Self {
        Self {
            session,
            ctx,
            job,
            state: AttemptState::Discovered,
            progress_clicks: 0,
        }
    }

    pub fn state(&self) -> AttemptState {
        self.state
    }

    /// Drive transitions until a terminal state is reached.
    pub async fn run(mut self) -> Result<AttemptOutcome> {
        loop {
            if let Some(outcome) = self.state.outcome(self.job) {
                info!(
                    target: "apply.attempt",
                    title = %self.job.title,
                    state = ?self.state,
                    progress_clicks = self.progress_clicks,
                    "attempt finished"
                );
                return Ok(outcome);
            }
            self.step().await?;
        }
    }

    /// Perform exactly one transition. Terminal states are left unchanged.
    pub async fn step(&mut self) -> Result<AttemptState> {
        let next = match self.state {
            AttemptState::Discovered => self.open_posting().await?,
            AttemptState::Evaluating => self.evaluate().await,
            AttemptState::ApplyOpened => self.fill_form().await,
            AttemptState::FormFilled => self.submit().await?,
            terminal => terminal,
        };
        if next != self.state {
            debug!(target: "apply.attempt", url = %self.job.url, from = ?self.state, to = ?next, "transition");
        }
        self.state = next;
        Ok(next)
    }

    async fn open_posting(&mut self) -> Result<AttemptState> {
        self.session
            .navigate(&self.job.url)
            .await
            .with_context(|| format!("failed to open {}", self.job.url))?;
        let settle = self.ctx.pacing.navigation_settle_ms;
        self.session.pause(settle, settle).await;
        Ok(AttemptState::Evaluating)
    }

    async fn evaluate(&mut self) -> AttemptState {
        let apply = &self.ctx.catalog.apply;
        if first_visible_match(self.session, apply).await.is_none() {
            return AttemptState::NotApplicable;
        }
        if click_first_match(self.session, apply).await {
            AttemptState::ApplyOpened
        } else {
            AttemptState::ApplyUnclickable
        }
    }

    async fn fill_form(&mut self) -> AttemptState {
        let settle = self.ctx.pacing.apply_settle_ms;
        self.session.pause(settle, settle).await;
        if fill_first_match(self.session, &self.ctx.catalog.phone, self.ctx.phone).await {
            debug!(target: "apply.attempt", url = %self.job.url, "phone field filled");
        }
        AttemptState::FormFilled
    }

    async fn submit(&mut self) -> Result<AttemptState> {
        let step = self.ctx.pacing.step_settle_ms;
        for _ in 0..PROGRESS_PASSES {
            for candidate in &self.ctx.catalog.progress {
                if self.session.click(candidate).await {
                    self.progress_clicks += 1;
                    debug!(target: "apply.attempt", %candidate, "progress click");
                    self.session.pause(step, step).await;
                }
            }
        }

        let text = self
            .session
            .page_text()
            .await
            .context("failed to read page text after submission")?;
        let confirmed = contains_any(&text, &self.ctx.catalog.confirmation_texts);

        if !confirmed && self.progress_clicks == 0 {
            return Ok(AttemptState::SubmitFailed);
        }
        if click_first_match(self.session, &self.ctx.catalog.dismiss).await {
            debug!(target: "apply.attempt", "confirmation dismissed");
        }
        Ok(AttemptState::Submitted)
    }
}

/// Case-insensitive search for any of `needles` in `haystack`.
fn contains_any(haystack: &str, needles: &[String]) -> bool {
    let haystack = haystack.to_lowercase();
    needles
        .iter()
        .filter(|n| !n.trim().is_empty())
        .any(|n| haystack.contains(&n.to_lowercase()))
}
