//! The capped run loop.
use crate::attempt::{ApplyAttempt, AttemptContext};
use crate::login::login;
use crate::search::run_search;
use crate::session::SessionDriver;
use autoapply_common::ApplyError;
use autoapply_common::model::{AttemptOutcome, JobCandidate, RunState, RunSummary, SkipReason};
use autoapply_config::{ApplyConfig, Credentials};
use tracing::{info, info_span, warn, Instrument};

/// What a run searches for and how many applications it may submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub keywords: String,
    pub location: String,
    pub max_applications: u32,
}

impl RunPlan {
    pub fn from_config(cfg: &ApplyConfig) -> Self {
        Self {
            keywords: cfg.keywords.clone(),
            location: cfg.location.clone(),
            max_applications: cfg.max_applications,
        }
    }
}

/// Work through `candidates` in order until the cap is met or the list runs
/// out. The cap is checked before every candidate, so a cap of zero visits
/// nothing.
pub async fn execute_run<S>(
    session: &mut S,
    plan: &RunPlan,
    candidates: &[JobCandidate],
    ctx: AttemptContext<'_>,
) -> RunSummary
where
    S: SessionDriver + ?Sized,
{
    let cap = plan.max_applications as usize;
    let mut state = RunState::default();

    for (index, job) in candidates.iter().enumerate() {
        if state.applied_count() >= cap {
            info!(target: "apply.run", applied = state.applied_count(), cap, "application cap reached");
            break;
        }
        if index > 0 {
            session
                .pause(ctx.pacing.between_jobs_min_ms, ctx.pacing.between_jobs_max_ms)
                .await;
        }

        let span = info_span!("candidate", index, url = %job.url);
        let outcome = process_candidate(session, ctx, job).instrument(span).await;
        match &outcome {
            AttemptOutcome::Applied { title, .. } => {
                info!(target: "apply.run", %title, "applied");
            }
            AttemptOutcome::Skipped { title, reason, .. } => {
                info!(target: "apply.run", %title, %reason, "skipped");
            }
        }
        state.record(outcome);
    }

    info!(
        target: "apply.run",
        applied = state.applied_count(),
        skipped = state.skipped_count(),
        "run finished"
    );
    state.into_summary(plan.keywords.clone(), plan.location.clone())
}

/// One candidate in its own page context. The context is closed whatever
/// happened inside it, and errors become a skipped outcome.
pub async fn process_candidate<S>(
    session: &mut S,
    ctx: AttemptContext<'_>,
    job: &JobCandidate,
) -> AttemptOutcome
where
    S: SessionDriver + ?Sized,
{
    if let Err(err) = session.open_context().await {
        warn!(target: "apply.run", error = %format!("{err:#}"), "could not open page context");
        return AttemptOutcome::skipped(job.clone(), SkipReason::Error(format!("{err:#}")));
    }

    let result = ApplyAttempt::new(&mut *session, ctx, job).run().await;

    if let Err(err) = session.close_context().await {
        warn!(target: "apply.run", error = %format!("{err:#}"), "could not close page context");
    }

    result.unwrap_or_else(|err| {
        warn!(target: "apply.run", title = %job.title, error = %format!("{err:#}"), "attempt failed");
        AttemptOutcome::skipped(job.clone(), SkipReason::Error(format!("{err:#}")))
    })
}

/// Sign in, search, then apply. Login and search failures end the run;
/// per-job failures never do.
pub async fn run_session<S>(
    session: &mut S,
    cfg: &ApplyConfig,
    credentials: &Credentials,
) -> Result<RunSummary, ApplyError>
where
    S: SessionDriver + ?Sized,
{
    let plan = RunPlan::from_config(cfg);
    info!(
        target: "apply.run",
        keywords = %plan.keywords,
        location = %plan.location,
        max_applications = plan.max_applications,
        "starting run"
    );

    login(session, &cfg.site, &cfg.selectors, &cfg.pacing, credentials).await?;

    let candidates = run_search(
        session,
        &cfg.site,
        &cfg.selectors,
        &cfg.pacing,
        &plan.keywords,
        &plan.location,
    )
    .await?;
    info!(target: "apply.run", candidates = candidates.len(), "candidates discovered");

    let ctx = AttemptContext {
        catalog: &cfg.selectors,
        pacing: &cfg.pacing,
        phone: cfg.phone_or_placeholder(),
    };
    Ok(execute_run(session, &plan, &candidates, ctx).await)
}
