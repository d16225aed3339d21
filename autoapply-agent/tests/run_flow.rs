mod common;

use autoapply_agent::attempt::{ApplyAttempt, AttemptContext, AttemptState};
use autoapply_agent::login::login;
use autoapply_agent::run::{RunPlan, execute_run, process_candidate, run_session};
use autoapply_agent::search::run_search;
use autoapply_common::ApplyError;
use autoapply_common::Locator;
use autoapply_common::model::{AttemptOutcome, JobCandidate, SkipReason};
use autoapply_config::{PacingConfig, SelectorCatalog};
use common::{FakePage, FakeSite, LOGIN_URL, catalog, config, credentials, link, posting_url, site};

fn plan(max_applications: u32) -> RunPlan {
    RunPlan {
        keywords: "Rust Engineer".into(),
        location: "Remote".into(),
        max_applications,
    }
}

fn ctx<'a>(catalog: &'a SelectorCatalog, pacing: &'a PacingConfig) -> AttemptContext<'a> {
    AttemptContext {
        catalog,
        pacing,
        phone: "5551234",
    }
}

fn job(id: u32) -> JobCandidate {
    JobCandidate::new(format!("Role {id}"), posting_url(id))
}

#[tokio::test]
async fn attempt_walks_every_state_to_submitted() {
    common::init_test_tracing();
    let catalog = catalog();
    let pacing = PacingConfig::immediate();
    let job = job(1);
    let mut browser = FakeSite::new().with_page(posting_url(1), FakePage::easy_apply());

    let mut attempt = ApplyAttempt::new(&mut browser, ctx(&catalog, &pacing), &job);
    let mut seen = vec![attempt.state()];
    while !attempt.state().is_terminal() {
        seen.push(attempt.step().await.unwrap());
    }
    assert_eq!(
        seen,
        vec![
            AttemptState::Discovered,
            AttemptState::Evaluating,
            AttemptState::ApplyOpened,
            AttemptState::FormFilled,
            AttemptState::Submitted,
        ]
    );
    // Terminal states stay put.
    assert_eq!(attempt.step().await.unwrap(), AttemptState::Submitted);

    assert_eq!(
        browser.fills,
        vec![(Locator::css("input.phone"), "5551234".to_string())]
    );
    assert!(browser.clicks.contains(&Locator::css("button.dismiss")));
}

#[tokio::test]
async fn attempt_outcomes_per_posting_kind() {
    common::init_test_tracing();
    let catalog = catalog();
    let pacing = PacingConfig::immediate();

    let cases = [
        (FakePage::easy_apply(), None),
        (FakePage::external_only(), Some(SkipReason::NoEasyApply)),
        (FakePage::unclickable(), Some(SkipReason::ApplyNotClickable)),
        (FakePage::stuck(), Some(SkipReason::CouldNotSubmit)),
    ];
    for (page, expected) in cases {
        let job = job(9);
        let mut browser = FakeSite::new().with_page(posting_url(9), page);
        let outcome = ApplyAttempt::new(&mut browser, ctx(&catalog, &pacing), &job)
            .run()
            .await
            .unwrap();
        match expected {
            None => assert_eq!(outcome, AttemptOutcome::applied(job.clone())),
            Some(reason) => assert_eq!(outcome, AttemptOutcome::skipped(job.clone(), reason)),
        }
    }
}

#[tokio::test]
async fn confirmation_without_progress_click_still_counts() {
    common::init_test_tracing();
    let catalog = catalog();
    let pacing = PacingConfig::immediate();
    let mut page = FakePage::stuck();
    page.text = "application SENT".into();
    let job = job(3);
    let mut browser = FakeSite::new().with_page(posting_url(3), page);

    let outcome = ApplyAttempt::new(&mut browser, ctx(&catalog, &pacing), &job)
        .run()
        .await
        .unwrap();
    assert!(outcome.is_applied());
}

#[tokio::test]
async fn cap_stops_before_visiting_remaining_candidates() {
    common::init_test_tracing();
    let catalog = catalog();
    let pacing = PacingConfig::immediate();
    let mut browser = FakeSite::new()
        .with_page(posting_url(1), FakePage::external_only())
        .with_page(posting_url(2), FakePage::easy_apply())
        .with_page(posting_url(3), FakePage::easy_apply())
        .with_page(posting_url(4), FakePage::easy_apply());
    let candidates: Vec<_> = (1..=4).map(job).collect();

    let summary = execute_run(&mut browser, &plan(2), &candidates, ctx(&catalog, &pacing)).await;

    assert_eq!(summary.applied().len(), 2);
    assert_eq!(summary.skipped().len(), 1);
    assert_eq!(summary.total_tried(), 3);
    assert_eq!(summary.skipped()[0].reason, SkipReason::NoEasyApply);
    assert!(!browser.visited(&posting_url(4)));
    assert!(browser.contexts_balanced());
    assert_eq!(browser.opened, 3);
}

#[tokio::test]
async fn zero_cap_evaluates_nothing() {
    common::init_test_tracing();
    let catalog = catalog();
    let pacing = PacingConfig::immediate();
    let mut browser = FakeSite::new().with_page(posting_url(1), FakePage::easy_apply());

    let summary = execute_run(&mut browser, &plan(0), &[job(1)], ctx(&catalog, &pacing)).await;

    assert_eq!(summary.total_tried(), 0);
    assert!(browser.navigations.is_empty());
    assert_eq!(browser.opened, 0);
}

#[tokio::test]
async fn nothing_applicable_skips_everything() {
    common::init_test_tracing();
    let catalog = catalog();
    let pacing = PacingConfig::immediate();
    let mut browser = FakeSite::new();
    for id in 1..=3 {
        browser = browser.with_page(posting_url(id), FakePage::external_only());
    }
    let candidates: Vec<_> = (1..=3).map(job).collect();

    let summary = execute_run(&mut browser, &plan(5), &candidates, ctx(&catalog, &pacing)).await;

    assert!(summary.applied().is_empty());
    assert_eq!(summary.total_tried(), 3);
    assert!(
        summary
            .skipped()
            .iter()
            .all(|s| s.reason == SkipReason::NoEasyApply)
    );
}

#[tokio::test]
async fn errors_become_skips_and_contexts_are_closed() {
    common::init_test_tracing();
    let catalog = catalog();
    let pacing = PacingConfig::immediate();
    let mut broken = FakePage::easy_apply();
    broken.broken_text = true;
    // Posting 1 is unreachable, posting 2 fails mid-flow, posting 3 applies.
    let mut browser = FakeSite::new()
        .with_page(posting_url(2), broken)
        .with_page(posting_url(3), FakePage::easy_apply());
    let candidates: Vec<_> = (1..=3).map(job).collect();

    let summary = execute_run(&mut browser, &plan(5), &candidates, ctx(&catalog, &pacing)).await;

    assert_eq!(summary.total_tried(), 3);
    assert_eq!(summary.applied().len(), 1);
    assert_eq!(summary.applied()[0].url, posting_url(3));
    for skipped in summary.skipped() {
        let SkipReason::Error(message) = &skipped.reason else {
            panic!("expected an error skip, got {:?}", skipped.reason);
        };
        assert!(!message.is_empty());
        assert!(skipped.reason.to_string().starts_with("Error: "));
    }
    assert!(browser.contexts_balanced());
    assert_eq!(browser.opened, 3);
}

#[tokio::test]
async fn failing_context_is_a_skip_not_a_crash() {
    common::init_test_tracing();
    let catalog = catalog();
    let pacing = PacingConfig::immediate();
    let mut browser = FakeSite::new().with_page(posting_url(1), FakePage::easy_apply());
    browser.fail_open_context = true;

    let job = job(1);
    let outcome = process_candidate(&mut browser, ctx(&catalog, &pacing), &job).await;

    assert!(matches!(
        outcome,
        AttemptOutcome::Skipped {
            reason: SkipReason::Error(_),
            ..
        }
    ));
    assert!(browser.navigations.is_empty());
}

#[tokio::test]
async fn pauses_only_between_candidates() {
    common::init_test_tracing();
    let catalog = catalog();
    let pacing = PacingConfig {
        between_jobs_min_ms: 7,
        between_jobs_max_ms: 11,
        ..PacingConfig::immediate()
    };
    let mut browser = FakeSite::new()
        .with_page(posting_url(1), FakePage::external_only())
        .with_page(posting_url(2), FakePage::external_only());
    let candidates: Vec<_> = (1..=2).map(job).collect();

    execute_run(&mut browser, &plan(5), &candidates, ctx(&catalog, &pacing)).await;

    let between = browser.pauses.iter().filter(|p| **p == (7, 11)).count();
    assert_eq!(between, 1);
}

#[tokio::test]
async fn login_fills_both_fields_and_tolerates_challenge() {
    common::init_test_tracing();
    let mut browser = FakeSite::new().with_page(LOGIN_URL, FakePage::login_form());
    browser.landing_url = Some("https://jobs.example.com/checkpoint/challenge/123".into());

    login(
        &mut browser,
        &site(),
        &catalog(),
        &PacingConfig::immediate(),
        &credentials(),
    )
    .await
    .unwrap();

    assert_eq!(browser.navigations, vec![LOGIN_URL.to_string()]);
    assert_eq!(
        browser.fills,
        vec![
            (Locator::css("#username"), "me@example.com".to_string()),
            (Locator::css("#password"), "hunter2".to_string()),
        ]
    );
    assert_eq!(browser.clicks, vec![Locator::css("button[type='submit']")]);
}

#[tokio::test]
async fn login_without_form_fails() {
    common::init_test_tracing();
    let mut browser = FakeSite::new().with_page(LOGIN_URL, FakePage::default());

    let err = login(
        &mut browser,
        &site(),
        &catalog(),
        &PacingConfig::immediate(),
        &credentials(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApplyError::Login(_)));
}

#[tokio::test]
async fn search_falls_back_to_later_link_selectors_and_dedupes() {
    common::init_test_tracing();
    let mut browser = FakeSite::signed_in_search(vec![
        link("Rust Engineer\nAcme", "/jobs/view/1/?trk=a"),
        link("Platform Engineer", "/jobs/view/2/"),
        link("Rust Engineer (dup)", "/jobs/view/1/?trk=b"),
    ]);

    let jobs = run_search(
        &mut browser,
        &site(),
        &catalog(),
        &PacingConfig::immediate(),
        "Rust Engineer",
        "Remote",
    )
    .await
    .unwrap();

    assert_eq!(
        jobs,
        vec![
            JobCandidate::new("Rust Engineer", posting_url(1)),
            JobCandidate::new("Platform Engineer", posting_url(2)),
        ]
    );
    let searched = &browser.navigations[0];
    assert!(searched.contains("keywords=Rust+Engineer"));
    assert!(searched.contains("location=Remote"));
}

#[tokio::test]
async fn search_with_no_links_is_empty() {
    common::init_test_tracing();
    let mut browser = FakeSite::signed_in_search(Vec::new());
    let jobs = run_search(
        &mut browser,
        &site(),
        &catalog(),
        &PacingConfig::immediate(),
        "Nothing",
        "Atlantis",
    )
    .await
    .unwrap();
    assert!(jobs.is_empty());
}

#[tokio::test]
async fn full_session_respects_cap_and_summarizes() {
    common::init_test_tracing();
    let mut browser = FakeSite::signed_in_search(vec![
        link("No apply", &posting_url(1)),
        link("First", &posting_url(2)),
        link("Second", &posting_url(3)),
        link("Extra", &posting_url(4)),
    ])
    .with_page(posting_url(1), FakePage::external_only())
    .with_page(posting_url(2), FakePage::easy_apply())
    .with_page(posting_url(3), FakePage::easy_apply())
    .with_page(posting_url(4), FakePage::easy_apply());

    let summary = run_session(&mut browser, &config(2), &credentials())
        .await
        .unwrap();

    assert_eq!(summary.keywords(), "Rust Engineer");
    assert_eq!(summary.location(), "Remote");
    assert_eq!(summary.applied().len(), 2);
    assert_eq!(summary.skipped().len(), 1);
    assert_eq!(summary.total_tried(), 3);
    assert_eq!(
        summary.total_tried(),
        summary.applied().len() + summary.skipped().len()
    );
    assert!(!browser.visited(&posting_url(4)));
    assert!(browser.contexts_balanced());
}

#[tokio::test]
async fn full_session_fails_when_login_page_is_unreachable() {
    common::init_test_tracing();
    let mut browser = FakeSite::new();
    let err = run_session(&mut browser, &config(2), &credentials())
        .await
        .unwrap_err();
    assert!(matches!(err, ApplyError::Driver(_)));
}
