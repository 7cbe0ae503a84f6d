mod common;

use form_pilot::browser::mock::MockPage;
use form_pilot::{run_form_session, SessionOptions};

use common::{
    answers_from, dead_next_button, follow_checkbox, labeled_text_input, next_button,
    progress_region, step, submit_button, yes_no_radio,
};

fn two_step_form() -> MockPage {
    MockPage::new(vec![
        step()
            .child(progress_region(0))
            .child(labeled_text_input("first-name", "First name"))
            .child(yes_no_radio("sponsor", "Will you require sponsorship?"))
            .child(next_button()),
        step()
            .child(progress_region(100))
            .child(follow_checkbox("follow", "Acme Corp"))
            .child(submit_button()),
    ])
}

// ============================================================================
// Dry run
// ============================================================================

#[test]
fn dry_run_reaches_review_without_submitting() {
    let page = two_step_form();
    let source = answers_from(&[("first-name", "Jordan")]);
    let options = SessionOptions::default();
    assert!(!options.allow_submit);

    let summary = run_form_session(&page, &source, &options).unwrap();

    assert!(summary.reached_terminal);
    assert!(!summary.submitted);
    assert_eq!(summary.error, None);
    assert_eq!(summary.total_filled, 2);

    // The follow opt-in is cleared even in a dry run, and the dialog stays
    // open for inspection.
    assert!(!page.is_checked_id("follow"));
    assert!(page.dialog_open());
    assert!(!page
        .action_log()
        .iter()
        .any(|a| a == "click:Submit application"));
}

// ============================================================================
// Live submission
// ============================================================================

#[test]
fn submission_clicks_submit_and_verifies() {
    let page = two_step_form();
    let source = answers_from(&[("first-name", "Jordan")]);
    let options = SessionOptions {
        allow_submit: true,
        ..SessionOptions::default()
    };

    let summary = run_form_session(&page, &source, &options).unwrap();

    assert!(summary.reached_terminal);
    assert!(summary.submitted);
    assert_eq!(summary.error, None);
    assert!(!page.dialog_open());
    assert!(page
        .action_log()
        .iter()
        .any(|a| a == "click:Submit application"));
}

#[test]
fn missing_submit_button_reports_a_submission_error() {
    let page = MockPage::new(vec![
        step().child(progress_region(0)).child(next_button()),
        step().child(progress_region(100)),
    ]);
    let source = answers_from(&[]);
    let options = SessionOptions {
        allow_submit: true,
        ..SessionOptions::default()
    };

    let summary = run_form_session(&page, &source, &options).unwrap();

    assert!(summary.reached_terminal);
    assert!(!summary.submitted);
    let error = summary.error.unwrap();
    assert!(error.contains("submit button not found"), "{error}");
}

// ============================================================================
// Failure reporting
// ============================================================================

#[test]
fn stalled_walk_surfaces_in_the_summary() {
    let page = MockPage::new(vec![step()
        .child(progress_region(25))
        .child(dead_next_button())]);
    let source = answers_from(&[]);

    let summary = run_form_session(&page, &source, &SessionOptions::default()).unwrap();

    assert!(!summary.reached_terminal);
    assert_eq!(summary.error.as_deref(), Some("navigation stuck at 25%"));
}

#[test]
fn step_limit_surfaces_in_the_summary() {
    let steps = (0..5)
        .map(|i| step().child(progress_region(i * 10)).child(next_button()))
        .collect();
    let page = MockPage::new(steps);
    let source = answers_from(&[]);
    let options = SessionOptions {
        max_steps: 3,
        ..SessionOptions::default()
    };

    let summary = run_form_session(&page, &source, &options).unwrap();

    assert_eq!(summary.steps_completed, 3);
    assert_eq!(
        summary.error.as_deref(),
        Some("step limit of 3 reached before the review step")
    );
}

#[test]
fn missing_dialog_and_trigger_is_an_error() {
    let page = MockPage::new(vec![]);
    let source = answers_from(&[]);

    let result = run_form_session(&page, &source, &SessionOptions::default());
    assert!(result.is_err());
}
