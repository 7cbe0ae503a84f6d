use serde::Serialize;

use crate::browser::dom::{ClickOptions, DomElement, DomPage, Query};
use crate::error::EngineError;

/// Pause after the submit click before verifying.
const VERIFY_SETTLE_MS: u64 = 1500;
/// Pause in dry-run mode so a watching operator can inspect the review step.
const DRY_RUN_PAUSE_MS: u64 = 2000;

/// Submit button queries, most specific first. Matching "Submit" last keeps
/// a "Submit feedback" style button from shadowing the real one.
const SUBMIT_QUERIES: &[fn() -> Query] = &[
    || Query::tag("button").with_text("Submit application"),
    || Query::tag("button").with_aria_label("Submit application"),
    || Query::tag("button").with_aria_label("Submit"),
    || Query::tag("button").with_text("Submit"),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubmitOutcome {
    pub submitted: bool,
    /// Whether the dialog closed or a success message appeared afterwards.
    /// Meaningless when `submitted` is false.
    pub verified: bool,
}

impl SubmitOutcome {
    pub fn dry_run() -> Self {
        SubmitOutcome {
            submitted: false,
            verified: false,
        }
    }
}

/// Final act on the review step: clear the opt-in follow checkbox, then
/// either stop (dry run) or click submit and verify.
///
/// Only called once a walk reaches the terminal step; submission from any
/// earlier state is a caller bug, not something this function re-checks.
pub fn finalize_review_step(
    page: &dyn DomPage,
    dialog: &dyn DomElement,
    allow_submit: bool,
) -> Result<SubmitOutcome, EngineError> {
    uncheck_follow(dialog);

    if !allow_submit {
        tracing::info!("dry run: review step reached, submission skipped");
        page.settle(DRY_RUN_PAUSE_MS)?;
        return Ok(SubmitOutcome::dry_run());
    }

    let Some(button) = find_submit_button(dialog) else {
        return Err(EngineError::SubmissionFailed(
            "submit button not found on review step".to_string(),
        ));
    };

    button
        .click(ClickOptions::plain())
        .map_err(|e| EngineError::SubmissionFailed(format!("submit click failed: {e}")))?;
    page.settle(VERIFY_SETTLE_MS)?;

    let verified = verify_submission(page, dialog);
    if verified {
        tracing::info!("application submitted and verified");
    } else {
        tracing::warn!("submit clicked but no confirmation observed");
    }
    Ok(SubmitOutcome {
        submitted: true,
        verified,
    })
}

/// The review step renders an opt-in "follow company" checkbox pre-checked.
/// Clicking its label clears it; labels sit on top of the input and
/// intercept pointer events.
fn uncheck_follow(dialog: &dyn DomElement) {
    let Ok(checked) = dialog.locate(&Query::input("checkbox").with_checked(true)) else {
        return;
    };
    let Some(checkbox) = checked.first() else {
        return;
    };

    if let Ok(Some(id)) = checkbox.attr("id") {
        if let Ok(labels) = dialog.locate(&Query::label_for(&id)) {
            if let Some(label) = labels.first() {
                if label.click(ClickOptions::plain()).is_ok() {
                    tracing::debug!("cleared follow checkbox via label");
                    return;
                }
            }
        }
    }
    if checkbox.click(ClickOptions::forced()).is_ok() {
        tracing::debug!("cleared follow checkbox via forced click");
    }
}

fn find_submit_button(dialog: &dyn DomElement) -> Option<Box<dyn DomElement>> {
    for make_query in SUBMIT_QUERIES {
        let found = match dialog.locate(&make_query()) {
            Ok(found) => found,
            Err(_) => continue,
        };
        for button in found {
            if button.is_visible().unwrap_or(false) && button.is_enabled().unwrap_or(false) {
                return Some(button);
            }
        }
    }
    None
}

/// Submission succeeded when the dialog is gone or the page shows a success
/// message. Both checks are best-effort reads.
fn verify_submission(page: &dyn DomPage, dialog: &dyn DomElement) -> bool {
    if !dialog.is_visible().unwrap_or(false) {
        return true;
    }
    for phrase in ["application was sent", "submitted", "successfully applied"] {
        if let Ok(found) = page.locate(&Query::default().with_text(phrase)) {
            if found.iter().any(|n| n.is_visible().unwrap_or(false)) {
                return true;
            }
        }
    }
    false
}
