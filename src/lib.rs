use crate::{
    answers::source::AnswerSource,
    browser::dom::{ClickOptions, DomElement, DomPage, Query},
    error::EngineError,
    form::field_model::NavigationSummary,
    nav::{
        navigator::{Navigator, WalkEnd},
        submit::finalize_review_step,
    },
};

pub mod answers;
pub mod browser;
pub mod cli;
pub mod error;
pub mod fill;
pub mod form;
pub mod nav;
pub mod report;

/// Pause after clicking the trigger, before looking for the dialog.
const DIALOG_OPEN_SETTLE_MS: u64 = 1000;

/// Knobs for one form session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Text of the button that opens the application dialog.
    pub trigger_text: String,
    pub max_steps: usize,
    /// When false the session stops on the review step without submitting.
    pub allow_submit: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            trigger_text: "Easy Apply".to_string(),
            max_steps: 10,
            allow_submit: false,
        }
    }
}

/// Find the application dialog, clicking the trigger button when it is not
/// already open.
pub fn open_application_dialog(
    page: &dyn DomPage,
    trigger_text: &str,
) -> Result<Box<dyn DomElement>, EngineError> {
    if let Some(dialog) = first_dialog(page)? {
        return Ok(dialog);
    }

    let buttons = page.locate(&Query::tag("button").with_text(trigger_text))?;
    let trigger = buttons
        .into_iter()
        .find(|b| b.is_visible().unwrap_or(false) && b.is_enabled().unwrap_or(true))
        .ok_or_else(|| EngineError::ElementNotFound {
            element: format!("button '{trigger_text}'"),
            context: "application trigger not on page".to_string(),
        })?;

    if trigger.click(ClickOptions::plain()).is_err() {
        trigger.click(ClickOptions::forced())?;
    }
    page.settle(DIALOG_OPEN_SETTLE_MS)?;

    first_dialog(page)?.ok_or_else(|| EngineError::ElementNotFound {
        element: "role=dialog".to_string(),
        context: format!("no dialog appeared after clicking '{trigger_text}'"),
    })
}

fn first_dialog(page: &dyn DomPage) -> Result<Option<Box<dyn DomElement>>, EngineError> {
    let mut dialogs = page.locate(&Query::role("dialog"))?;
    Ok((!dialogs.is_empty()).then(|| dialogs.remove(0)))
}

/// Drive one full session: open the dialog, walk and fill every step, and
/// finish the review step according to `allow_submit`.
///
/// Form-level trouble (a stalled walk, a failed submit click) lands in the
/// summary's `error` field; only a broken page connection returns `Err`.
pub fn run_form_session(
    page: &dyn DomPage,
    source: &AnswerSource,
    options: &SessionOptions,
) -> Result<NavigationSummary, EngineError> {
    let dialog = open_application_dialog(page, &options.trigger_text)?;

    let navigator = Navigator::new(page, source, options.max_steps);
    let walk = navigator.run(dialog)?;

    let mut summary = NavigationSummary {
        steps_completed: walk.steps_completed,
        total_filled: walk.total_filled,
        skipped_prefilled: walk.skipped_prefilled,
        reached_terminal: walk.reached_terminal(),
        submitted: false,
        missing_labels: walk.missing_labels.clone(),
        error: None,
    };

    match &walk.end {
        WalkEnd::Terminal => {
            match finalize_review_step(page, walk.dialog.as_ref(), options.allow_submit) {
                Ok(outcome) => {
                    summary.submitted = outcome.submitted;
                    if outcome.submitted && !outcome.verified {
                        summary.error = Some("submission unverified".to_string());
                    }
                }
                Err(e) => {
                    summary.error = Some(e.to_string());
                }
            }
        }
        WalkEnd::Stalled { percent } => {
            summary.error = Some(format!(
                "navigation stuck at {}",
                percent.map_or("unknown progress".to_string(), |p| format!("{p}%"))
            ));
        }
        WalkEnd::DialogClosed => {
            summary.error = Some("dialog closed before the review step".to_string());
        }
        WalkEnd::StepLimit => {
            summary.error = Some(format!(
                "step limit of {} reached before the review step",
                options.max_steps
            ));
        }
        WalkEnd::NoAdvanceButton => {
            // Some short forms end without a review screen; not an error,
            // but nothing was submitted either.
        }
    }

    Ok(summary)
}
