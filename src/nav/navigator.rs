use serde::Serialize;

use crate::answers::source::AnswerSource;
use crate::browser::dom::{ClickOptions, DomElement, DomPage, Query};
use crate::error::EngineError;
use crate::fill::filler::StepFiller;
use crate::form::classifier::classify_step;
use crate::form::field_model::StepFillResult;
use crate::form::progress::detect_progress;

/// Consecutive unchanged progress observations tolerated before aborting.
/// Two no-op passes mean clicking cannot get the form unstuck.
const STALL_LIMIT: u32 = 2;

/// Pause after clicking a continuation button, letting the next step render.
const ADVANCE_SETTLE_MS: u64 = 800;
/// Pause between filling and button hunting.
const POST_FILL_SETTLE_MS: u64 = 300;

/// Continuation button texts, most specific first. Specific texts beat the
/// generic ones so "Continue to next step" never matches a bare "Continue"
/// rendered elsewhere in the dialog.
const CONTINUE_TEXTS: &[&str] = &[
    "Continue to next step",
    "Review your application",
    "Review",
    "Next",
    "Continue",
];
const CONTINUE_ARIA: &[&str] = &["Continue", "Review", "Next"];

/// How a walk over the form's steps ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkEnd {
    /// Progress reported 100%; the review step is on screen.
    Terminal,
    /// No continuation button was found; treated as the last step.
    NoAdvanceButton,
    /// Progress stopped changing; a required field is likely rejected.
    Stalled { percent: Option<u32> },
    /// The dialog vanished mid-walk.
    DialogClosed,
    /// The step cap was reached before anything above happened.
    StepLimit,
}

/// Result of walking the whole form. The final dialog handle is carried
/// forward so submission acts on the scope the walk ended in.
pub struct FormWalk {
    pub steps_completed: usize,
    pub total_filled: usize,
    pub skipped_prefilled: usize,
    pub missing_labels: Vec<String>,
    pub end: WalkEnd,
    pub dialog: Box<dyn DomElement>,
}

impl FormWalk {
    pub fn reached_terminal(&self) -> bool {
        self.end == WalkEnd::Terminal
    }
}

/// Drives one dialog from its first step to the review step.
///
/// Each pass reads progress, fills the visible step, then clicks the best
/// continuation button. The dialog handle is re-acquired after every
/// advance; hosts re-render the dialog node between steps.
pub struct Navigator<'a> {
    page: &'a dyn DomPage,
    source: &'a AnswerSource,
    max_steps: usize,
}

impl<'a> Navigator<'a> {
    pub fn new(page: &'a dyn DomPage, source: &'a AnswerSource, max_steps: usize) -> Self {
        Navigator {
            page,
            source,
            max_steps,
        }
    }

    pub fn run(&self, mut dialog: Box<dyn DomElement>) -> Result<FormWalk, EngineError> {
        let filler = StepFiller::new(self.page, self.source);

        let mut steps_completed = 0;
        let mut total_filled = 0;
        let mut skipped_prefilled = 0;
        let mut missing_labels: Vec<String> = Vec::new();
        let mut end = WalkEnd::StepLimit;

        let mut last_percent: Option<Option<u32>> = None;
        let mut stall_count: u32 = 0;

        for step in 0..self.max_steps {
            let progress = detect_progress(dialog.as_ref());
            tracing::info!(
                step = step + 1,
                percent = ?progress.percent,
                current = ?progress.current,
                total = ?progress.total,
                "navigating step"
            );

            // Terminal check comes before filling: the review step has no
            // answerable fields and scanning it wastes a pass.
            if progress.is_terminal() {
                steps_completed = step + 1;
                end = WalkEnd::Terminal;
                break;
            }

            if last_percent == Some(progress.percent) {
                stall_count += 1;
                if stall_count >= STALL_LIMIT {
                    tracing::warn!(
                        percent = ?progress.percent,
                        "progress unchanged after {stall_count} passes, aborting"
                    );
                    end = WalkEnd::Stalled {
                        percent: progress.percent,
                    };
                    break;
                }
            } else {
                stall_count = 0;
            }
            last_percent = Some(progress.percent);

            let fields = classify_step(dialog.as_ref());
            let step_result = filler.fill_step(dialog.as_ref(), &fields);
            log_step(&step_result);
            total_filled += step_result.filled;
            skipped_prefilled += step_result.skipped_prefilled;
            missing_labels.extend(step_result.missing_labels);

            self.sniff_validation_errors(dialog.as_ref());

            steps_completed = step + 1;
            self.page.settle(POST_FILL_SETTLE_MS)?;

            let Some(button) = self.find_continuation(dialog.as_ref()) else {
                tracing::info!("no continuation button, treating as final step");
                end = WalkEnd::NoAdvanceButton;
                break;
            };

            if !self.click_advance(button.as_ref())? {
                end = WalkEnd::NoAdvanceButton;
                break;
            }
            self.page.settle(ADVANCE_SETTLE_MS)?;

            match self.reacquire_dialog()? {
                Some(fresh) => dialog = fresh,
                None => {
                    tracing::warn!("dialog disappeared after advancing");
                    end = WalkEnd::DialogClosed;
                    break;
                }
            }
        }

        Ok(FormWalk {
            steps_completed,
            total_filled,
            skipped_prefilled,
            missing_labels,
            end,
            dialog,
        })
    }

    /// First visible, enabled button matching the priority ladder. Submit
    /// buttons are excluded here; submission is a separate, gated act.
    fn find_continuation(&self, dialog: &dyn DomElement) -> Option<Box<dyn DomElement>> {
        let mut queries: Vec<Query> = Vec::new();
        for text in CONTINUE_TEXTS {
            queries.push(Query::tag("button").with_text(text));
        }
        for aria in CONTINUE_ARIA {
            queries.push(Query::tag("button").with_aria_label(aria));
        }
        queries.push(Query::tag("button").with_class("primary"));

        for query in &queries {
            let found = match dialog.locate(query) {
                Ok(found) => found,
                Err(_) => continue,
            };
            for button in found {
                if !button.is_visible().unwrap_or(false) {
                    continue;
                }
                if !button.is_enabled().unwrap_or(true) {
                    continue;
                }
                let text = button.inner_text().unwrap_or_default().to_lowercase();
                let aria = button
                    .attr("aria-label")
                    .ok()
                    .flatten()
                    .unwrap_or_default()
                    .to_lowercase();
                if text.contains("submit") || aria.contains("submit") {
                    continue;
                }
                return Some(button);
            }
        }
        None
    }

    /// Plain click, then a forced click when overlays intercept the first.
    fn click_advance(&self, button: &dyn DomElement) -> Result<bool, EngineError> {
        if button.click(ClickOptions::plain()).is_ok() {
            return Ok(true);
        }
        tracing::debug!("plain click intercepted, retrying forced");
        match button.click(ClickOptions::forced()) {
            Ok(()) => Ok(true),
            Err(e) => {
                tracing::warn!(error = %e, "continuation click failed twice");
                Ok(false)
            }
        }
    }

    fn reacquire_dialog(&self) -> Result<Option<Box<dyn DomElement>>, EngineError> {
        let mut found = self.page.locate(&Query::role("dialog"))?;
        Ok((!found.is_empty()).then(|| found.remove(0)))
    }

    /// Surface inline validation feedback after a fill pass. Informational
    /// only; the stall counter is what actually ends a rejected walk.
    fn sniff_validation_errors(&self, dialog: &dyn DomElement) {
        for query in [
            Query::role("alert"),
            Query::tag("span").with_class("error"),
            Query::tag("div").with_class("error"),
        ] {
            let Ok(found) = dialog.locate(&query) else {
                continue;
            };
            for node in &found {
                if !node.is_visible().unwrap_or(false) {
                    continue;
                }
                if let Ok(text) = node.inner_text() {
                    let text = text.trim();
                    if !text.is_empty() {
                        tracing::warn!(message = %text, "form validation error visible");
                        return;
                    }
                }
            }
        }
    }
}

fn log_step(result: &StepFillResult) {
    tracing::info!(
        filled = result.filled,
        required = result.required,
        skipped_prefilled = result.skipped_prefilled,
        missing = result.missing_labels.len(),
        "step fill pass done"
    );
}
