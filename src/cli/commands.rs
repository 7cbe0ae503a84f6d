use std::path::Path;

use crate::answers::source::{load_answer_source, AnswerSource};
use crate::browser::session::BrowserSession;
use crate::form::classifier::classify_step;
use crate::form::field_model::{FieldCategory, FieldDescriptor};
use crate::form::progress::{detect_progress, ProgressState};
use crate::open_application_dialog;
use crate::report::outcome::{
    format_console_summary, JsonlOutcomeSink, NullOutcomeSink, OutcomeRecord, OutcomeSink,
};
use crate::{run_form_session, SessionOptions};

// ============================================================================
// apply subcommand
// ============================================================================

/// Walk and fill a posting's form. Returns whether the session finished
/// without a recorded error.
#[allow(clippy::too_many_arguments)]
pub fn cmd_apply(
    url: &str,
    answers_path: Option<&str>,
    allow_submit: bool,
    max_steps: usize,
    trigger: &str,
    bridge_script: &str,
    journal: Option<&str>,
) -> Result<bool, Box<dyn std::error::Error>> {
    let source = match answers_path {
        Some(path) => load_answer_source(Path::new(path))?,
        None => AnswerSource::default(),
    };

    let session = BrowserSession::launch(bridge_script)?;
    session.navigate(url)?;

    let options = SessionOptions {
        trigger_text: trigger.to_string(),
        max_steps,
        allow_submit,
    };
    let summary = run_form_session(&session, &source, &options)?;
    session.quit();

    let sink: Box<dyn OutcomeSink> = match journal {
        Some(path) => Box::new(JsonlOutcomeSink::new(path)),
        None => Box::new(NullOutcomeSink),
    };
    sink.record(&OutcomeRecord::new(url, &summary));

    print!("{}", format_console_summary(url, &summary, !allow_submit));
    Ok(summary.error.is_none())
}

// ============================================================================
// inspect subcommand
// ============================================================================

/// Open the dialog and dump the first step's classification as YAML, along
/// with an answers-file skeleton whose keys are the classified labels.
pub fn cmd_inspect(
    url: &str,
    trigger: &str,
    bridge_script: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = BrowserSession::launch(bridge_script)?;
    session.navigate(url)?;

    let dialog = open_application_dialog(&session, trigger)?;
    let progress = detect_progress(dialog.as_ref());
    let fields = classify_step(dialog.as_ref());
    session.quit();

    let template: serde_yaml::Mapping = fields
        .iter()
        .filter(|f| !matches!(f.category, FieldCategory::FileUpload { .. }))
        .map(|f| {
            (
                serde_yaml::Value::String(f.label.clone()),
                serde_yaml::Value::String(String::new()),
            )
        })
        .collect();

    #[derive(serde::Serialize)]
    struct InspectReport {
        progress: ProgressState,
        fields: Vec<FieldDescriptor>,
        answers_template: serde_yaml::Mapping,
    }

    print!(
        "{}",
        serde_yaml::to_string(&InspectReport {
            progress,
            fields,
            answers_template: template,
        })?
    );
    Ok(())
}
