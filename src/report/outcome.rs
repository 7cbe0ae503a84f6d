use std::{
    fs::OpenOptions,
    io::Write,
    sync::Mutex,
    time::{SystemTime, UNIX_EPOCH},
};

use serde::Serialize;

use crate::form::field_model::NavigationSummary;

/// One appended line of the outcome journal.
#[derive(Debug, Serialize)]
pub struct OutcomeRecord {
    pub timestamp_ms: u128,
    /// Page or posting the session ran against.
    pub target: String,
    pub steps_completed: usize,
    pub total_filled: usize,
    pub skipped_prefilled: usize,
    pub reached_terminal: bool,
    pub submitted: bool,
    pub missing_labels: Vec<String>,
    pub error: Option<String>,
}

impl OutcomeRecord {
    pub fn new(target: &str, summary: &NavigationSummary) -> Self {
        OutcomeRecord {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0),
            target: target.to_string(),
            steps_completed: summary.steps_completed,
            total_filled: summary.total_filled,
            skipped_prefilled: summary.skipped_prefilled,
            reached_terminal: summary.reached_terminal,
            submitted: summary.submitted,
            missing_labels: summary.missing_labels.clone(),
            error: summary.error.clone(),
        }
    }
}

/// Persistence seam for session outcomes.
pub trait OutcomeSink {
    fn record(&self, record: &OutcomeRecord);
}

/// Appends one JSON line per session. Failures to open or write degrade to
/// warnings; outcome journaling never blocks a run.
pub struct JsonlOutcomeSink {
    file: Option<Mutex<std::fs::File>>,
}

impl JsonlOutcomeSink {
    pub fn new(path: &str) -> Self {
        let file = OpenOptions::new().create(true).append(true).open(path);
        match file {
            Ok(f) => JsonlOutcomeSink {
                file: Some(Mutex::new(f)),
            },
            Err(e) => {
                tracing::warn!(path, error = %e, "could not open outcome journal, journaling disabled");
                JsonlOutcomeSink { file: None }
            }
        }
    }
}

impl OutcomeSink for JsonlOutcomeSink {
    fn record(&self, record: &OutcomeRecord) {
        let Some(file_mutex) = &self.file else {
            return;
        };
        let json = match serde_json::to_string(record) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize outcome record");
                return;
            }
        };
        let mut file = match file_mutex.lock() {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(error = %e, "outcome journal lock poisoned");
                return;
            }
        };
        if let Err(e) = writeln!(file, "{}", json) {
            tracing::warn!(error = %e, "failed to write outcome record");
        }
    }
}

/// Sink that drops everything, for callers that opt out of journaling.
pub struct NullOutcomeSink;

impl OutcomeSink for NullOutcomeSink {
    fn record(&self, _record: &OutcomeRecord) {}
}

/// Format a session summary for terminal output.
///
/// Produces output like:
/// ```text
/// === Form session: https://example.com/jobs/123 ===
/// steps completed : 4
/// fields filled   : 9
/// reached review  : yes
/// submitted       : no (dry run)
/// missing:
///   - Years of experience
/// ```
pub fn format_console_summary(target: &str, summary: &NavigationSummary, dry_run: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== Form session: {} ===\n", target));
    out.push_str(&format!("steps completed : {}\n", summary.steps_completed));
    out.push_str(&format!("fields filled   : {}\n", summary.total_filled));
    out.push_str(&format!(
        "reached review  : {}\n",
        if summary.reached_terminal { "yes" } else { "no" }
    ));
    let submitted = match (summary.submitted, dry_run) {
        (true, _) => "yes".to_string(),
        (false, true) => "no (dry run)".to_string(),
        (false, false) => "no".to_string(),
    };
    out.push_str(&format!("submitted       : {}\n", submitted));
    if let Some(error) = &summary.error {
        out.push_str(&format!("error           : {}\n", error));
    }
    if !summary.missing_labels.is_empty() {
        out.push_str("missing:\n");
        for label in &summary.missing_labels {
            out.push_str(&format!("  - {}\n", label));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_summary_lists_missing_fields() {
        let summary = NavigationSummary {
            steps_completed: 3,
            total_filled: 7,
            skipped_prefilled: 0,
            reached_terminal: true,
            submitted: false,
            missing_labels: vec!["Years of experience".to_string()],
            error: None,
        };
        let text = format_console_summary("job-123", &summary, true);
        assert!(text.contains("steps completed : 3"));
        assert!(text.contains("no (dry run)"));
        assert!(text.contains("- Years of experience"));
    }
}
