use thiserror::Error;

/// Errors surfaced by the form engine and the browser bridge.
///
/// Field-level problems (a vanished handle, an unmatched dropdown option) are
/// accumulated into `StepFillResult::missing_labels` and never abort a step;
/// only the step-level variants below end a session.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Node.js bridge process failed to spawn.
    #[error("failed to spawn {script} (is Node.js installed?): {source}")]
    SubprocessSpawn {
        script: String,
        source: std::io::Error,
    },

    /// I/O against the bridge process broke down.
    #[error("bridge session I/O error: {0}")]
    SessionIo(String),

    /// Bridge returned a failure for a command.
    #[error("bridge command '{command}' failed: {error}")]
    SessionProtocol { command: String, error: String },

    /// JSON from or to the bridge could not be (de)serialized.
    #[error("JSON error ({context}): {source}")]
    Json {
        context: String,
        source: serde_json::Error,
    },

    /// A config, profile, or answers file could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),

    /// A classified field's handle vanished before it could be filled.
    #[error("element '{element}' not found: {context}")]
    ElementNotFound { element: String, context: String },

    /// The final submit click (or its precondition) failed.
    #[error("submission failed: {0}")]
    SubmissionFailed(String),
}

impl EngineError {
    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        EngineError::Json {
            context: context.into(),
            source,
        }
    }
}
