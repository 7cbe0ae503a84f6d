use serde::Serialize;

use crate::browser::dom::Query;

/// One option of a native or custom dropdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectOption {
    pub value: Option<String>,
    pub text: String,
}

/// One sibling of a radio group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadioOption {
    /// DOM id of the radio input, used to reach its `label[for]`.
    pub id: String,
    pub value: String,
    pub label: String,
}

/// Control kind, carrying only the metadata that kind needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldCategory {
    TextInput,
    TextArea,
    Dropdown { options: Vec<SelectOption> },
    /// `group` is the radio-group identifier: the control's `name` attribute
    /// when present, else its id with a trailing `-<n>` suffix stripped.
    /// Controls sharing a group are mutually exclusive.
    Radio {
        group: String,
        options: Vec<RadioOption>,
    },
    Checkbox,
    FileUpload { accepted_types: Option<String> },
}

impl FieldCategory {
    pub fn name(&self) -> &'static str {
        match self {
            FieldCategory::TextInput => "text_input",
            FieldCategory::TextArea => "text_area",
            FieldCategory::Dropdown { .. } => "dropdown",
            FieldCategory::Radio { .. } => "radio",
            FieldCategory::Checkbox => "checkbox",
            FieldCategory::FileUpload { .. } => "file_upload",
        }
    }
}

/// Normalized representation of one form control within one step snapshot.
///
/// Descriptors are created fresh each time a step is scanned and discarded
/// once navigation advances; the DOM may re-render, so no cross-step identity
/// is guaranteed. `id` is unique within the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    pub id: String,
    pub category: FieldCategory,
    pub label: String,
    pub required: bool,
    /// Re-acquisition query back to the live control.
    pub locator: Query,
}

impl FieldDescriptor {
    pub fn radio_group(&self) -> Option<&str> {
        match &self.category {
            FieldCategory::Radio { group, .. } => Some(group.as_str()),
            _ => None,
        }
    }
}

/// Accumulated result of one fill pass over one step.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StepFillResult {
    pub filled: usize,
    pub required: usize,
    pub missing_labels: Vec<String>,
    pub skipped_prefilled: usize,
}

impl StepFillResult {
    pub fn record_missing(&mut self, label: &str) {
        self.missing_labels.push(label.to_string());
    }
}

/// Final outcome of one form session, handed to the persistence collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NavigationSummary {
    pub steps_completed: usize,
    pub total_filled: usize,
    pub skipped_prefilled: usize,
    pub reached_terminal: bool,
    pub submitted: bool,
    pub missing_labels: Vec<String>,
    pub error: Option<String>,
}
