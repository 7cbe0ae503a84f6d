use std::collections::HashSet;

use crate::answers::location::parse_location;
use crate::answers::resolver::{self, ResolvedAnswer};
use crate::answers::source::{AnswerSource, AnswerValue};
use crate::browser::dom::{ClickOptions, DomElement, DomPage, Query};
use crate::error::EngineError;
use crate::fill::typeahead;
use crate::form::field_model::{FieldCategory, FieldDescriptor, SelectOption, StepFillResult};

/// Dropdown option texts that mean "nothing chosen yet".
const PLACEHOLDER_OPTIONS: &[&str] = &[
    "select an option",
    "please select",
    "choose an option",
    "select",
    "choose",
    "--",
    "---",
];

/// Pause after opening a custom dropdown, before looking for its options.
const OPEN_SETTLE_MS: u64 = 400;
/// Pause after a click that mutates the form.
const CLICK_SETTLE_MS: u64 = 200;

pub fn is_placeholder_option(text: &str) -> bool {
    let lower = text.trim().to_lowercase();
    lower.is_empty() || PLACEHOLDER_OPTIONS.contains(&lower.as_str())
}

/// Fills one classified step. Field-level failures are downgraded to
/// `missing_labels` entries; only a broken page connection escapes as an
/// error from the caller's side.
pub struct StepFiller<'a> {
    page: &'a dyn DomPage,
    source: &'a AnswerSource,
}

impl<'a> StepFiller<'a> {
    pub fn new(page: &'a dyn DomPage, source: &'a AnswerSource) -> Self {
        StepFiller { page, source }
    }

    /// One pass over the step's descriptors. Radio groups are filled at most
    /// once per pass; re-running the pass on an unchanged step fills nothing
    /// new.
    pub fn fill_step(&self, scope: &dyn DomElement, fields: &[FieldDescriptor]) -> StepFillResult {
        let mut result = StepFillResult::default();
        let mut filled_groups: HashSet<String> = HashSet::new();

        for field in fields {
            if field.required {
                result.required += 1;
            }
            if let Some(group) = field.radio_group() {
                if filled_groups.contains(group) {
                    continue;
                }
            }

            let control = match self.acquire(scope, field) {
                Some(control) => control,
                None => {
                    tracing::debug!(field = %field.id, "control vanished before fill");
                    if field.required {
                        result.record_missing(&field.label);
                    }
                    continue;
                }
            };

            let resolved = resolver::resolve(field, self.source);
            tracing::debug!(
                field = %field.id,
                label = %field.label,
                category = field.category.name(),
                required = field.required,
                answered = resolved.is_some(),
                "filling field"
            );

            // Prefill policy: an existing value stands unless a resolved
            // answer disagrees with it.
            if let Some(current) = current_value(scope, control.as_ref(), field) {
                let keep = match &resolved {
                    None => true,
                    Some(answer) => value_matches(&current, answer, &field.category),
                };
                if keep {
                    result.skipped_prefilled += 1;
                    if let Some(group) = field.radio_group() {
                        filled_groups.insert(group.to_string());
                    }
                    continue;
                }
                tracing::debug!(field = %field.id, %current, "overwriting prefilled value");
            }

            let outcome = self.fill_field(scope, control.as_ref(), field, resolved.as_ref());
            match outcome {
                Ok(true) => {
                    result.filled += 1;
                    if let Some(group) = field.radio_group() {
                        filled_groups.insert(group.to_string());
                    }
                }
                Ok(false) => {
                    if field.required {
                        result.record_missing(&field.label);
                    }
                }
                Err(e) => {
                    tracing::debug!(field = %field.id, error = %e, "fill attempt failed");
                    if field.required {
                        result.record_missing(&field.label);
                    }
                }
            }
        }

        result
    }

    fn acquire(
        &self,
        scope: &dyn DomElement,
        field: &FieldDescriptor,
    ) -> Option<Box<dyn DomElement>> {
        scope
            .locate(&field.locator)
            .ok()
            .and_then(|mut found| (!found.is_empty()).then(|| found.remove(0)))
    }

    /// Dispatch to the category's protocol. `Ok(true)` means the field now
    /// holds a value.
    fn fill_field(
        &self,
        scope: &dyn DomElement,
        control: &dyn DomElement,
        field: &FieldDescriptor,
        resolved: Option<&ResolvedAnswer>,
    ) -> Result<bool, EngineError> {
        match &field.category {
            FieldCategory::TextInput | FieldCategory::TextArea => {
                let Some(answer) = resolved else {
                    return Ok(false);
                };
                let text = answer.value.as_text();
                if is_typeahead(control, field) {
                    let target = parse_location(&text);
                    return typeahead::fill_typeahead(self.page, scope, control, &target);
                }
                control.fill(&text)?;
                Ok(true)
            }
            FieldCategory::Dropdown { options } => {
                self.fill_dropdown(control, field, options, resolved)
            }
            FieldCategory::Radio { options, .. } => {
                let Some(answer) = resolved else {
                    return Ok(false);
                };
                let target = answer.value.as_text().to_lowercase();
                for option in options {
                    if !option.label.to_lowercase().contains(&target) {
                        continue;
                    }
                    // Clicking the label dodges overlays that intercept
                    // pointer events on the input itself.
                    if !option.id.is_empty() {
                        if let Ok(labels) = scope.locate(&Query::label_for(&option.id)) {
                            if let Some(label) = labels.first() {
                                if label.click(ClickOptions::plain()).is_ok() {
                                    return Ok(true);
                                }
                            }
                        }
                        if let Ok(inputs) = scope.locate(&Query::id(&option.id)) {
                            if let Some(input) = inputs.first() {
                                input.click(ClickOptions::forced())?;
                                return Ok(true);
                            }
                        }
                    }
                }
                Ok(false)
            }
            FieldCategory::Checkbox => {
                let Some(answer) = resolved else {
                    return Ok(false);
                };
                control.set_checked(answer.value.as_flag())?;
                Ok(true)
            }
            FieldCategory::FileUpload { .. } => {
                // Uploads are never populated; the host site carries the
                // document from the account profile. A required upload still
                // surfaces as missing.
                tracing::debug!(field = %field.id, "skipping file upload field");
                Ok(false)
            }
        }
    }

    /// Dropdown chain: native select by label, native by value, custom
    /// open-and-click, then first non-placeholder option when required.
    fn fill_dropdown(
        &self,
        control: &dyn DomElement,
        field: &FieldDescriptor,
        options: &[SelectOption],
        resolved: Option<&ResolvedAnswer>,
    ) -> Result<bool, EngineError> {
        if let Some(answer) = resolved {
            let wanted = answer.value.as_text();
            if control.select_by_label(&wanted).is_ok() {
                return Ok(true);
            }
            if control.select_by_value(&wanted).is_ok() {
                return Ok(true);
            }
            if self.fill_custom_dropdown(control, &wanted)? {
                return Ok(true);
            }
        }

        if field.required {
            // Last resort keeps validation quiet without inventing data
            // beyond the first real choice.
            for option in options {
                if is_placeholder_option(&option.text) {
                    continue;
                }
                if let Some(value) = &option.value {
                    if control.select_by_value(value).is_ok() {
                        tracing::debug!(field = %field.id, option = %option.text, "dropdown fallback choice");
                        return Ok(true);
                    }
                }
            }
        }
        Ok(false)
    }

    /// Custom (non-`<select>`) dropdowns: click to open, find the option
    /// anywhere on the page (overlays render outside the dialog), click it.
    /// Escape closes the menu when no option matched.
    fn fill_custom_dropdown(
        &self,
        control: &dyn DomElement,
        wanted: &str,
    ) -> Result<bool, EngineError> {
        if control.click(ClickOptions::plain()).is_err() {
            return Ok(false);
        }
        self.page.settle(OPEN_SETTLE_MS)?;

        let queries = [
            Query::tag("option").with_text(wanted),
            Query::role("option").with_text(wanted),
            Query::tag("li").with_text(wanted),
        ];
        for query in &queries {
            let found = match self.page.locate(query) {
                Ok(found) => found,
                Err(_) => continue,
            };
            for option in &found {
                if option.is_visible().unwrap_or(false) {
                    option.click(ClickOptions::plain())?;
                    self.page.settle(CLICK_SETTLE_MS)?;
                    return Ok(true);
                }
            }
        }

        self.page.press_key("Escape")?;
        Ok(false)
    }
}

/// Whether a text control drives a suggestion list rather than taking free
/// text. Only location-flavored fields get the typeahead protocol.
fn is_typeahead(control: &dyn DomElement, field: &FieldDescriptor) -> bool {
    let hay = format!("{} {}", field.label, field.id).to_lowercase();
    // "relocation" questions are yes/no, not geography.
    if hay.contains("relocat") {
        return false;
    }
    if !hay.contains("location") && !hay.contains("city") {
        return false;
    }
    let role = control.attr("role").ok().flatten().unwrap_or_default();
    let autocomplete = control.attr("aria-autocomplete").ok().flatten();
    role == "combobox" || autocomplete.is_some()
}

/// Read the field's current value, `None` meaning empty/unselected.
fn current_value(
    scope: &dyn DomElement,
    control: &dyn DomElement,
    field: &FieldDescriptor,
) -> Option<String> {
    match &field.category {
        FieldCategory::TextInput | FieldCategory::TextArea => {
            let value = control.input_value().ok()?;
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        FieldCategory::Dropdown { options } => {
            let value = control.input_value().ok()?;
            let selected = options
                .iter()
                .find(|o| o.value.as_deref() == Some(value.as_str()))
                .map(|o| o.text.clone())
                .unwrap_or(value);
            (!is_placeholder_option(&selected)).then_some(selected)
        }
        FieldCategory::Radio { options, .. } => {
            // Prefilled when any sibling in the group is already checked.
            for option in options {
                if option.id.is_empty() {
                    continue;
                }
                let found = scope.locate(&Query::id(&option.id)).ok()?;
                if let Some(input) = found.first() {
                    if input.is_checked().unwrap_or(false) {
                        return Some(option.label.clone());
                    }
                }
            }
            None
        }
        FieldCategory::Checkbox => control
            .is_checked()
            .unwrap_or(false)
            .then(|| "checked".to_string()),
        FieldCategory::FileUpload { .. } => None,
    }
}

/// A prefilled value matches a resolved answer when they agree after trimming
/// and case folding; for flags, when the checked state agrees. A checked
/// radio's current value is its option label, so the answer only has to
/// appear within it.
fn value_matches(current: &str, answer: &ResolvedAnswer, category: &FieldCategory) -> bool {
    match &answer.value {
        AnswerValue::Flag(wanted) => (current == "checked") == *wanted,
        AnswerValue::Text(wanted) => {
            if matches!(category, FieldCategory::Radio { .. }) {
                return current.to_lowercase().contains(&wanted.trim().to_lowercase());
            }
            current.trim().eq_ignore_ascii_case(wanted.trim())
        }
    }
}
