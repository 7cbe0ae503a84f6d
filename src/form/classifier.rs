use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::browser::dom::{DomElement, Query};
use crate::form::field_model::{FieldCategory, FieldDescriptor, RadioOption, SelectOption};

/// Bounds keeping a pathological page from stalling a scan.
const MAX_CONTROLS: usize = 100;
const MAX_OPTIONS: usize = 30;
const MAX_RADIO_OPTIONS: usize = 10;

/// Scan the current step's container and produce one descriptor per fillable
/// control. Pure read of the live DOM; a control that cannot be read is
/// skipped, never fatal.
pub fn classify_step(scope: &dyn DomElement) -> Vec<FieldDescriptor> {
    let controls = match scope.locate(&Query::controls()) {
        Ok(controls) => controls,
        Err(e) => {
            tracing::warn!(error = %e, "control enumeration failed");
            return Vec::new();
        }
    };

    let mut descriptors: Vec<FieldDescriptor> = Vec::new();
    let mut seen_ids: HashSet<String> = HashSet::new();

    for (index, control) in controls.iter().take(MAX_CONTROLS).enumerate() {
        let descriptor = match classify_control(scope, control.as_ref(), index) {
            Ok(Some(descriptor)) => descriptor,
            Ok(None) => continue,
            Err(e) => {
                tracing::debug!(index, error = %e, "skipping unreadable control");
                continue;
            }
        };

        // Ids must be unique within one snapshot; the DOM makes no promises.
        let mut unique = descriptor;
        if !seen_ids.insert(unique.id.clone()) {
            let mut n = 2;
            while !seen_ids.insert(format!("{}_{}", unique.id, n)) {
                n += 1;
            }
            unique.id = format!("{}_{}", unique.id, n);
        }
        descriptors.push(unique);
    }

    descriptors
}

fn classify_control(
    scope: &dyn DomElement,
    control: &dyn DomElement,
    index: usize,
) -> Result<Option<FieldDescriptor>, crate::error::EngineError> {
    let tag = control.tag()?.to_lowercase();
    let input_type = control
        .attr("type")?
        .map(|t| t.to_lowercase())
        .unwrap_or_else(|| if tag == "select" { "select".into() } else { "text".into() });

    // Buttons and hidden inputs are not answerable fields.
    if matches!(
        input_type.as_str(),
        "submit" | "button" | "reset" | "image" | "hidden"
    ) {
        return Ok(None);
    }

    let el_id = control.attr("id")?.unwrap_or_default();
    let name = control.attr("name")?.unwrap_or_default();
    let aria_label = control.attr("aria-label")?.unwrap_or_default();
    let placeholder = control.attr("placeholder")?.unwrap_or_default();
    let required = control.attr("required")?.is_some()
        || control.attr("aria-required")?.as_deref() == Some("true");

    let label = resolve_label(
        scope, control, &el_id, &aria_label, &placeholder, &name, index,
    );

    let category = if tag == "select" {
        FieldCategory::Dropdown {
            options: collect_options(control),
        }
    } else if tag == "textarea" {
        FieldCategory::TextArea
    } else {
        match input_type.as_str() {
            "checkbox" => FieldCategory::Checkbox,
            "radio" => {
                let group = derive_radio_group(&name, &el_id);
                FieldCategory::Radio {
                    options: collect_radio_options(scope, &name, &group),
                    group,
                }
            }
            "file" => FieldCategory::FileUpload {
                accepted_types: control.attr("accept")?,
            },
            _ => FieldCategory::TextInput,
        }
    };

    let id = if !el_id.is_empty() {
        el_id.clone()
    } else if !name.is_empty() {
        name.clone()
    } else {
        format!("field_{}", index)
    };

    Ok(Some(FieldDescriptor {
        id,
        category,
        label,
        required,
        locator: build_locator(&tag, &input_type, &el_id, &name, &aria_label),
    }))
}

/// Label priority chain: explicit `label[for=id]`, nearest ancestor label,
/// then ARIA label / placeholder / name / id, finally a generated fallback.
fn resolve_label(
    scope: &dyn DomElement,
    control: &dyn DomElement,
    el_id: &str,
    aria_label: &str,
    placeholder: &str,
    name: &str,
    index: usize,
) -> String {
    if !el_id.is_empty() {
        if let Ok(labels) = scope.locate(&Query::label_for(el_id)) {
            if let Some(label) = labels.first() {
                if let Ok(text) = label.inner_text() {
                    let text = text.trim();
                    if !text.is_empty() {
                        return text.to_string();
                    }
                }
            }
        }
    }

    if let Ok(Some(ancestor)) = control.closest(&Query::tag("label")) {
        if let Ok(text) = ancestor.inner_text() {
            let text = text.trim();
            if !text.is_empty() {
                return text.to_string();
            }
        }
    }

    for candidate in [aria_label, placeholder, name, el_id] {
        let candidate = candidate.trim();
        if !candidate.is_empty() {
            return candidate.to_string();
        }
    }

    format!("field_{}", index)
}

/// Radio group id: the `name` attribute when present, else the control id
/// with a trailing `-<n>` suffix stripped (grouped-id convention). This id is
/// load-bearing for group exclusivity.
pub fn derive_radio_group(name: &str, el_id: &str) -> String {
    if !name.is_empty() {
        return name.to_string();
    }
    static SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(.+)-\d+$").unwrap());
    match SUFFIX_RE.captures(el_id) {
        Some(caps) => caps[1].to_string(),
        None => el_id.to_string(),
    }
}

fn collect_options(control: &dyn DomElement) -> Vec<SelectOption> {
    let mut options = Vec::new();
    if let Ok(nodes) = control.locate(&Query::tag("option")) {
        for node in nodes.iter().take(MAX_OPTIONS) {
            let text = match node.inner_text() {
                Ok(text) => text.trim().to_string(),
                Err(_) => continue,
            };
            let value = node.attr("value").ok().flatten();
            options.push(SelectOption { value, text });
        }
    }
    options
}

/// Sibling options of a radio group, resolved through each input's label.
fn collect_radio_options(scope: &dyn DomElement, name: &str, group: &str) -> Vec<RadioOption> {
    let query = if !name.is_empty() {
        Query::input("radio").with_name(name)
    } else {
        Query::input("radio")
    };

    let mut options = Vec::new();
    if let Ok(radios) = scope.locate(&query) {
        for radio in radios.iter().take(MAX_RADIO_OPTIONS) {
            let rid = radio.attr("id").ok().flatten().unwrap_or_default();
            if name.is_empty() && derive_radio_group("", &rid) != group {
                continue;
            }
            let value = radio.attr("value").ok().flatten().unwrap_or_default();
            let mut label = String::new();
            if !rid.is_empty() {
                if let Ok(labels) = scope.locate(&Query::label_for(&rid)) {
                    if let Some(node) = labels.first() {
                        if let Ok(text) = node.inner_text() {
                            label = text.trim().to_string();
                        }
                    }
                }
            }
            options.push(RadioOption {
                id: rid,
                value,
                label,
            });
        }
    }
    options
}

/// Best-effort stable query for re-acquiring the control after the DOM
/// re-renders: id, then name, then aria-label, then tag alone.
fn build_locator(
    tag: &str,
    input_type: &str,
    el_id: &str,
    name: &str,
    aria_label: &str,
) -> Query {
    if !el_id.is_empty() {
        return Query::id(el_id);
    }
    if !name.is_empty() {
        return Query::tag(tag).with_name(name);
    }
    let mut query = Query::tag(tag);
    if tag == "input" {
        query.input_type = Some(input_type.to_string());
    }
    if !aria_label.is_empty() {
        query = query.with_aria_label(aria_label);
    }
    query
}
