use serde::Serialize;

use crate::answers::source::{normalize_key, AnswerSource, AnswerValue};
use crate::form::field_model::{FieldCategory, FieldDescriptor};

/// Which strategy produced an answer. Recorded in outcome logs so a reviewer
/// can tell a curated answer from a guessed default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOrigin {
    ExactKey,
    FuzzyLabel,
    ProfileField,
    CategoryDefault,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedAnswer {
    pub value: AnswerValue,
    pub origin: AnswerOrigin,
}

impl ResolvedAnswer {
    fn new(value: AnswerValue, origin: AnswerOrigin) -> Self {
        ResolvedAnswer { value, origin }
    }
}

const WORK_AUTH_KEYWORDS: &[&str] = &[
    "authorized",
    "work authorization",
    "legally authorized",
    "eligible to work",
];

const SPONSORSHIP_KEYWORDS: &[&str] = &[
    "sponsorship",
    "require sponsorship",
    "visa sponsorship",
    "need sponsorship",
];

const COUNTRY_CODE_KEYWORDS: &[&str] = &["phone country code", "country code"];

/// Resolve an answer for one classified field.
///
/// Strategies run in a fixed order and the first hit wins: exact key lookup
/// over the field's identifying strings, fuzzy substring match of answer keys
/// against the normalized label, profile field keywords, and finally
/// per-category defaults. Pure: no DOM access, no mutation.
pub fn resolve(field: &FieldDescriptor, source: &AnswerSource) -> Option<ResolvedAnswer> {
    if let Some(value) = exact_key(field, source) {
        return Some(ResolvedAnswer::new(value, AnswerOrigin::ExactKey));
    }
    if let Some(value) = fuzzy_label(field, source) {
        return Some(ResolvedAnswer::new(value, AnswerOrigin::FuzzyLabel));
    }
    if let Some(value) = profile_field(field, source) {
        return Some(ResolvedAnswer::new(value, AnswerOrigin::ProfileField));
    }
    if let Some(value) = category_default(field) {
        return Some(ResolvedAnswer::new(value, AnswerOrigin::CategoryDefault));
    }
    None
}

/// Exact lookup over the field's identifying strings: id, control type, tag,
/// label, and locator name, raw first and then in normalized-key space. The
/// type and tag candidates let one answer key cover every control of a kind.
fn exact_key(field: &FieldDescriptor, source: &AnswerSource) -> Option<AnswerValue> {
    let mut candidates: Vec<&str> = vec![
        &field.id,
        control_type(field),
        control_tag(field),
        &field.label,
    ];
    if let Some(name) = field.locator.name.as_deref() {
        candidates.push(name);
    }
    for key in candidates {
        if key.is_empty() {
            continue;
        }
        if let Some(v) = source.answers.get(key) {
            return Some(v.clone());
        }
        if let Some(v) = source.answers.get_normalized(&normalize_key(key)) {
            return Some(v.clone());
        }
    }
    None
}

/// Raw control type as an answer-key candidate, the locator's `type` when it
/// carries one.
fn control_type(field: &FieldDescriptor) -> &str {
    if let Some(t) = field.locator.input_type.as_deref() {
        return t;
    }
    match &field.category {
        FieldCategory::TextInput => "text",
        FieldCategory::TextArea => "textarea",
        FieldCategory::Dropdown { .. } => "select",
        FieldCategory::Radio { .. } => "radio",
        FieldCategory::Checkbox => "checkbox",
        FieldCategory::FileUpload { .. } => "file",
    }
}

fn control_tag(field: &FieldDescriptor) -> &'static str {
    match &field.category {
        FieldCategory::TextArea => "textarea",
        FieldCategory::Dropdown { .. } => "select",
        _ => "input",
    }
}

/// First answer key (document order) whose normalized form is a substring of
/// the normalized label. Keys that merely repeat the field id are skipped so
/// that machine-generated ids never match by accident.
fn fuzzy_label(field: &FieldDescriptor, source: &AnswerSource) -> Option<AnswerValue> {
    let norm_label = normalize_key(&field.label);
    if norm_label.is_empty() {
        return None;
    }
    let norm_id = normalize_key(&field.id);
    for (key, value) in source.answers.iter() {
        let nk = normalize_key(key);
        if nk.len() < 2 || nk == norm_id {
            continue;
        }
        if norm_label.contains(&nk) {
            return Some(value.clone());
        }
    }
    None
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Map well-known label keywords onto profile fields. The checks are ordered
/// most specific first ("country code" before "phone", "first name" before
/// "name").
fn profile_field(field: &FieldDescriptor, source: &AnswerSource) -> Option<AnswerValue> {
    let profile = &source.profile;
    let lower = field.label.to_lowercase();
    let text = |opt: &Option<String>| opt.clone().map(AnswerValue::Text);

    match &field.category {
        FieldCategory::TextInput | FieldCategory::TextArea => {
            if contains_any(&lower, COUNTRY_CODE_KEYWORDS) {
                return text(&profile.phone_country);
            }
            if lower.contains("email") {
                return text(&profile.email);
            }
            if lower.contains("phone") || lower.contains("mobile") {
                return text(&profile.phone);
            }
            if lower.contains("first name") {
                return text(&profile.first_name);
            }
            if lower.contains("last name") || lower.contains("surname") {
                return text(&profile.last_name);
            }
            if lower.contains("full name") || lower == "name" {
                return text(&profile.full_name);
            }
            if lower.contains("linkedin") || lower.contains("profile url") {
                return text(&profile.linkedin_url);
            }
            if lower.contains("website") || lower.contains("portfolio") || lower.contains("url") {
                return text(&profile.website);
            }
            if lower.contains("location") || lower.contains("city") {
                return text(&profile.location);
            }
            None
        }
        FieldCategory::Dropdown { .. } => {
            if lower.contains("email") {
                return text(&profile.email);
            }
            if contains_any(&lower, COUNTRY_CODE_KEYWORDS) {
                return text(&profile.phone_country);
            }
            None
        }
        _ => None,
    }
}

/// Safe defaults for the questions every application form asks. Follow-company
/// checkboxes default to unchecked so a run never opts in silently.
fn category_default(field: &FieldDescriptor) -> Option<AnswerValue> {
    let lower = field.label.to_lowercase();
    match &field.category {
        FieldCategory::Radio { .. } | FieldCategory::Dropdown { .. } => {
            if contains_any(&lower, WORK_AUTH_KEYWORDS) {
                return Some(AnswerValue::text("yes"));
            }
            if contains_any(&lower, SPONSORSHIP_KEYWORDS) {
                return Some(AnswerValue::text("no"));
            }
            None
        }
        FieldCategory::Checkbox => {
            if lower.contains("follow") {
                return Some(AnswerValue::Flag(false));
            }
            None
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::source::{AnswerMap, ProfileRecord};
    use crate::browser::dom::Query;

    fn text_field(id: &str, label: &str) -> FieldDescriptor {
        FieldDescriptor {
            id: id.to_string(),
            category: FieldCategory::TextInput,
            label: label.to_string(),
            required: true,
            locator: Query::id(id),
        }
    }

    fn source_with(entries: &[(&str, &str)]) -> AnswerSource {
        let answers: AnswerMap = entries
            .iter()
            .map(|(k, v)| (k.to_string(), AnswerValue::text(v)))
            .collect();
        AnswerSource::new(ProfileRecord::default(), answers)
    }

    #[test]
    fn exact_key_wins_over_fuzzy() {
        let source = source_with(&[("experience", "2"), ("Years of experience", "5")]);
        let field = text_field("years", "Years of experience");
        let resolved = resolve(&field, &source).unwrap();
        assert_eq!(resolved.origin, AnswerOrigin::ExactKey);
        assert_eq!(resolved.value, AnswerValue::text("5"));
    }

    #[test]
    fn exact_key_matches_in_normalized_space() {
        let source = source_with(&[("Years Of Experience?", "3")]);
        let field = text_field("x1", "years of experience");
        let resolved = resolve(&field, &source).unwrap();
        assert_eq!(resolved.origin, AnswerOrigin::ExactKey);
    }

    #[test]
    fn fuzzy_takes_first_key_in_document_order() {
        let source = source_with(&[("python", "4"), ("experience", "9")]);
        let field = text_field("q7", "How many years of Python experience do you have?");
        let resolved = resolve(&field, &source).unwrap();
        assert_eq!(resolved.origin, AnswerOrigin::FuzzyLabel);
        assert_eq!(resolved.value, AnswerValue::text("4"));
    }

    #[test]
    fn key_equal_to_field_id_resolves_as_exact() {
        let source = source_with(&[("q7", "direct")]);
        let field = text_field("q7", "Unrelated question");
        let resolved = resolve(&field, &source).unwrap();
        assert_eq!(resolved.origin, AnswerOrigin::ExactKey);
        assert_eq!(resolved.value, AnswerValue::text("direct"));
    }

    #[test]
    fn fuzzy_pass_skips_keys_that_repeat_the_field_id() {
        // "Field 3" normalizes to the same string as the generated id, so the
        // fuzzy pass must pass it over and take the next matching key.
        let source = source_with(&[("Field 3", "stale"), ("option", "good")]);
        let field = text_field("field_3", "Which field 3 option applies?");
        assert_eq!(
            fuzzy_label(&field, &source),
            Some(AnswerValue::text("good"))
        );
    }

    #[test]
    fn control_type_and_tag_act_as_catch_all_keys() {
        let source = source_with(&[("select", "Remote")]);
        let mut field = text_field("d1", "Preferred work arrangement");
        field.category = FieldCategory::Dropdown {
            options: Vec::new(),
        };
        let resolved = resolve(&field, &source).unwrap();
        assert_eq!(resolved.origin, AnswerOrigin::ExactKey);
        assert_eq!(resolved.value, AnswerValue::text("Remote"));

        let source = source_with(&[("input", "42")]);
        let field = text_field("t1", "Favorite number");
        let resolved = resolve(&field, &source).unwrap();
        assert_eq!(resolved.origin, AnswerOrigin::ExactKey);
        assert_eq!(resolved.value, AnswerValue::text("42"));
    }

    #[test]
    fn profile_keywords_fill_contact_fields() {
        let mut source = source_with(&[]);
        source.profile.phone = Some("555-0100".to_string());
        let field = text_field("p", "Mobile phone number");
        let resolved = resolve(&field, &source).unwrap();
        assert_eq!(resolved.origin, AnswerOrigin::ProfileField);
        assert_eq!(resolved.value, AnswerValue::text("555-0100"));
    }

    #[test]
    fn work_auth_defaults_yes_sponsorship_no() {
        let source = source_with(&[]);
        let mut auth = text_field("a", "Are you legally authorized to work in the United States?");
        auth.category = FieldCategory::Radio {
            group: "a".to_string(),
            options: Vec::new(),
        };
        let resolved = resolve(&auth, &source).unwrap();
        assert_eq!(resolved.origin, AnswerOrigin::CategoryDefault);
        assert_eq!(resolved.value, AnswerValue::text("yes"));

        let mut visa = text_field("v", "Will you require visa sponsorship?");
        visa.category = FieldCategory::Radio {
            group: "v".to_string(),
            options: Vec::new(),
        };
        assert_eq!(
            resolve(&visa, &source).unwrap().value,
            AnswerValue::text("no")
        );
    }

    #[test]
    fn follow_checkbox_defaults_unchecked() {
        let source = source_with(&[]);
        let mut follow = text_field("f", "Follow Acme Corp to stay up to date");
        follow.category = FieldCategory::Checkbox;
        assert_eq!(
            resolve(&follow, &source).unwrap().value,
            AnswerValue::Flag(false)
        );
    }

    #[test]
    fn no_answer_for_unknown_field() {
        let source = source_with(&[("salary", "90000")]);
        let field = text_field("x", "Describe your ideal team");
        assert!(resolve(&field, &source).is_none());
    }
}
