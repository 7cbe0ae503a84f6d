use std::path::Path;

use form_pilot::answers::source::{load_answer_source, normalize_key, AnswerSource, AnswerValue};

// ============================================================================
// YAML shape
// ============================================================================

#[test]
fn answer_file_parses_profile_and_answers() {
    let yaml = r#"
profile:
  first_name: Jordan
  last_name: Reyes
  email: jordan@example.com
  location: "Austin, TX"
answers:
  "Years of experience": 5
  "Willing to relocate": true
  "Notice period": "Two weeks"
  salary: 95000.5
"#;
    let source: AnswerSource = serde_yaml::from_str(yaml).unwrap();

    assert_eq!(source.profile.first_name.as_deref(), Some("Jordan"));
    assert_eq!(source.profile.email.as_deref(), Some("jordan@example.com"));

    // Numbers coerce to text, booleans stay flags.
    assert_eq!(
        source.answers.get("Years of experience"),
        Some(&AnswerValue::text("5"))
    );
    assert_eq!(
        source.answers.get("Willing to relocate"),
        Some(&AnswerValue::Flag(true))
    );
    assert_eq!(source.answers.get("salary"), Some(&AnswerValue::text("95000.5")));
}

#[test]
fn answer_map_preserves_document_order() {
    let yaml = r#"
answers:
  zebra: "1"
  apple: "2"
  mango: "3"
"#;
    let source: AnswerSource = serde_yaml::from_str(yaml).unwrap();
    let keys: Vec<&String> = source.answers.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, ["zebra", "apple", "mango"]);
}

#[test]
fn sections_are_optional() {
    let source: AnswerSource = serde_yaml::from_str("answers:\n  q1: yes\n").unwrap();
    assert_eq!(source.profile.email, None);
    assert_eq!(source.answers.len(), 1);

    let empty: AnswerSource = serde_yaml::from_str("{}").unwrap();
    assert!(empty.answers.is_empty());
}

#[test]
fn missing_answer_file_is_a_config_error() {
    let result = load_answer_source(Path::new("/nonexistent/answers.yaml"));
    let error = result.unwrap_err().to_string();
    assert!(error.contains("/nonexistent/answers.yaml"), "{error}");
}

// ============================================================================
// Value semantics
// ============================================================================

#[test]
fn flag_interpretation_of_text_values() {
    assert!(AnswerValue::text("yes").as_flag());
    assert!(AnswerValue::text("checked").as_flag());
    assert!(!AnswerValue::text("no").as_flag());
    assert!(!AnswerValue::text("No").as_flag());
    assert!(!AnswerValue::text("0").as_flag());
    assert!(!AnswerValue::text("").as_flag());
    assert!(!AnswerValue::Flag(false).as_flag());
}

#[test]
fn normalization_strips_everything_but_alphanumerics() {
    assert_eq!(normalize_key("Years of experience?"), "yearsofexperience");
    assert_eq!(normalize_key("  E-mail (work) "), "emailwork");
    assert_eq!(normalize_key("***"), "");
}
