mod common;

use form_pilot::browser::mock::{MockPage, NodeSpec};
use form_pilot::form::classifier::{classify_step, derive_radio_group};
use form_pilot::form::field_model::FieldCategory;

use common::{labeled_text_input, native_select, step, yes_no_radio};

// ============================================================================
// Control categorization
// ============================================================================

#[test]
fn classifies_a_mixed_step() {
    let page = MockPage::new(vec![step()
        .child(labeled_text_input("first-name", "First name"))
        .child(
            NodeSpec::new("div")
                .child(NodeSpec::new("label").attr("for", "cover").text("Cover letter"))
                .child(NodeSpec::new("textarea").attr("id", "cover")),
        )
        .child(native_select(
            "experience",
            "Years of experience",
            &[("1", "1 year"), ("2", "2 years")],
        ))
        .child(yes_no_radio("work-auth", "Are you authorized to work?"))
        .child(
            NodeSpec::new("input")
                .attr("id", "follow")
                .attr("type", "checkbox")
                .attr("aria-label", "Follow company"),
        )
        .child(
            NodeSpec::new("input")
                .attr("id", "resume")
                .attr("type", "file")
                .attr("accept", ".pdf,.docx"),
        )]);

    let dialog = page.dialog().unwrap();
    let fields = classify_step(dialog.as_ref());

    // One descriptor per control, radios one per input.
    assert_eq!(fields.len(), 7);

    assert_eq!(fields[0].id, "first-name");
    assert_eq!(fields[0].label, "First name");
    assert!(matches!(fields[0].category, FieldCategory::TextInput));

    assert!(matches!(fields[1].category, FieldCategory::TextArea));
    assert_eq!(fields[1].label, "Cover letter");

    match &fields[2].category {
        FieldCategory::Dropdown { options } => {
            assert_eq!(options.len(), 3);
            assert_eq!(options[0].text, "Select an option");
            assert_eq!(options[1].text, "1 year");
            assert_eq!(options[2].value.as_deref(), Some("2"));
        }
        other => panic!("expected dropdown, got {:?}", other),
    }

    match &fields[3].category {
        FieldCategory::Radio { group, options } => {
            assert_eq!(group, "work-auth");
            assert_eq!(options.len(), 2);
            assert_eq!(options[0].value, "yes");
            assert_eq!(options[0].label, "Are you authorized to work? Yes");
            assert_eq!(options[1].label, "No");
        }
        other => panic!("expected radio, got {:?}", other),
    }

    assert!(matches!(fields[5].category, FieldCategory::Checkbox));
    assert_eq!(fields[5].label, "Follow company");

    match &fields[6].category {
        FieldCategory::FileUpload { accepted_types } => {
            assert_eq!(accepted_types.as_deref(), Some(".pdf,.docx"));
        }
        other => panic!("expected file upload, got {:?}", other),
    }
}

#[test]
fn skips_buttons_and_hidden_inputs() {
    let page = MockPage::new(vec![step()
        .child(NodeSpec::new("input").attr("type", "hidden").attr("id", "csrf"))
        .child(NodeSpec::new("input").attr("type", "submit").attr("id", "go"))
        .child(labeled_text_input("email", "Email address"))]);

    let dialog = page.dialog().unwrap();
    let fields = classify_step(dialog.as_ref());

    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].id, "email");
}

#[test]
fn required_detected_from_attribute_and_aria() {
    let page = MockPage::new(vec![step()
        .child(
            NodeSpec::new("input")
                .attr("id", "a")
                .attr("type", "text")
                .attr("required", ""),
        )
        .child(
            NodeSpec::new("input")
                .attr("id", "b")
                .attr("type", "text")
                .attr("aria-required", "true"),
        )
        .child(NodeSpec::new("input").attr("id", "c").attr("type", "text"))]);

    let dialog = page.dialog().unwrap();
    let fields = classify_step(dialog.as_ref());

    assert!(fields[0].required);
    assert!(fields[1].required);
    assert!(!fields[2].required);
}

// ============================================================================
// Labels and ids
// ============================================================================

#[test]
fn label_falls_back_through_aria_and_placeholder() {
    let page = MockPage::new(vec![step()
        .child(
            NodeSpec::new("input")
                .attr("id", "aria-only")
                .attr("type", "text")
                .attr("aria-label", "Phone number"),
        )
        .child(
            NodeSpec::new("input")
                .attr("id", "ph-only")
                .attr("type", "text")
                .attr("placeholder", "City of residence"),
        )
        .child(NodeSpec::new("input").attr("type", "text").attr("name", "salary"))]);

    let dialog = page.dialog().unwrap();
    let fields = classify_step(dialog.as_ref());

    assert_eq!(fields[0].label, "Phone number");
    assert_eq!(fields[1].label, "City of residence");
    assert_eq!(fields[2].label, "salary");
    assert_eq!(fields[2].id, "salary");
}

#[test]
fn duplicate_dom_ids_are_disambiguated() {
    let page = MockPage::new(vec![step()
        .child(NodeSpec::new("input").attr("id", "q1").attr("type", "text"))
        .child(NodeSpec::new("input").attr("id", "q1").attr("type", "text"))]);

    let dialog = page.dialog().unwrap();
    let fields = classify_step(dialog.as_ref());

    assert_eq!(fields[0].id, "q1");
    assert_eq!(fields[1].id, "q1_2");
}

#[test]
fn radio_group_derived_from_name_or_id_suffix() {
    assert_eq!(derive_radio_group("visa", "visa-0"), "visa");
    assert_eq!(derive_radio_group("", "sponsorship-2"), "sponsorship");
    assert_eq!(derive_radio_group("", "plain"), "plain");
}
