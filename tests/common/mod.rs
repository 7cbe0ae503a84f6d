#![allow(dead_code)]

use form_pilot::answers::source::{AnswerMap, AnswerSource, AnswerValue, ProfileRecord};
use form_pilot::browser::mock::{Effect, NodeSpec};

/// Step container; its children become the dialog content for that step.
pub fn step() -> NodeSpec {
    NodeSpec::new("step")
}

/// Progress region announcing a bare percentage, the host's primary signal.
pub fn progress_region(percent: u32) -> NodeSpec {
    NodeSpec::new("div")
        .attr("role", "region")
        .attr("aria-label", &format!("Your application progress is {percent} percent"))
}

/// A labelled text input wrapped the way hosts group form elements.
pub fn labeled_text_input(id: &str, label: &str) -> NodeSpec {
    NodeSpec::new("div")
        .child(NodeSpec::new("label").attr("for", id).text(label))
        .child(NodeSpec::new("input").attr("id", id).attr("type", "text"))
}

pub fn required_text_input(id: &str, label: &str) -> NodeSpec {
    NodeSpec::new("div")
        .child(NodeSpec::new("label").attr("for", id).text(label))
        .child(
            NodeSpec::new("input")
                .attr("id", id)
                .attr("type", "text")
                .attr("required", ""),
        )
}

/// A yes/no radio group sharing one `name`, labels wired through `for`.
pub fn yes_no_radio(group: &str, legend: &str) -> NodeSpec {
    let yes_id = format!("{group}-0");
    let no_id = format!("{group}-1");
    NodeSpec::new("fieldset")
        .child(
            NodeSpec::new("label")
                .attr("for", &yes_id)
                .text(&format!("{legend} Yes")),
        )
        .child(
            NodeSpec::new("input")
                .attr("id", &yes_id)
                .attr("type", "radio")
                .attr("name", group)
                .attr("value", "yes")
                .attr("aria-label", legend),
        )
        .child(NodeSpec::new("label").attr("for", &no_id).text("No"))
        .child(
            NodeSpec::new("input")
                .attr("id", &no_id)
                .attr("type", "radio")
                .attr("name", group)
                .attr("value", "no"),
        )
}

/// Native select with a placeholder plus real options.
pub fn native_select(id: &str, label: &str, options: &[(&str, &str)]) -> NodeSpec {
    let mut select = NodeSpec::new("select").attr("id", id);
    select = select.child(NodeSpec::new("option").attr("value", "").text("Select an option"));
    for (value, text) in options {
        select = select.child(NodeSpec::new("option").attr("value", value).text(text));
    }
    NodeSpec::new("div")
        .child(NodeSpec::new("label").attr("for", id).text(label))
        .child(select)
}

pub fn next_button() -> NodeSpec {
    NodeSpec::new("button").text("Next").on_click(Effect::Advance)
}

/// A continuation button that does nothing, simulating a rejected advance.
pub fn dead_next_button() -> NodeSpec {
    NodeSpec::new("button").text("Next").on_click(Effect::None)
}

pub fn submit_button() -> NodeSpec {
    NodeSpec::new("button")
        .text("Submit application")
        .on_click(Effect::Submit)
}

/// Pre-checked opt-in checkbox as rendered on review steps.
pub fn follow_checkbox(id: &str, company: &str) -> NodeSpec {
    NodeSpec::new("div")
        .child(
            NodeSpec::new("label")
                .attr("for", id)
                .text(&format!("Follow {company}")),
        )
        .child(
            NodeSpec::new("input")
                .attr("id", id)
                .attr("type", "checkbox")
                .checked(),
        )
}

pub fn answers_from(entries: &[(&str, &str)]) -> AnswerSource {
    let answers: AnswerMap = entries
        .iter()
        .map(|(k, v)| (k.to_string(), AnswerValue::text(v)))
        .collect();
    AnswerSource::new(ProfileRecord::default(), answers)
}

pub fn profile() -> ProfileRecord {
    ProfileRecord {
        full_name: Some("Jordan Reyes".to_string()),
        first_name: Some("Jordan".to_string()),
        last_name: Some("Reyes".to_string()),
        email: Some("jordan@example.com".to_string()),
        phone: Some("512-555-0100".to_string()),
        phone_country: Some("United States (+1)".to_string()),
        location: Some("Austin, TX".to_string()),
        linkedin_url: Some("https://linkedin.com/in/jordanreyes".to_string()),
        website: Some("https://jordanreyes.dev".to_string()),
    }
}
