use form_pilot::browser::dom::Query;
use form_pilot::browser::session::{BridgeRequest, BridgeResponse};
use serde_json::{json, Value};

fn to_value(request: &BridgeRequest) -> Value {
    serde_json::to_value(request).unwrap()
}

// ============================================================================
// Request wire format
// ============================================================================

#[test]
fn locate_request_carries_query_and_optional_scope() {
    let query = Query::tag("button").with_text("Next");
    let page_wide = to_value(&BridgeRequest::locate(None, &query));
    assert_eq!(
        page_wide,
        json!({
            "cmd": "locate",
            "query": { "tags": ["button"], "text_contains": "Next" }
        })
    );

    let scoped = to_value(&BridgeRequest::locate(Some(7), &query));
    assert_eq!(scoped["scope"], json!(7));
}

#[test]
fn query_omits_unset_criteria() {
    let value = serde_json::to_value(Query::input("radio").with_name("work-auth")).unwrap();
    assert_eq!(
        value,
        json!({ "tags": ["input"], "type": "radio", "name": "work-auth" })
    );
}

#[test]
fn element_commands_reference_their_handle() {
    assert_eq!(
        to_value(&BridgeRequest::click(3, true)),
        json!({ "cmd": "click", "handle": 3, "forced": true })
    );
    assert_eq!(
        to_value(&BridgeRequest::fill(4, "Jordan")),
        json!({ "cmd": "fill", "handle": 4, "value": "Jordan" })
    );
    assert_eq!(
        to_value(&BridgeRequest::select(5, "label", "Two weeks")),
        json!({ "cmd": "select", "handle": 5, "by": "label", "value": "Two weeks" })
    );
    assert_eq!(
        to_value(&BridgeRequest::handle_cmd("inner_text", 6)),
        json!({ "cmd": "inner_text", "handle": 6 })
    );
}

#[test]
fn page_commands_have_no_handle() {
    assert_eq!(
        to_value(&BridgeRequest::press_key("Escape")),
        json!({ "cmd": "press_key", "key": "Escape" })
    );
    assert_eq!(
        to_value(&BridgeRequest::settle(400)),
        json!({ "cmd": "settle", "ms": 400 })
    );
    assert_eq!(to_value(&BridgeRequest::quit()), json!({ "cmd": "quit" }));
}

// ============================================================================
// Response parsing
// ============================================================================

#[test]
fn response_fields_default_when_absent() {
    let response: BridgeResponse = serde_json::from_str(r#"{"ok":true}"#).unwrap();
    assert!(response.ok);
    assert_eq!(response.error, None);
    assert_eq!(response.handles, None);
    assert_eq!(response.text, None);

    let located: BridgeResponse =
        serde_json::from_str(r#"{"ok":true,"handles":[1,2,3]}"#).unwrap();
    assert_eq!(located.handles, Some(vec![1, 2, 3]));

    let failed: BridgeResponse =
        serde_json::from_str(r#"{"ok":false,"error":"no such handle"}"#).unwrap();
    assert!(!failed.ok);
    assert_eq!(failed.error.as_deref(), Some("no such handle"));
}
