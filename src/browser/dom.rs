use serde::Serialize;

use crate::error::EngineError;

/// Structured selector hint used to locate elements in the live DOM.
///
/// The engine never emits raw CSS; every lookup is expressed through this
/// struct so that any backend (the Node.js bridge, the scripted mock) can
/// interpret it. All criteria are ANDed; empty `tags` matches any tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Query {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    /// Case-insensitive substring of the element's inner text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_contains: Option<String>,
    /// Case-insensitive substring of the aria-label attribute.
    #[serde(rename = "ariaLabelContains", skip_serializing_if = "Option::is_none")]
    pub aria_label_contains: Option<String>,
    /// Matches `label` elements whose `for` attribute equals this id.
    #[serde(rename = "labelFor", skip_serializing_if = "Option::is_none")]
    pub label_for: Option<String>,
    /// Substring of the class attribute (primary-button styling and the like).
    #[serde(rename = "classContains", skip_serializing_if = "Option::is_none")]
    pub class_contains: Option<String>,
    #[serde(rename = "ariaCurrent", skip_serializing_if = "Option::is_none")]
    pub aria_current: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
}

impl Query {
    pub fn tag(tag: &str) -> Self {
        Query {
            tags: vec![tag.to_string()],
            ..Default::default()
        }
    }

    /// All fillable form controls, in document order.
    pub fn controls() -> Self {
        Query {
            tags: vec!["input".into(), "select".into(), "textarea".into()],
            ..Default::default()
        }
    }

    pub fn role(role: &str) -> Self {
        Query {
            role: Some(role.to_string()),
            ..Default::default()
        }
    }

    pub fn id(id: &str) -> Self {
        Query {
            id: Some(id.to_string()),
            ..Default::default()
        }
    }

    pub fn input(input_type: &str) -> Self {
        Query {
            tags: vec!["input".into()],
            input_type: Some(input_type.to_string()),
            ..Default::default()
        }
    }

    pub fn label_for(id: &str) -> Self {
        Query {
            tags: vec!["label".into()],
            label_for: Some(id.to_string()),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text_contains = Some(text.to_string());
        self
    }

    pub fn with_aria_label(mut self, text: &str) -> Self {
        self.aria_label_contains = Some(text.to_string());
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.class_contains = Some(class.to_string());
        self
    }

    pub fn with_aria_current(mut self, value: &str) -> Self {
        self.aria_current = Some(value.to_string());
        self
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = Some(checked);
        self
    }
}

/// Click behavior. `forced` bypasses visibility/interception checks, the
/// second rung of the plain-then-forced click ladder.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ClickOptions {
    pub forced: bool,
}

impl ClickOptions {
    pub fn plain() -> Self {
        ClickOptions { forced: false }
    }

    pub fn forced() -> Self {
        ClickOptions { forced: true }
    }
}

/// Capability set of one live element handle.
///
/// The engine is polymorphic over this trait and `DomPage` only; it assumes
/// no particular automation library. Handles are snapshots of a lookup, not
/// stable references: after navigation they must be re-acquired via `locate`.
pub trait DomElement {
    /// Search within this element's subtree, document order.
    fn locate(&self, query: &Query) -> Result<Vec<Box<dyn DomElement>>, EngineError>;

    /// Nearest ancestor matching the query, if any.
    fn closest(&self, query: &Query) -> Result<Option<Box<dyn DomElement>>, EngineError>;

    fn tag(&self) -> Result<String, EngineError>;
    fn inner_text(&self) -> Result<String, EngineError>;
    fn attr(&self, name: &str) -> Result<Option<String>, EngineError>;
    /// Current value of an input/select/textarea, empty for other elements.
    fn input_value(&self) -> Result<String, EngineError>;

    fn click(&self, opts: ClickOptions) -> Result<(), EngineError>;
    fn fill(&self, text: &str) -> Result<(), EngineError>;
    fn press(&self, key: &str) -> Result<(), EngineError>;
    fn set_checked(&self, checked: bool) -> Result<(), EngineError>;
    fn select_by_label(&self, label: &str) -> Result<(), EngineError>;
    fn select_by_value(&self, value: &str) -> Result<(), EngineError>;

    fn is_visible(&self) -> Result<bool, EngineError>;
    fn is_enabled(&self) -> Result<bool, EngineError>;
    fn is_checked(&self) -> Result<bool, EngineError>;
}

/// Capability set of the page hosting the dialog. Needed where the engine
/// must look outside the dialog scope (custom-dropdown overlays render at the
/// document root) or drive the keyboard.
pub trait DomPage {
    fn locate(&self, query: &Query) -> Result<Vec<Box<dyn DomElement>>, EngineError>;
    fn press_key(&self, key: &str) -> Result<(), EngineError>;
    /// Block until the UI has had `ms` milliseconds to settle.
    fn settle(&self, ms: u64) -> Result<(), EngineError>;
}
