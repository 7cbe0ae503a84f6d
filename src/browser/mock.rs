//! Scripted in-memory DOM used by the test suites.
//!
//! A `MockPage` holds a node arena plus a sequence of step specs. Clicking a
//! node carrying [`Effect::Advance`] swaps the dialog's children for the next
//! step, the way hosts re-render a multi-step dialog. Handles held across an
//! advance go stale exactly like real browser handles do.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::browser::dom::{ClickOptions, DomElement, DomPage, Query};
use crate::error::EngineError;

/// What clicking a node does to the scripted page.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Effect {
    #[default]
    None,
    /// Replace the dialog's content with the next scripted step.
    Advance,
    /// Detach the dialog and render a submission confirmation.
    Submit,
    /// Set another node's value (custom dropdown options, typeahead
    /// suggestions).
    SetValue { id: String, value: String },
}

/// Declarative node used to describe scripted DOM trees.
#[derive(Debug, Clone, Default)]
pub struct NodeSpec {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub text: String,
    pub value: String,
    pub checked: bool,
    pub hidden: bool,
    pub disabled: bool,
    pub effect: Effect,
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    pub fn new(tag: &str) -> Self {
        NodeSpec {
            tag: tag.to_string(),
            ..NodeSpec::default()
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn checked(mut self) -> Self {
        self.checked = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn on_click(mut self, effect: Effect) -> Self {
        self.effect = effect;
        self
    }

    pub fn child(mut self, child: NodeSpec) -> Self {
        self.children.push(child);
        self
    }
}

struct NodeData {
    tag: String,
    attrs: BTreeMap<String, String>,
    text: String,
    value: String,
    checked: bool,
    visible: bool,
    enabled: bool,
    effect: Effect,
    parent: Option<usize>,
    children: Vec<usize>,
}

struct DomState {
    nodes: Vec<NodeData>,
    root: usize,
    dialog: Option<usize>,
    steps: Vec<NodeSpec>,
    current_step: usize,
    actions: Vec<String>,
}

impl DomState {
    fn insert(&mut self, spec: &NodeSpec, parent: Option<usize>) -> usize {
        let id = self.nodes.len();
        self.nodes.push(NodeData {
            tag: spec.tag.clone(),
            attrs: spec.attrs.iter().cloned().collect(),
            text: spec.text.clone(),
            value: spec.value.clone(),
            checked: spec.checked,
            visible: !spec.hidden,
            enabled: !spec.disabled,
            effect: spec.effect.clone(),
            parent,
            children: Vec::new(),
        });
        if let Some(p) = parent {
            self.nodes[p].children.push(id);
        }
        for child in &spec.children {
            self.insert(child, Some(id));
        }
        id
    }

    fn render_step(&mut self) {
        let Some(dialog) = self.dialog else {
            return;
        };
        // Old children stay in the arena but detach, so outstanding handles
        // go stale instead of resolving against the new step.
        let old: Vec<usize> = std::mem::take(&mut self.nodes[dialog].children);
        for id in old {
            self.nodes[id].parent = None;
        }
        let step = self.steps[self.current_step].clone();
        for child in &step.children {
            self.insert(child, Some(dialog));
        }
        // Step-level attrs land on the dialog node itself (aria labels etc.).
        for (name, value) in &step.attrs {
            self.nodes[dialog]
                .attrs
                .insert(name.clone(), value.clone());
        }
    }

    fn inner_text(&self, id: usize) -> String {
        let mut parts: Vec<String> = Vec::new();
        self.collect_text(id, &mut parts);
        parts.join(" ")
    }

    fn collect_text(&self, id: usize, out: &mut Vec<String>) {
        let node = &self.nodes[id];
        if !node.text.is_empty() {
            out.push(node.text.clone());
        }
        for &child in &node.children {
            self.collect_text(child, out);
        }
    }

    fn matches(&self, id: usize, query: &Query) -> bool {
        let node = &self.nodes[id];
        if !query.tags.is_empty() && !query.tags.iter().any(|t| *t == node.tag) {
            return false;
        }
        if let Some(wanted) = &query.id {
            if node.attrs.get("id") != Some(wanted) {
                return false;
            }
        }
        if let Some(wanted) = &query.name {
            if node.attrs.get("name") != Some(wanted) {
                return false;
            }
        }
        if let Some(wanted) = &query.role {
            if node.attrs.get("role") != Some(wanted) {
                return false;
            }
        }
        if let Some(wanted) = &query.input_type {
            if node.attrs.get("type") != Some(wanted) {
                return false;
            }
        }
        if let Some(wanted) = &query.text_contains {
            let text = self.inner_text(id).to_lowercase();
            if !text.contains(&wanted.to_lowercase()) {
                return false;
            }
        }
        if let Some(wanted) = &query.aria_label_contains {
            let aria = node
                .attrs
                .get("aria-label")
                .map(|a| a.to_lowercase())
                .unwrap_or_default();
            if !aria.contains(&wanted.to_lowercase()) {
                return false;
            }
        }
        if let Some(wanted) = &query.label_for {
            if node.attrs.get("for") != Some(wanted) {
                return false;
            }
        }
        if let Some(wanted) = &query.class_contains {
            let class = node.attrs.get("class").cloned().unwrap_or_default();
            if !class.contains(wanted.as_str()) {
                return false;
            }
        }
        if let Some(wanted) = &query.aria_current {
            if node.attrs.get("aria-current") != Some(wanted) {
                return false;
            }
        }
        if let Some(wanted) = query.checked {
            if node.checked != wanted {
                return false;
            }
        }
        true
    }

    fn descendants(&self, id: usize, out: &mut Vec<usize>) {
        for &child in &self.nodes[id].children {
            out.push(child);
            self.descendants(child, out);
        }
    }

    fn find(&self, scope: usize, query: &Query) -> Vec<usize> {
        let mut candidates = Vec::new();
        self.descendants(scope, &mut candidates);
        candidates
            .into_iter()
            .filter(|&id| self.matches(id, query))
            .collect()
    }

    fn is_attached(&self, mut id: usize) -> bool {
        loop {
            if id == self.root {
                return true;
            }
            match self.nodes[id].parent {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    fn find_by_dom_id(&self, dom_id: &str) -> Option<usize> {
        (0..self.nodes.len())
            .find(|&id| self.is_attached(id) && self.nodes[id].attrs.get("id").map(String::as_str) == Some(dom_id))
    }

    fn apply_click(&mut self, id: usize) {
        let effect = self.nodes[id].effect.clone();
        match effect {
            Effect::None => self.default_click(id),
            Effect::Advance => {
                if self.current_step + 1 < self.steps.len() {
                    self.current_step += 1;
                    self.render_step();
                }
            }
            Effect::Submit => {
                if let Some(dialog) = self.dialog.take() {
                    self.nodes[dialog].parent = None;
                    let root = self.root;
                    self.nodes[root].children.retain(|&c| c != dialog);
                }
                let confirmation = NodeSpec::new("div").text("Your application was sent.");
                let root = self.root;
                self.insert(&confirmation, Some(root));
            }
            Effect::SetValue { id: target, value } => {
                if let Some(node) = self.find_by_dom_id(&target) {
                    self.nodes[node].value = value;
                }
            }
        }
    }

    /// Clicks without an explicit effect follow native semantics: labels
    /// reach their control, radios check exclusively, checkboxes toggle.
    fn default_click(&mut self, id: usize) {
        let node = &self.nodes[id];
        if node.tag == "label" {
            if let Some(target) = node.attrs.get("for").cloned() {
                if let Some(control) = self.find_by_dom_id(&target) {
                    self.default_click(control);
                }
            }
            return;
        }
        let input_type = node.attrs.get("type").cloned().unwrap_or_default();
        match input_type.as_str() {
            "radio" => self.check_exclusively(id),
            "checkbox" => self.nodes[id].checked = !self.nodes[id].checked,
            _ => {}
        }
    }

    fn check_exclusively(&mut self, id: usize) {
        let name = self.nodes[id].attrs.get("name").cloned();
        if let Some(name) = name {
            for other in 0..self.nodes.len() {
                if self.nodes[other].attrs.get("name") == Some(&name)
                    && self.nodes[other].attrs.get("type").map(String::as_str) == Some("radio")
                {
                    self.nodes[other].checked = false;
                }
            }
        }
        self.nodes[id].checked = true;
    }
}

/// Scripted page: build it from one `NodeSpec` per step, where each spec's
/// children become the dialog's content for that step.
pub struct MockPage {
    state: Rc<RefCell<DomState>>,
}

impl MockPage {
    pub fn new(steps: Vec<NodeSpec>) -> Self {
        let mut state = DomState {
            nodes: Vec::new(),
            root: 0,
            dialog: None,
            steps,
            current_step: 0,
            actions: Vec::new(),
        };
        let root = state.insert(&NodeSpec::new("body"), None);
        state.root = root;
        if !state.steps.is_empty() {
            let dialog = state.insert(&NodeSpec::new("div").attr("role", "dialog"), Some(root));
            state.dialog = Some(dialog);
            state.render_step();
        }
        MockPage {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Convenience handle to the dialog, the scope most tests start from.
    pub fn dialog(&self) -> Option<Box<dyn DomElement>> {
        let dialog = self.state.borrow().dialog?;
        Some(self.element(dialog))
    }

    pub fn current_step(&self) -> usize {
        self.state.borrow().current_step
    }

    pub fn dialog_open(&self) -> bool {
        self.state.borrow().dialog.is_some()
    }

    /// Every click/fill/press the engine performed, in order.
    pub fn action_log(&self) -> Vec<String> {
        self.state.borrow().actions.clone()
    }

    /// Current value of the attached node with the given DOM id.
    pub fn value_of(&self, dom_id: &str) -> Option<String> {
        let state = self.state.borrow();
        state
            .find_by_dom_id(dom_id)
            .map(|id| state.nodes[id].value.clone())
    }

    pub fn is_checked_id(&self, dom_id: &str) -> bool {
        let state = self.state.borrow();
        state
            .find_by_dom_id(dom_id)
            .map(|id| state.nodes[id].checked)
            .unwrap_or(false)
    }

    fn element(&self, id: usize) -> Box<dyn DomElement> {
        Box::new(MockElement {
            state: Rc::clone(&self.state),
            id,
        })
    }
}

impl DomPage for MockPage {
    fn locate(&self, query: &Query) -> Result<Vec<Box<dyn DomElement>>, EngineError> {
        let found = {
            let state = self.state.borrow();
            let root = state.root;
            state.find(root, query)
        };
        Ok(found.into_iter().map(|id| self.element(id)).collect())
    }

    fn press_key(&self, key: &str) -> Result<(), EngineError> {
        self.state
            .borrow_mut()
            .actions
            .push(format!("press_key:{key}"));
        Ok(())
    }

    fn settle(&self, _ms: u64) -> Result<(), EngineError> {
        Ok(())
    }
}

struct MockElement {
    state: Rc<RefCell<DomState>>,
    id: usize,
}

impl MockElement {
    fn boxed(&self, id: usize) -> Box<dyn DomElement> {
        Box::new(MockElement {
            state: Rc::clone(&self.state),
            id,
        })
    }

    fn attached(&self) -> Result<(), EngineError> {
        if self.state.borrow().is_attached(self.id) {
            Ok(())
        } else {
            Err(EngineError::ElementNotFound {
                element: format!("node#{}", self.id),
                context: "handle went stale after re-render".to_string(),
            })
        }
    }
}

impl DomElement for MockElement {
    fn locate(&self, query: &Query) -> Result<Vec<Box<dyn DomElement>>, EngineError> {
        self.attached()?;
        let found = self.state.borrow().find(self.id, query);
        Ok(found.into_iter().map(|id| self.boxed(id)).collect())
    }

    fn closest(&self, query: &Query) -> Result<Option<Box<dyn DomElement>>, EngineError> {
        self.attached()?;
        let state = self.state.borrow();
        let mut current = state.nodes[self.id].parent;
        while let Some(id) = current {
            if state.matches(id, query) {
                drop(state);
                return Ok(Some(self.boxed(id)));
            }
            current = state.nodes[id].parent;
        }
        Ok(None)
    }

    fn tag(&self) -> Result<String, EngineError> {
        self.attached()?;
        Ok(self.state.borrow().nodes[self.id].tag.clone())
    }

    fn inner_text(&self) -> Result<String, EngineError> {
        self.attached()?;
        Ok(self.state.borrow().inner_text(self.id))
    }

    fn attr(&self, name: &str) -> Result<Option<String>, EngineError> {
        self.attached()?;
        Ok(self.state.borrow().nodes[self.id].attrs.get(name).cloned())
    }

    fn input_value(&self) -> Result<String, EngineError> {
        self.attached()?;
        Ok(self.state.borrow().nodes[self.id].value.clone())
    }

    fn click(&self, options: ClickOptions) -> Result<(), EngineError> {
        self.attached()?;
        {
            let state = self.state.borrow();
            let node = &state.nodes[self.id];
            if !options.forced && (!node.visible || !node.enabled) {
                return Err(EngineError::ElementNotFound {
                    element: format!("node#{}", self.id),
                    context: "not clickable without force".to_string(),
                });
            }
        }
        let mut state = self.state.borrow_mut();
        let label = state.nodes[self.id]
            .attrs
            .get("id")
            .cloned()
            .unwrap_or_else(|| state.inner_text(self.id));
        state.actions.push(format!("click:{label}"));
        state.apply_click(self.id);
        Ok(())
    }

    fn fill(&self, text: &str) -> Result<(), EngineError> {
        self.attached()?;
        let mut state = self.state.borrow_mut();
        state.actions.push(format!("fill:{text}"));
        state.nodes[self.id].value = text.to_string();
        Ok(())
    }

    fn press(&self, key: &str) -> Result<(), EngineError> {
        self.attached()?;
        let mut state = self.state.borrow_mut();
        state.actions.push(format!("press:{key}"));
        // Enter on a node scripted with a data-commit attribute commits that
        // value, approximating a typeahead accepting its first suggestion.
        if key == "Enter" {
            if let Some(commit) = state.nodes[self.id].attrs.get("data-commit").cloned() {
                state.nodes[self.id].value = commit;
            }
        }
        Ok(())
    }

    fn set_checked(&self, checked: bool) -> Result<(), EngineError> {
        self.attached()?;
        let mut state = self.state.borrow_mut();
        if checked && state.nodes[self.id].attrs.get("type").map(String::as_str) == Some("radio") {
            state.check_exclusively(self.id);
        } else {
            state.nodes[self.id].checked = checked;
        }
        Ok(())
    }

    fn select_by_label(&self, label: &str) -> Result<(), EngineError> {
        self.select_option(|state, option| state.nodes[option].text.trim() == label)
    }

    fn select_by_value(&self, value: &str) -> Result<(), EngineError> {
        self.select_option(|state, option| {
            state.nodes[option].attrs.get("value").map(String::as_str) == Some(value)
        })
    }

    fn is_visible(&self) -> Result<bool, EngineError> {
        self.attached()?;
        Ok(self.state.borrow().nodes[self.id].visible)
    }

    fn is_enabled(&self) -> Result<bool, EngineError> {
        self.attached()?;
        Ok(self.state.borrow().nodes[self.id].enabled)
    }

    fn is_checked(&self) -> Result<bool, EngineError> {
        self.attached()?;
        Ok(self.state.borrow().nodes[self.id].checked)
    }
}

impl MockElement {
    fn select_option(
        &self,
        pick: impl Fn(&DomState, usize) -> bool,
    ) -> Result<(), EngineError> {
        self.attached()?;
        let mut state = self.state.borrow_mut();
        if state.nodes[self.id].tag != "select" {
            return Err(EngineError::ElementNotFound {
                element: format!("node#{}", self.id),
                context: "not a native select".to_string(),
            });
        }
        let children = state.nodes[self.id].children.clone();
        for option in children {
            if state.nodes[option].tag == "option" && pick(&state, option) {
                let value = state.nodes[option]
                    .attrs
                    .get("value")
                    .cloned()
                    .unwrap_or_else(|| state.nodes[option].text.clone());
                state.nodes[self.id].value = value;
                return Ok(());
            }
        }
        Err(EngineError::ElementNotFound {
            element: format!("node#{}", self.id),
            context: "no matching option".to_string(),
        })
    }
}
