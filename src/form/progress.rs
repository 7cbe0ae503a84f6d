use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::browser::dom::{DomElement, Query};

/// Normalized progress signal of the multi-step dialog.
///
/// Once a session reports `percent == 100` it is terminal: no further
/// classification or filling happens before submission handling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ProgressState {
    pub current: Option<u32>,
    pub total: Option<u32>,
    pub percent: Option<u32>,
}

impl ProgressState {
    pub fn is_terminal(&self) -> bool {
        if self.percent == Some(100) {
            return true;
        }
        matches!((self.current, self.total), (Some(c), Some(t)) if t > 0 && c == t)
    }

    pub fn is_unknown(&self) -> bool {
        self.current.is_none() && self.total.is_none() && self.percent.is_none()
    }
}

/// Inspect the dialog for step/percentage signals. Independent strategies are
/// tried in priority order, stopping at the first that succeeds; when none
/// match all fields stay None and the navigator falls back to button-presence
/// heuristics alone.
pub fn detect_progress(scope: &dyn DomElement) -> ProgressState {
    if let Some(state) = from_region_aria_label(scope) {
        return state;
    }
    if let Some(state) = from_progressbar(scope) {
        return state;
    }
    if let Some(state) = from_step_text(scope) {
        return state;
    }
    if let Some(state) = from_stepper(scope) {
        return state;
    }
    ProgressState::default()
}

/// Priority 1: a region whose aria-label carries "N percent".
fn from_region_aria_label(scope: &dyn DomElement) -> Option<ProgressState> {
    let regions = scope.locate(&Query::role("region")).ok()?;
    let region = regions.first()?;
    let aria = region.attr("aria-label").ok()??;
    static PERCENT_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*percent").unwrap());
    let percent: u32 = PERCENT_RE.captures(&aria)?[1].parse().ok()?;
    Some(state_from_percent(percent))
}

/// Map a bare percentage onto (current, total) using the known increment
/// patterns: 25% steps mean 5 total, 33/66 mean 4. Unknown patterns get a
/// rough current estimate against an assumed 5 steps.
pub fn state_from_percent(percent: u32) -> ProgressState {
    let (current, total) = match percent {
        0 => (Some(1), Some(5)),
        100 => (Some(5), Some(5)),
        p if p % 25 == 0 => (Some(p / 25 + 1), Some(5)),
        p if p % 33 == 0 || p == 66 => (Some(p / 33 + 1), Some(4)),
        p => (Some(p / 20 + 1), Some(5)),
    };
    ProgressState {
        current,
        total,
        percent: Some(percent),
    }
}

/// Priority 2: a progressbar's now/max attributes.
fn from_progressbar(scope: &dyn DomElement) -> Option<ProgressState> {
    let bars = scope.locate(&Query::role("progressbar")).ok()?;
    for bar in &bars {
        let now = first_attr(bar.as_ref(), &["aria-valuenow", "value"]);
        let max = first_attr(bar.as_ref(), &["aria-valuemax", "max"]);
        if let (Some(now), Some(max)) = (now, max) {
            if let (Ok(current), Ok(total)) = (now.parse::<u32>(), max.parse::<u32>()) {
                if total > 0 {
                    return Some(ProgressState {
                        current: Some(current),
                        total: Some(total),
                        percent: Some(current * 100 / total),
                    });
                }
            }
        }
    }
    None
}

/// Priority 3: visible text like "Step 2 of 4" or "2 of 4".
fn from_step_text(scope: &dyn DomElement) -> Option<ProgressState> {
    let text = scope.inner_text().ok()?;
    static STEP_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)(?:step\s*)?(\d+)\s*of\s*(\d+)").unwrap());
    let caps = STEP_RE.captures(&text)?;
    let current: u32 = caps[1].parse().ok()?;
    let total: u32 = caps[2].parse().ok()?;
    if total == 0 {
        return None;
    }
    Some(ProgressState {
        current: Some(current),
        total: Some(total),
        percent: Some(current * 100 / total),
    })
}

/// Priority 4: a stepper list item marked aria-current="step" among siblings.
fn from_stepper(scope: &dyn DomElement) -> Option<ProgressState> {
    let current_query = Query::default().with_aria_current("step");
    let marked = scope.locate(&current_query).ok()?;
    let marked = marked.first()?;

    let list = marked
        .closest(&Query {
            tags: vec!["ol".into(), "ul".into()],
            ..Default::default()
        })
        .ok()??;
    let items = list.locate(&Query::tag("li")).ok()?;
    let total = items.len() as u32;
    if total == 0 {
        return None;
    }

    let mut current = None;
    for (i, item) in items.iter().enumerate() {
        let has_marker = item
            .locate(&current_query)
            .map(|found| !found.is_empty())
            .unwrap_or(false);
        let self_marked = item.attr("aria-current").ok().flatten().as_deref() == Some("step");
        if has_marker || self_marked {
            current = Some(i as u32 + 1);
            break;
        }
    }

    let current = current?;
    Some(ProgressState {
        current: Some(current),
        total: Some(total),
        percent: Some(current * 100 / total),
    })
}

fn first_attr(el: &dyn DomElement, names: &[&str]) -> Option<String> {
    for name in names {
        if let Ok(Some(value)) = el.attr(name) {
            return Some(value);
        }
    }
    None
}
