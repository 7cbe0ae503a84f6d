use crate::answers::location::LocationTarget;
use crate::browser::dom::{ClickOptions, DomElement, DomPage, Query};
use crate::error::EngineError;

/// Pause after typing, giving the suggestion list time to render.
const SUGGEST_SETTLE_MS: u64 = 600;
const CLICK_SETTLE_MS: u64 = 200;

/// Drive a location typeahead: type progressively less specific candidate
/// strings, score the rendered suggestions, click the best one, and confirm
/// the committed value names the target. Free text never commits on these
/// controls, so as a last resort the best candidate is typed and submitted
/// with Enter.
pub fn fill_typeahead(
    page: &dyn DomPage,
    scope: &dyn DomElement,
    control: &dyn DomElement,
    target: &LocationTarget,
) -> Result<bool, EngineError> {
    let candidates = target.candidates();
    if candidates.is_empty() {
        return Ok(false);
    }

    for candidate in &candidates {
        control.fill("")?;
        control.fill(candidate)?;
        page.settle(SUGGEST_SETTLE_MS)?;

        if let Some(suggestion) = best_suggestion(page, target)? {
            let text = suggestion.inner_text().unwrap_or_default();
            tracing::debug!(candidate = %candidate, suggestion = %text.trim(), "clicking typeahead suggestion");
            if suggestion.click(ClickOptions::plain()).is_err() {
                continue;
            }
            page.settle(CLICK_SETTLE_MS)?;

            let committed = committed_value(scope, control);
            if target.confirms(&committed) {
                return Ok(true);
            }
            tracing::debug!(value = %committed, "committed value did not confirm target");
        }
    }

    // Last resort: type the most specific candidate and let Enter pick the
    // host's own first suggestion. The host chooses freely here, so the
    // commit still has to pass the same confirmation as a clicked one.
    let first = &candidates[0];
    tracing::debug!(candidate = %first, "typeahead fallback: fill and press Enter");
    control.fill("")?;
    control.fill(first)?;
    page.settle(SUGGEST_SETTLE_MS)?;
    control.press("Enter")?;
    page.settle(CLICK_SETTLE_MS)?;

    let committed = committed_value(scope, control);
    if target.confirms(&committed) {
        return Ok(true);
    }
    tracing::debug!(value = %committed, "fallback commit did not confirm target");
    Ok(false)
}

/// Highest-scoring visible suggestion, if any scores above zero. Suggestion
/// overlays render outside the dialog, so the whole page is searched.
fn best_suggestion(
    page: &dyn DomPage,
    target: &LocationTarget,
) -> Result<Option<Box<dyn DomElement>>, EngineError> {
    let mut best: Option<(i32, Box<dyn DomElement>)> = None;
    for query in [Query::role("option"), Query::tag("li").with_class("suggestion")] {
        let found = match page.locate(&query) {
            Ok(found) => found,
            Err(_) => continue,
        };
        for suggestion in found {
            if !suggestion.is_visible().unwrap_or(false) {
                continue;
            }
            let text = match suggestion.inner_text() {
                Ok(text) => text,
                Err(_) => continue,
            };
            let score = target.score_suggestion(&text);
            if score <= 0 {
                continue;
            }
            if best.as_ref().is_none_or(|(b, _)| score > *b) {
                best = Some((score, suggestion));
            }
        }
        if best.is_some() {
            break;
        }
    }
    Ok(best.map(|(_, el)| el))
}

/// The value the control settled on after a suggestion click. Some hosts swap
/// the input node on commit, so the control is re-acquired through its id
/// when the original handle reads empty.
fn committed_value(scope: &dyn DomElement, control: &dyn DomElement) -> String {
    if let Ok(value) = control.input_value() {
        if !value.trim().is_empty() {
            return value;
        }
    }
    if let Ok(Some(id)) = control.attr("id") {
        if let Ok(found) = scope.locate(&Query::id(&id)) {
            if let Some(fresh) = found.first() {
                if let Ok(value) = fresh.input_value() {
                    return value;
                }
            }
        }
    }
    String::new()
}
