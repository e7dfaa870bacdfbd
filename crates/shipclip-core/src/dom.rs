//! Element-level page operations shared by both pipelines.
//!
//! Values are written content-script style: assign `value` and dispatch
//! bubbling `input`/`change` events from inside the page, so the host
//! page's reactive framework observes the update exactly as it would a
//! user edit.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use shipclip_cdp::{CdpError, TabSession};

/// One option of a select control.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

const INNER_TEXT_JS: &str = r#"function() { return this.innerText || ""; }"#;

const VALUE_JS: &str = r#"function() { return this.value == null ? "" : String(this.value); }"#;

const SET_VALUE_JS: &str = r#"function(v) {
    this.value = v == null ? "" : v;
    this.dispatchEvent(new Event("input", { bubbles: true }));
    this.dispatchEvent(new Event("change", { bubbles: true }));
}"#;

const OPTIONS_JS: &str = r#"function() {
    if (this.tagName !== "SELECT") return null;
    return Array.from(this.options).map(function(o) {
        return { value: o.value || "", label: o.text || "" };
    });
}"#;

/// Read an element's visible text.
pub async fn inner_text(session: &TabSession, node_id: i64) -> Result<String, CdpError> {
    let value = session.call_on_node(node_id, INNER_TEXT_JS, None).await?;
    Ok(value.as_str().unwrap_or("").to_string())
}

/// Read a form control's current value.
pub async fn input_value(session: &TabSession, node_id: i64) -> Result<String, CdpError> {
    let value = session.call_on_node(node_id, VALUE_JS, None).await?;
    Ok(value.as_str().unwrap_or("").to_string())
}

/// Set a control's value and dispatch `input` + `change` events.
pub async fn set_value_with_events(
    session: &TabSession,
    node_id: i64,
    value: &str,
) -> Result<(), CdpError> {
    session
        .call_on_node(node_id, SET_VALUE_JS, Some(vec![Value::String(value.to_string())]))
        .await?;
    Ok(())
}

/// List a select control's options. Non-select controls yield an empty
/// list.
pub async fn select_options(
    session: &TabSession,
    node_id: i64,
) -> Result<Vec<SelectOption>, CdpError> {
    let value = session.call_on_node(node_id, OPTIONS_JS, None).await?;
    if value.is_null() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_value(value)?)
}

/// Find a button under `root` whose trimmed visible text equals
/// `text`, case-insensitively.
pub async fn find_button_by_text(
    session: &TabSession,
    root: i64,
    text: &str,
) -> Result<Option<i64>, CdpError> {
    let wanted = text.trim().to_lowercase();

    for button in session.query_selector_all_from(root, "button").await? {
        let label = inner_text(session, button).await?;
        if label.trim().to_lowercase() == wanted {
            return Ok(Some(button));
        }
    }

    debug!("no button with text {:?}", text);
    Ok(None)
}

/// Locate an element by its id attribute anywhere in the document.
pub async fn by_element_id(session: &TabSession, id: &str) -> Result<Option<i64>, CdpError> {
    // Attribute selector rather than `#id` so ids with CSS-significant
    // characters still resolve.
    let selector = format!("[id='{}']", id.replace('\'', "\\'"));
    session.query_selector(&selector).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_select_option_deserializes_from_bridge_shape() {
        let value = json!([
            {"value": "WA", "label": "WA Washington"},
            {"value": "CA", "label": "CA California"}
        ]);
        let options: Vec<SelectOption> = serde_json::from_value(value).unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].value, "WA");
        assert_eq!(options[1].label, "CA California");
    }
}
