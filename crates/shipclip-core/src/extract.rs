//! Destination extraction from the shipping-label dialog.
//!
//! Two strategies, tried in priority order:
//!
//! - **Suggested**: the selected pre-validated suggestion card carries a
//!   four-line summary (name / street / "City, ST ZIP" / country) that
//!   is interpreted with strict line semantics.
//! - **Manual**: labeled inputs in the expanded address section,
//!   located by label-keyword matching and resolved to their controls.
//!
//! A strategy "yielding nothing" is not an error; only both coming up
//! empty fails the copy, with diagnostics describing what markup was
//! actually present.

use serde_json::Value;
use tracing::{debug, warn};

use shipclip_cdp::TabSession;

use crate::config::SourceConfig;
use crate::dom;
use crate::error::{CopyDiagnostics, CopyError};
use crate::record::{
    AddressSource, DestinationRecord, extract_order_number, normalize_country,
    parse_city_state_zip, split_name,
};

/// Bridge: from a checked choice control, climb to its card and read
/// the summary text.
const CLOSEST_SUMMARY_JS: &str = r#"function(cardSel, summarySel) {
    const card = this.closest(cardSel);
    if (!card) return null;
    const summary = card.querySelector(summarySel);
    return summary ? summary.innerText : null;
}"#;

/// Bridge: resolve a label's control by proximity (nested control, then
/// the control immediately following the label) and read its value.
const PROXIMITY_VALUE_JS: &str = r#"function() {
    let control = this.querySelector("input, select, textarea");
    if (!control) {
        const next = this.nextElementSibling;
        if (next && ["INPUT", "SELECT", "TEXTAREA"].includes(next.tagName)) control = next;
    }
    if (!control) return null;
    return control.value == null ? "" : String(control.value);
}"#;

/// Extract a destination record from the dialog, trying the suggested
/// card first and the manual fields second.
///
/// `section` is the expanded address section when one was located; the
/// manual strategy searches it, falling back to the whole dialog.
pub async fn extract_destination(
    session: &TabSession,
    dialog: i64,
    section: Option<i64>,
    source: &SourceConfig,
) -> Result<DestinationRecord, CopyError> {
    if let Some(record) = extract_suggested(session, dialog, source).await? {
        debug!("extracted destination from suggested card");
        return Ok(record);
    }

    let manual_scope = section.unwrap_or(dialog);
    if let Some(record) = extract_manual(session, manual_scope).await? {
        debug!("extracted destination from manual fields");
        return Ok(record);
    }

    let diagnostics = gather_diagnostics(session, dialog, manual_scope, source).await;
    warn!("extraction failed: {}", diagnostics);
    Err(CopyError::NoAddressFound(diagnostics))
}

/// Strategy A: the selected suggestion card.
async fn extract_suggested(
    session: &TabSession,
    dialog: i64,
    source: &SourceConfig,
) -> Result<Option<DestinationRecord>, CopyError> {
    let summary_text = read_selected_summary(session, dialog, source).await?;

    let Some(text) = summary_text else {
        debug!("no selected suggestion card");
        return Ok(None);
    };

    Ok(interpret_summary(&text))
}

/// Read the selected card's summary text: the "selected" marker class
/// first, then a checked choice control climbing to its card.
async fn read_selected_summary(
    session: &TabSession,
    dialog: i64,
    source: &SourceConfig,
) -> Result<Option<String>, CopyError> {
    if let Some(card) = session
        .query_selector_from(dialog, &source.suggestion_selected)
        .await?
    {
        if let Some(summary) = session
            .query_selector_from(card, &source.suggestion_summary)
            .await?
        {
            return Ok(Some(dom::inner_text(session, summary).await?));
        }
        debug!("selected card has no summary block");
        return Ok(None);
    }

    if let Some(choice) = session
        .query_selector_from(dialog, &source.suggestion_choice)
        .await?
    {
        let value = session
            .call_on_node(
                choice,
                CLOSEST_SUMMARY_JS,
                Some(vec![
                    Value::String(source.suggestion_card.clone()),
                    Value::String(source.suggestion_summary.clone()),
                ]),
            )
            .await?;
        return Ok(value.as_str().map(str::to_string));
    }

    Ok(None)
}

/// Interpret a suggestion summary's lines:
///
/// ```text
/// 0: full name
/// 1: street address
/// 2: City, ST ZIP[-plus4]
/// 3: country
/// ```
///
/// Yields nothing when the combined city/state/zip line fails the
/// strict parse; a missing country line degrades to an empty country.
pub fn interpret_summary(text: &str) -> Option<DestinationRecord> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let name_line = lines.first().copied().unwrap_or("");
    let address1 = lines.get(1).copied().unwrap_or("");
    let csz = parse_city_state_zip(lines.get(2).copied().unwrap_or(""));
    if csz.city.is_empty() {
        return None;
    }
    let country = normalize_country(lines.get(3).copied().unwrap_or(""));

    let (first_name, last_name) = split_name(name_line);

    Some(DestinationRecord {
        first_name,
        last_name,
        company: String::new(),
        phone: String::new(),
        address1: address1.to_string(),
        address2: String::new(),
        city: csz.city,
        state: csz.state,
        postal_code: csz.postal_code,
        country,
        order_number: String::new(),
        email: String::new(),
        source: AddressSource::Suggested,
    })
}

/// The manual-form fields a label can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ManualField {
    Name,
    Company,
    Phone,
    Address,
    City,
    State,
    Zip,
    Country,
}

/// Map a label's text to a field by keyword substring.
///
/// Checked in an order where the more specific keywords win: a
/// "Company name" label is a company field, not a name field.
fn field_for_label(text: &str) -> Option<ManualField> {
    let t = text.to_lowercase();
    if t.contains("company") {
        Some(ManualField::Company)
    } else if t.contains("phone") {
        Some(ManualField::Phone)
    } else if t.contains("address") {
        Some(ManualField::Address)
    } else if t.contains("city") {
        Some(ManualField::City)
    } else if t.contains("state") {
        Some(ManualField::State)
    } else if t.contains("zip") || t.contains("postal") {
        Some(ManualField::Zip)
    } else if t.contains("country") {
        Some(ManualField::Country)
    } else if t.contains("name") {
        Some(ManualField::Name)
    } else {
        None
    }
}

/// Upper-case bare 2-letter state codes; anything longer passes
/// through untouched.
fn normalize_state(value: &str) -> String {
    let v = value.trim();
    if v.len() == 2 && v.chars().all(|c| c.is_ascii_alphabetic()) {
        v.to_uppercase()
    } else {
        v.to_string()
    }
}

/// Strategy B: labeled inputs in the expanded section.
///
/// Missing labels yield empty strings; the strategy yields nothing only
/// when the resolved address line is empty.
async fn extract_manual(
    session: &TabSession,
    scope: i64,
) -> Result<Option<DestinationRecord>, CopyError> {
    let mut fields = Vec::new();

    for label in session.query_selector_all_from(scope, "label").await? {
        let text = dom::inner_text(session, label).await?;
        let Some(field) = field_for_label(&text) else {
            continue;
        };

        let value = label_control_value(session, label).await?.unwrap_or_default();
        fields.push((field, value.trim().to_string()));
    }

    Ok(assemble_manual(fields))
}

/// Assemble a manual record from resolved (field, value) pairs. The
/// first non-empty value per field wins; yields nothing when the
/// address line came up empty.
fn assemble_manual(fields: Vec<(ManualField, String)>) -> Option<DestinationRecord> {
    let mut name = String::new();
    let mut company = String::new();
    let mut phone = String::new();
    let mut address = String::new();
    let mut city = String::new();
    let mut state = String::new();
    let mut zip = String::new();
    let mut country = String::new();

    for (field, value) in fields {
        let slot = match field {
            ManualField::Name => &mut name,
            ManualField::Company => &mut company,
            ManualField::Phone => &mut phone,
            ManualField::Address => &mut address,
            ManualField::City => &mut city,
            ManualField::State => &mut state,
            ManualField::Zip => &mut zip,
            ManualField::Country => &mut country,
        };
        if slot.is_empty() {
            *slot = value;
        }
    }

    if address.is_empty() {
        debug!("manual fields resolved no address line");
        return None;
    }

    let (first_name, last_name) = split_name(&name);

    Some(DestinationRecord {
        first_name,
        last_name,
        company,
        phone,
        address1: address,
        address2: String::new(),
        city,
        state: normalize_state(&state),
        postal_code: zip,
        country: normalize_country(&country),
        order_number: String::new(),
        email: String::new(),
        source: AddressSource::Manual,
    })
}

/// Resolve a label's control and read its value: the explicit `for`
/// reference first, then proximity (nested control, following control).
async fn label_control_value(
    session: &TabSession,
    label: i64,
) -> Result<Option<String>, CopyError> {
    if let Some(target_id) = session.attribute(label, "for").await? {
        if let Some(control) = dom::by_element_id(session, &target_id).await? {
            return Ok(Some(dom::input_value(session, control).await?));
        }
    }

    let value = session.call_on_node(label, PROXIMITY_VALUE_JS, None).await?;
    Ok(value.as_str().map(str::to_string))
}

/// Collect the context logged alongside a NoAddressFound failure.
async fn gather_diagnostics(
    session: &TabSession,
    dialog: i64,
    manual_scope: i64,
    source: &SourceConfig,
) -> CopyDiagnostics {
    let suggestion_markup = session
        .query_selector_from(dialog, &source.suggestion_card)
        .await
        .ok()
        .flatten()
        .is_some();

    let manual_markup = session
        .query_selector_from(manual_scope, "label")
        .await
        .ok()
        .flatten()
        .is_some();

    CopyDiagnostics {
        dialog_found: true,
        suggestion_markup,
        manual_markup,
        order_number: read_order_number(session, source).await,
    }
}

/// Read the order number from its heading, outside the dialog.
///
/// Missing heading or pattern is non-fatal; the copy proceeds without
/// an order number.
pub async fn read_order_number(session: &TabSession, source: &SourceConfig) -> String {
    let heading = match session.query_selector(&source.order_heading_selector).await {
        Ok(Some(node)) => dom::inner_text(session, node).await.unwrap_or_default(),
        _ => String::new(),
    };

    let number = extract_order_number(&heading);
    if number.is_empty() {
        warn!("order number not found; proceeding without it");
    }
    number
}

/// Read the customer email from outside the dialog: the billing input
/// first, then a mailto link in the address block.
pub async fn read_email(session: &TabSession, source: &SourceConfig) -> String {
    if let Ok(Some(input)) = session.query_selector(&source.email_input_selector).await {
        if let Ok(value) = dom::input_value(session, input).await {
            let value = value.trim().to_string();
            if !value.is_empty() {
                return value;
            }
        }
    }

    if let Ok(Some(link)) = session.query_selector(&source.email_mailto_selector).await {
        if let Ok(text) = dom::inner_text(session, link).await {
            return text.trim().to_string();
        }
    }

    debug!("no customer email found");
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpret_summary_full() {
        let text = "Allison Lee\n4230 120TH AVE SE\nBELLEVUE, WA 98006-1188\nUnited States (US)";
        let record = interpret_summary(text).unwrap();
        assert_eq!(record.first_name, "Allison");
        assert_eq!(record.last_name, "Lee");
        assert_eq!(record.address1, "4230 120TH AVE SE");
        assert_eq!(record.city, "BELLEVUE");
        assert_eq!(record.state, "WA");
        assert_eq!(record.postal_code, "98006-1188");
        assert_eq!(record.country, "US");
        assert_eq!(record.source, AddressSource::Suggested);
    }

    #[test]
    fn test_interpret_summary_skips_blank_lines() {
        let text = "Allison Lee\n\n  4230 120TH AVE SE  \n\nBELLEVUE, WA 98006\nCanada (CA)\n";
        let record = interpret_summary(text).unwrap();
        assert_eq!(record.address1, "4230 120TH AVE SE");
        assert_eq!(record.country, "CA");
    }

    #[test]
    fn test_interpret_summary_missing_country_degrades() {
        let text = "Allison Lee\n4230 120TH AVE SE\nBELLEVUE, WA 98006";
        let record = interpret_summary(text).unwrap();
        assert_eq!(record.country, "");
    }

    #[test]
    fn test_interpret_summary_rejects_unparseable_city_line() {
        assert!(interpret_summary("Allison Lee\n4230 120TH AVE SE\nno city line here").is_none());
        assert!(interpret_summary("Allison Lee\n4230 120TH AVE SE").is_none());
        assert!(interpret_summary("").is_none());
    }

    #[test]
    fn test_field_for_label_keywords() {
        assert_eq!(field_for_label("Name"), Some(ManualField::Name));
        assert_eq!(field_for_label("Company name"), Some(ManualField::Company));
        assert_eq!(field_for_label("Phone number"), Some(ManualField::Phone));
        assert_eq!(field_for_label("Address line 1"), Some(ManualField::Address));
        assert_eq!(field_for_label("City"), Some(ManualField::City));
        assert_eq!(field_for_label("State"), Some(ManualField::State));
        assert_eq!(field_for_label("ZIP code"), Some(ManualField::Zip));
        assert_eq!(field_for_label("Postal code"), Some(ManualField::Zip));
        assert_eq!(field_for_label("Country"), Some(ManualField::Country));
        assert_eq!(field_for_label("Weight"), None);
    }

    #[test]
    fn test_normalize_state() {
        assert_eq!(normalize_state(" wa "), "WA");
        assert_eq!(normalize_state("WA"), "WA");
        assert_eq!(normalize_state("Washington"), "Washington");
        assert_eq!(normalize_state("W1"), "W1");
    }

    #[test]
    fn test_assemble_manual_carries_manual_provenance() {
        let record = assemble_manual(vec![
            (ManualField::Name, "Allison Lee".to_string()),
            (ManualField::Address, "4230 120TH AVE SE".to_string()),
            (ManualField::City, "Bellevue".to_string()),
            (ManualField::State, "wa".to_string()),
            (ManualField::Zip, "98006".to_string()),
            (ManualField::Country, "United States (US)".to_string()),
        ])
        .unwrap();

        assert_eq!(record.source, AddressSource::Manual);
        assert_eq!(record.first_name, "Allison");
        assert_eq!(record.address1, "4230 120TH AVE SE");
        assert_eq!(record.state, "WA");
        assert_eq!(record.country, "US");
    }

    #[test]
    fn test_assemble_manual_missing_labels_yield_empty_fields() {
        let record = assemble_manual(vec![(
            ManualField::Address,
            "4230 120TH AVE SE".to_string(),
        )])
        .unwrap();

        assert_eq!(record.first_name, "");
        assert_eq!(record.city, "");
        assert_eq!(record.postal_code, "");
    }

    #[test]
    fn test_assemble_manual_first_nonempty_value_wins() {
        let record = assemble_manual(vec![
            (ManualField::Address, "".to_string()),
            (ManualField::Address, "4230 120TH AVE SE".to_string()),
            (ManualField::City, "Bellevue".to_string()),
            (ManualField::City, "Seattle".to_string()),
        ])
        .unwrap();

        assert_eq!(record.address1, "4230 120TH AVE SE");
        assert_eq!(record.city, "Bellevue");
    }

    #[test]
    fn test_assemble_manual_empty_address_yields_nothing() {
        assert!(assemble_manual(vec![(ManualField::City, "Bellevue".to_string())]).is_none());
        assert!(assemble_manual(Vec::new()).is_none());
    }
}
