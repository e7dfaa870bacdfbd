//! Record writer for the label-printing form.
//!
//! Writing is best-effort per field: a missing control or an unmatched
//! select option skips that field and never aborts the rest. The write
//! plan itself is a pure function of the record and the field map, so
//! planning is deterministic and repeat fills produce identical plans.

use tracing::{debug, warn};

use shipclip_cdp::TabSession;

use crate::config::DestConfig;
use crate::dom::{self, SelectOption};
use crate::error::CopyError;
use crate::record::DestinationRecord;

/// How a planned write is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    /// Plain value control: set value, dispatch events.
    Text,
    /// Select control: resolve the option first, then set its value.
    Select,
}

/// One planned field write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldWrite {
    pub element_id: String,
    pub value: String,
    pub kind: WriteKind,
}

/// Build the ordered write plan for a record.
///
/// Fields whose element id is configured empty are omitted. Absent
/// record values still produce writes of the empty string, clearing any
/// stale content in the form.
pub fn plan_writes(record: &DestinationRecord, dest: &DestConfig) -> Vec<FieldWrite> {
    let entries: [(&str, &str, WriteKind); 12] = [
        (&dest.first_name, &record.first_name, WriteKind::Text),
        (&dest.last_name, &record.last_name, WriteKind::Text),
        (&dest.company, &record.company, WriteKind::Text),
        (&dest.phone, &record.phone, WriteKind::Text),
        (&dest.address1, &record.address1, WriteKind::Text),
        (&dest.address2, &record.address2, WriteKind::Text),
        (&dest.city, &record.city, WriteKind::Text),
        (&dest.state, &record.state, WriteKind::Select),
        (&dest.zip, &record.postal_code, WriteKind::Text),
        (&dest.country, &record.country, WriteKind::Select),
        (&dest.order_number, &record.order_number, WriteKind::Text),
        (&dest.email, &record.email, WriteKind::Text),
    ];

    entries
        .into_iter()
        .filter(|(id, _, _)| !id.is_empty())
        .map(|(id, value, kind)| FieldWrite {
            element_id: id.to_string(),
            value: value.to_string(),
            kind,
        })
        .collect()
}

/// Resolve a select target against the control's options.
///
/// A target matches an option by value (case-insensitive equality) or
/// by label starting with the target followed by a space, so the
/// 2-letter code "WA" picks an option labeled "WA Washington".
pub fn match_select_option(options: &[SelectOption], target: &str) -> Option<String> {
    let wanted = target.trim().to_uppercase();
    if wanted.is_empty() {
        return None;
    }

    options
        .iter()
        .find(|o| {
            let value = o.value.trim().to_uppercase();
            let label = o.label.trim().to_uppercase();
            value == wanted || label.starts_with(&format!("{} ", wanted))
        })
        .map(|o| o.value.clone())
}

/// Apply a write plan to the page. Returns the number of fields
/// actually written.
pub async fn apply_writes(
    session: &TabSession,
    plan: &[FieldWrite],
) -> Result<usize, CopyError> {
    let mut written = 0;

    for write in plan {
        match apply_one(session, write).await {
            Ok(true) => written += 1,
            Ok(false) => {}
            Err(e) => {
                // Per-field best effort: log and keep going.
                warn!("failed to write {:?}: {}", write.element_id, e);
            }
        }
    }

    Ok(written)
}

async fn apply_one(session: &TabSession, write: &FieldWrite) -> Result<bool, CopyError> {
    let Some(node) = dom::by_element_id(session, &write.element_id).await? else {
        debug!("control {:?} not on page, skipping", write.element_id);
        return Ok(false);
    };

    match write.kind {
        WriteKind::Text => {
            dom::set_value_with_events(session, node, &write.value).await?;
            Ok(true)
        }
        WriteKind::Select => {
            let options = dom::select_options(session, node).await?;
            match match_select_option(&options, &write.value) {
                Some(option_value) => {
                    dom::set_value_with_events(session, node, &option_value).await?;
                    Ok(true)
                }
                None => {
                    warn!(
                        "no option matching {:?} in select {:?}, leaving unchanged",
                        write.value, write.element_id
                    );
                    Ok(false)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::AddressSource;

    fn sample_record() -> DestinationRecord {
        DestinationRecord {
            first_name: "Allison".to_string(),
            last_name: "Lee".to_string(),
            company: String::new(),
            phone: String::new(),
            address1: "4230 120TH AVE SE".to_string(),
            address2: String::new(),
            city: "BELLEVUE".to_string(),
            state: "WA".to_string(),
            postal_code: "98006-1188".to_string(),
            country: "US".to_string(),
            order_number: "29703".to_string(),
            email: "allison@example.com".to_string(),
            source: AddressSource::Suggested,
        }
    }

    fn wa_ca_options() -> Vec<SelectOption> {
        vec![
            SelectOption {
                value: "WA".to_string(),
                label: "WA Washington".to_string(),
            },
            SelectOption {
                value: "CA".to_string(),
                label: "CA California".to_string(),
            },
        ]
    }

    #[test]
    fn test_match_select_option_by_value() {
        assert_eq!(match_select_option(&wa_ca_options(), "WA"), Some("WA".to_string()));
        assert_eq!(match_select_option(&wa_ca_options(), "ca"), Some("CA".to_string()));
    }

    #[test]
    fn test_match_select_option_by_label_prefix() {
        let options = vec![
            SelectOption {
                value: "us-wa".to_string(),
                label: "WA Washington".to_string(),
            },
            SelectOption {
                value: "us-ca".to_string(),
                label: "CA California".to_string(),
            },
        ];
        assert_eq!(match_select_option(&options, "wa"), Some("us-wa".to_string()));
    }

    #[test]
    fn test_match_select_option_label_prefix_requires_space() {
        let options = vec![SelectOption {
            value: "x".to_string(),
            label: "WAX paper".to_string(),
        }];
        assert_eq!(match_select_option(&options, "WA"), None);
    }

    #[test]
    fn test_match_select_option_no_match_or_empty_target() {
        assert_eq!(match_select_option(&wa_ca_options(), "OR"), None);
        assert_eq!(match_select_option(&wa_ca_options(), ""), None);
        assert_eq!(match_select_option(&[], "WA"), None);
    }

    #[test]
    fn test_plan_covers_configured_fields_in_order() {
        let plan = plan_writes(&sample_record(), &DestConfig::default());

        // phone and country ids default to empty and are omitted.
        let ids: Vec<&str> = plan.iter().map(|w| w.element_id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "FirstName_DA",
                "LastName_DA",
                "Company_DA",
                "Address1_DA",
                "Address2_DA",
                "City_DA",
                "State_DA",
                "Zip_DA",
                "OrderNumber",
                "RecipientEmail",
            ]
        );

        let state = plan.iter().find(|w| w.element_id == "State_DA").unwrap();
        assert_eq!(state.kind, WriteKind::Select);
        assert_eq!(state.value, "WA");
    }

    #[test]
    fn test_plan_writes_empty_string_for_absent_fields() {
        let plan = plan_writes(&sample_record(), &DestConfig::default());
        let company = plan.iter().find(|w| w.element_id == "Company_DA").unwrap();
        assert_eq!(company.value, "");
        assert_eq!(company.kind, WriteKind::Text);
    }

    #[test]
    fn test_plan_is_idempotent() {
        let record = sample_record();
        let dest = DestConfig::default();
        assert_eq!(plan_writes(&record, &dest), plan_writes(&record, &dest));
    }

    #[test]
    fn test_plan_includes_optional_fields_when_configured() {
        let dest = DestConfig {
            phone: "Phone_DA".to_string(),
            country: "Country_DA".to_string(),
            ..DestConfig::default()
        };
        let plan = plan_writes(&sample_record(), &dest);
        assert!(plan.iter().any(|w| w.element_id == "Phone_DA"));
        let country = plan.iter().find(|w| w.element_id == "Country_DA").unwrap();
        assert_eq!(country.kind, WriteKind::Select);
    }
}
