//! The destination record and its normalization rules.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Which extraction strategy produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressSource {
    /// Read from the selected pre-validated suggestion card.
    Suggested,
    /// Read from the manual/expanded form fields.
    Manual,
}

/// Canonical destination address exchanged between the two pipelines.
///
/// Serialized with camelCase keys; the stored JSON is the same shape
/// both pipelines agree on, so a round-trip through the handoff store
/// is lossless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationRecord {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub phone: String,
    pub address1: String,
    pub address2: String,
    pub city: String,
    /// Upper-case 2-letter code when present.
    pub state: String,
    pub postal_code: String,
    /// Upper-case 2-letter code when derivable, raw text otherwise.
    pub country: String,
    pub order_number: String,
    pub email: String,
    pub source: AddressSource,
}

/// Split-out city/state/zip triple.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CityStateZip {
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

static CITY_STATE_ZIP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(.+?),\s*([A-Z]{2})\s+(\d{5}(?:-\d{4})?)$").unwrap());

static COUNTRY_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([A-Z]{2})\)\s*$").unwrap());

static ORDER_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Order\s*#\s*(\d+)").unwrap());

/// Split a full name on whitespace: first token is the first name, the
/// rest joined with single spaces is the last name. Empty input yields
/// empty strings for both.
pub fn split_name(full: &str) -> (String, String) {
    let mut parts = full.split_whitespace();
    let first = parts.next().unwrap_or("").to_string();
    let last = parts.collect::<Vec<_>>().join(" ");
    (first, last)
}

/// Parse a combined `"City, ST 12345[-6789]"` line.
///
/// Non-matching input degrades to empty fields rather than an error;
/// partial data is still useful downstream.
pub fn parse_city_state_zip(line: &str) -> CityStateZip {
    let s = line.trim();
    match CITY_STATE_ZIP_RE.captures(s) {
        Some(caps) => CityStateZip {
            city: caps[1].trim().to_string(),
            state: caps[2].to_uppercase(),
            postal_code: caps[3].to_string(),
        },
        None => CityStateZip::default(),
    }
}

/// Normalize a country line: `"United States (US)"` → `"US"`; anything
/// without a trailing parenthesized 2-letter code passes through
/// trimmed.
pub fn normalize_country(line: &str) -> String {
    let s = line.trim();
    match COUNTRY_CODE_RE.captures(s) {
        Some(caps) => caps[1].to_string(),
        None => s.to_string(),
    }
}

/// Extract the digit run from a heading like `"Order #29703 details"`.
/// Absent pattern yields an empty string.
pub fn extract_order_number(heading: &str) -> String {
    ORDER_NUMBER_RE
        .captures(heading.trim())
        .map(|caps| caps[1].to_string())
        .unwrap_or_default()
}
