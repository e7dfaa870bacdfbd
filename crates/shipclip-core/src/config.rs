//! Configuration schema and loader.
//!
//! Everything that ties the pipelines to a specific host site's markup
//! (selectors, element ids, text patterns, URL fragments) lives here
//! so a markup change on either site means editing the config, not the
//! pipelines. Defaults match the markup observed on the supported
//! sites.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub dest: DestConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}

/// Browser connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Remote debugging port.
    #[serde(default = "default_debug_port")]
    pub debug_port: u16,

    /// Launch a browser when none is listening on the port.
    #[serde(default = "default_true")]
    pub launch: bool,

    /// Profile directory for a launched browser, so logins persist
    /// across runs. Default: ~/.shipclip/browser-profile
    #[serde(default)]
    pub profile_dir: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            debug_port: default_debug_port(),
            launch: true,
            profile_dir: None,
        }
    }
}

impl BrowserConfig {
    /// Get the CDP endpoint URL.
    pub fn endpoint(&self) -> String {
        format!("http://localhost:{}", self.debug_port)
    }

    /// Get the profile directory, creating the default if unset.
    pub fn get_profile_dir(&self) -> PathBuf {
        self.profile_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".shipclip")
                .join("browser-profile")
        })
    }
}

/// Handoff store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Handoff file path. Default: ~/.shipclip/handoff.json
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    /// Get the handoff file path, falling back to the default location.
    pub fn get_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".shipclip")
                .join("handoff.json")
        })
    }
}

/// Wait and settle timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Readiness timeout for required elements, in milliseconds.
    #[serde(default = "default_wait_timeout_ms")]
    pub wait_timeout_ms: u64,

    /// DOM poll interval, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Upper bound for the post-open settle poll, in milliseconds.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            wait_timeout_ms: default_wait_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            settle_ms: default_settle_ms(),
        }
    }
}

impl TimingConfig {
    pub fn wait_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.wait_timeout_ms)
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.poll_interval_ms)
    }

    pub fn settle(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.settle_ms)
    }
}

/// Selector table for the order-management site (the copy side).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// URL fragment identifying the order page among open tabs.
    #[serde(default = "default_source_url_fragment")]
    pub url_fragment: String,

    /// The shipping-label dialog root.
    #[serde(default = "default_dialog_selector")]
    pub dialog_selector: String,

    /// Generic dialog roots accepted when their text matches
    /// `dialog_title_pattern`.
    #[serde(default = "default_generic_dialog_selectors")]
    pub generic_dialog_selectors: Vec<String>,

    /// Case-insensitive pattern the generic dialog's text must match.
    #[serde(default = "default_dialog_title_pattern")]
    pub dialog_title_pattern: String,

    /// The control that opens the dialog, by class.
    #[serde(default = "default_open_button_selector")]
    pub open_button_selector: String,

    /// The control that opens the dialog, by exact visible text
    /// (matched case-insensitively when the class lookup fails).
    #[serde(default = "default_open_button_text")]
    pub open_button_text: String,

    /// A suggestion card (any of the mutually exclusive options).
    #[serde(default = "default_suggestion_card")]
    pub suggestion_card: String,

    /// The selected suggestion card.
    #[serde(default = "default_suggestion_selected")]
    pub suggestion_selected: String,

    /// The checked choice control inside a suggestion card.
    #[serde(default = "default_suggestion_choice")]
    pub suggestion_choice: String,

    /// The multi-line summary block inside a suggestion card.
    #[serde(default = "default_suggestion_summary")]
    pub suggestion_summary: String,

    /// Collapsible section containers inside the dialog.
    #[serde(default = "default_section_container")]
    pub section_container: String,

    /// Toggle control inside a section container.
    #[serde(default = "default_section_toggle")]
    pub section_toggle: String,

    /// Case-insensitive pattern the section heading must match.
    #[serde(default = "default_section_heading_pattern")]
    pub section_heading_pattern: String,

    /// Heading carrying the order number.
    #[serde(default = "default_order_heading_selector")]
    pub order_heading_selector: String,

    /// Input carrying the customer email (outside the dialog).
    #[serde(default = "default_email_input_selector")]
    pub email_input_selector: String,

    /// Mailto link fallback for the customer email.
    #[serde(default = "default_email_mailto_selector")]
    pub email_mailto_selector: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url_fragment: default_source_url_fragment(),
            dialog_selector: default_dialog_selector(),
            generic_dialog_selectors: default_generic_dialog_selectors(),
            dialog_title_pattern: default_dialog_title_pattern(),
            open_button_selector: default_open_button_selector(),
            open_button_text: default_open_button_text(),
            suggestion_card: default_suggestion_card(),
            suggestion_selected: default_suggestion_selected(),
            suggestion_choice: default_suggestion_choice(),
            suggestion_summary: default_suggestion_summary(),
            section_container: default_section_container(),
            section_toggle: default_section_toggle(),
            section_heading_pattern: default_section_heading_pattern(),
            order_heading_selector: default_order_heading_selector(),
            email_input_selector: default_email_input_selector(),
            email_mailto_selector: default_email_mailto_selector(),
        }
    }
}

/// Field-id map for the label-printing site (the paste side).
///
/// Empty ids disable a field. `state` names a select control; the rest
/// are plain value controls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestConfig {
    /// URL fragment identifying the label form among open tabs.
    #[serde(default = "default_dest_url_fragment")]
    pub url_fragment: String,

    #[serde(default = "default_first_name_id")]
    pub first_name: String,

    #[serde(default = "default_last_name_id")]
    pub last_name: String,

    #[serde(default = "default_company_id")]
    pub company: String,

    #[serde(default)]
    pub phone: String,

    #[serde(default = "default_address1_id")]
    pub address1: String,

    #[serde(default = "default_address2_id")]
    pub address2: String,

    #[serde(default = "default_city_id")]
    pub city: String,

    #[serde(default = "default_state_id")]
    pub state: String,

    #[serde(default = "default_zip_id")]
    pub zip: String,

    #[serde(default)]
    pub country: String,

    #[serde(default = "default_order_number_id")]
    pub order_number: String,

    #[serde(default = "default_email_id")]
    pub email: String,
}

impl Default for DestConfig {
    fn default() -> Self {
        Self {
            url_fragment: default_dest_url_fragment(),
            first_name: default_first_name_id(),
            last_name: default_last_name_id(),
            company: default_company_id(),
            phone: String::new(),
            address1: default_address1_id(),
            address2: default_address2_id(),
            city: default_city_id(),
            state: default_state_id(),
            zip: default_zip_id(),
            country: String::new(),
            order_number: default_order_number_id(),
            email: default_email_id(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_debug_port() -> u16 {
    9222
}

fn default_wait_timeout_ms() -> u64 {
    12_000
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_settle_ms() -> u64 {
    2_000
}

fn default_source_url_fragment() -> String {
    "wp-admin/post.php".to_string()
}

fn default_dialog_selector() -> String {
    ".components-modal__frame.woocommerce.label-purchase-modal".to_string()
}

fn default_generic_dialog_selectors() -> Vec<String> {
    vec![
        "[role=\"dialog\"]".to_string(),
        ".components-modal__frame".to_string(),
        ".woocommerce-shipping-label__modal".to_string(),
    ]
}

fn default_dialog_title_pattern() -> String {
    "(?i)create shipping label".to_string()
}

fn default_open_button_selector() -> String {
    "button.shipping-label__new-label-button".to_string()
}

fn default_open_button_text() -> String {
    "create shipping label".to_string()
}

fn default_suggestion_card() -> String {
    "label.address-step__suggestion".to_string()
}

fn default_suggestion_selected() -> String {
    "label.address-step__suggestion.is-selected".to_string()
}

fn default_suggestion_choice() -> String {
    "label.address-step__suggestion input[type='radio']:checked".to_string()
}

fn default_suggestion_summary() -> String {
    ".address-step__summary".to_string()
}

fn default_section_container() -> String {
    ".components-panel__body".to_string()
}

fn default_section_toggle() -> String {
    "button.components-panel__body-toggle".to_string()
}

fn default_section_heading_pattern() -> String {
    "(?i)address".to_string()
}

fn default_order_heading_selector() -> String {
    "h2.woocommerce-order-data__heading".to_string()
}

fn default_email_input_selector() -> String {
    "#_billing_email".to_string()
}

fn default_email_mailto_selector() -> String {
    ".order_data_column .address a[href^='mailto:']".to_string()
}

fn default_dest_url_fragment() -> String {
    "lettertrack".to_string()
}

fn default_first_name_id() -> String {
    "FirstName_DA".to_string()
}

fn default_last_name_id() -> String {
    "LastName_DA".to_string()
}

fn default_company_id() -> String {
    "Company_DA".to_string()
}

fn default_address1_id() -> String {
    "Address1_DA".to_string()
}

fn default_address2_id() -> String {
    "Address2_DA".to_string()
}

fn default_city_id() -> String {
    "City_DA".to_string()
}

fn default_state_id() -> String {
    "State_DA".to_string()
}

fn default_zip_id() -> String {
    "Zip_DA".to_string()
}

fn default_order_number_id() -> String {
    "OrderNumber".to_string()
}

fn default_email_id() -> String {
    "RecipientEmail".to_string()
}
