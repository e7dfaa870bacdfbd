//! Error taxonomy for the copy/paste pipelines.

use std::fmt;

use thiserror::Error;

use shipclip_cdp::CdpError;

use crate::config::ConfigError;
use crate::store::StoreError;

/// Pipeline errors.
///
/// Extraction errors abort the whole copy operation so a partial record
/// never overwrites a valid previous one. Fill-side problems below the
/// whole-operation level (missing control, unmatched option) are not
/// errors at all; they degrade per field with a warning.
#[derive(Debug, Error)]
pub enum CopyError {
    /// A required element never appeared within the readiness timeout.
    #[error("element not found: {locator}")]
    NotFound { locator: String },

    /// The control needed to proceed is missing; failed fast, no wait.
    #[error("action unavailable: {0}")]
    ActionUnavailable(String),

    /// Both extraction strategies came up empty.
    #[error("no verified address found in dialog ({0})")]
    NoAddressFound(CopyDiagnostics),

    /// Handoff store read/write failed.
    #[error("handoff store failure: {0}")]
    Storage(#[from] StoreError),

    /// Nothing in the store at paste time; user-facing precondition.
    #[error("nothing copied yet; run `shipclip copy` first")]
    NothingCopied,

    /// CDP transport or protocol failure.
    #[error("browser failure: {0}")]
    Browser(#[from] CdpError),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Context gathered when extraction fails, mirrored into the log so a
/// markup change on the host site can be diagnosed from the report
/// alone.
#[derive(Debug, Default, Clone)]
pub struct CopyDiagnostics {
    /// Whether the dialog root was located at all.
    pub dialog_found: bool,
    /// Whether any suggestion-card markup was present.
    pub suggestion_markup: bool,
    /// Whether any manual-form labels were present.
    pub manual_markup: bool,
    /// Order number, when one was readable.
    pub order_number: String,
}

impl fmt::Display for CopyDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dialog_found={}, suggestion_markup={}, manual_markup={}, order_number={:?}",
            self.dialog_found, self.suggestion_markup, self.manual_markup, self.order_number
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_display() {
        let diag = CopyDiagnostics {
            dialog_found: true,
            suggestion_markup: false,
            manual_markup: true,
            order_number: "29703".to_string(),
        };
        let rendered = diag.to_string();
        assert!(rendered.contains("dialog_found=true"));
        assert!(rendered.contains("suggestion_markup=false"));
        assert!(rendered.contains("29703"));
    }

    #[test]
    fn test_no_address_found_message_carries_context() {
        let err = CopyError::NoAddressFound(CopyDiagnostics::default());
        let rendered = err.to_string();
        assert!(rendered.contains("no verified address"));
        assert!(rendered.contains("dialog_found=false"));
    }
}
