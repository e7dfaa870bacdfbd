//! The copy and paste pipelines.
//!
//! Each runs strictly in sequence within one invocation: attach, make
//! the page ready, move the data. Nothing prevents overlapping
//! invocations; the handoff store resolves those as last-write-wins.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::browser::Browser;
use crate::config::Config;
use crate::error::CopyError;
use crate::extract;
use crate::fill;
use crate::record::DestinationRecord;
use crate::store::{HandoffSlip, HandoffStore};
use crate::waiter;

/// Outcome of a copy run.
#[derive(Debug, Clone)]
pub struct CopySummary {
    pub record: DestinationRecord,
    pub saved_at: DateTime<Utc>,
}

/// Outcome of a paste run.
#[derive(Debug, Clone)]
pub struct PasteSummary {
    pub fields_written: usize,
    pub fields_planned: usize,
    pub saved_at: DateTime<Utc>,
}

/// Source side: open the label dialog on the order page, extract the
/// destination, and persist it.
///
/// Extraction failures abort before the save, so a valid previously
/// stored record is never replaced by a partial one.
pub async fn copy_destination(
    config: &Config,
    store: &dyn HandoffStore,
) -> Result<CopySummary, CopyError> {
    let browser = Browser::connect(config.browser.clone()).await?;
    let session = browser.attach_matching(&config.source.url_fragment).await?;

    let dialog = waiter::ensure_dialog_open(&session, &config.source, &config.timing).await?;
    waiter::await_dialog_content(&session, dialog, &config.source, &config.timing).await;
    let section =
        waiter::expand_address_section(&session, dialog, &config.source, &config.timing).await?;

    let mut record =
        extract::extract_destination(&session, dialog, section, &config.source).await?;

    record.order_number = extract::read_order_number(&session, &config.source).await;
    record.email = extract::read_email(&session, &config.source).await;

    let slip = HandoffSlip::new(record.clone());
    store.save(&slip).await?;

    info!(
        "copied destination for order {:?} ({} {}, {:?} source)",
        record.order_number, record.first_name, record.last_name, record.source
    );

    Ok(CopySummary {
        record,
        saved_at: slip.saved_at,
    })
}

/// Destination side: read the stored record and fill the label form.
///
/// Fails only when the store is empty; individual fields degrade with
/// warnings. Repeat pastes re-read the same record until the source
/// side overwrites it.
pub async fn paste_destination(
    config: &Config,
    store: &dyn HandoffStore,
) -> Result<PasteSummary, CopyError> {
    let slip = store.load().await?.ok_or(CopyError::NothingCopied)?;

    let browser = Browser::connect(config.browser.clone()).await?;
    let session = browser.attach_matching(&config.dest.url_fragment).await?;

    let plan = fill::plan_writes(&slip.destination, &config.dest);
    let written = fill::apply_writes(&session, &plan).await?;

    if written < plan.len() {
        warn!("wrote {} of {} planned fields", written, plan.len());
    } else {
        info!("wrote all {} fields", written);
    }

    Ok(PasteSummary {
        fields_written: written,
        fields_planned: plan.len(),
        saved_at: slip.saved_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::AddressSource;
    use crate::store::MemoryHandoffStore;

    #[tokio::test]
    async fn test_paste_with_empty_store_is_a_precondition_failure() {
        // The store check runs before any browser work, so an empty
        // store must fail cleanly without a browser present.
        let store = MemoryHandoffStore::new();
        let err = paste_destination(&Config::default(), &store).await.unwrap_err();
        assert!(matches!(err, CopyError::NothingCopied));
    }

    #[tokio::test]
    async fn test_store_round_trip_preserves_every_field() {
        let record = DestinationRecord {
            first_name: "Allison".to_string(),
            last_name: "Lee".to_string(),
            company: "Wanderella".to_string(),
            phone: "206-555-0100".to_string(),
            address1: "4230 120TH AVE SE".to_string(),
            address2: "Unit 7".to_string(),
            city: "BELLEVUE".to_string(),
            state: "WA".to_string(),
            postal_code: "98006-1188".to_string(),
            country: "US".to_string(),
            order_number: "29703".to_string(),
            email: "allison@example.com".to_string(),
            source: AddressSource::Manual,
        };

        let store = MemoryHandoffStore::new();
        store.save(&HandoffSlip::new(record.clone())).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.destination, record);
    }
}
