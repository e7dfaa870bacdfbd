//! End-to-end handoff: a suggestion summary extracted on the source
//! side must survive the store round-trip and come out of write
//! planning with the same values the destination form expects.

use shipclip_core::config::DestConfig;
use shipclip_core::extract::interpret_summary;
use shipclip_core::fill::{WriteKind, plan_writes};
use shipclip_core::{AddressSource, FileHandoffStore, HandoffSlip, HandoffStore};

#[tokio::test]
async fn summary_to_form_values_is_lossless() {
    let summary = "Allison Lee\n4230 120TH AVE SE\nBELLEVUE, WA 98006-1188\nUnited States (US)";

    let mut record = interpret_summary(summary).expect("summary should parse");
    record.order_number = "29703".to_string();
    record.email = "allison@example.com".to_string();
    assert_eq!(record.source, AddressSource::Suggested);

    // Through the file store, as the copy pipeline would persist it.
    let dir = tempfile::TempDir::new().unwrap();
    let store = FileHandoffStore::new(dir.path().join("handoff.json"));
    store.save(&HandoffSlip::new(record.clone())).await.unwrap();
    let loaded = store.load().await.unwrap().unwrap();
    assert_eq!(loaded.destination, record);

    // Into the form's field ids, as the paste pipeline would write it.
    let plan = plan_writes(&loaded.destination, &DestConfig::default());
    let value_of = |id: &str| {
        plan.iter()
            .find(|w| w.element_id == id)
            .map(|w| w.value.clone())
            .unwrap()
    };

    assert_eq!(value_of("FirstName_DA"), "Allison");
    assert_eq!(value_of("LastName_DA"), "Lee");
    assert_eq!(value_of("Address1_DA"), "4230 120TH AVE SE");
    assert_eq!(value_of("City_DA"), "BELLEVUE");
    assert_eq!(value_of("State_DA"), "WA");
    assert_eq!(value_of("Zip_DA"), "98006-1188");
    assert_eq!(value_of("OrderNumber"), "29703");
    assert_eq!(value_of("RecipientEmail"), "allison@example.com");

    let state = plan.iter().find(|w| w.element_id == "State_DA").unwrap();
    assert_eq!(state.kind, WriteKind::Select);

    // Planning again from the same stored record yields the same plan.
    assert_eq!(plan, plan_writes(&loaded.destination, &DestConfig::default()));
}
