//! Handoff store.
//!
//! The two pipelines exchange exactly one document: the latest copied
//! destination plus the time it was saved. Each save fully replaces the
//! prior document in a single file write, which is all the atomicity
//! the contract needs; concurrent copies resolve to last-write-wins.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use tracing::debug;

use crate::record::DestinationRecord;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The stored handoff document: one record and its save time, written
/// together.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandoffSlip {
    pub destination: DestinationRecord,
    pub saved_at: DateTime<Utc>,
}

impl HandoffSlip {
    /// Wrap a record with the current time.
    pub fn new(destination: DestinationRecord) -> Self {
        Self {
            destination,
            saved_at: Utc::now(),
        }
    }
}

/// Async key-value handoff between the copy and paste pipelines.
///
/// `load` returning `Ok(None)` means "nothing copied yet": a
/// user-facing precondition, not a system error. The paste pipeline
/// never mutates or deletes the stored document.
#[async_trait]
pub trait HandoffStore: Send + Sync {
    /// Load the current handoff document, if any.
    async fn load(&self) -> Result<Option<HandoffSlip>, StoreError>;

    /// Save a handoff document, replacing any prior one.
    async fn save(&self, slip: &HandoffSlip) -> Result<(), StoreError>;
}

/// In-memory store for tests.
pub struct MemoryHandoffStore {
    slip: tokio::sync::RwLock<Option<HandoffSlip>>,
}

impl MemoryHandoffStore {
    pub fn new() -> Self {
        Self {
            slip: tokio::sync::RwLock::new(None),
        }
    }
}

impl Default for MemoryHandoffStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HandoffStore for MemoryHandoffStore {
    async fn load(&self) -> Result<Option<HandoffSlip>, StoreError> {
        Ok(self.slip.read().await.clone())
    }

    async fn save(&self, slip: &HandoffSlip) -> Result<(), StoreError> {
        *self.slip.write().await = Some(slip.clone());
        Ok(())
    }
}

/// File-backed store: a single JSON document at a fixed path.
pub struct FileHandoffStore {
    path: PathBuf,
}

impl FileHandoffStore {
    /// Create a store at the given file path. The parent directory is
    /// created on the first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file path this store reads and writes.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl HandoffStore for FileHandoffStore {
    async fn load(&self) -> Result<Option<HandoffSlip>, StoreError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => {
                let slip: HandoffSlip = serde_json::from_str(&content)?;
                Ok(Some(slip))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, slip: &HandoffSlip) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(slip)?;
        fs::write(&self.path, content).await?;

        debug!("saved handoff for order {:?} to {:?}", slip.destination.order_number, self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::AddressSource;
    use tempfile::TempDir;

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

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryHandoffStore::new();
        assert!(store.load().await.unwrap().is_none());

        let slip = HandoffSlip::new(sample_record());
        store.save(&slip).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.destination, sample_record());
        assert_eq!(loaded.saved_at, slip.saved_at);
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileHandoffStore::new(temp_dir.path().join("handoff.json"));

        let slip = HandoffSlip::new(sample_record());
        store.save(&slip).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.destination, slip.destination);
    }

    #[tokio::test]
    async fn test_file_store_absent_file_means_nothing_copied() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileHandoffStore::new(temp_dir.path().join("handoff.json"));

        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileHandoffStore::new(temp_dir.path().join("nested/deeper/handoff.json"));

        store.save(&HandoffSlip::new(sample_record())).await.unwrap();
        assert!(store.load().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_save_replaces_prior_document() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileHandoffStore::new(temp_dir.path().join("handoff.json"));

        store.save(&HandoffSlip::new(sample_record())).await.unwrap();

        let mut second = sample_record();
        second.order_number = "30001".to_string();
        second.source = AddressSource::Manual;
        store.save(&HandoffSlip::new(second.clone())).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.destination, second);
    }

    #[tokio::test]
    async fn test_stored_json_keeps_record_shape() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("handoff.json");
        let store = FileHandoffStore::new(&path);

        store.save(&HandoffSlip::new(sample_record())).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"destination\""));
        assert!(raw.contains("\"savedAt\""));
        assert!(raw.contains("\"firstName\": \"Allison\""));
    }
}
