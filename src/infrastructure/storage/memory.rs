//! In-process recording store

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::{RecordingStore, StorageError};
use crate::domain::recording::{Recording, RecordingId};

/// Map-backed store; contents vanish with the process
#[derive(Debug, Default)]
pub struct MemoryRecordingStore {
    records: RwLock<BTreeMap<RecordingId, Recording>>,
}

impl MemoryRecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RecordingStore for MemoryRecordingStore {
    async fn put(&self, recording: &Recording) -> Result<(), StorageError> {
        self.records
            .write()
            .await
            .insert(recording.id().clone(), recording.clone());
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<Recording>, StorageError> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn get(&self, id: &RecordingId) -> Result<Recording, StorageError> {
        self.records
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(id.clone()))
    }

    async fn delete(&self, id: &RecordingId) -> Result<(), StorageError> {
        self.records
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(id.clone()))
    }
}
