//! Recording store port interface

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::recording::{Recording, RecordingId};

/// Storage errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Recording not found: {0}")]
    NotFound(RecordingId),

    #[error("Failed to write recording: {0}")]
    WriteFailed(String),

    #[error("Failed to read recording: {0}")]
    ReadFailed(String),
}

/// Port for persisted recordings.
/// Each call is atomic for its own key only.
#[async_trait]
pub trait RecordingStore: Send + Sync {
    /// Insert or replace a recording
    async fn put(&self, recording: &Recording) -> Result<(), StorageError>;

    /// All stored recordings, in no particular order
    async fn get_all(&self) -> Result<Vec<Recording>, StorageError>;

    async fn get(&self, id: &RecordingId) -> Result<Recording, StorageError>;

    /// Remove a recording. Fails with `NotFound` and leaves others untouched
    /// when the id is unknown.
    async fn delete(&self, id: &RecordingId) -> Result<(), StorageError>;
}

#[async_trait]
impl<T: RecordingStore + ?Sized> RecordingStore for Arc<T> {
    async fn put(&self, recording: &Recording) -> Result<(), StorageError> {
        (**self).put(recording).await
    }

    async fn get_all(&self) -> Result<Vec<Recording>, StorageError> {
        (**self).get_all().await
    }

    async fn get(&self, id: &RecordingId) -> Result<Recording, StorageError> {
        (**self).get(id).await
    }

    async fn delete(&self, id: &RecordingId) -> Result<(), StorageError> {
        (**self).delete(id).await
    }
}
