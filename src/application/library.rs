//! Recording library use case: browse, inspect, export and delete

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::domain::recording::{Recording, RecordingId, RecordingMetadata};

use super::ports::{RecordingStore, StorageError};

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Recording not found: {0}")]
    NotFound(RecordingId),

    #[error(transparent)]
    Storage(StorageError),

    #[error("Failed to export recording: {0}")]
    ExportFailed(String),
}

impl From<StorageError> for LibraryError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(id) => Self::NotFound(id),
            other => Self::Storage(other),
        }
    }
}

/// Read and management operations over a recording store
pub struct RecordingLibrary<S: RecordingStore> {
    store: S,
}

impl<S: RecordingStore> RecordingLibrary<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All recordings, newest first
    pub async fn list(&self) -> Result<Vec<Recording>, LibraryError> {
        let mut recordings = self.store.get_all().await?;
        recordings.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(a.id()))
        });
        debug!(count = recordings.len(), "Listed recordings");
        Ok(recordings)
    }

    pub async fn info(&self, id: &RecordingId) -> Result<RecordingMetadata, LibraryError> {
        Ok(self.store.get(id).await?.metadata())
    }

    pub async fn load(&self, id: &RecordingId) -> Result<Recording, LibraryError> {
        Ok(self.store.get(id).await?)
    }

    /// Write the audio of `id` into `dir` under its export file name.
    /// An existing file with that name is replaced.
    pub async fn export(&self, id: &RecordingId, dir: &Path) -> Result<PathBuf, LibraryError> {
        let recording = self.store.get(id).await?;

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| LibraryError::ExportFailed(format!("{}: {}", dir.display(), e)))?;

        let path = dir.join(recording.export_file_name());
        tokio::fs::write(&path, recording.audio().data())
            .await
            .map_err(|e| LibraryError::ExportFailed(format!("{}: {}", path.display(), e)))?;

        info!(%id, path = %path.display(), "Recording exported");
        Ok(path)
    }

    pub async fn delete(&self, id: &RecordingId) -> Result<(), LibraryError> {
        self.store.delete(id).await?;
        info!(%id, "Recording deleted");
        Ok(())
    }
}
