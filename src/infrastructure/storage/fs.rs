//! Directory-backed recording store
//!
//! Layout: one `<id>.json` metadata file and one `<id>.<ext>` audio file per
//! recording. A record exists once its metadata file exists.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

use crate::application::ports::{RecordingStore, StorageError};
use crate::domain::audio::{AudioData, AudioMimeType};
use crate::domain::recording::{Recording, RecordingId, RecordingMetadata};

const METADATA_EXTENSION: &str = "json";

pub struct FsRecordingStore {
    dir: PathBuf,
}

impl FsRecordingStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn metadata_path(&self, id: &RecordingId) -> PathBuf {
        self.dir.join(format!("{}.{}", id, METADATA_EXTENSION))
    }

    fn audio_path(&self, id: &RecordingId, mime: AudioMimeType) -> PathBuf {
        self.dir.join(format!("{}.{}", id, mime.extension()))
    }

    /// Write through a hidden temp file and rename into place
    async fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let tmp = self.dir.join(format!(".{}.tmp", file_name));

        fs::write(&tmp, bytes)
            .await
            .map_err(|e| StorageError::WriteFailed(format!("{}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, path)
            .await
            .map_err(|e| StorageError::WriteFailed(format!("{}: {}", path.display(), e)))
    }

    async fn read_metadata(&self, id: &RecordingId) -> Result<RecordingMetadata, StorageError> {
        let path = self.metadata_path(id);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(id.clone()))
            }
            Err(e) => {
                return Err(StorageError::ReadFailed(format!("{}: {}", path.display(), e)))
            }
        };
        serde_json::from_str(&content)
            .map_err(|e| StorageError::ReadFailed(format!("{}: {}", path.display(), e)))
    }
}

#[async_trait]
impl RecordingStore for FsRecordingStore {
    async fn put(&self, recording: &Recording) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StorageError::WriteFailed(format!("{}: {}", self.dir.display(), e)))?;

        // Audio first so the metadata never points at a missing file
        let audio_path = self.audio_path(recording.id(), recording.mime_type());
        self.write_atomic(&audio_path, recording.audio().data())
            .await?;

        let json = serde_json::to_string_pretty(&recording.metadata())
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;
        self.write_atomic(&self.metadata_path(recording.id()), json.as_bytes())
            .await?;

        debug!(id = %recording.id(), dir = %self.dir.display(), "Recording written");
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<Recording>, StorageError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StorageError::ReadFailed(format!(
                    "{}: {}",
                    self.dir.display(),
                    e
                )))
            }
        };

        let mut recordings = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::ReadFailed(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(METADATA_EXTENSION) {
                continue;
            }
            let Some(id) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<RecordingId>().ok())
            else {
                continue;
            };

            match self.get(&id).await {
                Ok(recording) => recordings.push(recording),
                // Removed concurrently
                Err(StorageError::NotFound(_)) => {}
                Err(e) => warn!(%id, error = %e, "Skipping unreadable recording"),
            }
        }
        Ok(recordings)
    }

    async fn get(&self, id: &RecordingId) -> Result<Recording, StorageError> {
        let meta = self.read_metadata(id).await?;
        let mime: AudioMimeType = meta
            .mime
            .parse()
            .map_err(|e| StorageError::ReadFailed(format!("{}", e)))?;

        let audio_path = self.audio_path(id, mime);
        let bytes = fs::read(&audio_path)
            .await
            .map_err(|e| StorageError::ReadFailed(format!("{}: {}", audio_path.display(), e)))?;

        Ok(Recording::new(
            meta.id,
            meta.name,
            meta.created_at,
            meta.duration_seconds,
            AudioData::new(bytes, mime),
        ))
    }

    async fn delete(&self, id: &RecordingId) -> Result<(), StorageError> {
        let meta = self.read_metadata(id).await?;

        fs::remove_file(self.metadata_path(id))
            .await
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;

        if let Ok(mime) = meta.mime.parse::<AudioMimeType>() {
            match fs::remove_file(self.audio_path(id, mime)).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!(%id, error = %e, "Failed to remove audio file"),
            }
        }
        debug!(%id, "Recording removed");
        Ok(())
    }
}
