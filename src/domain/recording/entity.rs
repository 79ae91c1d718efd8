//! Recording entity

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::audio::{AudioData, AudioMimeType};
use crate::domain::error::InvalidRecordingIdError;

/// Default prefix for generated recording names
pub const DEFAULT_NAME_PREFIX: &str = "Recording";

/// Exclusive upper bound of the random id suffix
const ID_SUFFIX_RANGE: u32 = 10_000;

/// Opaque recording identifier: `<unix-millis>-<random suffix>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordingId(String);

impl RecordingId {
    /// Generate a new id for a recording finalized at `now`
    pub fn generate(now: DateTime<Utc>) -> Self {
        let suffix = rand::rng().random_range(0..ID_SUFFIX_RANGE);
        Self(format!("{}-{}", now.timestamp_millis(), suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_valid(input: &str) -> bool {
        !input.is_empty()
            && input
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }
}

impl FromStr for RecordingId {
    type Err = InvalidRecordingIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if Self::is_valid(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(InvalidRecordingIdError {
                input: s.to_string(),
            })
        }
    }
}

impl TryFrom<String> for RecordingId {
    type Error = InvalidRecordingIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RecordingId> for String {
    fn from(id: RecordingId) -> Self {
        id.0
    }
}

impl fmt::Display for RecordingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A finalized voice memo. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    id: RecordingId,
    name: String,
    created_at: DateTime<Utc>,
    duration_seconds: f64,
    audio: AudioData,
}

impl Recording {
    pub fn new(
        id: RecordingId,
        name: impl Into<String>,
        created_at: DateTime<Utc>,
        duration_seconds: f64,
        audio: AudioData,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            created_at,
            duration_seconds: duration_seconds.max(0.0),
            audio,
        }
    }

    pub fn id(&self) -> &RecordingId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    pub fn audio(&self) -> &AudioData {
        &self.audio
    }

    pub fn mime_type(&self) -> AudioMimeType {
        self.audio.mime_type()
    }

    pub fn size_bytes(&self) -> u64 {
        self.audio.size_bytes() as u64
    }

    /// Size in kilobytes, rounded to the nearest whole KB
    pub fn size_kb(&self) -> u64 {
        (self.size_bytes() as f64 / 1024.0).round() as u64
    }

    /// File name offered when exporting the audio blob.
    ///
    /// Every run of whitespace in the name becomes a single `_` and the
    /// extension of the captured container is appended.
    pub fn export_file_name(&self) -> String {
        let mut stem = String::with_capacity(self.name.len());
        let mut in_whitespace = false;
        for ch in self.name.chars() {
            if ch.is_whitespace() {
                if !in_whitespace {
                    stem.push('_');
                }
                in_whitespace = true;
            } else {
                // Path separators never leave the export directory
                stem.push(if ch == '/' || ch == '\\' { '-' } else { ch });
                in_whitespace = false;
            }
        }
        if stem.is_empty() {
            stem.push_str(self.id.as_str());
        }
        format!("{}.{}", stem, self.mime_type().extension())
    }

    /// Metadata view persisted next to the audio blob
    pub fn metadata(&self) -> RecordingMetadata {
        RecordingMetadata {
            id: self.id.clone(),
            name: self.name.clone(),
            created_at: self.created_at,
            duration_seconds: self.duration_seconds,
            mime: self.mime_type().as_str().to_string(),
            size_bytes: self.size_bytes(),
        }
    }
}

/// Persisted record shape, without the audio bytes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub id: RecordingId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub duration_seconds: f64,
    pub mime: String,
    pub size_bytes: u64,
}

/// Default display name: prefix followed by the local time of day
pub fn default_name(prefix: &str, at: DateTime<Local>) -> String {
    format!("{} {}", prefix, at.format("%H:%M:%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(name: &str) -> Recording {
        Recording::new(
            "1700000000000-42".parse().unwrap(),
            name,
            Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
            3.0,
            AudioData::new(vec![0u8; 3000], AudioMimeType::Flac),
        )
    }

    #[test]
    fn generated_id_has_timestamp_and_suffix() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let id = RecordingId::generate(now);
        let (millis, suffix) = id.as_str().split_once('-').unwrap();
        assert_eq!(millis, "1700000000123");
        assert!(suffix.parse::<u32>().unwrap() < ID_SUFFIX_RANGE);
    }

    #[test]
    fn id_rejects_path_characters() {
        assert!("../etc/passwd".parse::<RecordingId>().is_err());
        assert!("".parse::<RecordingId>().is_err());
        assert!("a b".parse::<RecordingId>().is_err());
        assert!("1700000000000-7".parse::<RecordingId>().is_ok());
    }

    #[test]
    fn export_name_collapses_whitespace() {
        let rec = sample("Recording  10:15:02\tmorning");
        assert_eq!(rec.export_file_name(), "Recording_10:15:02_morning.flac");
    }

    #[test]
    fn export_name_keeps_leading_whitespace_as_underscore() {
        let rec = sample(" memo ");
        assert_eq!(rec.export_file_name(), "_memo_.flac");
    }

    #[test]
    fn export_name_replaces_separators() {
        let rec = sample("a/b");
        assert_eq!(rec.export_file_name(), "a-b.flac");
    }

    #[test]
    fn size_kb_rounds() {
        let rec = sample("x");
        assert_eq!(rec.size_bytes(), 3000);
        assert_eq!(rec.size_kb(), 3);
    }

    #[test]
    fn negative_duration_clamps_to_zero() {
        let rec = Recording::new(
            "1-1".parse().unwrap(),
            "x",
            Utc::now(),
            -0.5,
            AudioData::new(Vec::new(), AudioMimeType::Flac),
        );
        assert_eq!(rec.duration_seconds(), 0.0);
    }

    #[test]
    fn metadata_round_trips_through_json() {
        let meta = sample("memo").metadata();
        let json = serde_json::to_string(&meta).unwrap();
        let parsed: RecordingMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, meta);
        assert_eq!(parsed.mime, "audio/flac");
    }

    #[test]
    fn metadata_rejects_invalid_id() {
        let json = r#"{"id":"../x","name":"n","created_at":"2024-01-01T00:00:00Z","duration_seconds":1.0,"mime":"audio/flac","size_bytes":1}"#;
        assert!(serde_json::from_str::<RecordingMetadata>(json).is_err());
    }

    #[test]
    fn default_name_uses_time_of_day() {
        let at = Local.with_ymd_and_hms(2024, 5, 1, 9, 5, 7).unwrap();
        assert_eq!(default_name(DEFAULT_NAME_PREFIX, at), "Recording 09:05:07");
    }
}
