//! Segment encoder port

use thiserror::Error;

use crate::domain::audio::{AudioData, AudioMimeType};
use crate::domain::session::Segment;

use super::capture::CaptureFormat;

#[derive(Debug, Clone, Error)]
pub enum EncodingError {
    #[error("Failed to resample audio: {0}")]
    ResampleFailed(String),

    #[error("Failed to encode audio: {0}")]
    EncodeFailed(String),
}

/// Port that turns captured segments into a single audio container
pub trait SegmentEncoder: Send + Sync {
    /// Concatenate `segments` in order and encode them.
    /// An empty slice yields a valid container with no audio frames.
    fn encode(&self, segments: &[Segment], format: CaptureFormat)
        -> Result<AudioData, EncodingError>;

    fn mime_type(&self) -> AudioMimeType;
}
