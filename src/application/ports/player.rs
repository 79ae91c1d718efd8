//! Audio playback port interface

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::domain::audio::AudioData;

use super::signal::SampleSource;

#[derive(Debug, Clone, Error)]
pub enum PlaybackError {
    #[error("No audio output available: {0}")]
    OutputUnavailable(String),

    #[error("Failed to decode audio: {0}")]
    DecodeFailed(String),

    #[error("Seek failed: {0}")]
    SeekFailed(String),
}

/// Port for an audio output.
///
/// Audio output handles are usually tied to the thread that opened them,
/// so this port is not `Send`.
pub trait Player {
    /// Decode `audio` and queue it, paused.
    fn load(&mut self, audio: &AudioData) -> Result<(), PlaybackError>;

    fn play(&mut self);

    fn pause(&mut self);

    fn is_paused(&self) -> bool;

    /// True once the queued audio has played out
    fn is_finished(&self) -> bool;

    fn seek(&mut self, position: Duration) -> Result<(), PlaybackError>;

    fn position(&self) -> Duration;

    /// Playback speed multiplier
    fn set_rate(&mut self, rate: f32);

    /// Volume in 0.0..=1.0
    fn set_volume(&mut self, volume: f32);

    /// Amplitude tap of what is being played
    fn tap(&self) -> Arc<dyn SampleSource>;
}
