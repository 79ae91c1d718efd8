//! Playback use case: transport controls over a `Player`

use std::fmt;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use tracing::debug;

use crate::domain::recording::Recording;
use crate::domain::session::format_clock;

use super::ports::{PlaybackError, Player, SampleSource};

/// Speeds offered by the rate cycle, in order
pub const PLAYBACK_RATES: [f32; 4] = [1.0, 1.25, 1.5, 2.0];

/// Seconds moved by one skip forward/back
pub const SKIP_SECONDS: f64 = 5.0;

pub const VOLUME_STEP: f32 = 0.1;

/// Next speed in the cycle; an unknown speed restarts at 1x
pub fn next_rate(current: f32) -> f32 {
    PLAYBACK_RATES
        .iter()
        .position(|&rate| (rate - current).abs() < f32::EPSILON)
        .map(|i| PLAYBACK_RATES[(i + 1) % PLAYBACK_RATES.len()])
        .unwrap_or(PLAYBACK_RATES[0])
}

/// Coarse volume indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeLevel {
    Off,
    Low,
    High,
}

impl VolumeLevel {
    pub fn from_volume(volume: f32) -> Self {
        if volume <= 0.0 {
            Self::Off
        } else if volume < 0.5 {
            Self::Low
        } else {
            Self::High
        }
    }
}

impl fmt::Display for VolumeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Off => "off",
            Self::Low => "low",
            Self::High => "high",
        };
        write!(f, "{}", s)
    }
}

/// Initial transport settings
#[derive(Debug, Clone, Copy)]
pub struct PlaybackOptions {
    pub rate: f32,
    pub volume: f32,
    /// Start position in seconds
    pub start_at: f64,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            rate: 1.0,
            volume: 1.0,
            start_at: 0.0,
        }
    }
}

/// One recording loaded into a player
pub struct PlaybackSession<P: Player> {
    player: P,
    duration: f64,
    rate: f32,
    volume: f32,
}

impl<P: Player> PlaybackSession<P> {
    /// Load `recording` and start playing it
    pub fn open(
        mut player: P,
        recording: &Recording,
        options: PlaybackOptions,
    ) -> Result<Self, PlaybackError> {
        player.load(recording.audio())?;

        let mut session = Self {
            player,
            duration: recording.duration_seconds(),
            rate: 1.0,
            volume: 1.0,
        };
        session.set_rate(options.rate);
        session.set_volume(options.volume);
        if options.start_at > 0.0 {
            session.seek(options.start_at)?;
        }
        session.player.play();
        debug!(id = %recording.id(), "Playback started");
        Ok(session)
    }

    /// Play when paused, pause when playing. Returns true when now playing.
    pub fn toggle(&mut self) -> bool {
        if self.player.is_paused() {
            self.player.play();
            true
        } else {
            self.player.pause();
            false
        }
    }

    pub fn is_paused(&self) -> bool {
        self.player.is_paused()
    }

    pub fn is_finished(&self) -> bool {
        self.player.is_finished()
    }

    /// Seek to `seconds`, clamped to the recording
    pub fn seek(&mut self, seconds: f64) -> Result<(), PlaybackError> {
        let target = if seconds.is_finite() {
            seconds.clamp(0.0, self.duration.max(0.0))
        } else {
            0.0
        };
        self.player.seek(StdDuration::from_secs_f64(target))
    }

    pub fn skip_forward(&mut self) -> Result<(), PlaybackError> {
        self.seek(self.position() + SKIP_SECONDS)
    }

    pub fn skip_back(&mut self) -> Result<(), PlaybackError> {
        self.seek(self.position() - SKIP_SECONDS)
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn set_rate(&mut self, rate: f32) {
        let rate = if rate.is_finite() && rate > 0.0 { rate } else { 1.0 };
        self.rate = rate;
        self.player.set_rate(rate);
    }

    /// Advance through [`PLAYBACK_RATES`] and return the new speed
    pub fn cycle_rate(&mut self) -> f32 {
        self.set_rate(next_rate(self.rate));
        self.rate
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f32) {
        let volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.volume = volume;
        self.player.set_volume(volume);
    }

    pub fn adjust_volume(&mut self, delta: f32) -> f32 {
        // Round to the step grid so repeated steps land on 0.0 exactly
        let target = ((self.volume + delta) / VOLUME_STEP).round() * VOLUME_STEP;
        self.set_volume(target);
        self.volume
    }

    pub fn volume_level(&self) -> VolumeLevel {
        VolumeLevel::from_volume(self.volume)
    }

    /// Current position in seconds
    pub fn position(&self) -> f64 {
        self.player.position().as_secs_f64()
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// `MM:SS / MM:SS`
    pub fn time_readout(&self) -> String {
        let position = self.position().min(self.duration.max(0.0));
        format!("{} / {}", format_clock(position), format_clock(self.duration))
    }

    pub fn tap(&self) -> Arc<dyn SampleSource> {
        self.player.tap()
    }
}
