//! Live monitor display settings

use std::time::Duration as StdDuration;

use thiserror::Error;

pub const DEFAULT_FPS: u32 = 30;
pub const DEFAULT_WIDTH: usize = 64;
pub const DEFAULT_HEIGHT: usize = 9;
/// Samples pulled from the signal per frame
pub const DEFAULT_WINDOW: usize = 1024;

const MAX_FPS: u32 = 120;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MonitorSettingsError {
    #[error("Frame rate must be between 1 and 120, got {0}")]
    FrameRate(u32),

    #[error("Display size must be at least 2x3, got {width}x{height}")]
    Size { width: usize, height: usize },

    #[error("Sample window must be a power of two, got {0}")]
    Window(usize),
}

/// Frame rate, framebuffer size and sample window of the live monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    pub fps: u32,
    pub width: usize,
    pub height: usize,
    pub window: usize,
}

impl MonitorSettings {
    pub fn validate(&self) -> Result<(), MonitorSettingsError> {
        if self.fps == 0 || self.fps > MAX_FPS {
            return Err(MonitorSettingsError::FrameRate(self.fps));
        }
        if self.width < 2 || self.height < 3 {
            return Err(MonitorSettingsError::Size {
                width: self.width,
                height: self.height,
            });
        }
        if !self.window.is_power_of_two() {
            return Err(MonitorSettingsError::Window(self.window));
        }
        Ok(())
    }

    /// Time between two render ticks
    pub fn frame_period(&self) -> StdDuration {
        StdDuration::from_secs_f64(1.0 / self.fps.max(1) as f64)
    }
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            window: DEFAULT_WINDOW,
        }
    }
}
