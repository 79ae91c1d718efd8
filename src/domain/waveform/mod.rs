//! Waveform domain module
//!
//! Pure drawing: a cell framebuffer, the sample-to-polyline transform and
//! the monitor settings. Sampling and scheduling live in the application layer.

mod framebuffer;
mod renderer;
mod settings;

pub use framebuffer::{Framebuffer, Point};
pub use renderer::{render_waveform, waveform_points};
pub use settings::{
    MonitorSettings, MonitorSettingsError, DEFAULT_FPS, DEFAULT_HEIGHT, DEFAULT_WIDTH,
    DEFAULT_WINDOW,
};
