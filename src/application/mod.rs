//! Application layer - Use cases and port interfaces
//!
//! Contains the recording session controller, the live monitor, the
//! library and playback use cases, and the trait definitions for
//! external system interactions.

pub mod library;
pub mod monitor;
pub mod playback;
pub mod ports;
pub mod session;

// Re-export use cases
pub use library::{LibraryError, RecordingLibrary};
pub use monitor::{LiveMonitor, MonitorHandle};
pub use playback::{
    next_rate, PlaybackOptions, PlaybackSession, VolumeLevel, PLAYBACK_RATES, SKIP_SECONDS,
    VOLUME_STEP,
};
pub use session::{RecordingSessionController, SessionError, SessionOptions};
