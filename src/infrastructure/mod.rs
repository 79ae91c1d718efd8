//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with cpal, rodio, flacenc, the filesystem and the clock.

pub mod capture;
pub mod clock;
pub mod config;
pub mod encoding;
pub mod playback;
pub mod signal_tap;
pub mod storage;

// Re-export adapters
pub use capture::{CpalCaptureDevice, SimulatedCaptureDevice, SimulatedFeed};
pub use clock::{ManualClock, SystemClock};
pub use config::XdgConfigStore;
pub use encoding::FlacSegmentEncoder;
pub use playback::RodioPlayer;
pub use signal_tap::SignalTap;
pub use storage::{FsRecordingStore, MemoryRecordingStore};
