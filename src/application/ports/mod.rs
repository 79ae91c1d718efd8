//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod capture;
pub mod clock;
pub mod config;
pub mod display;
pub mod encoder;
pub mod player;
pub mod signal;
pub mod storage;

// Re-export common types
pub use capture::{CaptureDevice, CaptureError, CaptureEvent, CaptureFormat, CaptureStream};
pub use clock::Clock;
pub use config::ConfigStore;
pub use display::{MonitorDisplay, MonitorFrame};
pub use encoder::{EncodingError, SegmentEncoder};
pub use player::{PlaybackError, Player};
pub use signal::SampleSource;
pub use storage::{RecordingStore, StorageError};
