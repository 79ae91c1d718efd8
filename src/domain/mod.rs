//! Domain layer - Core business logic
//!
//! Contains value objects, entities, the session state machine and domain errors.
//! This layer has no dependencies on external systems.

pub mod audio;
pub mod config;
pub mod error;
pub mod recording;
pub mod session;
pub mod waveform;

// Re-export common types
pub use audio::{AudioData, AudioMimeType};
pub use config::AppConfig;
pub use error::*;
pub use recording::{Duration, Recording, RecordingId};
pub use session::{Session, SessionEvent, SessionState};
