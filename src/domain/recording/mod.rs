//! Recording domain module

mod duration;
mod entity;

pub use duration::{Duration, DEFAULT_MAX_DURATION_SECS};
pub use entity::{
    default_name, Recording, RecordingId, RecordingMetadata, DEFAULT_NAME_PREFIX,
};
