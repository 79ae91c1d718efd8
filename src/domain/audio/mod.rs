//! Audio domain module

mod audio_data;

pub use audio_data::{AudioData, AudioMimeType};
