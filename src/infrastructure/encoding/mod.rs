//! Audio encoding infrastructure module
//!
//! Recordings are stored as lossless 16kHz mono FLAC.

mod flac_encoder;

pub use flac_encoder::{
    empty_flac_stream, encode_to_flac, resample_to_16k, FlacSegmentEncoder, TARGET_SAMPLE_RATE,
};
