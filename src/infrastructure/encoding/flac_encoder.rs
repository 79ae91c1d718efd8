//! FLAC encoding of captured segments
//!
//! Settings:
//! - 16kHz sample rate (resampled from the device rate with rubato)
//! - Mono channel
//! - 16-bit samples

use flacenc::bitsink::ByteSink;
use flacenc::component::BitRepr;
use flacenc::config;
use flacenc::error::Verify;
use flacenc::source::MemSource;
use rubato::{FftFixedIn, Resampler};
use tracing::debug;

use crate::application::ports::{CaptureFormat, EncodingError, SegmentEncoder};
use crate::domain::audio::{AudioData, AudioMimeType};
use crate::domain::session::Segment;

/// Sample rate of every encoded recording
pub const TARGET_SAMPLE_RATE: u32 = 16000;

/// Bits per sample (16-bit audio)
const BITS_PER_SAMPLE: usize = 16;

/// Number of channels (mono)
const CHANNELS: usize = 1;

/// Block size advertised by a stream without frames
const EMPTY_STREAM_BLOCK_SIZE: u16 = 4096;

/// Encode mono 16kHz PCM samples to FLAC
pub fn encode_to_flac(pcm_samples: &[i16]) -> Result<Vec<u8>, EncodingError> {
    if pcm_samples.is_empty() {
        return Ok(empty_flac_stream());
    }

    // flacenc works on i32 samples
    let samples_i32: Vec<i32> = pcm_samples.iter().map(|&s| s as i32).collect();

    let config = config::Encoder::default()
        .into_verified()
        .map_err(|(_, e)| EncodingError::EncodeFailed(format!("config: {:?}", e)))?;

    let source = MemSource::from_samples(
        &samples_i32,
        CHANNELS,
        BITS_PER_SAMPLE,
        TARGET_SAMPLE_RATE as usize,
    );

    let flac_stream = flacenc::encode_with_fixed_block_size(&config, source, config.block_size)
        .map_err(|e| EncodingError::EncodeFailed(format!("{:?}", e)))?;

    let mut sink = ByteSink::new();
    flac_stream
        .write(&mut sink)
        .map_err(|e| EncodingError::EncodeFailed(e.to_string()))?;

    Ok(sink.into_inner())
}

/// A valid FLAC stream with a STREAMINFO block and no audio frames
pub fn empty_flac_stream() -> Vec<u8> {
    let mut out = Vec::with_capacity(42);
    out.extend_from_slice(b"fLaC");
    // Last-metadata-block flag, type 0 (STREAMINFO), 34 byte body
    out.extend_from_slice(&[0x80, 0x00, 0x00, 0x22]);
    out.extend_from_slice(&EMPTY_STREAM_BLOCK_SIZE.to_be_bytes());
    out.extend_from_slice(&EMPTY_STREAM_BLOCK_SIZE.to_be_bytes());
    // Unknown min/max frame sizes
    out.extend_from_slice(&[0; 6]);
    // Sample rate (20 bits), channels - 1 (3), bits per sample - 1 (5), total samples (36)
    let packed: u64 = ((TARGET_SAMPLE_RATE as u64) << 44)
        | (((CHANNELS as u64) - 1) << 41)
        | (((BITS_PER_SAMPLE as u64) - 1) << 36);
    out.extend_from_slice(&packed.to_be_bytes());
    // MD5 of no audio is left unset
    out.extend_from_slice(&[0; 16]);
    out
}

/// Resample mono audio from `source_rate` to 16kHz
pub fn resample_to_16k(samples: &[i16], source_rate: u32) -> Result<Vec<i16>, EncodingError> {
    if source_rate == TARGET_SAMPLE_RATE || samples.is_empty() {
        return Ok(samples.to_vec());
    }
    if source_rate == 0 {
        return Err(EncodingError::ResampleFailed("source rate is zero".into()));
    }

    let samples_f32: Vec<f32> = samples.iter().map(|&s| s as f32 / 32768.0).collect();

    let ratio = TARGET_SAMPLE_RATE as f64 / source_rate as f64;
    let output_len = (samples_f32.len() as f64 * ratio).ceil() as usize;

    let mut resampler = FftFixedIn::<f32>::new(
        source_rate as usize,
        TARGET_SAMPLE_RATE as usize,
        1024, // Chunk size
        2,    // Sub-chunks
        1,    // Mono
    )
    .map_err(|e| EncodingError::ResampleFailed(format!("init: {}", e)))?;

    // The first `delay` output frames are filter warm-up, not signal
    let delay = resampler.output_delay();
    let mut output = Vec::with_capacity(delay + output_len);
    let mut input_pos = 0;

    // Past the end of the input, silence flushes the delayed tail out
    while output.len() < delay + output_len {
        let frames_needed = resampler.input_frames_next();
        let end_pos = (input_pos + frames_needed).min(samples_f32.len());
        let mut chunk = samples_f32[input_pos..end_pos].to_vec();
        chunk.resize(frames_needed, 0.0);

        let resampled = resampler
            .process(&[chunk], None)
            .map_err(|e| EncodingError::ResampleFailed(e.to_string()))?;
        if resampled[0].is_empty() {
            break;
        }

        output.extend(
            resampled[0]
                .iter()
                .map(|&s| (s.clamp(-1.0, 1.0) * 32767.0) as i16),
        );
        input_pos = end_pos;
    }

    Ok(output.into_iter().skip(delay).take(output_len).collect())
}

/// Concatenates segments, resamples to 16kHz and encodes FLAC
#[derive(Debug, Clone, Copy, Default)]
pub struct FlacSegmentEncoder;

impl FlacSegmentEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl SegmentEncoder for FlacSegmentEncoder {
    fn encode(
        &self,
        segments: &[Segment],
        format: CaptureFormat,
    ) -> Result<AudioData, EncodingError> {
        let total: usize = segments.iter().map(Segment::len).sum();
        let mut samples = Vec::with_capacity(total);
        for segment in segments {
            samples.extend_from_slice(segment.samples());
        }

        let resampled = resample_to_16k(&samples, format.sample_rate)?;
        let bytes = encode_to_flac(&resampled)?;
        debug!(
            segments = segments.len(),
            samples = total,
            bytes = bytes.len(),
            "Encoded recording"
        );
        Ok(AudioData::new(bytes, AudioMimeType::Flac))
    }

    fn mime_type(&self) -> AudioMimeType {
        AudioMimeType::Flac
    }
}
