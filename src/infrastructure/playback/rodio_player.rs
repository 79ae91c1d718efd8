//! Rodio-based audio player
//!
//! Decoded samples pass through a [`TapSource`] on their way to the output
//! so the monitor can draw what is playing.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use rodio::source::{SeekError, Source};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tracing::debug;

use crate::application::ports::{PlaybackError, Player, SampleSource};
use crate::domain::audio::AudioData;
use crate::infrastructure::signal_tap::SignalTap;

/// Samples kept for the monitor
const TAP_CAPACITY: usize = 8192;

/// Samples collected before taking the tap lock
const TAP_BATCH: usize = 256;

/// Source adapter copying every sample into a [`SignalTap`]
pub struct TapSource<S> {
    inner: S,
    tap: Arc<SignalTap>,
    batch: Vec<f32>,
}

impl<S> TapSource<S>
where
    S: Source<Item = f32>,
{
    pub fn new(inner: S, tap: Arc<SignalTap>) -> Self {
        Self {
            inner,
            tap,
            batch: Vec::with_capacity(TAP_BATCH),
        }
    }

    fn flush(&mut self) {
        if !self.batch.is_empty() {
            self.tap.push_f32(&self.batch);
            self.batch.clear();
        }
    }
}

impl<S> Iterator for TapSource<S>
where
    S: Source<Item = f32>,
{
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        match self.inner.next() {
            Some(sample) => {
                self.batch.push(sample);
                if self.batch.len() >= TAP_BATCH {
                    self.flush();
                }
                Some(sample)
            }
            None => {
                self.flush();
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<S> Source for TapSource<S>
where
    S: Source<Item = f32>,
{
    fn current_frame_len(&self) -> Option<usize> {
        self.inner.current_frame_len()
    }

    fn channels(&self) -> u16 {
        self.inner.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.inner.total_duration()
    }

    fn try_seek(&mut self, pos: Duration) -> Result<(), SeekError> {
        self.batch.clear();
        self.inner.try_seek(pos)
    }
}

/// Player on the default output device
pub struct RodioPlayer {
    // Dropping the stream silences the sink
    _stream: OutputStream,
    handle: OutputStreamHandle,
    sink: Sink,
    tap: Arc<SignalTap>,
}

impl RodioPlayer {
    pub fn new() -> Result<Self, PlaybackError> {
        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| PlaybackError::OutputUnavailable(e.to_string()))?;
        let sink =
            Sink::try_new(&handle).map_err(|e| PlaybackError::OutputUnavailable(e.to_string()))?;

        Ok(Self {
            _stream: stream,
            handle,
            sink,
            tap: Arc::new(SignalTap::new(TAP_CAPACITY)),
        })
    }
}

impl Player for RodioPlayer {
    fn load(&mut self, audio: &AudioData) -> Result<(), PlaybackError> {
        let decoder = Decoder::new(Cursor::new(audio.data().to_vec()))
            .map_err(|e| PlaybackError::DecodeFailed(e.to_string()))?;

        // Fresh sink so nothing from a previous load keeps playing
        self.sink.stop();
        self.sink = Sink::try_new(&self.handle)
            .map_err(|e| PlaybackError::OutputUnavailable(e.to_string()))?;
        self.sink.pause();

        self.tap.attach();
        self.sink.append(TapSource::new(
            decoder.convert_samples::<f32>(),
            Arc::clone(&self.tap),
        ));
        debug!(bytes = audio.size_bytes(), "Audio loaded");
        Ok(())
    }

    fn play(&mut self) {
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn is_paused(&self) -> bool {
        self.sink.is_paused()
    }

    fn is_finished(&self) -> bool {
        self.sink.empty()
    }

    fn seek(&mut self, position: Duration) -> Result<(), PlaybackError> {
        self.sink
            .try_seek(position)
            .map_err(|e| PlaybackError::SeekFailed(format!("{:?}", e)))
    }

    fn position(&self) -> Duration {
        self.sink.get_pos()
    }

    fn set_rate(&mut self, rate: f32) {
        self.sink.set_speed(rate);
    }

    fn set_volume(&mut self, volume: f32) {
        self.sink.set_volume(volume.clamp(0.0, 1.0));
    }

    fn tap(&self) -> Arc<dyn SampleSource> {
        self.tap.clone()
    }
}

impl Drop for RodioPlayer {
    fn drop(&mut self) {
        self.sink.stop();
        self.tap.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rodio::source::SineWave;

    #[test]
    fn tap_source_passes_samples_through() {
        let tap = Arc::new(SignalTap::new(1024));
        let source = SineWave::new(440.0).take_duration(Duration::from_millis(10));
        let expected: Vec<f32> = SineWave::new(440.0)
            .take_duration(Duration::from_millis(10))
            .collect();

        let tapped: Vec<f32> = TapSource::new(source, Arc::clone(&tap)).collect();
        assert_eq!(tapped, expected);

        let mut window = vec![0.0; 4];
        assert!(tap.read_window(&mut window));
        assert_eq!(window.as_slice(), &expected[expected.len() - 4..]);
    }

    #[test]
    fn tap_source_keeps_format() {
        let tap = Arc::new(SignalTap::new(16));
        let inner = SineWave::new(220.0);
        let (channels, rate) = (inner.channels(), inner.sample_rate());
        let source = TapSource::new(inner, tap);
        assert_eq!(source.channels(), channels);
        assert_eq!(source.sample_rate(), rate);
        assert!(source.total_duration().is_none());
    }

    #[test]
    #[ignore = "requires an audio output device"]
    fn plays_encoded_flac() {
        let samples = vec![0i16; 16_000];
        let bytes = crate::infrastructure::encoding::encode_to_flac(&samples).unwrap();
        let audio = AudioData::new(bytes, crate::domain::audio::AudioMimeType::Flac);

        let mut player = RodioPlayer::new().unwrap();
        player.load(&audio).unwrap();
        assert!(player.is_paused());
        player.play();
        assert!(!player.is_paused());
    }
}
