//! Microphone capture using cpal
//!
//! The cpal stream is not `Send`, so it lives on a dedicated thread and
//! hands chunks to the session through an unbounded channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig, StreamError};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::lease::{DeviceLease, LeaseGuard};
use crate::application::ports::{
    CaptureDevice, CaptureError, CaptureEvent, CaptureFormat, CaptureStream, SampleSource,
};
use crate::domain::session::Segment;
use crate::infrastructure::encoding::TARGET_SAMPLE_RATE;
use crate::infrastructure::signal_tap::SignalTap;

/// How often the capture thread checks whether it should exit
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Samples kept for the live monitor
const TAP_CAPACITY: usize = 8192;

/// Default system input device
pub struct CpalCaptureDevice {
    lease: DeviceLease,
}

impl CpalCaptureDevice {
    pub fn new() -> Self {
        Self {
            lease: DeviceLease::new(),
        }
    }

    fn get_input_device() -> Result<cpal::Device, CaptureError> {
        let host = cpal::default_host();
        host.default_input_device()
            .ok_or_else(|| CaptureError::DeviceUnavailable("no input device found".into()))
    }

    /// Pick a supported config, preferring mono and the encoder's rate
    fn get_input_config(
        device: &cpal::Device,
    ) -> Result<(StreamConfig, SampleFormat), CaptureError> {
        let supported_configs = device.supported_input_configs().map_err(|e| {
            CaptureError::DeviceUnavailable(format!("failed to query input configs: {}", e))
        })?;

        let mut best_config: Option<cpal::SupportedStreamConfigRange> = None;

        for config in supported_configs {
            if config.sample_format() != SampleFormat::I16
                && config.sample_format() != SampleFormat::F32
            {
                continue;
            }

            let includes_target = config.min_sample_rate().0 <= TARGET_SAMPLE_RATE
                && config.max_sample_rate().0 >= TARGET_SAMPLE_RATE;

            let is_better = match &best_config {
                None => true,
                Some(current) => {
                    let fewer_channels = config.channels() < current.channels();
                    let better_rate =
                        includes_target && current.min_sample_rate().0 > TARGET_SAMPLE_RATE;
                    fewer_channels || better_rate
                }
            };
            if is_better {
                best_config = Some(config);
            }
        }

        let config_range = best_config
            .ok_or_else(|| CaptureError::StartFailed("no suitable input config".into()))?;

        let sample_rate = if config_range.min_sample_rate().0 <= TARGET_SAMPLE_RATE
            && config_range.max_sample_rate().0 >= TARGET_SAMPLE_RATE
        {
            SampleRate(TARGET_SAMPLE_RATE)
        } else {
            config_range.min_sample_rate()
        };

        let sample_format = config_range.sample_format();
        let config = StreamConfig {
            channels: config_range.channels(),
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        Ok((config, sample_format))
    }

    /// Average interleaved channels down to mono
    fn to_mono(samples: &[i16], channels: u16) -> Vec<i16> {
        if channels <= 1 {
            return samples.to_vec();
        }

        samples
            .chunks(channels as usize)
            .map(|chunk| {
                let sum: i32 = chunk.iter().map(|&s| s as i32).sum();
                (sum / chunk.len() as i32) as i16
            })
            .collect()
    }

    /// Body of the capture thread. Reports readiness once, then keeps the
    /// stream alive until `running` is cleared.
    fn run_capture(
        ready: oneshot::Sender<Result<CaptureFormat, CaptureError>>,
        events: UnboundedSender<CaptureEvent>,
        capturing: Arc<AtomicBool>,
        running: Arc<AtomicBool>,
        tap: Arc<SignalTap>,
    ) {
        let opened = Self::get_input_device().and_then(|device| {
            let (config, sample_format) = Self::get_input_config(&device)?;
            let channels = config.channels;

            let deliver = {
                let events = events.clone();
                let capturing = Arc::clone(&capturing);
                let tap = Arc::clone(&tap);
                move |mono: Vec<i16>| {
                    if capturing.load(Ordering::SeqCst) && !mono.is_empty() {
                        tap.push_i16(&mono);
                        let _ = events.send(CaptureEvent::Chunk(Segment::new(mono)));
                    }
                }
            };

            let on_error = {
                let events = events.clone();
                move |err: StreamError| match err {
                    StreamError::DeviceNotAvailable => {
                        let _ = events.send(CaptureEvent::Lost("input device disconnected".into()));
                    }
                    other => warn!(error = %other, "Audio stream error"),
                }
            };

            let stream = match sample_format {
                SampleFormat::I16 => device.build_input_stream(
                    &config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        deliver(Self::to_mono(data, channels));
                    },
                    on_error,
                    None,
                ),
                SampleFormat::F32 => device.build_input_stream(
                    &config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        let i16_data: Vec<i16> =
                            data.iter().map(|&s| (s * 32767.0) as i16).collect();
                        deliver(Self::to_mono(&i16_data, channels));
                    },
                    on_error,
                    None,
                ),
                _ => {
                    return Err(CaptureError::StartFailed("unsupported sample format".into()));
                }
            }
            .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;

            stream
                .play()
                .map_err(|e| CaptureError::StartFailed(e.to_string()))?;

            Ok((
                stream,
                CaptureFormat {
                    sample_rate: config.sample_rate.0,
                },
            ))
        });

        let stream = match opened {
            Ok((stream, format)) => {
                if ready.send(Ok(format)).is_err() {
                    return;
                }
                stream
            }
            Err(err) => {
                let _ = ready.send(Err(err));
                return;
            }
        };

        while running.load(Ordering::SeqCst) {
            std::thread::sleep(POLL_INTERVAL);
        }

        drop(stream);
        debug!("Capture thread exited");
    }
}

impl Default for CpalCaptureDevice {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaptureDevice for CpalCaptureDevice {
    async fn acquire(&self) -> Result<Box<dyn CaptureStream>, CaptureError> {
        let lease = self
            .lease
            .try_acquire()
            .ok_or_else(|| CaptureError::DeviceUnavailable("busy".into()))?;

        let (events_tx, events_rx) = unbounded_channel();
        let (ready_tx, ready_rx) = oneshot::channel();
        let capturing = Arc::new(AtomicBool::new(false));
        let running = Arc::new(AtomicBool::new(true));
        let tap = Arc::new(SignalTap::new(TAP_CAPACITY));

        let thread = {
            let capturing = Arc::clone(&capturing);
            let running = Arc::clone(&running);
            let tap = Arc::clone(&tap);
            std::thread::Builder::new()
                .name("voice-memo-capture".into())
                .spawn(move || Self::run_capture(ready_tx, events_tx, capturing, running, tap))
                .map_err(|e| CaptureError::StartFailed(e.to_string()))?
        };

        let format = match ready_rx.await {
            Ok(Ok(format)) => format,
            Ok(Err(err)) => {
                let _ = thread.join();
                return Err(err);
            }
            Err(_) => {
                return Err(CaptureError::DeviceUnavailable(
                    "capture thread exited".into(),
                ))
            }
        };
        debug!(sample_rate = format.sample_rate, "Input device acquired");

        Ok(Box::new(CpalCaptureStream {
            format,
            events: events_rx,
            capturing,
            running,
            thread: Some(thread),
            tap,
            lease: Some(lease),
        }))
    }
}

/// A running capture thread holding the input device
pub struct CpalCaptureStream {
    format: CaptureFormat,
    events: UnboundedReceiver<CaptureEvent>,
    capturing: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
    tap: Arc<SignalTap>,
    lease: Option<LeaseGuard>,
}

impl CaptureStream for CpalCaptureStream {
    fn format(&self) -> CaptureFormat {
        self.format
    }

    fn events(&mut self) -> &mut UnboundedReceiver<CaptureEvent> {
        &mut self.events
    }

    fn begin(&mut self) -> Result<(), CaptureError> {
        if !self.running.load(Ordering::SeqCst) {
            return Err(CaptureError::StartFailed("stream already ended".into()));
        }
        self.capturing.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn suspend(&mut self) {
        self.capturing.store(false, Ordering::SeqCst);
    }

    fn resume(&mut self) {
        self.capturing.store(true, Ordering::SeqCst);
    }

    fn end(&mut self) {
        self.capturing.store(false, Ordering::SeqCst);
        self.running.store(false, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
        self.tap.detach();
        self.lease.take();
    }

    fn tap(&self) -> Arc<dyn SampleSource> {
        self.tap.clone()
    }
}

impl Drop for CpalCaptureStream {
    fn drop(&mut self) {
        self.end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_mono_single_channel() {
        let mono = vec![100i16, 200, 300];
        assert_eq!(CpalCaptureDevice::to_mono(&mono, 1), mono);
    }

    #[test]
    fn to_mono_two_channels() {
        let stereo = vec![100i16, 200, 300, 400];
        assert_eq!(CpalCaptureDevice::to_mono(&stereo, 2), vec![150, 350]);
    }

    #[test]
    fn to_mono_partial_frame() {
        let samples = vec![90i16, 30, 60, 10];
        assert_eq!(CpalCaptureDevice::to_mono(&samples, 3), vec![60, 10]);
    }

    #[tokio::test]
    #[ignore = "requires an audio input device"]
    async fn acquire_default_device() {
        let device = CpalCaptureDevice::new();
        let mut stream = device.acquire().await.unwrap();
        assert!(device.acquire().await.is_err());
        stream.end();
        assert!(device.acquire().await.is_ok());
    }
}
