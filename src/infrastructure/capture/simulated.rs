//! In-process capture device driven by hand
//!
//! Stands in for a microphone in tests and headless runs: samples pushed
//! through a [`SimulatedFeed`] arrive as chunks while the stream is capturing.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use super::lease::{DeviceLease, LeaseGuard};
use crate::application::ports::{
    CaptureDevice, CaptureError, CaptureEvent, CaptureFormat, CaptureStream, SampleSource,
};
use crate::domain::session::Segment;
use crate::infrastructure::signal_tap::SignalTap;

const TAP_CAPACITY: usize = 4096;

#[derive(Debug, Default)]
struct FeedState {
    sender: Option<UnboundedSender<CaptureEvent>>,
    capturing: bool,
    tap: Option<Arc<SignalTap>>,
}

/// Producer handle of a simulated device
#[derive(Debug, Clone, Default)]
pub struct SimulatedFeed {
    state: Arc<Mutex<FeedState>>,
}

impl SimulatedFeed {
    /// Deliver samples as one chunk. Returns false when nothing is capturing.
    pub fn push(&self, samples: &[i16]) -> bool {
        let Ok(state) = self.state.lock() else {
            return false;
        };
        match (&state.sender, state.capturing) {
            (Some(sender), true) => {
                if let Some(tap) = &state.tap {
                    tap.push_i16(samples);
                }
                sender
                    .send(CaptureEvent::Chunk(Segment::new(samples.to_vec())))
                    .is_ok()
            }
            _ => false,
        }
    }

    /// Simulate the device disappearing
    pub fn lose(&self, reason: &str) -> bool {
        let Ok(state) = self.state.lock() else {
            return false;
        };
        state
            .sender
            .as_ref()
            .is_some_and(|sender| sender.send(CaptureEvent::Lost(reason.to_string())).is_ok())
    }

    pub fn is_capturing(&self) -> bool {
        self.state.lock().map(|s| s.capturing).unwrap_or(false)
    }
}

/// Capture device fed through a [`SimulatedFeed`]
#[derive(Debug)]
pub struct SimulatedCaptureDevice {
    lease: DeviceLease,
    format: CaptureFormat,
    unavailable: Option<String>,
    feed: SimulatedFeed,
}

impl SimulatedCaptureDevice {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            lease: DeviceLease::new(),
            format: CaptureFormat { sample_rate },
            unavailable: None,
            feed: SimulatedFeed::default(),
        }
    }

    /// A device whose every acquire fails with `reason`
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            unavailable: Some(reason.into()),
            ..Self::new(CaptureFormat::default().sample_rate)
        }
    }

    pub fn feed(&self) -> SimulatedFeed {
        self.feed.clone()
    }

    pub fn is_held(&self) -> bool {
        self.lease.is_held()
    }
}

#[async_trait]
impl CaptureDevice for SimulatedCaptureDevice {
    async fn acquire(&self) -> Result<Box<dyn CaptureStream>, CaptureError> {
        if let Some(reason) = &self.unavailable {
            return Err(CaptureError::DeviceUnavailable(reason.clone()));
        }
        let lease = self
            .lease
            .try_acquire()
            .ok_or_else(|| CaptureError::DeviceUnavailable("busy".into()))?;

        let (tx, rx) = unbounded_channel();
        let tap = Arc::new(SignalTap::new(TAP_CAPACITY));
        if let Ok(mut state) = self.feed.state.lock() {
            state.sender = Some(tx);
            state.capturing = false;
            state.tap = Some(Arc::clone(&tap));
        }

        Ok(Box::new(SimulatedCaptureStream {
            format: self.format,
            events: rx,
            feed: self.feed.clone(),
            tap,
            lease: Some(lease),
        }))
    }
}

struct SimulatedCaptureStream {
    format: CaptureFormat,
    events: UnboundedReceiver<CaptureEvent>,
    feed: SimulatedFeed,
    tap: Arc<SignalTap>,
    lease: Option<LeaseGuard>,
}

impl SimulatedCaptureStream {
    fn set_capturing(&self, capturing: bool) {
        if let Ok(mut state) = self.feed.state.lock() {
            state.capturing = capturing;
        }
    }
}

impl CaptureStream for SimulatedCaptureStream {
    fn format(&self) -> CaptureFormat {
        self.format
    }

    fn events(&mut self) -> &mut UnboundedReceiver<CaptureEvent> {
        &mut self.events
    }

    fn begin(&mut self) -> Result<(), CaptureError> {
        if self.lease.is_none() {
            return Err(CaptureError::StartFailed("stream already ended".into()));
        }
        self.set_capturing(true);
        Ok(())
    }

    fn suspend(&mut self) {
        self.set_capturing(false);
    }

    fn resume(&mut self) {
        self.set_capturing(true);
    }

    fn end(&mut self) {
        if let Ok(mut state) = self.feed.state.lock() {
            *state = FeedState::default();
        }
        self.tap.detach();
        self.lease.take();
    }

    fn tap(&self) -> Arc<dyn SampleSource> {
        self.tap.clone()
    }
}

impl Drop for SimulatedCaptureStream {
    fn drop(&mut self) {
        self.end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn chunks_flow_only_while_capturing() {
        let device = SimulatedCaptureDevice::new(16_000);
        let feed = device.feed();
        let mut stream = device.acquire().await.unwrap();

        assert!(!feed.push(&[1, 2]));
        stream.begin().unwrap();
        assert!(feed.push(&[3, 4]));
        stream.suspend();
        assert!(!feed.push(&[5]));
        stream.resume();
        assert!(feed.push(&[6]));

        let first = stream.events().recv().await.unwrap();
        assert_eq!(first, CaptureEvent::Chunk(Segment::new(vec![3, 4])));
        let second = stream.events().recv().await.unwrap();
        assert_eq!(second, CaptureEvent::Chunk(Segment::new(vec![6])));
    }

    #[tokio::test]
    async fn device_is_exclusive_until_ended() {
        let device = SimulatedCaptureDevice::new(16_000);
        let mut stream = device.acquire().await.unwrap();
        assert!(device.is_held());

        let err = device.acquire().await.err().unwrap();
        assert_eq!(err, CaptureError::DeviceUnavailable("busy".into()));

        stream.end();
        stream.end();
        assert!(!device.is_held());
        assert!(device.acquire().await.is_ok());
    }

    #[tokio::test]
    async fn tap_sees_pushed_samples() {
        let device = SimulatedCaptureDevice::new(16_000);
        let feed = device.feed();
        let mut stream = device.acquire().await.unwrap();
        stream.begin().unwrap();
        feed.push(&[16384, -16384]);

        let mut window = [0.0; 2];
        assert!(stream.tap().read_window(&mut window));
        assert_eq!(window, [0.5, -0.5]);

        stream.end();
        assert!(!stream.tap().read_window(&mut window));
    }

    #[tokio::test]
    async fn unavailable_device_never_acquires() {
        let device = SimulatedCaptureDevice::unavailable("permission denied");
        let err = device.acquire().await.err().unwrap();
        assert_eq!(err, CaptureError::DeviceUnavailable("permission denied".into()));
    }
}
