//! Audio capture port interfaces

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::domain::session::Segment;

use super::signal::SampleSource;

/// Capture errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CaptureError {
    #[error("Capture device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Failed to start capture: {0}")]
    StartFailed(String),
}

/// Message delivered by a running capture stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// A chunk of mono PCM samples
    Chunk(Segment),
    /// The device went away; the stream is dead
    Lost(String),
}

/// Format of the samples carried by `CaptureEvent::Chunk`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureFormat {
    pub sample_rate: u32,
}

impl Default for CaptureFormat {
    fn default() -> Self {
        Self { sample_rate: 16_000 }
    }
}

/// Port for the exclusively owned capture device
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Acquire the device.
    ///
    /// Fails with `DeviceUnavailable` when it is missing, denied or already
    /// held by another stream.
    async fn acquire(&self) -> Result<Box<dyn CaptureStream>, CaptureError>;
}

/// A held capture device. Dropping it releases the device.
pub trait CaptureStream: Send {
    fn format(&self) -> CaptureFormat;

    /// Channel of chunks and loss notifications
    fn events(&mut self) -> &mut UnboundedReceiver<CaptureEvent>;

    /// Start delivering chunks
    fn begin(&mut self) -> Result<(), CaptureError>;

    /// Stop delivering chunks without releasing the device
    fn suspend(&mut self);

    fn resume(&mut self);

    /// Stop the stream and release the device. Safe to call twice.
    fn end(&mut self);

    /// Live signal for the monitor
    fn tap(&self) -> Arc<dyn SampleSource>;
}

#[async_trait]
impl<T: CaptureDevice + ?Sized> CaptureDevice for Arc<T> {
    async fn acquire(&self) -> Result<Box<dyn CaptureStream>, CaptureError> {
        (**self).acquire().await
    }
}
