//! Audio capture infrastructure module
//!
//! Microphone capture through cpal, plus a hand-fed device for tests
//! and headless use.

mod cpal_capture;
mod lease;
mod simulated;

pub use cpal_capture::{CpalCaptureDevice, CpalCaptureStream};
pub use lease::{DeviceLease, LeaseGuard};
pub use simulated::{SimulatedCaptureDevice, SimulatedFeed};
