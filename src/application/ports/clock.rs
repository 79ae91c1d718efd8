//! Monotonic clock port

use std::time::Duration;

/// Monotonic time source. Readings are offsets from an arbitrary origin.
pub trait Clock: Send + Sync {
    fn now(&self) -> Duration;
}
