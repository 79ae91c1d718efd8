//! Live signal tap port

/// A source of the most recent time-domain samples.
///
/// Shared between the producer (capture thread or audio output) and the
/// render loop, so implementations are internally synchronized.
pub trait SampleSource: Send + Sync {
    /// Fill `window` with the latest samples in -1.0..=1.0, oldest first.
    ///
    /// Returns false when the source is detached; `window` is left untouched then.
    fn read_window(&self, window: &mut [f32]) -> bool;
}
