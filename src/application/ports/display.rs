//! Monitor display port

use crate::domain::session::SessionState;

/// One rendered monitor frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorFrame {
    pub state: SessionState,
    /// Elapsed active time as `MM:SS.t`
    pub elapsed: String,
    /// Framebuffer rows, top to bottom
    pub rows: Vec<String>,
    /// False when nothing was drawn (no signal source)
    pub drawn: bool,
}

/// Sink for monitor frames
pub trait MonitorDisplay: Send {
    fn present(&mut self, frame: &MonitorFrame);

    /// Called once when the render loop ends
    fn finish(&mut self) {}
}
