//! Elapsed-time readouts

use std::time::Duration as StdDuration;

/// Format an elapsed recording time as `MM:SS.t` (tenths truncated)
pub fn format_elapsed(elapsed: StdDuration) -> String {
    let total_ms = elapsed.as_millis();
    let total_secs = total_ms / 1000;
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    let tenths = (total_ms % 1000) / 100;
    format!("{:02}:{:02}.{}", minutes, seconds, tenths)
}

/// Format a playback position as `MM:SS`; non-finite input reads as zero
pub fn format_clock(seconds: f64) -> String {
    let secs = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
