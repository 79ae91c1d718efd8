//! Terminal rendering of monitor frames

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::application::ports::{MonitorDisplay, MonitorFrame};
use crate::domain::recording::Duration;

use super::presenter::state_label;

/// Redraws the waveform block in place on stderr.
///
/// Backed by an indicatif bar with a multi-line message, so the block is
/// hidden automatically when stderr is not a terminal.
pub struct TerminalDisplay {
    bar: ProgressBar,
    limit: Option<Duration>,
}

impl TerminalDisplay {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{msg}") {
            bar.set_style(style);
        }
        Self { bar, limit: None }
    }

    /// Show the maximum duration next to the timer
    pub fn with_limit(mut self, limit: Duration) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Draw an arbitrary header above the rows
    pub fn show(&self, header: &str, rows: &[String]) {
        self.bar.set_message(compose(header, rows));
    }

    pub fn clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for TerminalDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitorDisplay for TerminalDisplay {
    fn present(&mut self, frame: &MonitorFrame) {
        let header = frame_header(frame, self.limit);
        self.show(&header, &frame.rows);
    }

    fn finish(&mut self) {
        self.clear();
    }
}

/// `<state> <elapsed>` plus the limit when one is set
pub fn frame_header(frame: &MonitorFrame, limit: Option<Duration>) -> String {
    let mut header = format!("{} {}", state_label(frame.state), frame.elapsed.bold());
    if let Some(limit) = limit {
        header.push_str(&format!(" {}", format!("/ {}", limit).dimmed()));
    }
    if !frame.drawn {
        header.push_str(&format!("  {}", "no signal".dimmed()));
    }
    header
}

fn compose(header: &str, rows: &[String]) -> String {
    let mut out = String::from(header);
    for row in rows {
        out.push('\n');
        out.push_str(row);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::SessionState;

    fn frame(state: SessionState, drawn: bool) -> MonitorFrame {
        MonitorFrame {
            state,
            elapsed: "00:03.2".to_string(),
            rows: vec!["..".to_string(), "##".to_string()],
            drawn,
        }
    }

    #[test]
    fn header_shows_state_and_timer() {
        colored::control::set_override(false);
        let header = frame_header(&frame(SessionState::Recording, true), None);
        assert_eq!(header, "● REC 00:03.2");
    }

    #[test]
    fn header_shows_limit() {
        colored::control::set_override(false);
        let header = frame_header(
            &frame(SessionState::Paused, true),
            Some(Duration::from_secs(300)),
        );
        assert_eq!(header, "❚❚ PAUSED 00:03.2 / 5m");
    }

    #[test]
    fn header_flags_missing_signal() {
        colored::control::set_override(false);
        let header = frame_header(&frame(SessionState::Recording, false), None);
        assert!(header.ends_with("no signal"));
    }

    #[test]
    fn rows_follow_header() {
        assert_eq!(compose("h", &["a".into(), "b".into()]), "h\na\nb");
    }
}
