//! CLI presenter for output formatting

use std::io::{self, Write};

use chrono::Local;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::recording::{Recording, RecordingMetadata};
use crate::domain::session::{format_clock, SessionState};

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self { spinner: None }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
        {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✓".green(), message));
        }
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✗".red(), message));
        }
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Prompt on stderr without a trailing newline
    pub fn prompt(&self, question: &str) {
        eprint!("{} {} ", "?".yellow(), question);
        let _ = io::stderr().flush();
    }

    /// Print a key-value pair (for config list and recording info)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    /// Print recordings, one per line
    pub fn recording_list(&self, recordings: &[Recording]) {
        if recordings.is_empty() {
            self.info("No recordings yet");
            return;
        }
        for recording in recordings {
            println!("{}", format_list_line(recording));
        }
    }

    /// Print the info view of one recording
    pub fn recording_info(&self, meta: &RecordingMetadata) {
        self.key_value("name", &meta.name);
        self.key_value("size", &format!("{} KB", size_kb(meta.size_bytes)));
        self.key_value("id", meta.id.as_str());
        self.key_value(
            "created",
            &meta
                .created_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        );
        self.key_value("duration", &format_clock(meta.duration_seconds));
        self.key_value("format", &meta.mime);
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

/// Size in KB, rounded to the nearest whole KB
pub fn size_kb(bytes: u64) -> u64 {
    (bytes + 512) / 1024
}

/// `<id>  <created>  <duration>  <name>`
pub fn format_list_line(recording: &Recording) -> String {
    format!(
        "{}  {}  {}  {}",
        recording.id().as_str().dimmed(),
        recording
            .created_at()
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M"),
        format_clock(recording.duration_seconds()),
        recording.name().bold()
    )
}

/// Colored status label for the monitor header
pub fn state_label(state: SessionState) -> ColoredString {
    match state {
        SessionState::Recording => "● REC".red().bold(),
        SessionState::Paused => "❚❚ PAUSED".yellow().bold(),
        SessionState::Stopped => "■ STOPPED".dimmed(),
        SessionState::Idle => state.as_str().dimmed(),
    }
}

/// Progress bar of active time against the maximum duration
pub fn format_progress(elapsed_ms: u64, total_ms: u64) -> String {
    let percent = if total_ms > 0 {
        (elapsed_ms as f64 / total_ms as f64 * 100.0).min(100.0)
    } else {
        0.0
    };

    let bar_width = 20;
    let filled = ((percent / 100.0) * bar_width as f64) as usize;
    let empty = bar_width - filled;

    format!("[{}{}]", "█".repeat(filled).cyan(), "░".repeat(empty))
}
