//! Line-based keyboard commands read from stdin

use std::io::BufRead;

use tokio::sync::mpsc;
use tracing::debug;

/// Commands accepted while recording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordCommand {
    TogglePause,
    Stop,
}

impl RecordCommand {
    /// Bare Enter stops, like the record button
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "" | "s" | "stop" => Some(Self::Stop),
            "p" | "pause" | "resume" => Some(Self::TogglePause),
            _ => None,
        }
    }
}

/// Commands accepted during playback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackCommand {
    Toggle,
    SkipForward,
    SkipBack,
    CycleRate,
    VolumeUp,
    VolumeDown,
    Quit,
}

impl PlaybackCommand {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "" | "p" | "pause" | "play" => Some(Self::Toggle),
            "f" | "forward" => Some(Self::SkipForward),
            "b" | "back" => Some(Self::SkipBack),
            "r" | "rate" => Some(Self::CycleRate),
            "+" | "=" => Some(Self::VolumeUp),
            "-" | "_" => Some(Self::VolumeDown),
            "q" | "quit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Read stdin lines on a std thread and forward them.
///
/// The channel closes on EOF, so a closed receiver means no more input.
pub fn spawn_line_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    debug!(error = %e, "stdin read error");
                    break;
                }
            }
        }
        debug!("stdin closed");
    });

    rx
}

/// Answer to a yes/no question; anything but y/yes is a no
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_stops_recording() {
        assert_eq!(RecordCommand::parse(""), Some(RecordCommand::Stop));
        assert_eq!(RecordCommand::parse("  s "), Some(RecordCommand::Stop));
        assert_eq!(RecordCommand::parse("STOP"), Some(RecordCommand::Stop));
    }

    #[test]
    fn p_toggles_pause() {
        assert_eq!(RecordCommand::parse("p"), Some(RecordCommand::TogglePause));
        assert_eq!(
            RecordCommand::parse("resume"),
            Some(RecordCommand::TogglePause)
        );
    }

    #[test]
    fn unknown_record_input_is_ignored() {
        assert_eq!(RecordCommand::parse("x"), None);
    }

    #[test]
    fn playback_keys() {
        assert_eq!(PlaybackCommand::parse("p"), Some(PlaybackCommand::Toggle));
        assert_eq!(
            PlaybackCommand::parse("f"),
            Some(PlaybackCommand::SkipForward)
        );
        assert_eq!(PlaybackCommand::parse("b"), Some(PlaybackCommand::SkipBack));
        assert_eq!(PlaybackCommand::parse("r"), Some(PlaybackCommand::CycleRate));
        assert_eq!(PlaybackCommand::parse("+"), Some(PlaybackCommand::VolumeUp));
        assert_eq!(
            PlaybackCommand::parse("-"),
            Some(PlaybackCommand::VolumeDown)
        );
        assert_eq!(PlaybackCommand::parse("Q"), Some(PlaybackCommand::Quit));
        assert_eq!(PlaybackCommand::parse("zz"), None);
    }

    #[test]
    fn affirmative_answers() {
        assert!(is_affirmative("y"));
        assert!(is_affirmative(" YES\n"));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("no"));
    }
}
