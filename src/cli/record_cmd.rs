//! Interactive recording command

use std::process::ExitCode;
use std::sync::Arc;

use tracing::debug;

use crate::application::{
    LiveMonitor, RecordingSessionController, SessionError, SessionOptions,
};
use crate::domain::recording::Recording;
use crate::domain::session::{format_clock, SessionState};
use crate::infrastructure::{
    CpalCaptureDevice, FlacSegmentEncoder, FsRecordingStore, SystemClock,
};

use super::app::{EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR};
use super::args::RecordOptions;
use super::display::TerminalDisplay;
use super::input::{spawn_line_reader, RecordCommand};
use super::presenter::Presenter;
use super::signals::InterruptSignal;

/// How the recording loop ended
enum Finish {
    Stopped(Result<Option<Recording>, SessionError>),
    LimitReached(Result<Option<Recording>, SessionError>),
    Interrupted(SessionError),
}

/// Record from the default microphone until stopped
pub async fn run_record(options: RecordOptions) -> ExitCode {
    let presenter = Presenter::new();

    let monitor = match LiveMonitor::new(options.monitor) {
        Ok(monitor) => monitor,
        Err(e) => {
            presenter.error(&format!("Invalid monitor settings: {}", e));
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };

    let mut interrupts = match InterruptSignal::listen() {
        Ok(signal) => signal,
        Err(e) => {
            presenter.error(&format!("Failed to setup signal handler: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let display = TerminalDisplay::new().with_limit(options.max_duration);
    let mut controller = RecordingSessionController::new(
        CpalCaptureDevice::new(),
        FlacSegmentEncoder::new(),
        FsRecordingStore::new(options.storage_dir.clone()),
        Arc::new(SystemClock::new()),
    )
    .with_options(SessionOptions {
        name: options.name.clone(),
        name_prefix: options.name_prefix.clone(),
    })
    .with_monitor(monitor, Box::new(display));

    if let Err(e) = controller.start().await {
        presenter.error(&e.to_string());
        return ExitCode::from(EXIT_ERROR);
    }
    presenter.info("Recording. Type p + Enter to pause or resume, Enter to stop");

    let limit = options.max_duration.as_std();
    let mut keys = spawn_line_reader();
    let mut keys_open = true;

    let finish = loop {
        let remaining = limit.saturating_sub(controller.elapsed());
        let running = controller.state() == SessionState::Recording;

        tokio::select! {
            line = keys.recv(), if keys_open => match line {
                Some(line) => match RecordCommand::parse(&line) {
                    Some(RecordCommand::Stop) => break Finish::Stopped(controller.stop().await),
                    Some(RecordCommand::TogglePause) => {
                        if let Err(e) = controller.toggle_pause().await {
                            break Finish::Stopped(Err(e));
                        }
                    }
                    None => debug!(input = %line, "Ignoring unknown key"),
                },
                // stdin closed: Ctrl+C or the limit still end the recording
                None => keys_open = false,
            },
            event = controller.next_event() => {
                if let Err(e) = controller.handle_event(event).await {
                    break Finish::Interrupted(e);
                }
            }
            _ = interrupts.recv() => break Finish::Stopped(controller.stop().await),
            _ = tokio::time::sleep(remaining), if running => {
                if controller.elapsed() >= limit {
                    break Finish::LimitReached(controller.stop().await);
                }
            }
        }
    };

    report(&presenter, finish)
}

fn report(presenter: &Presenter, finish: Finish) -> ExitCode {
    match finish {
        Finish::LimitReached(result) => {
            presenter.info("Maximum duration reached");
            report_saved(presenter, result)
        }
        Finish::Stopped(result) => report_saved(presenter, result),
        Finish::Interrupted(SessionError::StreamInterrupted { reason, recording }) => {
            presenter.warn(&format!("Recording interrupted: {}", reason));
            match recording {
                Some(recording) => {
                    presenter.success(&saved_message(&recording));
                    presenter.output(recording.id().as_str());
                }
                None => presenter.error("Nothing could be saved"),
            }
            ExitCode::from(EXIT_ERROR)
        }
        Finish::Interrupted(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn report_saved(
    presenter: &Presenter,
    result: Result<Option<Recording>, SessionError>,
) -> ExitCode {
    match result {
        Ok(Some(recording)) => {
            presenter.success(&saved_message(&recording));
            presenter.output(recording.id().as_str());
            ExitCode::from(EXIT_SUCCESS)
        }
        Ok(None) => {
            presenter.warn("No active recording");
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn saved_message(recording: &Recording) -> String {
    format!(
        "Saved \"{}\" ({}, {} KB)",
        recording.name(),
        format_clock(recording.duration_seconds()),
        recording.size_kb()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::domain::audio::{AudioData, AudioMimeType};

    #[test]
    fn saved_message_has_name_duration_and_size() {
        let recording = Recording::new(
            "1700000000000-3".parse().unwrap(),
            "Call notes",
            Utc::now(),
            63.4,
            AudioData::new(vec![0; 2048], AudioMimeType::Flac),
        );
        assert_eq!(saved_message(&recording), "Saved \"Call notes\" (01:03, 2 KB)");
    }
}
