//! Interactive playback command

use std::process::ExitCode;

use colored::Colorize;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::application::ports::{PlaybackError, Player};
use crate::application::{
    LiveMonitor, PlaybackOptions, PlaybackSession, RecordingLibrary, VolumeLevel, VOLUME_STEP,
};
use crate::infrastructure::{FsRecordingStore, RodioPlayer};

use super::app::{EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR};
use super::args::PlayOptions;
use super::display::TerminalDisplay;
use super::input::{spawn_line_reader, PlaybackCommand};
use super::presenter::Presenter;
use super::signals::InterruptSignal;

/// Play a stored recording with a live waveform until it ends or the user quits
pub async fn run_play(options: PlayOptions) -> ExitCode {
    let presenter = Presenter::new();

    let mut monitor = match LiveMonitor::new(options.monitor) {
        Ok(monitor) => monitor,
        Err(e) => {
            presenter.error(&format!("Invalid monitor settings: {}", e));
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };

    let library = RecordingLibrary::new(FsRecordingStore::new(options.storage_dir.clone()));
    let recording = match library.load(&options.id).await {
        Ok(recording) => recording,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let player = match RodioPlayer::new() {
        Ok(player) => player,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut session = match PlaybackSession::open(
        player,
        &recording,
        PlaybackOptions {
            rate: options.rate,
            volume: options.volume,
            start_at: options.seek,
        },
    ) {
        Ok(session) => session,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };
    monitor.attach(session.tap());

    let mut interrupts = match InterruptSignal::listen() {
        Ok(signal) => signal,
        Err(e) => {
            presenter.error(&format!("Failed to setup signal handler: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    presenter.info(&format!(
        "Playing \"{}\". Keys: p pause, f/b skip, r speed, +/- volume, q quit (then Enter)",
        recording.name()
    ));

    let display = TerminalDisplay::new();
    let mut keys = spawn_line_reader();
    let mut keys_open = true;
    let mut ticker = interval(options.monitor.frame_period());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if session.is_finished() {
                    break;
                }
                // Paused playback keeps the last waveform on screen
                if !session.is_paused() || monitor.framebuffer().is_blank() {
                    monitor.sample();
                }
                display.show(&playback_header(&session), &monitor.rows());
            }
            line = keys.recv(), if keys_open => match line {
                Some(line) => match PlaybackCommand::parse(&line) {
                    Some(PlaybackCommand::Quit) => break,
                    Some(command) => {
                        if let Err(e) = apply(&mut session, command) {
                            warn!(error = %e, "Playback command failed");
                        }
                    }
                    None => debug!(input = %line, "Ignoring unknown key"),
                },
                None => keys_open = false,
            },
            _ = interrupts.recv() => break,
        }
    }

    display.clear();
    monitor.detach();
    presenter.success(&format!("Finished \"{}\"", recording.name()));
    ExitCode::from(EXIT_SUCCESS)
}

/// Run one transport command against the session
pub fn apply<P: Player>(
    session: &mut PlaybackSession<P>,
    command: PlaybackCommand,
) -> Result<(), PlaybackError> {
    match command {
        PlaybackCommand::Toggle => {
            session.toggle();
        }
        PlaybackCommand::SkipForward => session.skip_forward()?,
        PlaybackCommand::SkipBack => session.skip_back()?,
        PlaybackCommand::CycleRate => {
            session.cycle_rate();
        }
        PlaybackCommand::VolumeUp => {
            session.adjust_volume(VOLUME_STEP);
        }
        PlaybackCommand::VolumeDown => {
            session.adjust_volume(-VOLUME_STEP);
        }
        PlaybackCommand::Quit => {}
    }
    Ok(())
}

/// `▶ 00:12 / 01:15  1.5x  vol high`
pub fn playback_header<P: Player>(session: &PlaybackSession<P>) -> String {
    format_header(
        session.is_paused(),
        &session.time_readout(),
        session.rate(),
        session.volume_level(),
    )
}

fn format_header(paused: bool, readout: &str, rate: f32, level: VolumeLevel) -> String {
    let icon = if paused {
        "❚❚".yellow().bold()
    } else {
        "▶".green().bold()
    };
    format!(
        "{} {}  {}  {}",
        icon,
        readout.bold(),
        format!("{}x", rate).cyan(),
        format!("vol {}", level).dimmed()
    )
}
