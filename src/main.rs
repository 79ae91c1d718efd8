//! voice-memo CLI entry point

use std::process::ExitCode;

use clap::Parser;

use voice_memo::application::RecordingLibrary;
use voice_memo::cli::{
    app::{init_logging, load_merged_config, open_store, EXIT_ERROR, EXIT_USAGE_ERROR},
    args::{Cli, Commands, PlayOptions, RecordOptions},
    config_cmd::handle_config_command,
    library_cmd::{handle_library_command, LibraryCommand},
    play_cmd::run_play,
    presenter::Presenter,
    record_cmd::run_record,
};
use voice_memo::domain::config::{AppConfig, PlaybackConfig};
use voice_memo::domain::recording::Duration;
use voice_memo::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let presenter = Presenter::new();

    if let Commands::Config { action } = cli.command {
        let store = XdgConfigStore::new();
        if let Err(e) = handle_config_command(action, &store, &presenter).await {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
        return ExitCode::SUCCESS;
    }

    // Build CLI config from args
    let mut cli_config = AppConfig {
        storage_dir: cli.storage_dir.clone(),
        ..Default::default()
    };
    match &cli.command {
        Commands::Record { max_duration, .. } => {
            cli_config.max_duration = max_duration.clone();
        }
        Commands::Play {
            rate, volume, seek, ..
        } => {
            if let Some(rate) = rate {
                if !rate.is_finite() || *rate <= 0.0 {
                    presenter.error("Invalid rate: must be greater than 0");
                    return ExitCode::from(EXIT_USAGE_ERROR);
                }
            }
            if let Some(volume) = volume {
                if !(0.0..=1.0).contains(volume) {
                    presenter.error("Invalid volume: must be between 0.0 and 1.0");
                    return ExitCode::from(EXIT_USAGE_ERROR);
                }
            }
            if let Some(seek) = seek {
                if !seek.is_finite() || *seek < 0.0 {
                    presenter.error("Invalid seek position: must be 0 or more seconds");
                    return ExitCode::from(EXIT_USAGE_ERROR);
                }
            }
            cli_config.playback = Some(PlaybackConfig {
                volume: *volume,
                rate: *rate,
            });
        }
        _ => {}
    }

    // Merge config
    let config = load_merged_config(cli_config).await;

    match cli.command {
        Commands::Record { name, .. } => {
            let max_duration = match config.max_duration.as_ref() {
                Some(s) => match s.parse::<Duration>() {
                    Ok(d) => d,
                    Err(e) => {
                        presenter.error(&format!("Invalid max-duration: {}", e));
                        return ExitCode::from(EXIT_USAGE_ERROR);
                    }
                },
                None => Duration::default_max_duration(),
            };

            let options = RecordOptions {
                name: name.filter(|n| !n.trim().is_empty()),
                name_prefix: config.name_prefix_or_default().to_string(),
                max_duration,
                storage_dir: config.storage_dir_or_default(),
                monitor: config.monitor_settings(),
            };
            run_record(options).await
        }
        Commands::Play { id, seek, .. } => {
            let options = PlayOptions {
                id,
                rate: config.playback_rate_or_default(),
                volume: config.playback_volume_or_default(),
                seek: seek.unwrap_or(0.0),
                storage_dir: config.storage_dir_or_default(),
                monitor: config.monitor_settings(),
            };
            run_play(options).await
        }
        Commands::List => library(&config, LibraryCommand::List, &presenter).await,
        Commands::Info { id } => library(&config, LibraryCommand::Info(id), &presenter).await,
        Commands::Export { id, dir } => {
            library(&config, LibraryCommand::Export { id, dir }, &presenter).await
        }
        Commands::Delete { id, yes } => {
            library(
                &config,
                LibraryCommand::Delete { id, confirmed: yes },
                &presenter,
            )
            .await
        }
        Commands::Config { .. } => ExitCode::SUCCESS,
    }
}

async fn library(config: &AppConfig, command: LibraryCommand, presenter: &Presenter) -> ExitCode {
    let library = RecordingLibrary::new(open_store(config));
    handle_library_command(command, &library, presenter).await
}
