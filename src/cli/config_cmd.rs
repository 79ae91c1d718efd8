//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::config::{AppConfig, MonitorConfig, PlaybackConfig};
use crate::domain::error::ConfigError;
use crate::domain::recording::Duration;
use crate::domain::waveform::MonitorSettings;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;
    validate_config_value(key, value)?;

    let mut config = store.load().await?;
    apply_value(&mut config, key, value)?;

    store.save(&config).await?;
    presenter.success(&format!("{} = {}", key, value));

    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;

    let config = store.load().await?;
    match read_value(&config, key) {
        Some(v) => presenter.output(&v),
        None => presenter.output(NOT_SET),
    }

    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;

    for key in VALID_CONFIG_KEYS {
        let value = read_value(&config, key).unwrap_or_else(|| NOT_SET.to_string());
        presenter.key_value(key, &value);
    }

    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn check_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            key: key.to_string(),
            message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
        })
    }
}

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        key: key.to_string(),
        message: message.into(),
    }
}

/// Current value of `key` as text, if set
fn read_value(config: &AppConfig, key: &str) -> Option<String> {
    let monitor = config.monitor.as_ref();
    let playback = config.playback.as_ref();
    match key {
        "storage_dir" => config.storage_dir.clone(),
        "max_duration" => config.max_duration.clone(),
        "name_prefix" => config.name_prefix.clone(),
        "monitor.fps" => monitor.and_then(|m| m.fps).map(|v| v.to_string()),
        "monitor.width" => monitor.and_then(|m| m.width).map(|v| v.to_string()),
        "monitor.height" => monitor.and_then(|m| m.height).map(|v| v.to_string()),
        "monitor.window" => monitor.and_then(|m| m.window).map(|v| v.to_string()),
        "playback.volume" => playback.and_then(|p| p.volume).map(|v| v.to_string()),
        "playback.rate" => playback.and_then(|p| p.rate).map(|v| v.to_string()),
        _ => None,
    }
}

/// Store an already validated value
fn apply_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "storage_dir" => config.storage_dir = Some(value.to_string()),
        "max_duration" => config.max_duration = Some(value.to_string()),
        "name_prefix" => config.name_prefix = Some(value.trim().to_string()),
        "monitor.fps" | "monitor.width" | "monitor.height" | "monitor.window" => {
            let monitor = config.monitor.get_or_insert_with(MonitorConfig::default);
            match key {
                "monitor.fps" => monitor.fps = Some(parse_number(key, value)?),
                "monitor.width" => monitor.width = Some(parse_number(key, value)?),
                "monitor.height" => monitor.height = Some(parse_number(key, value)?),
                _ => monitor.window = Some(parse_number(key, value)?),
            }
        }
        "playback.volume" | "playback.rate" => {
            let playback = config.playback.get_or_insert_with(PlaybackConfig::default);
            let number = parse_number::<f32>(key, value)?;
            if key == "playback.volume" {
                playback.volume = Some(number);
            } else {
                playback.rate = Some(number);
            }
        }
        _ => return Err(invalid(key, "Unknown key")),
    }
    Ok(())
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| invalid(key, format!("'{}' is not a number", value)))
}

/// Validate a config value based on key type
fn validate_config_value(key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "max_duration" => {
            value
                .parse::<Duration>()
                .map_err(|e| invalid(key, e.to_string()))?;
        }
        "storage_dir" | "name_prefix" => {
            if value.trim().is_empty() {
                return Err(invalid(key, "Value must not be empty"));
            }
        }
        "monitor.fps" | "monitor.width" | "monitor.height" | "monitor.window" => {
            let mut settings = MonitorSettings::default();
            match key {
                "monitor.fps" => settings.fps = parse_number(key, value)?,
                "monitor.width" => settings.width = parse_number(key, value)?,
                "monitor.height" => settings.height = parse_number(key, value)?,
                _ => settings.window = parse_number(key, value)?,
            }
            settings
                .validate()
                .map_err(|e| invalid(key, e.to_string()))?;
        }
        "playback.volume" => {
            let volume: f32 = parse_number(key, value)?;
            if !(0.0..=1.0).contains(&volume) {
                return Err(invalid(key, "Volume must be between 0.0 and 1.0"));
            }
        }
        "playback.rate" => {
            let rate: f32 = parse_number(key, value)?;
            if !rate.is_finite() || rate <= 0.0 {
                return Err(invalid(key, "Rate must be greater than 0"));
            }
        }
        _ => {}
    }
    Ok(())
}
