//! Application configuration value object

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::recording::{Duration, DEFAULT_NAME_PREFIX};
use crate::domain::waveform::MonitorSettings;

/// Live monitor configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub fps: Option<u32>,
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub window: Option<usize>,
}

/// Playback configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaybackConfig {
    pub volume: Option<f32>,
    pub rate: Option<f32>,
}

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub storage_dir: Option<String>,
    pub max_duration: Option<String>,
    pub name_prefix: Option<String>,
    pub monitor: Option<MonitorConfig>,
    pub playback: Option<PlaybackConfig>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        let monitor = MonitorSettings::default();
        Self {
            storage_dir: None,
            max_duration: Some(Duration::default_max_duration().to_string()),
            name_prefix: Some(DEFAULT_NAME_PREFIX.to_string()),
            monitor: Some(MonitorConfig {
                fps: Some(monitor.fps),
                width: Some(monitor.width),
                height: Some(monitor.height),
                window: Some(monitor.window),
            }),
            playback: Some(PlaybackConfig {
                volume: Some(1.0),
                rate: Some(1.0),
            }),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            storage_dir: other.storage_dir.or(self.storage_dir),
            max_duration: other.max_duration.or(self.max_duration),
            name_prefix: other.name_prefix.or(self.name_prefix),
            monitor: Self::merge_monitor_config(self.monitor, other.monitor),
            playback: Self::merge_playback_config(self.playback, other.playback),
        }
    }

    fn merge_monitor_config(
        base: Option<MonitorConfig>,
        other: Option<MonitorConfig>,
    ) -> Option<MonitorConfig> {
        match (base, other) {
            (None, None) => None,
            (Some(b), None) => Some(b),
            (None, Some(o)) => Some(o),
            (Some(b), Some(o)) => Some(MonitorConfig {
                fps: o.fps.or(b.fps),
                width: o.width.or(b.width),
                height: o.height.or(b.height),
                window: o.window.or(b.window),
            }),
        }
    }

    fn merge_playback_config(
        base: Option<PlaybackConfig>,
        other: Option<PlaybackConfig>,
    ) -> Option<PlaybackConfig> {
        match (base, other) {
            (None, None) => None,
            (Some(b), None) => Some(b),
            (None, Some(o)) => Some(o),
            (Some(b), Some(o)) => Some(PlaybackConfig {
                volume: o.volume.or(b.volume),
                rate: o.rate.or(b.rate),
            }),
        }
    }

    /// Recording store directory, or `<data_dir>/voice-memo/recordings`
    pub fn storage_dir_or_default(&self) -> PathBuf {
        match self.storage_dir.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from(".local/share"))
                .join("voice-memo")
                .join("recordings"),
        }
    }

    /// Get max_duration as parsed Duration, or default if not set/invalid
    pub fn max_duration_or_default(&self) -> Duration {
        self.max_duration
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_max_duration)
    }

    pub fn name_prefix_or_default(&self) -> &str {
        self.name_prefix
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_NAME_PREFIX)
    }

    /// Monitor settings with defaults filled in; invalid combinations fall back to defaults
    pub fn monitor_settings(&self) -> MonitorSettings {
        let defaults = MonitorSettings::default();
        let settings = match &self.monitor {
            Some(m) => MonitorSettings {
                fps: m.fps.unwrap_or(defaults.fps),
                width: m.width.unwrap_or(defaults.width),
                height: m.height.unwrap_or(defaults.height),
                window: m.window.unwrap_or(defaults.window),
            },
            None => defaults,
        };
        if settings.validate().is_ok() {
            settings
        } else {
            defaults
        }
    }

    /// Playback volume clamped to 0..=1, or 1.0 if not set
    pub fn playback_volume_or_default(&self) -> f32 {
        self.playback
            .as_ref()
            .and_then(|p| p.volume)
            .filter(|v| v.is_finite())
            .map(|v| v.clamp(0.0, 1.0))
            .unwrap_or(1.0)
    }

    /// Playback rate, or 1.0 if not set/invalid
    pub fn playback_rate_or_default(&self) -> f32 {
        self.playback
            .as_ref()
            .and_then(|p| p.rate)
            .filter(|r| r.is_finite() && *r > 0.0)
            .unwrap_or(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_expected_values() {
        let config = AppConfig::defaults();
        assert!(config.storage_dir.is_none());
        assert_eq!(config.max_duration, Some("1h".to_string()));
        assert_eq!(config.name_prefix, Some("Recording".to_string()));
        let monitor = config.monitor.as_ref().unwrap();
        assert_eq!(monitor.fps, Some(30));
        assert_eq!(monitor.window, Some(1024));
        assert_eq!(config.playback_volume_or_default(), 1.0);
        assert_eq!(config.playback_rate_or_default(), 1.0);
    }

    #[test]
    fn empty_has_all_none() {
        let config = AppConfig::empty();
        assert!(config.storage_dir.is_none());
        assert!(config.max_duration.is_none());
        assert!(config.name_prefix.is_none());
        assert!(config.monitor.is_none());
        assert!(config.playback.is_none());
    }

    #[test]
    fn merge_other_takes_precedence() {
        let base = AppConfig {
            storage_dir: Some("/base".to_string()),
            max_duration: Some("10m".to_string()),
            ..Default::default()
        };
        let other = AppConfig {
            storage_dir: Some("/other".to_string()),
            max_duration: None,
            ..Default::default()
        };

        let merged = base.merge(other);
        assert_eq!(merged.storage_dir, Some("/other".to_string()));
        assert_eq!(merged.max_duration, Some("10m".to_string()));
    }

    #[test]
    fn merge_nested_sections_field_by_field() {
        let base = AppConfig::defaults();
        let other = AppConfig {
            monitor: Some(MonitorConfig {
                fps: Some(15),
                ..Default::default()
            }),
            playback: Some(PlaybackConfig {
                volume: Some(0.4),
                rate: None,
            }),
            ..Default::default()
        };
        let merged = base.merge(other);
        let settings = merged.monitor_settings();
        assert_eq!(settings.fps, 15);
        assert_eq!(settings.width, 64);
        assert_eq!(merged.playback_volume_or_default(), 0.4);
        assert_eq!(merged.playback_rate_or_default(), 1.0);
    }

    #[test]
    fn storage_dir_uses_configured_path() {
        let config = AppConfig {
            storage_dir: Some("/tmp/memos".to_string()),
            ..Default::default()
        };
        assert_eq!(config.storage_dir_or_default(), PathBuf::from("/tmp/memos"));
    }

    #[test]
    fn storage_dir_default_is_namespaced() {
        let dir = AppConfig::empty().storage_dir_or_default();
        assert!(dir.ends_with("voice-memo/recordings"));
    }

    #[test]
    fn max_duration_falls_back_on_invalid() {
        let config = AppConfig {
            max_duration: Some("forever".to_string()),
            ..Default::default()
        };
        assert_eq!(config.max_duration_or_default().as_secs(), 3600);
    }

    #[test]
    fn invalid_monitor_settings_fall_back() {
        let config = AppConfig {
            monitor: Some(MonitorConfig {
                window: Some(1000),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(config.monitor_settings(), MonitorSettings::default());
    }

    #[test]
    fn volume_is_clamped() {
        let config = AppConfig {
            playback: Some(PlaybackConfig {
                volume: Some(3.0),
                rate: Some(-1.0),
            }),
            ..Default::default()
        };
        assert_eq!(config.playback_volume_or_default(), 1.0);
        assert_eq!(config.playback_rate_or_default(), 1.0);
    }

    #[test]
    fn blank_name_prefix_uses_default() {
        let config = AppConfig {
            name_prefix: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(config.name_prefix_or_default(), "Recording");
    }
}
