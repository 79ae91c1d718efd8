//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::domain::recording::{Duration, RecordingId};
use crate::domain::waveform::MonitorSettings;

/// voice-memo - record, monitor and play back voice memos
#[derive(Parser, Debug)]
#[command(name = "voice-memo")]
#[command(version)]
#[command(about = "Record voice memos with a live waveform monitor, then browse and play them back")]
#[command(long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Directory holding recordings
    #[arg(long, value_name = "DIR", global = true, env = "VOICE_MEMO_STORAGE_DIR")]
    pub storage_dir: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record a new memo (p+Enter pauses/resumes, Enter stops)
    Record {
        /// Name of the recording (default: "<prefix> HH:MM:SS")
        #[arg(short, long)]
        name: Option<String>,

        /// Stop automatically after this much active time (e.g., 30s, 5m, 1h)
        #[arg(short, long, value_name = "TIME")]
        max_duration: Option<String>,
    },
    /// List recordings, newest first
    List,
    /// Show details of a recording
    Info {
        /// Recording id
        id: RecordingId,
    },
    /// Play a recording (p pause, f/b skip, r speed, +/- volume, q quit)
    Play {
        /// Recording id
        id: RecordingId,

        /// Playback speed multiplier
        #[arg(long, value_name = "RATE")]
        rate: Option<f32>,

        /// Volume between 0.0 and 1.0
        #[arg(long, value_name = "VOLUME")]
        volume: Option<f32>,

        /// Start position in seconds
        #[arg(long, value_name = "SECONDS")]
        seek: Option<f64>,
    },
    /// Write the audio of a recording to a file
    Export {
        /// Recording id
        id: RecordingId,

        /// Target directory (default: current directory)
        #[arg(short, long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },
    /// Delete a recording
    Delete {
        /// Recording id
        id: RecordingId,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Parsed record options
#[derive(Debug, Clone)]
pub struct RecordOptions {
    pub name: Option<String>,
    pub name_prefix: String,
    pub max_duration: Duration,
    pub storage_dir: PathBuf,
    pub monitor: MonitorSettings,
}

/// Parsed play options
#[derive(Debug, Clone)]
pub struct PlayOptions {
    pub id: RecordingId,
    pub rate: f32,
    pub volume: f32,
    pub seek: f64,
    pub storage_dir: PathBuf,
    pub monitor: MonitorSettings,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "storage_dir",
    "max_duration",
    "name_prefix",
    "monitor.fps",
    "monitor.width",
    "monitor.height",
    "monitor.window",
    "playback.volume",
    "playback.rate",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_record_defaults() {
        let cli = Cli::parse_from(["voice-memo", "record"]);
        assert_eq!(cli.verbose, 0);
        assert!(matches!(
            cli.command,
            Commands::Record {
                name: None,
                max_duration: None
            }
        ));
    }

    #[test]
    fn cli_parses_record_options() {
        let cli = Cli::parse_from(["voice-memo", "record", "-n", "Groceries", "-m", "5m"]);
        if let Commands::Record { name, max_duration } = cli.command {
            assert_eq!(name, Some("Groceries".to_string()));
            assert_eq!(max_duration, Some("5m".to_string()));
        } else {
            panic!("Expected Record command");
        }
    }

    #[test]
    fn cli_parses_verbose_count() {
        let cli = Cli::parse_from(["voice-memo", "-vv", "list"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn cli_parses_global_storage_dir() {
        let cli = Cli::parse_from(["voice-memo", "list", "--storage-dir", "/tmp/memos"]);
        assert_eq!(cli.storage_dir, Some("/tmp/memos".to_string()));
    }

    #[test]
    fn cli_parses_play_options() {
        let cli = Cli::parse_from([
            "voice-memo",
            "play",
            "1700000000000-42",
            "--rate",
            "1.5",
            "--volume",
            "0.4",
            "--seek",
            "12",
        ]);
        if let Commands::Play {
            id,
            rate,
            volume,
            seek,
        } = cli.command
        {
            assert_eq!(id.as_str(), "1700000000000-42");
            assert_eq!(rate, Some(1.5));
            assert_eq!(volume, Some(0.4));
            assert_eq!(seek, Some(12.0));
        } else {
            panic!("Expected Play command");
        }
    }

    #[test]
    fn cli_rejects_malformed_id() {
        let result = Cli::try_parse_from(["voice-memo", "info", "../etc/passwd"]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_parses_delete_yes() {
        let cli = Cli::parse_from(["voice-memo", "delete", "abc-1", "--yes"]);
        assert!(matches!(cli.command, Commands::Delete { yes: true, .. }));
    }

    #[test]
    fn cli_parses_config_set() {
        let cli = Cli::parse_from(["voice-memo", "config", "set", "monitor.fps", "24"]);
        if let Commands::Config {
            action: ConfigAction::Set { key, value },
        } = cli.command
        {
            assert_eq!(key, "monitor.fps");
            assert_eq!(value, "24");
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn valid_config_keys() {
        assert!(is_valid_config_key("storage_dir"));
        assert!(is_valid_config_key("monitor.window"));
        assert!(is_valid_config_key("playback.rate"));
        assert!(!is_valid_config_key("api_key"));
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }
}
