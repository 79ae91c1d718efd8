//! Shared plumbing for the command runners

use tracing_subscriber::EnvFilter;

use crate::domain::config::AppConfig;
use crate::infrastructure::{FsRecordingStore, XdgConfigStore};

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "VOICE_MEMO_LOG";

/// Log filter for the given `-v` count, used when `VOICE_MEMO_LOG` is unset
pub fn default_log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the tracing subscriber. Logs go to stderr so stdout stays clean
/// for command output.
pub fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_log_filter(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    XdgConfigStore::new().load_layered(cli_config).await
}

/// Recording store rooted at the configured directory
pub fn open_store(config: &AppConfig) -> FsRecordingStore {
    FsRecordingStore::new(config.storage_dir_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_filter() {
        assert_eq!(default_log_filter(0), "warn");
        assert_eq!(default_log_filter(1), "debug");
        assert_eq!(default_log_filter(2), "trace");
        assert_eq!(default_log_filter(9), "trace");
    }

    #[test]
    fn exit_codes_are_distinct() {
        assert_ne!(EXIT_SUCCESS, EXIT_ERROR);
        assert_ne!(EXIT_ERROR, EXIT_USAGE_ERROR);
    }

    #[test]
    fn store_uses_configured_dir() {
        let config = AppConfig {
            storage_dir: Some("/tmp/memos".to_string()),
            ..Default::default()
        };
        assert_eq!(open_store(&config).dir(), std::path::Path::new("/tmp/memos"));
    }
}
