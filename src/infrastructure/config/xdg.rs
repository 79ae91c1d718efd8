//! TOML config file under the platform config directory
//!
//! Also owns the environment layer, so callers get the fully layered
//! configuration from one place: `defaults < file < env < cli`.

use std::env;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

use crate::application::ports::ConfigStore;
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

const APP_DIR: &str = "voice-memo";
const CONFIG_FILE: &str = "config.toml";
const FILE_HEADER: &str = "# voice-memo configuration\n# Keys: voice-memo config list\n\n";

/// Environment variable overriding the storage directory
pub const STORAGE_DIR_ENV: &str = "VOICE_MEMO_STORAGE_DIR";

/// Config store at `<config_dir>/voice-memo/config.toml`
pub struct XdgConfigStore {
    path: PathBuf,
}

impl XdgConfigStore {
    pub fn new() -> Self {
        Self {
            path: default_config_dir().join(APP_DIR).join(CONFIG_FILE),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Settings taken from the environment through `lookup`.
    ///
    /// Blank values count as unset.
    pub fn env_layer(lookup: impl Fn(&str) -> Option<String>) -> AppConfig {
        AppConfig {
            storage_dir: lookup(STORAGE_DIR_ENV).filter(|dir| !dir.trim().is_empty()),
            ..AppConfig::empty()
        }
    }

    /// Defaults, then this file, then the process environment, then `cli`.
    ///
    /// An unreadable or malformed file is skipped with a warning so that a
    /// broken config never blocks recording.
    pub async fn load_layered(&self, cli: AppConfig) -> AppConfig {
        let file = match self.load().await {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring config file");
                AppConfig::empty()
            }
        };
        let env = Self::env_layer(|key| env::var(key).ok());

        AppConfig::defaults().merge(file).merge(env).merge(cli)
    }

    fn parse_toml(content: &str) -> Result<AppConfig, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    fn to_toml(config: &AppConfig) -> Result<String, ConfigError> {
        let body =
            toml::to_string_pretty(config).map_err(|e| ConfigError::WriteError(e.to_string()))?;
        Ok(format!("{FILE_HEADER}{body}"))
    }
}

impl Default for XdgConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Replace `path` through a sibling temp file so readers never see half a file
async fn write_atomic(path: &Path, content: &str) -> Result<(), ConfigError> {
    let tmp = path.with_extension("toml.tmp");
    fs::write(&tmp, content)
        .await
        .map_err(|e| ConfigError::WriteError(e.to_string()))?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(ConfigError::WriteError(e.to_string()));
    }
    Ok(())
}

#[async_trait]
impl ConfigStore for XdgConfigStore {
    async fn load(&self) -> Result<AppConfig, ConfigError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Self::parse_toml(&content),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(AppConfig::empty()),
            Err(e) => Err(ConfigError::ReadError(e.to_string())),
        }
    }

    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        write_atomic(&self.path, &Self::to_toml(config)?).await?;
        debug!(path = %self.path.display(), "Config saved");
        Ok(())
    }

    fn path(&self) -> PathBuf {
        self.path.clone()
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    async fn init(&self) -> Result<(), ConfigError> {
        if self.exists() {
            return Err(ConfigError::AlreadyExists(
                self.path.to_string_lossy().to_string(),
            ));
        }

        self.save(&AppConfig::defaults()).await
    }
}
