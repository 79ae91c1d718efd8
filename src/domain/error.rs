//! Domain error types

use thiserror::Error;

/// Error when parsing a duration string
#[derive(Debug, Clone, Error)]
#[error("Invalid duration format: \"{input}\". Expected format: <number>h, <number>m, <number>s or a combination (e.g., 30s, 5m, 1h30m)")]
pub struct DurationParseError {
    pub input: String,
}

/// Error when a recording id contains characters a store cannot address
#[derive(Debug, Clone, Error)]
#[error("Invalid recording id: \"{input}\". Ids contain only letters, digits, '-' and '_'")]
pub struct InvalidRecordingIdError {
    pub input: String,
}

/// Error when an unknown audio MIME type is encountered
#[derive(Debug, Clone, Error)]
#[error("Unsupported audio type: \"{input}\"")]
pub struct UnknownMimeTypeError {
    pub input: String,
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}
