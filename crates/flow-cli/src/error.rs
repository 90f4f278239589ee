//! CLI error types

use thiserror::Error;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid address format
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid hex string
    #[error("Invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// Invalid word value
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Unknown fork name
    #[error("Unknown fork: {0}")]
    UnknownFork(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config file could not be parsed
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// Config could not be serialized
    #[error("Config error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    /// No config path could be determined
    #[error("Cannot determine config path")]
    NoConfigPath,
}
