//! CLI configuration management

use crate::error::CliError;
use flow_evm::Fork;
use flow_primitives::Address;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Gas given to each run
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
    /// Fork whose rules apply
    #[serde(default = "default_fork")]
    pub fork: String,
    /// Classify tainted arithmetic
    #[serde(default = "default_track_overflow")]
    pub track_overflow: bool,
    /// Most arguments the analyzer enumerates
    #[serde(default = "default_max_retry_args")]
    pub max_retry_args: usize,
    /// Sender of each call
    #[serde(default = "default_caller")]
    pub caller: String,
    /// Address the code runs at
    #[serde(default = "default_address")]
    pub address: String,
    /// Log filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_gas_limit() -> u64 {
    10_000_000
}

fn default_fork() -> String {
    Fork::Constantinople.as_str().to_string()
}

fn default_track_overflow() -> bool {
    true
}

fn default_max_retry_args() -> usize {
    8
}

fn default_caller() -> String {
    Address::ZERO.to_hex()
}

fn default_address() -> String {
    "0x00000000000000000000000000000000000000ff".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gas_limit: default_gas_limit(),
            fork: default_fork(),
            track_overflow: default_track_overflow(),
            max_retry_args: default_max_retry_args(),
            caller: default_caller(),
            address: default_address(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".flowevm"))
    }

    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    /// Load config from the default path or return default
    pub fn load() -> Self {
        Self::config_path()
            .filter(|path| path.exists())
            .and_then(|path| std::fs::read_to_string(path).ok())
            .and_then(|content| toml::from_str(&content).ok())
            .unwrap_or_default()
    }

    /// Load config from an explicit path; a missing file yields the default
    pub fn load_from(path: &Path) -> Result<Self, CliError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<(), CliError> {
        let path = Self::config_path().ok_or(CliError::NoConfigPath)?;
        self.save_to(&path)
    }

    /// Save config to `path`, creating its directory
    pub fn save_to(&self, path: &Path) -> Result<(), CliError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Parsed fork
    pub fn fork(&self) -> Result<Fork, CliError> {
        self.fork.parse().map_err(|_| CliError::UnknownFork(self.fork.clone()))
    }

    /// Parsed caller address
    pub fn caller(&self) -> Result<Address, CliError> {
        Address::from_hex(&self.caller).map_err(|e| CliError::InvalidAddress(e.to_string()))
    }

    /// Parsed code address
    pub fn address(&self) -> Result<Address, CliError> {
        Address::from_hex(&self.address).map_err(|e| CliError::InvalidAddress(e.to_string()))
    }
}
