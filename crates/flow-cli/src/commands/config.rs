//! `flowevm config`: show or edit the configuration file

use clap::Args;
use std::path::Path;

use crate::{config::Config, output::Output, CliError};

/// Arguments of `flowevm config`
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Show current configuration
    #[arg(long)]
    pub show: bool,
    /// Set the default gas limit
    #[arg(long)]
    pub set_gas_limit: Option<u64>,
    /// Set the fork (frontier, homestead, tangerine, spurious, byzantium, constantinople)
    #[arg(long)]
    pub set_fork: Option<String>,
}

impl ConfigArgs {
    /// Apply the edits to `config`; saves to `path` (or the default path) when
    /// anything changed
    pub fn execute(
        self,
        config: &mut Config,
        path: Option<&Path>,
        json: bool,
    ) -> Result<(), CliError> {
        let mut modified = false;

        if let Some(gas_limit) = self.set_gas_limit {
            config.gas_limit = gas_limit;
            modified = true;
        }

        if let Some(fork) = self.set_fork {
            config.fork = fork;
            // Reject unknown names before writing them out
            config.fork()?;
            modified = true;
        }

        if modified {
            match path {
                Some(path) => config.save_to(path)?,
                None => config.save()?,
            }
            Output::new(json)
                .field("status", "saved")
                .line("Configuration saved")
                .print();
        } else if self.show {
            Output::new(json)
                .field_u64("gas_limit", config.gas_limit)
                .field("fork", &config.fork)
                .field_bool("track_overflow", config.track_overflow)
                .field_u64("max_retry_args", config.max_retry_args as u64)
                .field("caller", &config.caller)
                .field("address", &config.address)
                .field("log_level", &config.log_level)
                .line(format!("Gas Limit: {}", config.gas_limit))
                .line(format!("Fork: {}", config.fork))
                .line(format!("Track Overflow: {}", config.track_overflow))
                .line(format!("Max Retry Args: {}", config.max_retry_args))
                .line(format!("Caller: {}", config.caller))
                .line(format!("Address: {}", config.address))
                .line(format!("Log Level: {}", config.log_level))
                .print();
        } else {
            Output::new(json)
                .line("Use --show to display config, or --set-gas-limit/--set-fork to modify")
                .print();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_values_are_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();

        let args = ConfigArgs {
            show: false,
            set_gas_limit: Some(77_000),
            set_fork: Some("byzantium".to_string()),
        };
        args.execute(&mut config, Some(&path), true).unwrap();

        let saved = Config::load_from(&path).unwrap();
        assert_eq!(saved.gas_limit, 77_000);
        assert_eq!(saved.fork, "byzantium");
    }

    #[test]
    fn test_unknown_fork_is_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();

        let args = ConfigArgs {
            show: false,
            set_gas_limit: None,
            set_fork: Some("paris".to_string()),
        };
        assert!(args.execute(&mut config, Some(&path), false).is_err());
        assert!(!path.exists());
    }
}
