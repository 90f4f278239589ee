//! # flow-cli
//!
//! Command-line runner for flow-evm.
//!
//! ## Usage
//!
//! ```bash
//! # Execute runtime code and print the taint verdict
//! flowevm run --code 0x60016004350160005260206000f3 --input 0xaabbccdd...
//!
//! # Stream step records as JSON lines
//! flowevm --json run --code 0x...
//!
//! # Try to trigger a potential overflow
//! flowevm analyze --code 0x... --input 0x...
//!
//! # Configuration
//! flowevm config --show
//! flowevm config --set-fork byzantium
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod error;
mod output;

pub use config::Config;
pub use error::CliError;
pub use output::Output;

/// flow-evm CLI
#[derive(Parser, Debug)]
#[command(name = "flowevm")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path (default: ~/.flowevm/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// CLI commands
#[derive(Debug, Subcommand)]
enum Commands {
    /// Execute code once and print the taint verdict
    Run(commands::run::RunArgs),
    /// Retry a potential overflow with extreme inputs
    Analyze(commands::analyze::AnalyzeArgs),
    /// Show or edit configuration
    Config(commands::config::ConfigArgs),
}

fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(e) = run(cli) {
        if json {
            println!(
                "{}",
                serde_json::json!({
                    "error": e.to_string(),
                    "success": false
                })
            );
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };

    let level = cli.log_level.as_deref().unwrap_or(config.log_level.as_str());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Run(args) => args.execute(&config, cli.json)?,
        Commands::Analyze(args) => args.execute(&config, cli.json)?,
        Commands::Config(args) => args.execute(&mut config, cli.config.as_deref(), cli.json)?,
    }
    Ok(())
}
