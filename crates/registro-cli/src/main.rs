#![forbid(unsafe_code)]

//! Registro CLI
//!
//! Entry point for the `registro` binary.

use anyhow::Result;
use clap::Parser;

use registro_cli::config_handlers::handle_config_command;
use registro_cli::{Cli, Command, RegistroConfig, server};
use registro_core::traits::ConfigManager;

/// Loads the configuration and installs the log subscriber.
fn init(config_path: Option<&str>) -> Result<RegistroConfig> {
    let config = RegistroConfig::load(config_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.as_str().into()),
        )
        .init();

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Command::Config { action } => {
            println!("{}", handle_config_command(config_path, action)?);
        }
        Command::Serve { listen } => {
            let config = init(config_path)?;
            server::serve(&config, listen).await?;
        }
        Command::Migrate => {
            let config = init(config_path)?;
            server::migrate(&config).await?;
        }
    }
    Ok(())
}
