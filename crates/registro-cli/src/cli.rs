//! Command-line arguments.

use clap::{Parser, Subcommand};

/// Registro: accessibility surveys and IT inventory records
#[derive(Parser, Debug)]
#[command(name = "registro", author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Subcommand
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server
    Serve {
        /// Socket address, overriding `server.listen`
        #[arg(short, long)]
        listen: Option<String>,
    },
    /// Create the database schema and exit
    Migrate,
    /// Inspect or edit the configuration file
    Config {
        /// Config action
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// `registro config ...`
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the resolved config file path
    Path,
    /// Print one value by dotted key (e.g. `storage.backend`)
    Get {
        /// Dotted key
        key: String,
    },
    /// Set one value by dotted key in the config file
    Set {
        /// Dotted key
        key: String,
        /// New value; booleans and numbers are detected
        value: String,
    },
    /// Write a default config file
    Init {
        /// Target file instead of the platform default
        #[arg(long)]
        file: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the configuration as environment variables
    Export {
        /// Format as `--env KEY=VALUE` for `docker run`
        #[arg(long)]
        docker_env: bool,
    },
}
