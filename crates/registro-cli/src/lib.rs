#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod config_handlers;
pub mod server;

pub use cli::{Cli, Command, ConfigAction};
pub use config::RegistroConfig;
