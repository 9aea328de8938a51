//! The `registro` configuration file.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use registro_core::traits::ConfigManager;
use registro_workflows::DEFAULT_SESSION_TTL;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistroConfig {
    /// HTTP listener
    pub server: ServerConfig,
    /// Record store
    pub storage: StorageConfig,
    /// Bearer tokens for the inventory routes
    pub auth: AuthSettings,
    /// Browser sessions
    pub session: SessionSettings,
    /// Log filter
    pub logging: LoggingConfig,
}

/// `[server]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8000".to_string(),
        }
    }
}

/// Which record store backs the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process memory; lost on restart
    #[default]
    Memory,
    /// SQLite database at `database_url`
    Sqlite,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StorageBackend::Memory => "memory",
            StorageBackend::Sqlite => "sqlite",
        })
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "sqlite" => Ok(StorageBackend::Sqlite),
            other => Err(format!("unknown storage backend '{other}'")),
        }
    }
}

/// `[storage]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend kind
    pub backend: StorageBackend,
    /// sqlx connection URL, used by the SQLite backend
    pub database_url: String,
    /// Pool size for file databases
    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            database_url: "sqlite://registro.db".to_string(),
            max_connections: 5,
        }
    }
}

/// `[auth]`
///
/// Enabled unless the file turns it off: inventory records are stamped with
/// the acting user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Require a bearer token on `/inventario`
    pub enabled: bool,
    /// Token to username
    pub tokens: BTreeMap<String, String>,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            tokens: BTreeMap::new(),
        }
    }
}

/// `[session]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Seconds a session may sit idle before it is dropped
    pub ttl_secs: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_SESSION_TTL.as_secs(),
        }
    }
}

impl SessionSettings {
    /// Idle timeout as a `Duration`.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl RegistroConfig {
    /// Applies overrides from `lookup`, which maps a variable name to its value.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let prefix = Self::env_prefix();
        if let Some(listen) = lookup(&format!("{prefix}_LISTEN")).filter(|v| !v.is_empty()) {
            self.server.listen = listen;
        }
        if let Some(url) = lookup(&format!("{prefix}_DATABASE_URL")).filter(|v| !v.is_empty()) {
            self.storage.database_url = url;
        }
        if let Some(raw) = lookup(&format!("{prefix}_STORAGE_BACKEND")).filter(|v| !v.is_empty()) {
            match raw.parse() {
                Ok(backend) => self.storage.backend = backend,
                // Logging is not up yet while the config loads
                Err(err) => eprintln!("warning: ignoring {prefix}_STORAGE_BACKEND: {err}"),
            }
        }
    }
}

impl ConfigManager for RegistroConfig {
    fn project_name() -> &'static str {
        "registro"
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }
}
