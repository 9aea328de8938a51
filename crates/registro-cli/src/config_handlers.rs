//! `registro config` subcommands.
//!
//! Each handler returns the text to print so the binary stays a thin shell.
//! The handlers are generic over [`ConfigManager`]; [`handle_config_command`]
//! binds them to [`RegistroConfig`].

use std::path::PathBuf;

use registro_core::traits::ConfigManager;
use registro_core::{Error, Result};

use crate::cli::ConfigAction;
use crate::config::RegistroConfig;

/// Runs a config action against [`RegistroConfig`] and returns its output.
pub fn handle_config_command(config_path: Option<&str>, action: ConfigAction) -> Result<String> {
    match action {
        ConfigAction::Path => config_path_report::<RegistroConfig>(config_path),
        ConfigAction::Get { key } => config_get::<RegistroConfig>(config_path, &key),
        ConfigAction::Set { key, value } => {
            config_set::<RegistroConfig>(config_path, &key, &value)
        }
        ConfigAction::Init { file, force } => {
            config_init::<RegistroConfig>(file.as_deref(), force)
        }
        ConfigAction::Export { docker_env } => {
            config_export(&RegistroConfig::load(config_path)?, docker_env)
        }
    }
}

/// The resolved config path, flagged when the file is missing.
pub fn config_path_report<C: ConfigManager>(config_path: Option<&str>) -> Result<String> {
    let path = C::resolve_config_path(config_path)
        .ok_or_else(|| Error::config("No config directory on this platform"))?;
    if path.exists() {
        Ok(path.display().to_string())
    } else {
        Ok(format!(
            "{} (missing; create it with `{} config init`)",
            path.display(),
            C::project_name()
        ))
    }
}

/// One value of the effective configuration (file plus env overrides).
pub fn config_get<C: ConfigManager>(config_path: Option<&str>, key: &str) -> Result<String> {
    let config = C::load(config_path)?;
    let tree = toml::Value::try_from(&config).map_err(|e| Error::config(e.to_string()))?;
    lookup(&tree, key)
        .map(render)
        .ok_or_else(|| Error::config(format!("No setting named '{key}'")))
}

/// Writes one value into the config file, which must already exist.
pub fn config_set<C: ConfigManager>(
    config_path: Option<&str>,
    key: &str,
    value: &str,
) -> Result<String> {
    let path = C::resolve_config_path(config_path)
        .ok_or_else(|| Error::config("No config directory on this platform"))?;
    if !path.exists() {
        return Err(Error::config(format!(
            "{} does not exist; run `{} config init` first",
            path.display(),
            C::project_name()
        )));
    }

    let content = std::fs::read_to_string(&path).map_err(|e| Error::io_with_path(e, &path))?;
    let mut tree: toml::Value = toml::from_str(&content)
        .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))?;
    assign(&mut tree, key, infer(value))?;

    // The result must still load as a config before it replaces the file
    let text = toml::to_string_pretty(&tree).map_err(|e| Error::config(e.to_string()))?;
    toml::from_str::<C>(&text)
        .map_err(|e| Error::config(format!("'{key} = {value}' is not a valid setting: {e}")))?;
    std::fs::write(&path, text).map_err(|e| Error::io_with_path(e, &path))?;

    Ok(format!("{key} = {value} ({})", path.display()))
}

/// Writes the default configuration to `file` or the platform default.
pub fn config_init<C: ConfigManager>(file: Option<&str>, force: bool) -> Result<String> {
    let path = match file {
        Some(p) => PathBuf::from(p),
        None => C::default_config_path()
            .ok_or_else(|| Error::config("No config directory on this platform"))?,
    };
    if path.exists() && !force {
        return Err(Error::config(format!(
            "{} already exists; pass --force to overwrite",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }
    std::fs::write(&path, C::default().to_toml_string()?)
        .map_err(|e| Error::io_with_path(e, &path))?;
    Ok(format!("Wrote {}", path.display()))
}

/// `KEY=VALUE` lines, or `--env KEY=VALUE` for `docker run`.
pub fn config_export<C: ConfigManager>(config: &C, docker_env: bool) -> Result<String> {
    let flag = if docker_env { "--env " } else { "" };
    Ok(config
        .to_env_vars()?
        .into_iter()
        .map(|(key, value)| format!("{flag}{key}={value}"))
        .collect::<Vec<_>>()
        .join("\n"))
}

// ============================================================================
// Dotted-key helpers
// ============================================================================

/// Follows a dotted key through nested tables.
pub fn lookup<'a>(tree: &'a toml::Value, key: &str) -> Option<&'a toml::Value> {
    key.split('.')
        .try_fold(tree, |node, part| node.as_table()?.get(part))
}

/// Sets a dotted key, creating intermediate tables.
pub fn assign(tree: &mut toml::Value, key: &str, value: toml::Value) -> Result<()> {
    let (parents, leaf) = match key.rsplit_once('.') {
        Some((parents, leaf)) => (Some(parents), leaf),
        None => (None, key),
    };
    if leaf.is_empty() {
        return Err(Error::config("Empty key"));
    }

    let mut node = tree;
    for part in parents.into_iter().flat_map(|p| p.split('.')) {
        let table = node
            .as_table_mut()
            .ok_or_else(|| Error::config(format!("'{part}' is inside a non-table value")))?;
        node = table
            .entry(part.to_string())
            .or_insert(toml::Value::Table(toml::map::Map::new()));
    }
    node.as_table_mut()
        .ok_or_else(|| Error::config(format!("Cannot set '{key}' on a non-table value")))?
        .insert(leaf.to_string(), value);
    Ok(())
}

/// Reads a command-line value as a bool, integer, float or string.
pub fn infer(raw: &str) -> toml::Value {
    match raw {
        "true" => toml::Value::Boolean(true),
        "false" => toml::Value::Boolean(false),
        _ => raw
            .parse::<i64>()
            .map(toml::Value::Integer)
            .or_else(|_| raw.parse::<f64>().map(toml::Value::Float))
            .unwrap_or_else(|_| toml::Value::String(raw.to_string())),
    }
}

/// Display form of a value: bare scalars, TOML for tables and arrays.
pub fn render(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Table(_) | toml::Value::Array(_) => {
            toml::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        other => other.to_string(),
    }
}
