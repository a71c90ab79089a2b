//! Configuration management for `issue_report`.
//!
//! Configuration sources and precedence (highest wins):
//! 1. CLI overrides
//! 2. Environment variables (`ISSUES_*`)
//! 3. YAML config file (`--config`, else `./issues.yaml`)
//! 4. Defaults

use crate::error::{IssueError, Result};
use crate::logging::LogFormat;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Default database filename.
pub const DEFAULT_DB_FILENAME: &str = "db.sqlite3";
/// Default bind address: all interfaces, port 5000.
pub const DEFAULT_BIND: &str = "0.0.0.0:5000";
/// Default directory served under `/static`.
pub const DEFAULT_STATIC_DIR: &str = "static";
/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILENAME: &str = "issues.yaml";
/// Prefix of environment variables read into the env layer.
pub const ENV_PREFIX: &str = "ISSUES_";
/// Every key `ServerConfig::from_layer` reads, in normalized form.
pub const KNOWN_KEYS: [&str; 5] = ["db", "bind", "static-dir", "lock-timeout", "log-format"];

/// One source of configuration values, keyed by normalized name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub values: HashMap<String, String>,
}

impl ConfigLayer {
    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    /// Set a value under its normalized key.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(normalize_key(key), value.into());
    }

    /// Look up a value by any spelling of its key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&normalize_key(key)).map(String::as_str)
    }

    /// Keys that no setting reads, sorted.
    ///
    /// Nested YAML keys land here too: `server: {bind: ..}` flattens to
    /// `server-bind`, which is not `bind`.
    #[must_use]
    pub fn unknown_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .values
            .keys()
            .map(String::as_str)
            .filter(|key| !KNOWN_KEYS.contains(key))
            .collect();
        keys.sort_unstable();
        keys
    }

    /// Build a layer from a YAML file path. Missing files return empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let value: serde_yaml::Value = serde_yaml::from_str(&contents)?;
        Ok(layer_from_yaml_value(&value))
    }

    /// Build a layer from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_vars(env::vars())
    }

    /// Build a layer from `(name, value)` pairs, keeping `ISSUES_*` names.
    #[must_use]
    pub fn from_env_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut layer = Self::default();
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                layer.insert(stripped, value);
            }
        }
        layer
    }
}

/// CLI overrides for config loading (optional).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub db: Option<PathBuf>,
    pub bind: Option<String>,
    pub static_dir: Option<PathBuf>,
    pub lock_timeout: Option<u64>,
    pub log_format: Option<String>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();

        if let Some(path) = &self.db {
            layer.insert("db", path.to_string_lossy());
        }
        if let Some(bind) = &self.bind {
            layer.insert("bind", bind.clone());
        }
        if let Some(dir) = &self.static_dir {
            layer.insert("static-dir", dir.to_string_lossy());
        }
        if let Some(lock_timeout) = self.lock_timeout {
            layer.insert("lock-timeout", lock_timeout.to_string());
        }
        if let Some(format) = &self.log_format {
            layer.insert("log-format", format.clone());
        }

        layer
    }
}

/// Default config layer (lowest precedence).
#[must_use]
pub fn default_config_layer() -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    layer.insert("db", DEFAULT_DB_FILENAME);
    layer.insert("bind", DEFAULT_BIND);
    layer.insert("static-dir", DEFAULT_STATIC_DIR);
    layer.insert("log-format", LogFormat::Text.as_str());
    layer
}

/// Load configuration with the standard precedence order.
///
/// # Errors
///
/// Returns an error if the config file cannot be read or parsed.
pub fn load_config(config_path: Option<&Path>, cli: &CliOverrides) -> Result<ConfigLayer> {
    load_config_with_env(config_path, cli, ConfigLayer::from_env())
}

/// Same as [`load_config`] with an explicit environment layer.
///
/// # Errors
///
/// Returns an error if the config file cannot be read or parsed.
pub fn load_config_with_env(
    config_path: Option<&Path>,
    cli: &CliOverrides,
    env_layer: ConfigLayer,
) -> Result<ConfigLayer> {
    let file_layer = match config_path {
        Some(path) if !path.exists() => {
            return Err(IssueError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        Some(path) => ConfigLayer::from_yaml(path)?,
        None => ConfigLayer::from_yaml(Path::new(DEFAULT_CONFIG_FILENAME))?,
    };

    Ok(ConfigLayer::merge_layers(&[
        default_config_layer(),
        file_layer,
        env_layer,
        cli.as_layer(),
    ]))
}

/// Typed settings for the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub db_path: PathBuf,
    pub bind: SocketAddr,
    /// `None` disables static file serving.
    pub static_dir: Option<PathBuf>,
    pub lock_timeout_ms: Option<u64>,
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Resolve typed settings from a merged layer.
    ///
    /// # Errors
    ///
    /// Returns `IssueError::Config` naming the first invalid value.
    pub fn from_layer(layer: &ConfigLayer) -> Result<Self> {
        let db_path = non_empty(layer, "db")
            .map(PathBuf::from)
            .ok_or_else(|| IssueError::Config("db path cannot be empty".to_string()))?;

        let bind_raw = non_empty(layer, "bind").unwrap_or(DEFAULT_BIND);
        let bind = bind_raw
            .parse::<SocketAddr>()
            .map_err(|e| IssueError::Config(format!("invalid bind address '{bind_raw}': {e}")))?;

        let static_dir = non_empty(layer, "static-dir").map(PathBuf::from);

        let lock_timeout_ms = match non_empty(layer, "lock-timeout") {
            Some(raw) => Some(raw.parse::<u64>().map_err(|e| {
                IssueError::Config(format!("invalid lock-timeout '{raw}': {e}"))
            })?),
            None => None,
        };

        let log_format = non_empty(layer, "log-format")
            .map(str::parse::<LogFormat>)
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            db_path,
            bind,
            static_dir,
            lock_timeout_ms,
            log_format,
        })
    }
}

fn non_empty<'a>(layer: &'a ConfigLayer, key: &str) -> Option<&'a str> {
    layer.get(key).map(str::trim).filter(|value| !value.is_empty())
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace(['_', '.'], "-")
}

fn layer_from_yaml_value(value: &serde_yaml::Value) -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    let mut flat = HashMap::new();
    flatten_yaml(value, "", &mut flat);

    for (key, value) in flat {
        layer.insert(&key, value);
    }

    layer
}

fn flatten_yaml(value: &serde_yaml::Value, prefix: &str, out: &mut HashMap<String, String>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, value) in map {
                let Some(key_str) = key.as_str() else {
                    continue;
                };
                let next_prefix = if prefix.is_empty() {
                    key_str.to_string()
                } else {
                    format!("{prefix}.{key_str}")
                };
                flatten_yaml(value, &next_prefix, out);
            }
        }
        _ => {
            if let Some(value) = yaml_scalar_to_string(value) {
                out.insert(prefix.to_string(), value);
            }
        }
    }
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Bool(v) => Some(v.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Null
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_) => None,
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
    }
}
