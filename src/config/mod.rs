//! Configuration management.
//!
//! Settings merge from YAML files, environment variables, and CLI flags,
//! highest precedence last:
//!
//! 1. user config (`~/.config/tkr/config.yaml`)
//! 2. project config (`.tracker/config.yaml`)
//! 3. environment (`TKR_*`)
//! 4. CLI overrides

use crate::error::{Result, TrackerError};
use crate::storage::SqliteStorage;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory name for the tracker workspace.
pub const TRACKER_DIR_NAME: &str = ".tracker";

/// Database filename inside the workspace.
pub const DB_FILENAME: &str = "tracker.db";

/// Default busy timeout for the `SQLite` connection (ms).
const DEFAULT_LOCK_TIMEOUT_MS: u64 = 30_000;

/// A flat configuration layer.
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

        let mut layer = Self::default();
        if let serde_yaml::Value::Mapping(mapping) = value {
            for (key, value) in mapping {
                let (Some(key), Some(value)) = (yaml_scalar(&key), yaml_scalar(&value)) else {
                    continue;
                };
                layer.values.insert(normalize_key(&key), value);
            }
        }
        Ok(layer)
    }

    /// Build a layer from `TKR_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let mut layer = Self::default();
        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix("TKR_") {
                layer.values.insert(normalize_key(stripped), value);
            }
        }
        layer
    }

    /// Get a value by normalized key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&String> {
        self.values.get(&normalize_key(key))
    }
}

/// CLI overrides for config loading (optional).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub db: Option<PathBuf>,
    pub actor: Option<String>,
    pub json: Option<bool>,
    pub lock_timeout: Option<u64>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();

        if let Some(path) = &self.db {
            layer
                .values
                .insert("db".to_string(), path.to_string_lossy().to_string());
        }
        if let Some(actor) = &self.actor {
            layer.values.insert("actor".to_string(), actor.clone());
        }
        if let Some(json) = self.json {
            layer.values.insert("json".to_string(), json.to_string());
        }
        if let Some(lock_timeout) = self.lock_timeout {
            layer
                .values
                .insert("lock-timeout".to_string(), lock_timeout.to_string());
        }

        layer
    }
}

/// Discover the active `.tracker` directory.
///
/// Honors `TRACKER_DIR` when set, otherwise walks up from `start` (or CWD).
///
/// # Errors
///
/// Returns `NotInitialized` if no tracker directory is found.
pub fn discover_tracker_dir(start: Option<&Path>) -> Result<PathBuf> {
    if let Ok(value) = env::var("TRACKER_DIR") {
        if !value.trim().is_empty() {
            let path = PathBuf::from(value);
            if path.is_dir() {
                return Ok(path);
            }
        }
    }

    let mut current = match start {
        Some(path) => path.to_path_buf(),
        None => env::current_dir()?,
    };

    loop {
        let candidate = current.join(TRACKER_DIR_NAME);
        if candidate.is_dir() {
            return Ok(candidate);
        }

        if !current.pop() {
            break;
        }
    }

    Err(TrackerError::NotInitialized)
}

/// Load user config (`~/.config/tkr/config.yaml`).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<ConfigLayer> {
    let Ok(home) = env::var("HOME") else {
        return Ok(ConfigLayer::default());
    };
    let path = Path::new(&home)
        .join(".config")
        .join("tkr")
        .join("config.yaml");
    ConfigLayer::from_yaml(&path)
}

/// Load project config (`.tracker/config.yaml`).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(tracker_dir: &Path) -> Result<ConfigLayer> {
    ConfigLayer::from_yaml(&tracker_dir.join("config.yaml"))
}

/// Load configuration with standard precedence order.
///
/// # Errors
///
/// Returns an error if any config file cannot be read or parsed.
pub fn load_config(tracker_dir: &Path, cli: &CliOverrides) -> Result<ConfigLayer> {
    let user = load_user_config()?;
    let project = load_project_config(tracker_dir)?;
    let env_layer = ConfigLayer::from_env();
    let cli_layer = cli.as_layer();

    Ok(ConfigLayer::merge_layers(&[
        user, project, env_layer, cli_layer,
    ]))
}

/// Resolve the acting username with fallback to `USER` and a safe default.
#[must_use]
pub fn resolve_actor(layer: &ConfigLayer) -> String {
    layer
        .get("actor")
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .or_else(|| {
            env::var("USER")
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        })
        .unwrap_or_else(|| "anonymous".to_string())
}

/// Resolve the database path from config.
#[must_use]
pub fn resolve_db_path(tracker_dir: &Path, layer: &ConfigLayer) -> PathBuf {
    layer.get("db").map_or_else(
        || tracker_dir.join(DB_FILENAME),
        |value| {
            let candidate = PathBuf::from(value);
            if candidate.is_absolute() {
                candidate
            } else {
                tracker_dir.join(candidate)
            }
        },
    )
}

/// Open storage using the merged config, returning the storage and the
/// merged layer.
///
/// # Errors
///
/// Returns an error if config cannot be read or the database cannot be
/// opened.
pub fn open_storage(tracker_dir: &Path, cli: &CliOverrides) -> Result<(SqliteStorage, ConfigLayer)> {
    let layer = load_config(tracker_dir, cli)?;
    let db_path = resolve_db_path(tracker_dir, &layer);
    if !db_path.exists() {
        return Err(TrackerError::DatabaseNotFound { path: db_path });
    }
    let lock_timeout = layer
        .get("lock-timeout")
        .and_then(|value| value.parse().ok())
        .or(Some(DEFAULT_LOCK_TIMEOUT_MS));
    let storage = SqliteStorage::open_with_timeout(&db_path, lock_timeout)?;
    Ok((storage, layer))
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('_', "-")
}

fn yaml_scalar(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
