//! # Shuflow Configuration Module
//!
//! This module provides configuration management for Shuflow, including:
//! - Loading configuration from YAML files
//! - Merging with embedded default configuration
//! - Environment variable overrides
//! - Type-safe getters and setters for configuration values
//!
//! The configuration is loaded once by the binary and handed to the
//! components that need it.
//!
//! ## Usage
//!
//! ```no_run
//! use shuflowconfig::Config;
//!
//! let config = Config::load_config("")?;
//! let page_size = config.get_page_size()?;
//! let database = config.get_library_database_path()?;
//!
//! config.set_queue_lookahead(8)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Result, anyhow};
use dirs::home_dir;
use serde_yaml::{Mapping, Number, Value};
use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::info;

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("shuflow.yaml");

const ENV_CONFIG_DIR: &str = "SHUFLOW_CONFIG";
const ENV_PREFIX: &str = "SHUFLOW_CONFIG__";

// Default values for configuration
const DEFAULT_API_BASE: &str = "https://api.spotify.com/v1";
const DEFAULT_DATABASE: &str = "library.db";
const DEFAULT_PAGE_SIZE: usize = 50;
const MAX_PAGE_SIZE: usize = 50;
const DEFAULT_SYNC_FRESHNESS_HOURS: usize = 24;
const DEFAULT_MAX_SELECTION_RETRIES: usize = 20;
const DEFAULT_QUEUE_LOOKAHEAD: usize = 5;
const DEFAULT_LOG_MIN_LEVEL: &str = "info";

/// Macro to generate getter/setter for usize values with default
macro_rules! impl_usize_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> Result<usize> {
            match self.get_value($path) {
                Ok(Value::Number(n)) => Ok(n.as_u64().map(|v| v as usize).unwrap_or($default)),
                Ok(Value::String(s)) => Ok(s.trim().parse().unwrap_or($default)),
                _ => Ok($default),
            }
        }

        pub fn $setter(&self, value: usize) -> Result<()> {
            self.set_value($path, Value::Number(Number::from(value as u64)))
        }
    };
}

/// Configuration manager for Shuflow
///
/// Holds the merged YAML tree (embedded defaults, then `config.yaml`, then
/// `SHUFLOW_CONFIG__*` environment overrides) and writes it back on every
/// change.
#[derive(Debug)]
pub struct Config {
    config_dir: String,
    path: String,
    data: Mutex<Value>,
}

impl Config {
    /// Finds a config directory by trying different locations in order
    fn find_config_dir(directory: &str) -> String {
        // 1. Try provided directory
        if !directory.is_empty() {
            return directory.to_string();
        }

        // 2. Try environment variable
        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var=ENV_CONFIG_DIR, path=%env_path, "Trying to load config from env");
            return env_path;
        }

        // 3. Try current directory
        if Path::new(".shuflow").exists() {
            return ".shuflow".to_string();
        }

        // 4. Try home directory
        if let Some(home) = home_dir() {
            let home_config = home.join(".shuflow");
            if home_config.exists() {
                return home_config.to_string_lossy().to_string();
            }
        }

        ".shuflow".to_string()
    }

    /// Validates and prepares a config directory
    fn validate_config_dir(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        if !path.is_dir() {
            return Err(anyhow!("{} is not a directory", path.display()));
        }

        let test_file = path.join(".write_test");
        fs::write(&test_file, b"test")?;
        fs::remove_file(&test_file)?;

        Ok(())
    }

    /// Determines and validates the configuration directory
    ///
    /// The directory is searched in the following order:
    /// 1. The provided `directory` parameter if not empty
    /// 2. The `SHUFLOW_CONFIG` environment variable
    /// 3. `.shuflow` in the current directory
    /// 4. `.shuflow` in the user's home directory
    pub fn config_dir(directory: &str) -> Result<String> {
        let dir_path = Self::find_config_dir(directory);
        Self::validate_config_dir(Path::new(&dir_path))?;
        Ok(dir_path)
    }

    /// Loads the configuration from the specified directory
    ///
    /// This method:
    /// 1. Determines the configuration directory
    /// 2. Loads the default embedded configuration
    /// 3. Merges it with the external config.yaml file if present
    /// 4. Applies environment variable overrides
    /// 5. Saves the merged configuration
    pub fn load_config(directory: &str) -> Result<Self> {
        let config_dir = Self::config_dir(directory)?;
        info!(config_dir=%config_dir, "Using config directory");

        let path = Path::new(&config_dir)
            .join("config.yaml")
            .to_string_lossy()
            .to_string();

        let mut config_value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        match fs::read(&path) {
            Ok(data) => {
                info!(config_file=%path, "Loaded config file");
                let external_value: Value = serde_yaml::from_slice(&data)?;
                merge_yaml(&mut config_value, &lower_keys_value(external_value));
            }
            Err(_) => {
                info!(config_file=%path, "Config file not found, using default embedded config");
            }
        }

        let mut config_value = lower_keys_value(config_value);
        apply_env_overrides(&mut config_value, env::vars());

        let config = Config {
            config_dir,
            path,
            data: Mutex::new(config_value),
        };

        config.save()?;
        Ok(config)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Value>> {
        self.data
            .lock()
            .map_err(|_| anyhow!("configuration lock poisoned"))
    }

    /// Returns the directory holding `config.yaml`
    pub fn dir(&self) -> &str {
        &self.config_dir
    }

    /// Saves the current configuration to the config.yaml file
    pub fn save(&self) -> Result<()> {
        let yaml = {
            let data = self.lock()?;
            serde_yaml::to_string(&*data)?
        };
        fs::write(&self.path, yaml)?;
        Ok(())
    }

    /// Sets a configuration value at the specified path and saves it
    ///
    /// `path` is an array of keys, e.g. `&["library", "page_size"]`.
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        {
            let mut data = self.lock()?;
            set_value_internal(&mut data, path, value)?;
        }
        self.save()
    }

    /// Gets a configuration value at the specified path
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.lock()?;
        get_value_internal(&data, path)
    }

    fn get_string(&self, path: &[&str]) -> Option<String> {
        match self.get_value(path) {
            Ok(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        }
    }

    /// Base URL of the remote catalog API
    pub fn get_spotify_api_base(&self) -> String {
        self.get_string(&["spotify", "api_base"])
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
    }

    pub fn set_spotify_api_base(&self, base: String) -> Result<()> {
        self.set_value(&["spotify", "api_base"], Value::String(base))
    }

    /// Bearer token issued by the (external) authorization flow
    pub fn get_spotify_access_token(&self) -> Result<String> {
        self.get_string(&["spotify", "access_token"])
            .ok_or_else(|| anyhow!("spotify.access_token is not configured"))
    }

    pub fn set_spotify_access_token(&self, token: String) -> Result<()> {
        self.set_value(&["spotify", "access_token"], Value::String(token))
    }

    /// Path of the SQLite library mirror.
    ///
    /// Relative paths are resolved against the configuration directory; the
    /// parent directory is created when missing.
    pub fn get_library_database_path(&self) -> Result<PathBuf> {
        let configured = self
            .get_string(&["library", "database"])
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());
        let path = Path::new(&configured);
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            Path::new(&self.config_dir).join(path)
        };

        if let Some(parent) = absolute.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
                info!(directory=%parent.display(), "Created library directory");
            }
        }

        Ok(absolute)
    }

    pub fn set_library_database_path(&self, path: String) -> Result<()> {
        self.set_value(&["library", "database"], Value::String(path))
    }

    /// Page size used against the remote API, clamped to `1..=50`
    pub fn get_page_size(&self) -> Result<usize> {
        Ok(self.get_raw_page_size()?.clamp(1, MAX_PAGE_SIZE))
    }

    impl_usize_config!(
        get_raw_page_size,
        set_page_size,
        &["library", "page_size"],
        DEFAULT_PAGE_SIZE
    );

    impl_usize_config!(
        get_sync_freshness_hours,
        set_sync_freshness_hours,
        &["library", "sync_freshness_hours"],
        DEFAULT_SYNC_FRESHNESS_HOURS
    );

    impl_usize_config!(
        get_max_selection_retries,
        set_max_selection_retries,
        &["library", "max_selection_retries"],
        DEFAULT_MAX_SELECTION_RETRIES
    );

    impl_usize_config!(
        get_queue_lookahead,
        set_queue_lookahead,
        &["queue", "lookahead"],
        DEFAULT_QUEUE_LOOKAHEAD
    );

    /// Minimum log level (`RUST_LOG` still wins when set)
    pub fn get_log_min_level(&self) -> String {
        self.get_string(&["logger", "min_level"])
            .unwrap_or_else(|| DEFAULT_LOG_MIN_LEVEL.to_string())
    }

    pub fn set_log_min_level(&self, level: String) -> Result<()> {
        self.set_value(&["logger", "min_level"], Value::String(level))
    }
}

fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
    if path.is_empty() {
        *data = value;
        return Ok(());
    }
    if let Value::Mapping(map) = data {
        let key_value = Value::String(path[0].to_lowercase());
        if path.len() == 1 {
            map.insert(key_value, value);
        } else {
            let entry = map
                .entry(key_value)
                .or_insert(Value::Mapping(Mapping::new()));
            set_value_internal(entry, &path[1..], value)?;
        }
        Ok(())
    } else {
        Err(anyhow!("Current node is not a map"))
    }
}

fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
    let mut current = data;
    for (i, key) in path.iter().enumerate() {
        if let Value::Mapping(map) = current {
            match map.get(&Value::String(key.to_lowercase())) {
                Some(next) => current = next,
                None => return Err(anyhow!("Path {} does not exist", path[..=i].join("."))),
            }
        } else {
            return Err(anyhow!("Path {} is not a mapping", path[..i].join(".")));
        }
    }
    Ok(current.clone())
}

/// Applies `SHUFLOW_CONFIG__SECTION__KEY=value` pairs onto the tree
fn apply_env_overrides(config: &mut Value, vars: impl Iterator<Item = (String, String)>) {
    for (key, value) in vars {
        if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
            let key_path = stripped.split("__").collect::<Vec<_>>();
            let yaml_value = serde_yaml::from_str::<Value>(&value)
                .unwrap_or_else(|_| Value::String(value.clone()));
            let _ = set_value_internal(config, &key_path, yaml_value);
        }
    }
}

fn lower_keys_value(value: Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut new_map = Mapping::new();
            for (k, v) in map {
                let key = match k {
                    Value::String(s) => Value::String(s.to_lowercase()),
                    other => other,
                };
                new_map.insert(key, lower_keys_value(v));
            }
            Value::Mapping(new_map)
        }
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(lower_keys_value).collect()),
        _ => value,
    }
}

/// Merges external YAML configuration into default configuration
///
/// Mappings are merged key by key; scalars and sequences from `external`
/// replace the default value.
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(),
    }
}
