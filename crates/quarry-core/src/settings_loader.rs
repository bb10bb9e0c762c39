//! Settings loading from configuration files.
//!
//! This module provides functions to load [`Settings`] from TOML files, JSON
//! files, and to apply environment variable overrides.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (overriding defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `QUARRY_ENGINE` | `engine` |
//! | `QUARRY_DEBUG` | `debug` |
//! | `QUARRY_LOG_LEVEL` | `log_level` |
//! | `QUARRY_LEGACY_PAGINATION` | `legacy_pagination` |
//! | `QUARRY_PARAMETER_PREFIX` | `parameter_prefix` |
//! | `QUARRY_EXTRA_OPERATORS` | `extra_operators` (comma-separated) |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use quarry_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file("config/quarry.toml").unwrap();
//! let settings = settings_loader::from_json_file_with_env("config/quarry.json").unwrap();
//! ```

use std::path::Path;

use crate::error::QuarryError;
use crate::settings::Settings;

/// Loads settings from a TOML string.
///
/// Any fields not present in the TOML keep their default values.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or cannot be deserialized.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, QuarryError> {
    // Deserialize into a generic value first and merge it over the defaults,
    // so partial files keep every unspecified setting.
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| QuarryError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;

    let merged = merge_json(default_json()?, toml_to_json(toml_value));
    serde_json::from_value(merged).map_err(|e| {
        QuarryError::ConfigurationError(format!("Failed to deserialize settings from TOML: {e}"))
    })
}

/// Loads settings from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, QuarryError> {
    from_toml_str(&read(path.as_ref(), "TOML")?)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, QuarryError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or cannot be deserialized.
pub fn from_json_str(json_str: &str) -> Result<Settings, QuarryError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| QuarryError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;

    let merged = merge_json(default_json()?, json_value);
    serde_json::from_value(merged).map_err(|e| {
        QuarryError::ConfigurationError(format!("Failed to deserialize settings from JSON: {e}"))
    })
}

/// Loads settings from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the JSON is malformed.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, QuarryError> {
    from_json_str(&read(path.as_ref(), "JSON")?)
}

/// Loads settings from a JSON file and then applies environment variable overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the JSON is malformed.
pub fn from_json_file_with_env(path: impl AsRef<Path>) -> Result<Settings, QuarryError> {
    let mut settings = from_json_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies environment variable overrides to a settings struct.
///
/// Boolean variables accept "true"/"1"/"yes" as true; anything else is false.
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(val) = std::env::var("QUARRY_ENGINE") {
        settings.engine = val.trim().to_lowercase();
    }

    if let Ok(val) = std::env::var("QUARRY_DEBUG") {
        settings.debug = parse_flag(&val);
    }

    if let Ok(val) = std::env::var("QUARRY_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Ok(val) = std::env::var("QUARRY_LEGACY_PAGINATION") {
        settings.legacy_pagination = parse_flag(&val);
    }

    if let Ok(val) = std::env::var("QUARRY_PARAMETER_PREFIX") {
        settings.parameter_prefix = Some(val).filter(|p| !p.is_empty());
    }

    if let Ok(val) = std::env::var("QUARRY_EXTRA_OPERATORS") {
        settings.extra_operators = val
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
}

// ============================================================
// Helpers
// ============================================================

fn parse_flag(val: &str) -> bool {
    matches!(val.to_lowercase().as_str(), "true" | "1" | "yes")
}

fn read(path: &Path, format: &str) -> Result<String, QuarryError> {
    std::fs::read_to_string(path).map_err(|e| {
        QuarryError::ConfigurationError(format!(
            "Failed to read {format} file '{}': {e}",
            path.display()
        ))
    })
}

fn default_json() -> Result<serde_json::Value, QuarryError> {
    serde_json::to_value(Settings::default()).map_err(|e| {
        QuarryError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, serde_json::Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = if let Some(base_v) = base_map.remove(&key) {
                    merge_json(base_v, override_v)
                } else {
                    override_v
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}
