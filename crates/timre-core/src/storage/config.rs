//! TOML-based application configuration.
//!
//! Holds the tunables of the day engine:
//! - Day boundary hour and evening review window
//! - Streak saver cap and intention count
//! - Input limits for goal names, intention text and minute values
//!
//! Configuration is stored at `~/.config/timre/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;

/// Day-boundary configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayConfig {
    /// Hour (0-23) at which a new effective day starts.
    #[serde(default = "default_boundary_hour")]
    pub boundary_hour: u32,
    /// Hours before bedtime that the evening review opens.
    #[serde(default = "default_review_window")]
    pub evening_review_window_hours: u32,
}

/// Caps and input limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_streak_savers")]
    pub max_streak_savers: u32,
    #[serde(default = "default_max_intentions")]
    pub max_intentions: usize,
    #[serde(default = "default_max_intention_length")]
    pub max_intention_length: usize,
    #[serde(default = "default_max_goal_name_length")]
    pub max_goal_name_length: usize,
    /// Upper bound for any minute value (limit or usage).
    #[serde(default = "default_max_time_minutes")]
    pub max_time_minutes: u32,
    /// Limit used when a new app goal is given none.
    #[serde(default = "default_time_limit_minutes")]
    pub default_time_limit_minutes: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/timre/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub day: DayConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

fn default_boundary_hour() -> u32 {
    crate::day::DAY_BOUNDARY_HOUR
}
fn default_review_window() -> u32 {
    1
}
fn default_max_streak_savers() -> u32 {
    7
}
fn default_max_intentions() -> usize {
    5
}
fn default_max_intention_length() -> usize {
    200
}
fn default_max_goal_name_length() -> usize {
    50
}
fn default_max_time_minutes() -> u32 {
    1440
}
fn default_time_limit_minutes() -> u32 {
    30
}

impl Default for DayConfig {
    fn default() -> Self {
        Self {
            boundary_hour: default_boundary_hour(),
            evening_review_window_hours: default_review_window(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_streak_savers: default_max_streak_savers(),
            max_intentions: default_max_intentions(),
            max_intention_length: default_max_intention_length(),
            max_goal_name_length: default_max_goal_name_length(),
            max_time_minutes: default_max_time_minutes(),
            default_time_limit_minutes: default_time_limit_minutes(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as integer")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("cannot set a whole section".into()));
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Path of the config file in the data directory.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location or write and return the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing the default there if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or fails validation.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "using default configuration");
            Self::default()
        })
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Reject values the engine cannot work with.
    ///
    /// # Errors
    /// Returns `InvalidValue` naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.day.boundary_hour > 23 {
            return Err(ConfigError::InvalidValue {
                key: "day.boundary_hour".into(),
                message: format!("{} is not an hour of the day", self.day.boundary_hour),
            });
        }
        if self.day.evening_review_window_hours > 23 {
            return Err(ConfigError::InvalidValue {
                key: "day.evening_review_window_hours".into(),
                message: "window must be shorter than a day".into(),
            });
        }
        if self.limits.max_streak_savers == 0 {
            return Err(ConfigError::InvalidValue {
                key: "limits.max_streak_savers".into(),
                message: "cap must be at least 1".into(),
            });
        }
        if self.limits.default_time_limit_minutes > self.limits.max_time_minutes {
            return Err(ConfigError::InvalidValue {
                key: "limits.default_time_limit_minutes".into(),
                message: "default exceeds limits.max_time_minutes".into(),
            });
        }
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not parse
    /// or validate. `self` is left unchanged on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.day.boundary_hour, 3);
        assert_eq!(parsed.limits.max_streak_savers, 7);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[day]\nboundary_hour = 4\n").unwrap();
        assert_eq!(parsed.day.boundary_hour, 4);
        assert_eq!(parsed.day.evening_review_window_hours, 1);
        assert_eq!(parsed.limits.max_intentions, 5);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("day.boundary_hour").as_deref(), Some("3"));
        assert_eq!(cfg.get("limits.max_time_minutes").as_deref(), Some("1440"));
        assert!(cfg.get("day.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_nested_number() {
        let mut cfg = Config::default();
        cfg.set("limits.max_intentions", "3").unwrap();
        assert_eq!(cfg.limits.max_intentions, 3);
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("day.nonexistent_key", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn set_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.set("day.boundary_hour", "late").is_err());
        assert!(cfg.set("limits", "1").is_err());
    }

    #[test]
    fn set_rejects_invalid_value_and_keeps_old() {
        let mut cfg = Config::default();
        assert!(cfg.set("day.boundary_hour", "24").is_err());
        assert!(cfg.set("limits.max_streak_savers", "0").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn load_from_writes_default_when_missing() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());

        let mut changed = cfg.clone();
        changed.set("day.boundary_hour", "5").unwrap();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().day.boundary_hour, 5);
    }

    #[test]
    fn load_from_rejects_invalid_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[day]\nboundary_hour = 30\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
