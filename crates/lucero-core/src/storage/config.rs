//! TOML-based application configuration.
//!
//! Gathers every tunable surface in one file:
//! - the user profile (ideal sleep, chronotype, usual hours)
//! - debt engine tunables (window, weights, anchoring, nap credit)
//! - bandit and policy parameters
//! - forecaster and simulator settings
//!
//! Configuration is stored at `~/.config/lucero/config.toml`.

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::coach::{BanditConfig, ForecastConfig, PolicyConfig};
use crate::debt::DebtConfig;
use crate::error::{ConfigError, Result};
use crate::profile::UserProfile;
use crate::sim::SimConfig;

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/lucero/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Local offset from UTC in minutes, for calendar-day bucketing.
    #[serde(default)]
    pub utc_offset_minutes: i32,
    #[serde(default)]
    pub profile: UserProfile,
    #[serde(default)]
    pub debt: DebtConfig,
    #[serde(default)]
    pub bandit: BanditConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
    #[serde(default)]
    pub sim: SimConfig,
}

impl Config {
    /// Local offset as a chrono type. Out-of-range offsets fall back to UTC.
    pub fn timezone(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }

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
        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: "config key is empty".to_string(),
            });
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(|| unknown_key(key))?;
                let existing = obj.get(part).ok_or_else(|| unknown_key(key))?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| bad_value(key, e))?,
                    ),
                    serde_json::Value::Number(_) => parse_number(key, value)?,
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| bad_value(key, e))?
                    }
                    // Null means an unset Option; accept any JSON literal
                    serde_json::Value::Null => serde_json::from_str(value)
                        .unwrap_or_else(|_| serde_json::Value::String(value.to_string())),
                    _ => serde_json::Value::String(value.to_string()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(|| unknown_key(key))?;
        }

        Err(unknown_key(key))
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or write and return the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| {
                    ConfigError::LoadFailed {
                        path,
                        message: e.to_string(),
                    }
                })?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
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

    /// Set a config value by key and persist. Returns an error if the key
    /// is unknown or the value cannot be parsed into the field's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json)?;
        self.save()?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

fn unknown_key(key: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: "unknown config key".to_string(),
    }
}

fn bad_value(key: &str, err: impl std::fmt::Display) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: err.to_string(),
    }
}

fn parse_number(key: &str, value: &str) -> Result<serde_json::Value, ConfigError> {
    if let Ok(n) = value.parse::<i64>() {
        Ok(serde_json::Value::Number(n.into()))
    } else if let Ok(n) = value.parse::<f64>() {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .ok_or_else(|| bad_value(key, format!("cannot represent '{value}' as a number")))
    } else {
        Err(bad_value(key, format!("cannot parse '{value}' as a number")))
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
        assert_eq!(parsed.profile.usual_bed_hour, 23);
        assert_eq!(parsed.policy.nap_length_minutes, 20);
        assert_eq!(parsed.debt.window_hours, 24);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("profile.usual_bed_hour").as_deref(), Some("23"));
        assert_eq!(cfg.get("debt.window_hours").as_deref(), Some("24"));
        assert_eq!(cfg.get("bandit.alpha").as_deref(), Some("1.0"));
        assert!(cfg.get("profile.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_json_value_by_path_updates_nested_integer() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        Config::set_json_value_by_path(&mut json, "policy.nap_length_minutes", "30").unwrap();
        assert_eq!(
            Config::get_json_value_by_path(&json, "policy.nap_length_minutes").unwrap(),
            &serde_json::Value::Number(30.into())
        );
    }

    #[test]
    fn set_json_value_by_path_updates_nested_float() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        Config::set_json_value_by_path(&mut json, "bandit.alpha", "1.5").unwrap();
        let val = Config::get_json_value_by_path(&json, "bandit.alpha").unwrap();
        assert!((val.as_f64().unwrap() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn set_json_value_by_path_fills_unset_option() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        Config::set_json_value_by_path(&mut json, "sim.seed", "42").unwrap();
        assert_eq!(
            Config::get_json_value_by_path(&json, "sim.seed").unwrap(),
            &serde_json::Value::Number(42.into())
        );
    }

    #[test]
    fn set_json_value_by_path_rejects_unknown_key() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        let result = Config::set_json_value_by_path(&mut json, "profile.nonexistent", "1");
        assert!(result.is_err());
        let result = Config::set_json_value_by_path(&mut json, "", "1");
        assert!(result.is_err());
    }

    #[test]
    fn set_json_value_by_path_rejects_invalid_number() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        let result = Config::set_json_value_by_path(&mut json, "debt.window_hours", "abc");
        assert!(result.is_err());
    }

    #[test]
    fn negative_offsets_parse_as_numbers() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        Config::set_json_value_by_path(&mut json, "utc_offset_minutes", "-300").unwrap();
        let cfg: Config = serde_json::from_value(json).unwrap();
        assert_eq!(cfg.utc_offset_minutes, -300);
        assert_eq!(cfg.timezone().local_minus_utc(), -300 * 60);
    }

    #[test]
    fn timezone_falls_back_to_utc_when_out_of_range() {
        let cfg = Config {
            utc_offset_minutes: 100_000,
            ..Default::default()
        };
        assert_eq!(cfg.timezone().local_minus_utc(), 0);
    }

    #[test]
    fn config_default_values() {
        let cfg = Config::default();
        assert_eq!(cfg.utc_offset_minutes, 0);
        assert_eq!(cfg.profile.ideal_sleep_seconds, 28800.0);
        assert_eq!(cfg.policy.large_debt_minutes, 120.0);
        assert_eq!(cfg.sim.nights, 28);
        assert_eq!(cfg.forecast.min_points, 3);
    }
}
