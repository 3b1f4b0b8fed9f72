//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Reminder behavior (enabled, advance minutes, feeding interval)
//! - Display labels for generated schedule items
//! - Delivery daemon polling cadence
//!
//! Configuration is stored at `~/.config/easyday/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;
use crate::formula::PhaseLabels;

/// Reminder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemindersConfig {
    /// Whether phase-end reminders are scheduled at all.
    #[serde(default)]
    pub enabled: bool,
    /// How many minutes before a phase's end the reminder fires.
    #[serde(default = "default_advance_min")]
    pub advance_min: u32,
    /// Gap between feeds used by the single-slot feeding reminder.
    #[serde(default = "default_feeding_interval_min")]
    pub feeding_interval_min: u32,
}

/// Display labels for generated schedule items.
///
/// Localization lookup is external; whatever is configured here is what
/// the generator stamps onto items and the notifier shows in toasts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelsConfig {
    #[serde(default = "default_eat")]
    pub eat: String,
    #[serde(default = "default_activity")]
    pub activity: String,
    #[serde(default = "default_sleep")]
    pub sleep: String,
    #[serde(default = "default_your_time")]
    pub your_time: String,
}

impl LabelsConfig {
    /// The label set the schedule generator consumes.
    pub fn phase_labels(&self) -> PhaseLabels {
        PhaseLabels {
            eat: self.eat.clone(),
            activity: self.activity.clone(),
            sleep: self.sleep.clone(),
            your_time: self.your_time.clone(),
        }
    }
}

/// Delivery daemon configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Seconds between due-notification polls in `reminders watch`.
    #[serde(default = "default_poll_secs")]
    pub poll_secs: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/easyday/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub reminders: RemindersConfig,
    #[serde(default)]
    pub labels: LabelsConfig,
    #[serde(default)]
    pub daemon: DaemonConfig,
}

// Default functions
fn default_advance_min() -> u32 {
    10
}
fn default_feeding_interval_min() -> u32 {
    180
}
fn default_eat() -> String {
    "Eat".into()
}
fn default_activity() -> String {
    "Activity".into()
}
fn default_sleep() -> String {
    "Sleep".into()
}
fn default_your_time() -> String {
    "Your time".into()
}
fn default_poll_secs() -> u64 {
    30
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            advance_min: default_advance_min(),
            feeding_interval_min: default_feeding_interval_min(),
        }
    }
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            eat: default_eat(),
            activity: default_activity(),
            sleep: default_sleep(),
            your_time: default_your_time(),
        }
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            poll_secs: default_poll_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reminders: RemindersConfig::default(),
            labels: LabelsConfig::default(),
            daemon: DaemonConfig::default(),
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
        let unknown_key = || ConfigError::UnknownKey {
            key: key.to_string(),
        };
        let bad_value = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(unknown_key());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown_key)?;
                let existing = obj.get(part).ok_or_else(unknown_key)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|_| bad_value(format!("cannot parse '{value}' as bool")))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| bad_value(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(bad_value(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| bad_value(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown_key)?;
        }

        Err(unknown_key())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: format!("cannot resolve config directory: {e}"),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
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
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
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

    /// Set a config value by key. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let reencode = |e: serde_json::Error| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        };
        let mut json = serde_json::to_value(&*self).map_err(reencode)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(reencode)?;
        self.save()?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
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
        assert!(!parsed.reminders.enabled);
        assert_eq!(parsed.reminders.advance_min, 10);
        assert_eq!(parsed.daemon.poll_secs, 30);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("reminders.enabled").as_deref(), Some("false"));
        assert_eq!(cfg.get("reminders.advance_min").as_deref(), Some("10"));
        assert_eq!(cfg.get("labels.eat").as_deref(), Some("Eat"));
        assert!(cfg.get("labels.missing_key").is_none());
    }

    #[test]
    fn set_json_value_by_path_updates_nested_bool() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        Config::set_json_value_by_path(&mut json, "reminders.enabled", "true").unwrap();
        assert_eq!(
            Config::get_json_value_by_path(&json, "reminders.enabled").unwrap(),
            &serde_json::Value::Bool(true)
        );
    }

    #[test]
    fn set_json_value_by_path_updates_nested_number() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        Config::set_json_value_by_path(&mut json, "reminders.advance_min", "15").unwrap();
        assert_eq!(
            Config::get_json_value_by_path(&json, "reminders.advance_min").unwrap(),
            &serde_json::Value::Number(15.into())
        );
    }

    #[test]
    fn set_json_value_by_path_updates_nested_string() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        Config::set_json_value_by_path(&mut json, "labels.sleep", "Nap").unwrap();
        assert_eq!(
            Config::get_json_value_by_path(&json, "labels.sleep").unwrap(),
            &serde_json::Value::String("Nap".to_string())
        );
    }

    #[test]
    fn set_json_value_by_path_rejects_unknown_key() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        let result = Config::set_json_value_by_path(&mut json, "reminders.nonexistent_key", "1");
        assert!(matches!(result, Err(ConfigError::UnknownKey { .. })));
    }

    #[test]
    fn set_json_value_by_path_rejects_invalid_type() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        let result = Config::set_json_value_by_path(&mut json, "reminders.enabled", "not_a_bool");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn phase_labels_carry_configured_text() {
        let mut cfg = Config::default();
        cfg.labels.sleep = "Nap".to_string();
        let labels = cfg.labels.phase_labels();
        assert_eq!(labels.sleep, "Nap");
        assert_eq!(labels.eat, "Eat");
        assert_eq!(labels.your_time, "Your time");
    }
}
