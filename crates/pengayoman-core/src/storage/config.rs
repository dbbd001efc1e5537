//! TOML-based application configuration.
//!
//! Stores:
//! - Remote prayer table location and API token
//! - Ad unit identifiers and test-mode switch
//! - Ad reload delay and reward window length
//!
//! Configuration is stored at `~/.config/pengayoman/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{data_dir, is_dev_env};
use crate::error::ConfigError;

/// Remote tabular data API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrayerApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_table_id")]
    pub table_id: u64,
    /// Sent as `Authorization: Token <token>`.
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Ad surface settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdsConfig {
    /// Use the SDK's public test units instead of the ids below.
    #[serde(default = "is_dev_env")]
    pub test_mode: bool,
    #[serde(default = "default_interstitial_unit_id")]
    pub interstitial_unit_id: String,
    #[serde(default = "default_rewarded_unit_id")]
    pub rewarded_unit_id: String,
    #[serde(default = "default_banner_unit_id")]
    pub banner_unit_id: String,
    #[serde(default = "default_reload_delay_ms")]
    pub reload_delay_ms: u64,
}

/// Ad-free reward settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardConfig {
    #[serde(default = "default_reward_minutes")]
    pub duration_minutes: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/pengayoman/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub prayer_api: PrayerApiConfig,
    #[serde(default)]
    pub ads: AdsConfig,
    #[serde(default)]
    pub reward: RewardConfig,
}

// Default functions
fn default_base_url() -> String {
    "https://api.baserow.io".into()
}
fn default_table_id() -> u64 {
    581962
}
fn default_timeout_secs() -> u64 {
    15
}
fn default_interstitial_unit_id() -> String {
    "ca-app-pub-3940256099942544/1033173712".into()
}
fn default_rewarded_unit_id() -> String {
    "ca-app-pub-3940256099942544/5224354917".into()
}
fn default_banner_unit_id() -> String {
    "ca-app-pub-3940256099942544/6300978111".into()
}
fn default_reload_delay_ms() -> u64 {
    1000
}
fn default_reward_minutes() -> u64 {
    30
}

impl Default for PrayerApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            table_id: default_table_id(),
            token: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for AdsConfig {
    fn default() -> Self {
        Self {
            test_mode: is_dev_env(),
            interstitial_unit_id: default_interstitial_unit_id(),
            rewarded_unit_id: default_rewarded_unit_id(),
            banner_unit_id: default_banner_unit_id(),
            reload_delay_ms: default_reload_delay_ms(),
        }
    }
}

impl AdsConfig {
    pub fn reload_delay(&self) -> Duration {
        Duration::from_millis(self.reload_delay_ms)
    }
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            duration_minutes: default_reward_minutes(),
        }
    }
}

impl RewardConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_minutes.saturating_mul(60))
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
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
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

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit file, writing defaults there when it is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
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
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
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

    /// Set a config value by key without persisting.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Set a config value by key and save. Returns error if key is unknown.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(error = %e, "falling back to default configuration");
                Self::default()
            }
        }
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
        assert_eq!(parsed.prayer_api.table_id, 581962);
        assert_eq!(parsed.reward.duration_minutes, 30);
        assert_eq!(parsed.ads.reload_delay_ms, 1000);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[prayer_api]\ntoken = \"abc\"\n").unwrap();
        assert_eq!(parsed.prayer_api.token, "abc");
        assert_eq!(parsed.prayer_api.base_url, "https://api.baserow.io");
        assert_eq!(parsed.reward.duration(), Duration::from_secs(30 * 60));
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("reward.duration_minutes").as_deref(), Some("30"));
        assert_eq!(
            cfg.get("prayer_api.base_url").as_deref(),
            Some("https://api.baserow.io")
        );
        assert!(cfg.get("ads.missing_key").is_none());
    }

    #[test]
    fn apply_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.apply("ads.test_mode", "true").unwrap();
        cfg.apply("ads.reload_delay_ms", "2500").unwrap();
        cfg.apply("prayer_api.token", "secret").unwrap();
        assert!(cfg.ads.test_mode);
        assert_eq!(cfg.ads.reload_delay(), Duration::from_millis(2500));
        assert_eq!(cfg.prayer_api.token, "secret");
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        let err = cfg.apply("ads.nonexistent_key", "value").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(_)));
    }

    #[test]
    fn apply_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.apply("ads.test_mode", "not_a_bool").is_err());
        assert!(cfg.apply("reward.duration_minutes", "-3").is_err());
    }

    #[test]
    fn huge_reward_duration_saturates() {
        let mut cfg = Config::default();
        cfg.apply("reward.duration_minutes", &u64::MAX.to_string()).unwrap();
        assert_eq!(cfg.reward.duration(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.prayer_api.table_id, 581962);
    }
}
