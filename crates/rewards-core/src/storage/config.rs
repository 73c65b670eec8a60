//! TOML-based application configuration.
//!
//! Stores:
//! - The shared admin PIN
//! - Strike recording policy
//! - Audio cue settings
//! - Additional rewards beyond the built-in ones
//! - State and log file names
//!
//! Configuration is stored at `~/.config/kids-rewards/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::rewards::{Reward, RewardCatalog};
use crate::state::StrikePolicy;

const CONFIG_FILE: &str = "config.toml";

/// Admin panel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_pin")]
    pub pin: String,
}

/// Strike recording configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrikesConfig {
    #[serde(default)]
    pub policy: StrikePolicy,
}

/// Audio cue configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Directory holding `rule<N>.mp3|wav|ogg`.
    /// Defaults to `audio/` inside the data directory.
    #[serde(default)]
    pub dir: Option<String>,
    /// Program run as `<player> <file>` for each cue. When unset the file
    /// is handed to the operating system's default handler.
    #[serde(default)]
    pub player: Option<String>,
}

/// State and log file names, relative to the data directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_file")]
    pub data_file: String,
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/kids-rewards/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub strikes: StrikesConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    /// Rewards added to (or overriding) the built-in toy and hockey game.
    #[serde(default)]
    pub rewards: Vec<Reward>,
}

// Default functions
fn default_pin() -> String {
    "3136".into()
}
fn default_true() -> bool {
    true
}
fn default_data_file() -> String {
    "data.json".into()
}
fn default_log_file() -> String {
    "logs.txt".into()
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self { pin: default_pin() }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
            player: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            log_file: default_log_file(),
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
        if parts.peek().is_none() {
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
                    serde_json::Value::Number(_) => serde_json::Value::Number(
                        value
                            .parse::<i64>()
                            .map_err(|e| invalid(e.to_string()))?
                            .into(),
                    ),
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

    /// Load from `dir/config.toml`, writing defaults there if it is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// fails [`Config::validate`], or if the default config cannot be
    /// written to disk.
    pub fn load_from(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Self = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path,
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(dir)?;
                Ok(cfg)
            }
        }
    }

    /// Load from the data directory.
    ///
    /// # Errors
    ///
    /// See [`Config::load_from`].
    pub fn load() -> Result<Self, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from(CONFIG_FILE),
            message: e.to_string(),
        })?;
        Self::load_from(&dir)
    }

    /// Persist to `dir/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, dir: &Path) -> Result<(), ConfigError> {
        let path = dir.join(CONFIG_FILE);
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Persist to the data directory.
    ///
    /// # Errors
    ///
    /// See [`Config::save_to`].
    pub fn save(&self) -> Result<(), ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::SaveFailed {
            path: PathBuf::from(CONFIG_FILE),
            message: e.to_string(),
        })?;
        self.save_to(&dir)
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

    /// Set a config value by key. Does not persist; call `save` afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the
    /// field (e.g. an unknown strike policy).
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check values the types alone cannot rule out.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a reward whose cost is not
    /// positive, since redeeming it would add points.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.rewards.iter().find(|r| r.cost <= 0) {
            Some(reward) => Err(ConfigError::InvalidValue {
                key: "rewards".into(),
                message: format!("reward '{}' must cost at least 1 point", reward.key),
            }),
            None => Ok(()),
        }
    }

    /// Built-in rewards merged with the configured ones.
    pub fn reward_catalog(&self) -> RewardCatalog {
        RewardCatalog::with_extra(&self.rewards)
    }

    /// Directory searched for rule audio cues.
    pub fn audio_dir(&self, data_dir: &Path) -> PathBuf {
        match &self.audio.dir {
            Some(dir) => PathBuf::from(dir),
            None => data_dir.join("audio"),
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
        assert_eq!(parsed.admin.pin, "3136");
        assert_eq!(parsed.strikes.policy, StrikePolicy::Capped);
        assert_eq!(parsed.storage.data_file, "data.json");
    }

    #[test]
    fn empty_file_gives_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert!(cfg.audio.enabled);
        assert_eq!(cfg.storage.log_file, "logs.txt");
        assert!(cfg.rewards.is_empty());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("admin.pin").as_deref(), Some("3136"));
        assert_eq!(cfg.get("strikes.policy").as_deref(), Some("capped"));
        assert_eq!(cfg.get("audio.enabled").as_deref(), Some("true"));
        assert!(cfg.get("audio.missing_key").is_none());
    }

    #[test]
    fn set_updates_policy_and_rejects_unknown_variant() {
        let mut cfg = Config::default();
        cfg.set("strikes.policy", "unlimited").unwrap();
        assert_eq!(cfg.strikes.policy, StrikePolicy::Unlimited);

        let err = cfg.set("strikes.policy", "sometimes").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert_eq!(cfg.strikes.policy, StrikePolicy::Unlimited);
    }

    #[test]
    fn set_fills_optional_string() {
        let mut cfg = Config::default();
        cfg.set("audio.dir", "/srv/sounds").unwrap();
        assert_eq!(cfg.audio.dir.as_deref(), Some("/srv/sounds"));
        assert_eq!(cfg.audio_dir(Path::new("/data")), PathBuf::from("/srv/sounds"));
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_bool() {
        let mut cfg = Config::default();
        assert!(matches!(cfg.set("admin.nope", "1"), Err(ConfigError::UnknownKey(_))));
        assert!(matches!(
            cfg.set("audio.enabled", "loud"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn set_rewards_from_json() {
        let mut cfg = Config::default();
        cfg.set("rewards", r#"[{"key": "movie", "name": "Movie Night", "cost": 7}]"#)
            .unwrap();
        assert_eq!(cfg.reward_catalog().find("movie").map(|r| r.cost), Some(7));
    }

    #[test]
    fn set_rejects_non_positive_reward_cost() {
        let mut cfg = Config::default();
        for cost in ["0", "-50"] {
            let value = format!(r#"[{{"key": "bonus", "name": "Bonus", "cost": {cost}}}]"#);
            let err = cfg.set("rewards", &value).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "rewards"));
        }
        assert!(cfg.rewards.is_empty());
        assert!(cfg.reward_catalog().find("bonus").is_none());
    }

    #[test]
    fn load_from_rejects_non_positive_reward_cost() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "[[rewards]]\nkey = \"bonus\"\nname = \"Bonus\"\ncost = -50\n",
        )
        .unwrap();
        assert!(matches!(
            Config::load_from(dir.path()),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn load_from_writes_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(dir.path()).unwrap();
        assert_eq!(cfg.admin.pin, "3136");
        assert!(dir.path().join("config.toml").exists());
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "admin = [").unwrap();
        assert!(matches!(
            Config::load_from(dir.path()),
            Err(ConfigError::LoadFailed { .. })
        ));
    }

    #[test]
    fn extra_rewards_parse_from_toml() {
        let cfg: Config = toml::from_str(
            r#"
[[rewards]]
key = "ice_cream"
name = "Ice Cream"
cost = 3
"#,
        )
        .unwrap();
        let catalog = cfg.reward_catalog();
        assert_eq!(catalog.find("ice_cream").map(|r| r.cost), Some(3));
        assert_eq!(catalog.find("toy").map(|r| r.cost), Some(5));
    }
}
