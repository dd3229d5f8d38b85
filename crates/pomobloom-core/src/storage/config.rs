//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Notification preferences
//! - Completion sound (clip, volume, playback cap, player program)
//! - Initial window behavior (pinned, compact)
//!
//! Mode durations are fixed and intentionally absent here.
//!
//! Configuration is stored at `~/.config/pomobloom/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::error::ConfigError;

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Show the transient "keep going" notifications during focus.
    #[serde(default = "default_true")]
    pub motivational: bool,
}

/// Completion sound configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_clip")]
    pub clip: String,
    /// Volume in percent (0-100).
    #[serde(default = "default_volume")]
    pub volume: u32,
    /// Playback is stopped after this many seconds whatever the clip length.
    #[serde(default = "default_playback_cap_secs")]
    pub playback_cap_secs: u64,
    /// Player program override. Defaults to `afplay` on macOS, `paplay` elsewhere.
    #[serde(default)]
    pub player: Option<String>,
}

/// Window configuration applied at start-up.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default)]
    pub always_on_top: bool,
    #[serde(default)]
    pub compact: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/pomobloom/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub sound: SoundConfig,
    #[serde(default)]
    pub window: WindowConfig,
}

// Default functions
fn default_true() -> bool {
    true
}
fn default_clip() -> String {
    "/usr/share/sounds/freedesktop/stereo/complete.oga".into()
}
fn default_volume() -> u32 {
    70
}
fn default_playback_cap_secs() -> u64 {
    10
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            motivational: true,
        }
    }
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            clip: default_clip(),
            volume: default_volume(),
            playback_cap_secs: default_playback_cap_secs(),
            player: None,
        }
    }
}

impl SoundConfig {
    /// Volume as a 0.0 .. 1.0 gain.
    pub fn gain(&self) -> f32 {
        self.volume.min(100) as f32 / 100.0
    }

    pub fn playback_cap(&self) -> Duration {
        Duration::from_secs(self.playback_cap_secs)
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
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        if key.is_empty() {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

        let mut parts = key.split('.').peekable();
        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current
                    .get_mut(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
                continue;
            }

            let obj = current
                .as_object_mut()
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
            let existing = obj
                .get(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => value
                    .parse::<bool>()
                    .map(serde_json::Value::Bool)
                    .map_err(|e| invalid(e.to_string()))?,
                serde_json::Value::Number(_) => value
                    .parse::<u64>()
                    .map(|n| serde_json::Value::Number(n.into()))
                    .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                // Unset optional strings (`sound.player`) are null.
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
        }
        Ok(())
    }

    pub fn path() -> PathBuf {
        data_dir().join("config.toml")
    }

    /// Load from the default location, or return defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
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

    /// Update a value in memory by dot-separated key. Call [`Config::save`]
    /// to persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit
    /// the field's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
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
        assert!(parsed.notifications.enabled);
        assert_eq!(parsed.sound.volume, 70);
        assert_eq!(parsed.sound.playback_cap_secs, 10);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[sound]\nvolume = 30\n").unwrap();
        assert_eq!(parsed.sound.volume, 30);
        assert_eq!(parsed.sound.playback_cap_secs, 10);
        assert!(parsed.notifications.motivational);
        assert!(!parsed.window.always_on_top);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("window.compact").as_deref(), Some("false"));
        assert_eq!(cfg.get("sound.playback_cap_secs").as_deref(), Some("10"));
        assert!(cfg.get("sound.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.set("window.always_on_top", "true").unwrap();
        cfg.set("sound.volume", "25").unwrap();
        cfg.set("sound.player", "aplay").unwrap();
        assert!(cfg.window.always_on_top);
        assert_eq!(cfg.sound.volume, 25);
        assert_eq!(cfg.sound.player.as_deref(), Some("aplay"));
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        let err = cfg.set("window.nonexistent_key", "value").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(_)));
        assert!(cfg.set("focus_duration", "30").is_err());
    }

    #[test]
    fn set_rejects_invalid_type() {
        let mut cfg = Config::default();
        let err = cfg.set("notifications.enabled", "not_a_bool").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert!(cfg.set("sound.volume", "loud").is_err());
        assert!(cfg.notifications.enabled);
    }

    #[test]
    fn gain_is_clamped() {
        let mut sound = SoundConfig::default();
        assert!((sound.gain() - 0.7).abs() < f32::EPSILON);
        sound.volume = 250;
        assert_eq!(sound.gain(), 1.0);
    }

    #[test]
    fn save_and_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let missing = Config::load_from(&path).unwrap();
        assert_eq!(missing.sound.volume, 70);
        assert!(!path.exists());

        let mut cfg = Config::default();
        cfg.set("sound.playback_cap_secs", "3").unwrap();
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.sound.playback_cap_secs, 3);
    }

    #[test]
    fn load_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[sound\nvolume = ").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseFailed(_))
        ));
    }
}
