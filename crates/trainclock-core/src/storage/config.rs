//! TOML-based application configuration.
//!
//! Stores:
//! - Interval timer settings (prepare phase, render cadence)
//! - Yo-Yo test settings (tick period, audio toggle)
//! - Audio mute, volume and cue asset locations
//! - An optional external catalog file
//!
//! Configuration is stored at `~/.config/trainclock/config.toml`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::interval::PREPARE_SECS;

/// Interval timer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalConfig {
    #[serde(default = "default_prepare_secs")]
    pub prepare_secs: u32,
    /// Render-loop cadence of the terminal front end.
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,
}

/// Yo-Yo test configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YoYoConfig {
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default = "default_true")]
    pub enable_audio: bool,
}

/// Cue name to asset location, per engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioAssets {
    #[serde(default = "default_interval_assets")]
    pub interval: BTreeMap<String, String>,
    #[serde(default = "default_yoyo_assets")]
    pub yoyo: BTreeMap<String, String>,
}

/// Audio configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default)]
    pub muted: bool,
    /// 0.0 ..= 1.0
    #[serde(default = "default_volume")]
    pub volume: f64,
    #[serde(default)]
    pub assets: AudioAssets,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/trainclock/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub interval: IntervalConfig,
    #[serde(default)]
    pub yoyo: YoYoConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    /// Catalog file replacing the bundled presets and roster.
    #[serde(default)]
    pub catalog_path: Option<String>,
}

// Default functions
fn default_prepare_secs() -> u32 {
    PREPARE_SECS
}
fn default_frame_ms() -> u64 {
    16
}
fn default_tick_ms() -> u64 {
    100
}
fn default_true() -> bool {
    true
}
fn default_volume() -> f64 {
    0.8
}
fn default_interval_assets() -> BTreeMap<String, String> {
    ["start", "end", "rest", "finish", "transition", "side-change"]
        .into_iter()
        .map(|cue| (cue.to_string(), format!("/audio/interval/{cue}.mp3")))
        .collect()
}
fn default_yoyo_assets() -> BTreeMap<String, String> {
    [
        ("horn", "air-horn.mp3"),
        ("turn", "turn.mp3"),
        ("fanfare", "finish-fanfare-short.mp3"),
    ]
    .into_iter()
    .map(|(cue, file)| (cue.to_string(), format!("/yo-yo/assets/sounds/{file}")))
    .collect()
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self {
            prepare_secs: default_prepare_secs(),
            frame_ms: default_frame_ms(),
        }
    }
}

impl Default for YoYoConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            enable_audio: true,
        }
    }
}

impl Default for AudioAssets {
    fn default() -> Self {
        Self {
            interval: default_interval_assets(),
            yoyo: default_yoyo_assets(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            muted: false,
            volume: default_volume(),
            assets: AudioAssets::default(),
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
    ) -> std::result::Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
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
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
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

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing the defaults there if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or fails validation.
    pub fn load_from(path: &Path) -> Result<Self> {
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

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
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

    /// Set a config value by key in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// or is out of range. The config is left unchanged on error.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and persist. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.set_value(key, value)?;
        self.save()
    }

    /// Reject values the engines cannot run with.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.audio.volume) {
            return Err(ConfigError::InvalidValue {
                key: "audio.volume".into(),
                message: format!("{} is outside 0.0..=1.0", self.audio.volume),
            });
        }
        if self.yoyo.tick_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "yoyo.tick_ms".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.interval.frame_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "interval.frame_ms".into(),
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default configuration");
            Self::default()
        })
    }
}
