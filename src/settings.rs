//! Game settings and preferences
//!
//! Persisted as one JSON object under [`keys::SETTINGS`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clamp_or;
use crate::persistence::{KeyValueStore, keys, save_json};

/// Slowest and fastest allowed game speed multiplier
pub const MIN_SPEED_MULTIPLIER: f32 = 0.5;
pub const MAX_SPEED_MULTIPLIER: f32 = 2.0;

/// Difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "medium" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Parse a difficulty name, falling back to Normal for anything unknown
    pub fn from_str_or_default(s: &str) -> Self {
        Self::from_str(s).unwrap_or_else(|| {
            log::warn!("Unknown difficulty {:?}, using normal", s);
            Difficulty::Normal
        })
    }
}

/// User settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Global simulation speed multiplier (1.0 = normal)
    #[serde(rename = "gameSpeed")]
    pub speed_multiplier: f32,
    /// Difficulty preset
    pub difficulty: Difficulty,
    /// Sound effects on/off (consumed by the audio layer)
    #[serde(rename = "soundEnabled")]
    pub sound_enabled: bool,
    /// Show FPS / debug overlay
    #[serde(rename = "showFPS")]
    pub show_fps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            speed_multiplier: 1.0,
            difficulty: Difficulty::Normal,
            sound_enabled: true,
            show_fps: false,
        }
    }
}

impl Settings {
    /// Normalize a requested speed multiplier into the allowed range
    pub fn clamp_speed(speed: f32) -> f32 {
        if speed.is_finite() && speed > 0.0 {
            clamp_or(speed, MIN_SPEED_MULTIPLIER, MAX_SPEED_MULTIPLIER, 1.0)
        } else {
            1.0
        }
    }

    /// Build settings from stored JSON, defaulting each field on its own
    ///
    /// A corrupt document yields full defaults; a document with one bad field
    /// keeps the good ones.
    pub fn from_json(json: &str) -> Self {
        let defaults = Self::default();
        let value: Value = match serde_json::from_str(json) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Corrupt settings, using defaults: {}", e);
                return defaults;
            }
        };

        let speed_multiplier = value
            .get("gameSpeed")
            .and_then(Value::as_f64)
            .map(|v| Self::clamp_speed(v as f32))
            .unwrap_or(defaults.speed_multiplier);
        let difficulty = value
            .get("difficulty")
            .and_then(Value::as_str)
            .map(Difficulty::from_str_or_default)
            .unwrap_or(defaults.difficulty);
        let sound_enabled = value
            .get("soundEnabled")
            .and_then(Value::as_bool)
            .unwrap_or(defaults.sound_enabled);
        let show_fps = value
            .get("showFPS")
            .and_then(Value::as_bool)
            .unwrap_or(defaults.show_fps);

        Self {
            speed_multiplier,
            difficulty,
            sound_enabled,
            show_fps,
        }
    }

    /// Load settings from the store. Never fails.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(keys::SETTINGS) {
            Ok(Some(json)) => {
                let settings = Self::from_json(&json);
                log::info!("Loaded settings: {:?}", settings);
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Failed to load settings: {}", e);
                Self::default()
            }
        }
    }

    /// Save settings. Failures are logged and dropped.
    pub fn save(&self, store: &dyn KeyValueStore) {
        if save_json(store, keys::SETTINGS, self) {
            log::debug!("Settings saved");
        }
    }

    /// Restore defaults and persist them
    pub fn reset(&mut self, store: &dyn KeyValueStore) {
        *self = Self::default();
        self.save(store);
        log::info!("Settings reset to defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_difficulty_parsing() {
        assert_eq!(Difficulty::from_str("HARD"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_str(" easy "), Some(Difficulty::Easy));
        assert_eq!(Difficulty::from_str("nightmare"), None);
        assert_eq!(Difficulty::from_str_or_default("nightmare"), Difficulty::Normal);
    }

    #[test]
    fn test_serialized_layout() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(json["gameSpeed"], 1.0);
        assert_eq!(json["soundEnabled"], true);
        assert_eq!(json["difficulty"], "normal");
        assert_eq!(json["showFPS"], false);
    }

    #[test]
    fn test_per_field_fallback() {
        let s = Settings::from_json(r#"{"gameSpeed":1.5,"difficulty":"extreme","showFPS":true}"#);
        assert_eq!(s.speed_multiplier, 1.5);
        assert_eq!(s.difficulty, Difficulty::Normal);
        assert!(s.sound_enabled);
        assert!(s.show_fps);
    }

    #[test]
    fn test_out_of_range_speed_is_clamped() {
        assert_eq!(Settings::from_json(r#"{"gameSpeed":9}"#).speed_multiplier, MAX_SPEED_MULTIPLIER);
        assert_eq!(Settings::from_json(r#"{"gameSpeed":0.1}"#).speed_multiplier, MIN_SPEED_MULTIPLIER);
        assert_eq!(Settings::from_json(r#"{"gameSpeed":0}"#).speed_multiplier, 1.0);
        assert_eq!(Settings::from_json(r#"{"gameSpeed":-2}"#).speed_multiplier, 1.0);
        assert_eq!(Settings::from_json(r#"{"gameSpeed":"fast"}"#).speed_multiplier, 1.0);
    }

    #[test]
    fn test_corrupt_json_gives_defaults() {
        assert_eq!(Settings::from_json("{{{"), Settings::default());
        assert_eq!(Settings::from_json("[1,2]"), Settings::default());
    }

    #[test]
    fn test_save_load_reset() {
        let store = MemoryStore::new();
        assert_eq!(Settings::load(&store), Settings::default());

        let mut settings = Settings {
            speed_multiplier: 1.25,
            difficulty: Difficulty::Hard,
            sound_enabled: false,
            show_fps: true,
        };
        settings.save(&store);
        assert_eq!(Settings::load(&store), settings);

        settings.reset(&store);
        assert_eq!(settings, Settings::default());
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_save_failure_is_swallowed() {
        let store = MemoryStore::new();
        store.set_read_only(true);
        Settings::default().save(&store);
        assert!(store.is_empty());
    }
}
