//! Runtime configuration context
//!
//! Owned by the application root and moved into the [`Engine`](crate::sim::Engine).
//! Holds the user settings, the tuning derived from them, and the store the
//! settings persist to. Every mutation is saved immediately.

use crate::persistence::SharedStore;
use crate::settings::{Difficulty, Settings};
use crate::tuning::Tuning;

pub struct GameConfig {
    settings: Settings,
    tuning: Tuning,
    store: SharedStore,
}

impl GameConfig {
    /// Load persisted settings and derive tuning from them
    pub fn load(store: SharedStore) -> Self {
        let settings = Settings::load(&*store);
        Self::with_settings(settings, store)
    }

    /// Use explicit settings (not saved until the first mutation)
    pub fn with_settings(settings: Settings, store: SharedStore) -> Self {
        let mut config = Self {
            settings,
            tuning: Tuning::default(),
            store,
        };
        config.apply_difficulty();
        config
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Current speed multiplier
    pub fn speed_multiplier(&self) -> f32 {
        self.settings.speed_multiplier
    }

    /// Re-derive tuning from the current difficulty
    pub fn apply_difficulty(&mut self) {
        self.tuning = Tuning::for_difficulty(self.settings.difficulty);
        log::debug!(
            "Difficulty {}: gap={} speed={} gravity={}",
            self.settings.difficulty.as_str(),
            self.tuning.gap,
            self.tuning.base_speed,
            self.tuning.gravity
        );
    }

    pub fn set_speed_multiplier(&mut self, speed: f32) {
        self.settings.speed_multiplier = Settings::clamp_speed(speed);
        self.save();
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.settings.difficulty = difficulty;
        self.apply_difficulty();
        self.save();
    }

    /// Set difficulty by name; unknown names select Normal
    pub fn set_difficulty_name(&mut self, name: &str) {
        self.set_difficulty(Difficulty::from_str_or_default(name));
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.settings.sound_enabled = enabled;
        self.save();
    }

    pub fn set_show_fps(&mut self, show: bool) {
        self.settings.show_fps = show;
        self.save();
    }

    /// Restore default settings, persist them, and re-derive tuning
    pub fn reset(&mut self) {
        self.settings.reset(&*self.store);
        self.apply_difficulty();
    }

    pub fn save(&self) {
        self.settings.save(&*self.store);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_difficulty_change_rederives_tuning_and_saves() {
        let store = MemoryStore::shared();
        let mut config = GameConfig::load(store.clone());
        assert_eq!(config.tuning().gap, 120.0);

        config.set_difficulty(Difficulty::Hard);
        assert_eq!(config.tuning().gap, 100.0);
        assert_eq!(Settings::load(&*store).difficulty, Difficulty::Hard);

        config.set_difficulty_name("bogus");
        assert_eq!(config.settings().difficulty, Difficulty::Normal);
        assert_eq!(config.tuning().gap, 120.0);
    }

    #[test]
    fn test_setters_persist_immediately() {
        let store = MemoryStore::shared();
        let mut config = GameConfig::load(store.clone());
        config.set_speed_multiplier(5.0);
        config.set_sound_enabled(false);
        config.set_show_fps(true);

        let reloaded = GameConfig::load(store);
        assert_eq!(reloaded.speed_multiplier(), 2.0);
        assert!(!reloaded.settings().sound_enabled);
        assert!(reloaded.settings().show_fps);
    }

    #[test]
    fn test_reset_restores_normal_tuning() {
        let store = MemoryStore::shared();
        let mut config = GameConfig::load(store.clone());
        config.set_difficulty(Difficulty::Easy);
        config.reset();
        assert_eq!(config.settings(), &Settings::default());
        assert_eq!(config.tuning(), &Tuning::for_difficulty(Difficulty::Normal));
        assert_eq!(Settings::load(&*store), Settings::default());
    }

    #[test]
    fn test_broken_store_does_not_block_changes() {
        let store = MemoryStore::shared();
        store.set_read_only(true);
        let mut config = GameConfig::load(store);
        config.set_difficulty(Difficulty::Easy);
        assert_eq!(config.tuning().gap, 140.0);
    }
}
