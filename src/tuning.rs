//! Data-driven game balance
//!
//! Everything the simulation reads that depends on the difficulty preset.

use serde::{Deserialize, Serialize};

use crate::settings::Difficulty;

/// Balance values for one difficulty
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    /// Downward acceleration per nominal frame
    pub gravity: f32,
    /// Velocity set by a flap (negative = up)
    pub jump_impulse: f32,
    /// Terminal falling velocity
    pub max_velocity: f32,
    /// Vertical gap between top and bottom barrier
    pub gap: f32,
    /// Obstacle scroll speed at score 0 (units per nominal frame)
    pub base_speed: f32,
    /// Frames between obstacle spawns at speed multiplier 1.0
    pub spawn_rate: u32,
    /// Score needed per speed-up step (0 disables scaling)
    pub speed_step_score: u64,
    /// Speed gained per step, as a fraction of base speed
    pub speed_step: f32,
    /// Upper bound on the speed scale
    pub max_speed_scale: f32,
}

impl Tuning {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        let (gravity, gap, base_speed, spawn_rate) = match difficulty {
            Difficulty::Easy => (0.35, 140.0, 1.5, 100),
            Difficulty::Normal => (0.4, 120.0, 2.0, 90),
            Difficulty::Hard => (0.45, 100.0, 2.5, 80),
        };
        Self {
            gravity,
            jump_impulse: -6.0,
            max_velocity: 15.0,
            gap,
            base_speed,
            spawn_rate,
            speed_step_score: 10,
            speed_step: 0.1,
            max_speed_scale: 1.5,
        }
    }

    /// Frames between spawns; faster games spawn proportionally more often
    pub fn spawn_interval(&self, speed_multiplier: f32) -> u64 {
        let interval = (self.spawn_rate as f32 / speed_multiplier).floor();
        if interval.is_finite() && interval >= 1.0 {
            interval as u64
        } else {
            1
        }
    }

    /// Multiplier on base speed, stepping up every `speed_step_score` points
    pub fn speed_scale(&self, score: u64) -> f32 {
        if self.speed_step_score == 0 {
            return 1.0;
        }
        let steps = (score / self.speed_step_score) as f32;
        (1.0 + steps * self.speed_step).min(self.max_speed_scale)
    }

    /// Obstacle scroll speed for the current score
    pub fn scroll_speed(&self, score: u64) -> f32 {
        self.base_speed * self.speed_scale(score)
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self::for_difficulty(Difficulty::Normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let easy = Tuning::for_difficulty(Difficulty::Easy);
        let normal = Tuning::for_difficulty(Difficulty::Normal);
        let hard = Tuning::for_difficulty(Difficulty::Hard);
        assert!(easy.gap > normal.gap && normal.gap > hard.gap);
        assert!(easy.base_speed < normal.base_speed && normal.base_speed < hard.base_speed);
        assert_eq!(normal.gravity, 0.4);
        assert_eq!(normal.spawn_rate, 90);
    }

    #[test]
    fn test_spawn_interval_scales_with_speed() {
        let t = Tuning::default();
        assert_eq!(t.spawn_interval(1.0), 90);
        assert_eq!(t.spawn_interval(2.0), 45);
        assert_eq!(t.spawn_interval(0.5), 180);
        assert_eq!(t.spawn_interval(1.3), 69);
        assert_eq!(t.spawn_interval(1000.0), 1);
        assert_eq!(t.spawn_interval(0.0), 1);
    }

    #[test]
    fn test_speed_steps_and_cap() {
        let t = Tuning::default();
        assert_eq!(t.scroll_speed(0), 2.0);
        assert_eq!(t.scroll_speed(9), 2.0);
        assert!((t.scroll_speed(10) - 2.2).abs() < 1e-5);
        assert!((t.scroll_speed(25) - 2.4).abs() < 1e-5);
        assert_eq!(t.scroll_speed(500), 3.0);
    }

    #[test]
    fn test_scaling_can_be_disabled() {
        let t = Tuning {
            speed_step_score: 0,
            ..Tuning::default()
        };
        assert_eq!(t.scroll_speed(1000), t.base_speed);
    }
}
