//! Skyhop - a side-scrolling flap-through-the-gaps arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, obstacles, collisions, game state)
//! - `platform`: Frame scheduling and input helpers
//! - `persistence`: Key-value storage for settings, best score and leaderboard
//! - `tuning`: Difficulty-driven game balance
//! - `config`: Settings + tuning context handed to the engine
//! - `settings` / `highscores`: persisted user preferences, best score and leaderboard

pub mod config;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use config::GameConfig;
pub use highscores::{Leaderboard, ScoreBook};
pub use settings::{Difficulty, Settings};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Playfield dimensions
    pub const FIELD_WIDTH: f32 = 320.0;
    pub const FIELD_HEIGHT: f32 = 480.0;
    /// Ground strip at the bottom of the field
    pub const GROUND_HEIGHT: f32 = 50.0;

    /// Mover defaults
    pub const MOVER_X: f32 = 80.0;
    pub const MOVER_START_Y: f32 = 240.0;
    pub const MOVER_WIDTH: f32 = 34.0;
    pub const MOVER_HEIGHT: f32 = 24.0;
    /// Display rotation per unit of velocity (radians)
    pub const ROTATION_PER_VELOCITY: f32 = 0.05;
    pub const MAX_ROTATION: f32 = 0.5;

    /// Hitbox is smaller than the sprite so near misses feel fair
    pub const HITBOX_INSET_X: f32 = 6.0;
    pub const HITBOX_INSET_Y: f32 = 4.0;

    /// Obstacle defaults
    pub const OBSTACLE_WIDTH: f32 = 52.0;
    /// Highest allowed gap top
    pub const MIN_GAP_TOP: f32 = 50.0;
    /// Space kept between the lowest gap bottom and the field bottom
    pub const GAP_GROUND_MARGIN: f32 = 100.0;

    /// Target frame interval (60 Hz) in milliseconds
    pub const FRAME_TIME_MS: f64 = 1000.0 / 60.0;
    /// Largest real delta handed to physics (two nominal frames, rounded)
    pub const MAX_FRAME_DELTA_MS: f64 = 32.0;

    /// Crash effects
    pub const EXPLOSION_PARTICLES: usize = 12;
    /// Max particle speed per axis is half of this
    pub const EXPLOSION_SPEED: f32 = 12.0;
    pub const PARTICLE_GRAVITY: f32 = 0.5;
    /// Life lost per nominal frame
    pub const PARTICLE_FADE: f32 = 0.02;
    pub const CRASH_SHAKE: f32 = 10.0;
    pub const SHAKE_DECAY: f32 = 0.9;
    /// Shake below this snaps to 0
    pub const SHAKE_CUTOFF: f32 = 0.1;

    /// Leaderboard limits
    pub const MAX_LEADERBOARD_ENTRIES: usize = 10;
    pub const MAX_NAME_LEN: usize = 16;
}

/// Clamp a float, mapping NaN to `fallback`
#[inline]
pub fn clamp_or(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}
