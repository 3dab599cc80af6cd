//! Game state and core simulation types
//!
//! Pure data. Only the tick pipeline and the engine mutate it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, Collision};
use crate::consts::*;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for the first input
    Start,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Run ended
    GameOver,
}

/// The player-controlled mover
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mover {
    /// Top-left corner of the sprite
    pub pos: Vec2,
    /// Vertical velocity (positive = falling)
    pub vel: f32,
    /// Display tilt in radians, cosmetic only
    pub rotation: f32,
}

impl Default for Mover {
    fn default() -> Self {
        Self {
            pos: Vec2::new(MOVER_X, MOVER_START_Y),
            vel: 0.0,
            rotation: 0.0,
        }
    }
}

impl Mover {
    /// Apply one step of gravity and move
    pub fn integrate(&mut self, gravity: f32, max_velocity: f32, speed: f32, dt: f32) {
        self.vel = (self.vel + gravity * speed * dt).min(max_velocity);
        self.pos.y += self.vel * speed * dt;
        self.rotation = (self.vel * ROTATION_PER_VELOCITY).clamp(-MAX_ROTATION, MAX_ROTATION);
    }

    /// Instantly set the jump impulse, whatever the previous velocity
    pub fn flap(&mut self, impulse: f32) {
        self.vel = impulse;
    }

    /// Full sprite bounds
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.pos + Vec2::new(MOVER_WIDTH, MOVER_HEIGHT))
    }

    /// Forgiving hitbox used against obstacles
    pub fn hitbox(&self) -> Aabb {
        self.bounds().inset(HITBOX_INSET_X, HITBOX_INSET_Y)
    }
}

/// A top/bottom barrier pair with a vertical gap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    /// Leading (left) edge
    pub x: f32,
    /// Bottom of the upper barrier
    pub gap_top: f32,
    /// Top of the lower barrier
    pub gap_bottom: f32,
    /// Gap height at spawn
    pub gap: f32,
    /// Already counted toward the score
    pub scored: bool,
}

impl Obstacle {
    pub fn new(id: u32, x: f32, gap_top: f32, gap: f32) -> Self {
        Self {
            id,
            x,
            gap_top,
            gap_bottom: gap_top + gap,
            gap,
            scored: false,
        }
    }

    #[inline]
    pub fn trailing_edge(&self) -> f32 {
        self.x + OBSTACLE_WIDTH
    }

    #[inline]
    pub fn gap_size(&self) -> f32 {
        self.gap
    }

    /// Fully past the left edge of the field
    #[inline]
    pub fn is_off_screen(&self) -> bool {
        self.trailing_edge() < 0.0
    }
}

/// Crash debris (visual only)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 1.0 when spawned, removed at 0
    pub life: f32,
    /// HSL hue in degrees
    pub hue: f32,
    /// HSL lightness in percent
    pub lightness: f32,
}

impl Particle {
    /// Move, fall and fade by one step
    pub fn update(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        self.vel.y += PARTICLE_GRAVITY * dt;
        self.life -= PARTICLE_FADE * dt;
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Things that happened during a tick, in order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// An obstacle was passed; `score` is the new total
    Scored { obstacle_id: u32, score: u64 },
    /// The run ended
    Crashed { cause: Collision },
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Current phase
    pub phase: GamePhase,
    /// Simulation steps taken this session
    pub frame: u64,
    /// Obstacles passed this session
    pub score: u64,
    pub mover: Mover,
    /// Active obstacles, in spawn order
    pub obstacles: Vec<Obstacle>,
    /// Visual particles (not gameplay-affecting)
    #[serde(skip)]
    pub particles: Vec<Particle>,
    /// Screen shake intensity in pixels, 0 when settled
    pub screen_shake: f32,
    /// Next entity ID
    next_id: u32,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        Self {
            phase: GamePhase::Start,
            frame: 0,
            score: 0,
            mover: Mover::default(),
            obstacles: Vec::new(),
            particles: Vec::new(),
            screen_shake: 0.0,
            next_id: 1,
        }
    }

    /// Reset mover, obstacles, effects, score and frame counter. Phase is
    /// left alone.
    pub fn reset(&mut self) {
        self.frame = 0;
        self.score = 0;
        self.mover = Mover::default();
        self.obstacles.clear();
        self.particles.clear();
        self.screen_shake = 0.0;
    }

    /// Particles or shake still animating
    pub fn has_effects(&self) -> bool {
        !self.particles.is_empty() || self.screen_shake > 0.0
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}
