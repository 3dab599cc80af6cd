//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Normalized timestep, frame-rate capped (no accumulator)
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies beyond the `Scheduler` trait

pub mod clock;
pub mod collision;
pub mod engine;
pub mod events;
pub mod state;
pub mod tick;

pub use clock::SimClock;
pub use collision::{Aabb, Collision, detect};
pub use engine::{Engine, Frame};
pub use events::{EventLog, GameListener, Listeners, LogListener, Notification};
pub use state::{GameEvent, GamePhase, GameState, Mover, Obstacle, Particle};
pub use tick::{advance_obstacles, explode, spawn_obstacle, tick, update_effects};
