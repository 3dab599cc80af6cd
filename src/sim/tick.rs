//! Fixed timestep simulation tick
//!
//! Advances the game state by one normalized step. Pure apart from the
//! injected RNG: identical seeds and inputs give identical runs.

use rand::Rng;

use super::collision;
use super::state::{GameEvent, GamePhase, GameState, Obstacle, Particle};
use crate::consts::*;
use crate::tuning::Tuning;

/// Advance the game state by one step
///
/// `speed` is the user speed multiplier, `dt` is in nominal frames (1.0 at
/// exactly 60 FPS). Does nothing unless the game is Playing.
///
/// Order: gravity, spawn, scroll + cull, scoring, effects, collision, frame
/// counter. A crash sets off the explosion.
pub fn tick<R: Rng>(
    state: &mut GameState,
    tuning: &Tuning,
    speed: f32,
    dt: f32,
    rng: &mut R,
) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if state.phase != GamePhase::Playing {
        return events;
    }

    state
        .mover
        .integrate(tuning.gravity, tuning.max_velocity, speed, dt);

    if state.frame % tuning.spawn_interval(speed) == 0 {
        spawn_obstacle(state, tuning, rng);
    }

    let distance = tuning.scroll_speed(state.score) * speed * dt;
    advance_obstacles(&mut state.obstacles, distance);

    let mover_x = state.mover.pos.x;
    for obstacle in &mut state.obstacles {
        if !obstacle.scored && obstacle.trailing_edge() < mover_x {
            obstacle.scored = true;
            state.score += 1;
            events.push(GameEvent::Scored {
                obstacle_id: obstacle.id,
                score: state.score,
            });
        }
    }

    update_effects(state, dt);

    if let Some(cause) = collision::detect(&state.mover, &state.obstacles) {
        state.phase = GamePhase::GameOver;
        explode(state, rng);
        events.push(GameEvent::Crashed { cause });
    }

    state.frame += 1;
    events
}

/// Push a new obstacle at the right edge with a random gap position
///
/// The gap top is whole units so `gap_bottom - gap_top` is exactly the gap.
pub fn spawn_obstacle<R: Rng>(state: &mut GameState, tuning: &Tuning, rng: &mut R) {
    let min_top = MIN_GAP_TOP;
    let max_top = FIELD_HEIGHT - tuning.gap - GAP_GROUND_MARGIN;
    let gap_top = if max_top > min_top {
        rng.random_range(min_top..max_top).floor()
    } else {
        min_top
    };

    let id = state.next_entity_id();
    state
        .obstacles
        .push(Obstacle::new(id, FIELD_WIDTH, gap_top, tuning.gap));
    log::trace!("Spawned obstacle {} gap_top={:.1}", id, gap_top);
}

/// Scroll every obstacle left by `distance`, then drop the ones off screen
pub fn advance_obstacles(obstacles: &mut Vec<Obstacle>, distance: f32) {
    for obstacle in obstacles.iter_mut() {
        obstacle.x -= distance;
    }
    obstacles.retain(|o| !o.is_off_screen());
}

/// Advance particles and decay the screen shake. Also runs after game over
/// until both settle.
pub fn update_effects(state: &mut GameState, dt: f32) {
    for particle in state.particles.iter_mut() {
        particle.update(dt);
    }
    state.particles.retain(Particle::is_alive);

    if state.screen_shake > 0.0 {
        state.screen_shake *= SHAKE_DECAY;
        if state.screen_shake < SHAKE_CUTOFF {
            state.screen_shake = 0.0;
        }
    }
}

/// Burst of debris from the mover's center plus a screen shake
pub fn explode<R: Rng>(state: &mut GameState, rng: &mut R) {
    let center = state.mover.bounds().center();
    for _ in 0..EXPLOSION_PARTICLES {
        let vel = glam::Vec2::new(
            (rng.random::<f32>() - 0.5) * EXPLOSION_SPEED,
            (rng.random::<f32>() - 0.5) * EXPLOSION_SPEED,
        );
        state.particles.push(Particle {
            pos: center,
            vel,
            life: 1.0,
            hue: rng.random_range(15.0..75.0),
            lightness: rng.random_range(50.0..80.0),
        });
    }
    state.screen_shake = CRASH_SHAKE;
}
