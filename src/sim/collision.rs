//! Collision detection
//!
//! Two independent checks per step: the field boundaries (ceiling and ground)
//! against the full sprite, and each obstacle against the inset hitbox.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Mover, Obstacle};
use crate::consts::{FIELD_HEIGHT, GROUND_HEIGHT, OBSTACLE_WIDTH};

/// What ended the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Collision {
    Ground,
    Ceiling,
    Obstacle { id: u32 },
}

/// Axis-aligned box, y grows downward
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Shrink by `dx` on the left and right and `dy` on top and bottom
    pub fn inset(&self, dx: f32, dy: f32) -> Self {
        Self {
            min: self.min + Vec2::new(dx, dy),
            max: self.max - Vec2::new(dx, dy),
        }
    }

    /// Open-interval overlap with the horizontal span `[left, right]`
    #[inline]
    pub fn overlaps_x(&self, left: f32, right: f32) -> bool {
        self.max.x > left && self.min.x < right
    }

    /// Vertical span lies within `[top, bottom]`
    #[inline]
    pub fn within_y(&self, top: f32, bottom: f32) -> bool {
        self.min.y >= top && self.max.y <= bottom
    }
}

/// Y coordinate of the ground surface
#[inline]
pub fn ground_y() -> f32 {
    FIELD_HEIGHT - GROUND_HEIGHT
}

/// Ground or ceiling contact (ground wins when both)
pub fn boundary_collision(mover: &Mover) -> Option<Collision> {
    let bounds = mover.bounds();
    if bounds.max.y >= ground_y() {
        Some(Collision::Ground)
    } else if bounds.min.y <= 0.0 {
        Some(Collision::Ceiling)
    } else {
        None
    }
}

/// Hitbox overlaps the obstacle's column and pokes out of its gap
pub fn hits_obstacle(hitbox: &Aabb, obstacle: &Obstacle) -> bool {
    hitbox.overlaps_x(obstacle.x, obstacle.x + OBSTACLE_WIDTH)
        && !hitbox.within_y(obstacle.gap_top, obstacle.gap_bottom)
}

/// First collision for this step, checking boundaries then obstacles in order
pub fn detect(mover: &Mover, obstacles: &[Obstacle]) -> Option<Collision> {
    if let Some(hit) = boundary_collision(mover) {
        return Some(hit);
    }
    let hitbox = mover.hitbox();
    obstacles
        .iter()
        .find(|o| hits_obstacle(&hitbox, o))
        .map(|o| Collision::Obstacle { id: o.id })
}
