//! Frame-rate capped simulation clock
//!
//! Turns scheduler timestamps (milliseconds) into normalized step deltas.
//! Callbacks arriving sooner than the target interval are dropped rather
//! than accumulated.

use crate::consts::{FRAME_TIME_MS, MAX_FRAME_DELTA_MS};

#[derive(Debug, Clone)]
pub struct SimClock {
    last_tick: f64,
    /// Frames counted since `last_fps_update`
    frames: u32,
    last_fps_update: f64,
    fps: u32,
}

impl SimClock {
    pub fn new(now: f64) -> Self {
        Self {
            last_tick: now,
            frames: 0,
            last_fps_update: now,
            fps: 0,
        }
    }

    /// Start measuring from `now`, discarding any elapsed time
    pub fn restart(&mut self, now: f64) {
        self.last_tick = now;
        self.frames = 0;
        self.last_fps_update = now;
    }

    /// Normalized `dt` (1.0 = one nominal 60 Hz frame), or `None` if the
    /// target interval hasn't elapsed yet
    pub fn advance(&mut self, now: f64) -> Option<f32> {
        let raw = now - self.last_tick;
        if raw.is_nan() || raw < FRAME_TIME_MS {
            return None;
        }
        let clamped = raw.min(MAX_FRAME_DELTA_MS);
        self.last_tick = now;

        self.frames += 1;
        let since = now - self.last_fps_update;
        if since >= 1000.0 {
            self.fps = (self.frames as f64 * 1000.0 / since).round() as u32;
            self.frames = 0;
            self.last_fps_update = now;
        }

        Some((clamped / FRAME_TIME_MS) as f32)
    }

    /// Frames per second over the last full measurement window
    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn last_tick(&self) -> f64 {
        self.last_tick
    }
}
