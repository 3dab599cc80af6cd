//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Frame scheduling (`requestAnimationFrame` on web, manual time natively)
//! - Input debouncing

#[cfg(target_arch = "wasm32")]
pub mod web;

use std::cell::RefCell;
use std::rc::Rc;

/// Source of frame callbacks
///
/// The engine only asks for "one more tick" and may withdraw that request;
/// delivering the callback is up to whoever drives the engine.
pub trait Scheduler {
    /// Current time in milliseconds
    fn now(&self) -> f64;
    /// Request a single frame callback
    fn schedule_next_tick(&mut self);
    /// Withdraw a pending request, if any
    fn cancel(&mut self);
}

#[derive(Debug, Default)]
struct ManualInner {
    now: f64,
    pending: bool,
    requests: u64,
}

/// Scheduler driven by hand: tests and the headless demo move time forward
/// and pull pending ticks themselves. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    inner: Rc<RefCell<ManualInner>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(now: f64) -> Self {
        let s = Self::new();
        s.set_time(now);
        s
    }

    pub fn advance(&self, ms: f64) -> f64 {
        let mut inner = self.inner.borrow_mut();
        inner.now += ms;
        inner.now
    }

    pub fn set_time(&self, now: f64) {
        self.inner.borrow_mut().now = now;
    }

    pub fn is_pending(&self) -> bool {
        self.inner.borrow().pending
    }

    /// Consume the pending request; true if there was one
    pub fn take_pending(&self) -> bool {
        std::mem::take(&mut self.inner.borrow_mut().pending)
    }

    /// Total number of tick requests seen
    pub fn requests(&self) -> u64 {
        self.inner.borrow().requests
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> f64 {
        self.inner.borrow().now
    }

    fn schedule_next_tick(&mut self) {
        let mut inner = self.inner.borrow_mut();
        inner.pending = true;
        inner.requests += 1;
    }

    fn cancel(&mut self) {
        self.inner.borrow_mut().pending = false;
    }
}

/// Default window for collapsing repeated input triggers
pub const DEBOUNCE_MS: f64 = 100.0;

/// Drops triggers that arrive within `window_ms` of the last accepted one
#[derive(Debug, Clone)]
pub struct Debouncer {
    window_ms: f64,
    last: Option<f64>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEBOUNCE_MS)
    }
}

impl Debouncer {
    pub fn new(window_ms: f64) -> Self {
        Self {
            window_ms,
            last: None,
        }
    }

    /// True if a trigger at `now` should be acted on
    pub fn accept(&mut self, now: f64) -> bool {
        match self.last {
            Some(last) if now - last < self.window_ms => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_scheduler_shares_state_between_clones() {
        let handle = ManualScheduler::starting_at(100.0);
        let mut boxed: Box<dyn Scheduler> = Box::new(handle.clone());

        assert!(!handle.is_pending());
        boxed.schedule_next_tick();
        assert!(handle.is_pending());
        assert!(handle.take_pending());
        assert!(!handle.take_pending());

        boxed.schedule_next_tick();
        boxed.cancel();
        assert!(!handle.is_pending());
        assert_eq!(handle.requests(), 2);

        handle.advance(16.5);
        assert_eq!(boxed.now(), 116.5);
    }

    #[test]
    fn test_debouncer_window() {
        let mut d = Debouncer::default();
        assert!(d.accept(0.0));
        assert!(!d.accept(50.0));
        assert!(!d.accept(99.9));
        assert!(d.accept(100.0));
        // Rejected triggers don't extend the window
        assert!(!d.accept(150.0));
        assert!(d.accept(200.0));
        d.reset();
        assert!(d.accept(201.0));
    }
}
