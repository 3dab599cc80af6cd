//! Game notifications
//!
//! The engine calls registered listeners in registration order, once per
//! event. Sound, HUD and analytics hook in here.

use std::cell::RefCell;
use std::rc::Rc;

/// Observer for game lifecycle events. All methods default to no-ops.
pub trait GameListener {
    fn on_game_start(&mut self) {}
    fn on_flap(&mut self) {}
    /// `score` is the new session total
    fn on_score(&mut self, _score: u64) {}
    fn on_game_over(&mut self, _score: u64, _best: u64) {}
}

/// Ordered set of listeners
#[derive(Default)]
pub struct Listeners {
    listeners: Vec<Box<dyn GameListener>>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, listener: Box<dyn GameListener>) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn game_start(&mut self) {
        for l in &mut self.listeners {
            l.on_game_start();
        }
    }

    pub fn flap(&mut self) {
        for l in &mut self.listeners {
            l.on_flap();
        }
    }

    pub fn score(&mut self, score: u64) {
        for l in &mut self.listeners {
            l.on_score(score);
        }
    }

    pub fn game_over(&mut self, score: u64, best: u64) {
        for l in &mut self.listeners {
            l.on_game_over(score, best);
        }
    }
}

/// A recorded notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    GameStart,
    Flap,
    Score(u64),
    GameOver { score: u64, best: u64 },
}

/// Listener that records every notification. Clones share the same log,
/// so keep one clone and hand the other to the engine.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: Rc<RefCell<Vec<Notification>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far
    pub fn snapshot(&self) -> Vec<Notification> {
        self.entries.borrow().clone()
    }

    /// Remove and return everything recorded so far
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.entries.borrow_mut())
    }

    fn push(&self, n: Notification) {
        self.entries.borrow_mut().push(n);
    }
}

impl GameListener for EventLog {
    fn on_game_start(&mut self) {
        self.push(Notification::GameStart);
    }

    fn on_flap(&mut self) {
        self.push(Notification::Flap);
    }

    fn on_score(&mut self, score: u64) {
        self.push(Notification::Score(score));
    }

    fn on_game_over(&mut self, score: u64, best: u64) {
        self.push(Notification::GameOver { score, best });
    }
}

/// Writes lifecycle events to the `log` facade
#[derive(Debug, Default)]
pub struct LogListener;

impl GameListener for LogListener {
    fn on_game_start(&mut self) {
        log::info!("Game started");
    }

    fn on_score(&mut self, score: u64) {
        log::debug!("Score: {}", score);
    }

    fn on_game_over(&mut self, score: u64, best: u64) {
        log::info!("Game over: score={} best={}", score, best);
    }
}
