//! Game engine: state machine around the tick pipeline
//!
//! Owns the game state, configuration, score book, clock, scheduler,
//! listeners and the gap RNG. Driven by input calls (`start_game`, `flap`,
//! `pause`, `resume`) and by `on_frame` from the scheduler.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::clock::SimClock;
use super::events::{GameListener, Listeners};
use super::state::{GameEvent, GamePhase, GameState};
use super::tick::{tick, update_effects};
use crate::config::GameConfig;
use crate::highscores::ScoreBook;
use crate::platform::Scheduler;

/// Read-only view handed to the renderer after a step
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub state: &'a GameState,
    pub fps: u32,
    /// Normalized delta the step ran with
    pub dt: f32,
}

pub struct Engine {
    state: GameState,
    config: GameConfig,
    scores: ScoreBook,
    clock: SimClock,
    scheduler: Box<dyn Scheduler>,
    listeners: Listeners,
    rng: Pcg32,
}

impl Engine {
    pub fn new(
        config: GameConfig,
        scores: ScoreBook,
        scheduler: Box<dyn Scheduler>,
        seed: u64,
    ) -> Self {
        let clock = SimClock::new(scheduler.now());
        Self {
            state: GameState::new(),
            config,
            scores,
            clock,
            scheduler,
            listeners: Listeners::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn add_listener(&mut self, listener: Box<dyn GameListener>) {
        self.listeners.add(listener);
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut GameConfig {
        &mut self.config
    }

    pub fn scores(&self) -> &ScoreBook {
        &self.scores
    }

    pub fn scores_mut(&mut self) -> &mut ScoreBook {
        &mut self.scores
    }

    pub fn fps(&self) -> u32 {
        self.clock.fps()
    }

    /// Begin a fresh run from Start or GameOver
    pub fn start_game(&mut self) -> bool {
        if !matches!(self.state.phase, GamePhase::Start | GamePhase::GameOver) {
            return false;
        }
        self.state.reset();
        self.state.phase = GamePhase::Playing;
        self.clock.restart(self.scheduler.now());
        self.scheduler.schedule_next_tick();
        log::info!(
            "Run started ({}, speed x{})",
            self.config.settings().difficulty.as_str(),
            self.config.speed_multiplier()
        );
        self.listeners.game_start();
        true
    }

    pub fn flap(&mut self) -> bool {
        if self.state.phase != GamePhase::Playing {
            return false;
        }
        self.state.mover.flap(self.config.tuning().jump_impulse);
        self.listeners.flap();
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.state.phase != GamePhase::Playing {
            return false;
        }
        self.state.phase = GamePhase::Paused;
        self.scheduler.cancel();
        log::info!("Paused at frame {}", self.state.frame);
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.state.phase != GamePhase::Paused {
            return false;
        }
        self.state.phase = GamePhase::Playing;
        self.clock.restart(self.scheduler.now());
        self.scheduler.schedule_next_tick();
        log::info!("Resumed");
        true
    }

    /// Toggle between Playing and Paused
    pub fn toggle_pause(&mut self) -> bool {
        match self.state.phase {
            GamePhase::Playing => self.pause(),
            GamePhase::Paused => self.resume(),
            _ => false,
        }
    }

    /// Scheduler callback. Runs at most one step and returns the frame to
    /// draw, or `None` if nothing advanced.
    ///
    /// After game over it keeps animating the crash effects until they
    /// settle.
    pub fn on_frame(&mut self, now: f64) -> Option<Frame<'_>> {
        match self.state.phase {
            GamePhase::Playing => {}
            GamePhase::GameOver if self.state.has_effects() => {}
            _ => return None,
        }
        let stepped = self.clock.advance(now);
        if let Some(dt) = stepped {
            if self.state.phase == GamePhase::Playing {
                self.step(dt);
            } else {
                update_effects(&mut self.state, dt);
            }
        }
        if self.state.phase == GamePhase::Playing || self.state.has_effects() {
            self.scheduler.schedule_next_tick();
        }
        stepped.map(|dt| Frame {
            state: &self.state,
            fps: self.clock.fps(),
            dt,
        })
    }

    /// Advance one step with normalized `dt`, dispatching the results
    pub fn step(&mut self, dt: f32) -> Vec<GameEvent> {
        if self.state.phase != GamePhase::Playing {
            return Vec::new();
        }
        let speed = self.config.speed_multiplier();
        let events = tick(
            &mut self.state,
            self.config.tuning(),
            speed,
            dt,
            &mut self.rng,
        );

        for event in &events {
            match *event {
                GameEvent::Scored { score, .. } => {
                    if self.scores.record_score(score) {
                        log::debug!("New best score {}", score);
                    }
                    self.listeners.score(score);
                }
                GameEvent::Crashed { cause } => {
                    self.scheduler.cancel();
                    log::info!(
                        "Crashed ({:?}) at frame {} with score {}",
                        cause,
                        self.state.frame,
                        self.state.score
                    );
                    self.listeners
                        .game_over(self.state.score, self.scores.best());
                }
            }
        }
        events
    }

    /// Reseed the gap RNG, e.g. to replay a recorded run
    pub fn reseed(&mut self, seed: u64) {
        self.rng = Pcg32::seed_from_u64(seed);
        log::debug!("Reseeded with {}", seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::persistence::{KeyValueStore, MemoryStore, SharedStore, keys};
    use crate::platform::ManualScheduler;
    use crate::sim::events::{EventLog, Notification};
    use crate::sim::{Collision, Obstacle};
    use std::rc::Rc;

    fn engine_with(store: SharedStore, seed: u64) -> (Engine, ManualScheduler) {
        let sched = ManualScheduler::new();
        let config = GameConfig::load(store.clone());
        let scores = ScoreBook::load(store);
        let engine = Engine::new(config, scores, Box::new(sched.clone()), seed);
        (engine, sched)
    }

    fn engine(seed: u64) -> (Engine, ManualScheduler) {
        engine_with(MemoryStore::shared(), seed)
    }

    #[test]
    fn test_phase_transitions() {
        let (mut e, sched) = engine(1);
        assert_eq!(e.phase(), GamePhase::Start);
        assert!(!e.flap());
        assert!(!e.pause());
        assert!(!e.resume());

        assert!(e.start_game());
        assert_eq!(e.phase(), GamePhase::Playing);
        assert!(sched.is_pending());
        assert!(!e.start_game());
        assert!(!e.resume());

        assert!(e.pause());
        assert_eq!(e.phase(), GamePhase::Paused);
        assert!(!sched.is_pending());
        assert!(!e.flap());
        assert!(!e.start_game());

        assert!(e.toggle_pause());
        assert_eq!(e.phase(), GamePhase::Playing);
        assert!(sched.is_pending());

        // Fall to the ground
        while e.phase() == GamePhase::Playing {
            e.step(1.0);
        }
        assert_eq!(e.phase(), GamePhase::GameOver);
        assert!(!sched.is_pending());
        assert!(!e.pause());

        assert!(e.start_game());
        assert_eq!(e.state().score, 0);
        assert_eq!(e.state().frame, 0);
        assert_eq!(e.state().mover.pos.y, MOVER_START_Y);
    }

    #[test]
    fn test_flap_sets_velocity_and_notifies() {
        let (mut e, _sched) = engine(1);
        let log = EventLog::new();
        e.add_listener(Box::new(log.clone()));
        e.start_game();
        e.step(1.0);
        assert!(e.flap());
        assert_eq!(e.state().mover.vel, -6.0);
        assert_eq!(log.snapshot(), vec![Notification::GameStart, Notification::Flap]);
    }

    #[test]
    fn test_on_frame_caps_rate_and_reschedules() {
        let (mut e, sched) = engine(1);
        assert!(e.on_frame(100.0).is_none());

        e.start_game();
        assert!(sched.take_pending());

        // Too early: no step, but the loop keeps going
        assert!(e.on_frame(10.0).is_none());
        assert!(sched.take_pending());
        assert_eq!(e.state().frame, 0);

        let frame = e.on_frame(20.0).expect("step should run");
        assert!((frame.dt - 1.2).abs() < 1e-5);
        assert_eq!(frame.state.frame, 1);
        assert!(sched.take_pending());
    }

    #[test]
    fn test_pause_does_not_simulate_paused_time() {
        let (mut e, sched) = engine(1);
        e.start_game();
        e.on_frame(20.0);
        let y = e.state().mover.pos.y;
        e.pause();

        sched.set_time(60_000.0);
        assert!(e.on_frame(60_000.0).is_none());
        assert_eq!(e.state().mover.pos.y, y);

        e.resume();
        // Less than one frame since resume
        assert!(e.on_frame(60_010.0).is_none());
        let frame = e.on_frame(60_020.0).expect("step should run");
        assert!((frame.dt - 1.2).abs() < 1e-5);
    }

    #[test]
    fn test_score_updates_best_and_persists() {
        let store = MemoryStore::shared();
        store.set(keys::BEST_SCORE, "2").unwrap();
        let (mut e, _sched) = engine_with(store.clone(), 1);
        let log = EventLog::new();
        e.add_listener(Box::new(log.clone()));
        assert_eq!(e.scores().best(), 2);

        e.start_game();
        e.state.frame = 1;
        e.state.score = 2;
        let id = e.state.next_entity_id();
        e.state.obstacles.push(Obstacle::new(id, 29.0, 100.0, 120.0));
        let events = e.step(1.0);
        assert_eq!(events, vec![GameEvent::Scored { obstacle_id: id, score: 3 }]);
        assert_eq!(e.scores().best(), 3);

        // A fresh session sees the new best
        let reloaded = ScoreBook::load(store);
        assert_eq!(reloaded.best(), 3);
        assert_eq!(
            log.snapshot(),
            vec![Notification::GameStart, Notification::Score(3)]
        );
    }

    #[test]
    fn test_crash_reports_score_and_best() {
        let (mut e, sched) = engine(1);
        let log = EventLog::new();
        e.add_listener(Box::new(log.clone()));
        e.start_game();
        e.state.frame = 1;
        let id = e.state.next_entity_id();
        e.state.obstacles.push(Obstacle::new(id, 70.0, 300.0, 100.0));

        let events = e.step(1.0);
        assert_eq!(
            events,
            vec![GameEvent::Crashed {
                cause: Collision::Obstacle { id }
            }]
        );
        assert_eq!(e.phase(), GamePhase::GameOver);
        assert!(!sched.is_pending());
        assert_eq!(
            log.snapshot().last(),
            Some(&Notification::GameOver { score: 0, best: 0 })
        );
        // Dead engines ignore further steps
        assert!(e.step(1.0).is_empty());
    }

    #[test]
    fn test_effects_animate_after_game_over() {
        let (mut e, sched) = engine(1);
        let log = EventLog::new();
        e.add_listener(Box::new(log.clone()));
        e.start_game();
        e.state.frame = 1;
        let id = e.state.next_entity_id();
        e.state.obstacles.push(Obstacle::new(id, 70.0, 300.0, 100.0));

        let mut now = 20.0;
        assert!(e.on_frame(now).is_some());
        assert_eq!(e.phase(), GamePhase::GameOver);
        assert_eq!(e.state().particles.len(), EXPLOSION_PARTICLES);
        assert!(sched.is_pending());

        let mut frames = 0;
        while sched.take_pending() {
            now += 20.0;
            let frame = e.on_frame(now).expect("effects should advance");
            assert_eq!(frame.state.phase, GamePhase::GameOver);
            frames += 1;
            assert!(frames < 200);
        }
        assert!(!e.state().has_effects());
        assert_eq!(e.state().screen_shake, 0.0);
        assert!(e.on_frame(now + 20.0).is_none());
        assert!(!sched.is_pending());

        // Game over is reported once, however long the effects run
        let overs = log
            .snapshot()
            .iter()
            .filter(|n| matches!(n, Notification::GameOver { .. }))
            .count();
        assert_eq!(overs, 1);

        assert!(frames > 40);
        assert!(e.start_game());
        assert!(!e.state().has_effects());
    }

    #[test]
    fn test_new_run_clears_pending_effects() {
        let (mut e, _sched) = engine(1);
        e.start_game();
        e.state.frame = 1;
        let id = e.state.next_entity_id();
        e.state.obstacles.push(Obstacle::new(id, 70.0, 300.0, 100.0));
        e.step(1.0);
        assert!(e.state().has_effects());

        assert!(e.start_game());
        assert!(e.state().particles.is_empty());
        assert_eq!(e.state().screen_shake, 0.0);
    }

    #[test]
    fn test_listeners_see_each_event_once_in_order() {
        let (mut e, _sched) = engine(1);
        let first = EventLog::new();
        let second = EventLog::new();
        e.add_listener(Box::new(first.clone()));
        e.add_listener(Box::new(second.clone()));
        e.start_game();
        e.flap();
        assert_eq!(first.snapshot(), second.snapshot());
        assert_eq!(first.snapshot().len(), 2);
    }

    /// Drive a run to the end with a fixed input policy and frame timing
    fn autopilot_run(seed: u64) -> (GameState, Vec<u32>) {
        let (mut e, sched) = engine(seed);
        e.start_game();
        let mut spawned = Vec::new();
        let mut now = 0.0;
        for _ in 0..5000 {
            if e.phase() != GamePhase::Playing {
                break;
            }
            now += 20.0;
            sched.set_time(now);
            // Flap toward the gap of the next obstacle ahead of the mover
            let target = e
                .state()
                .obstacles
                .iter()
                .find(|o| o.trailing_edge() >= MOVER_X)
                .map(|o| o.gap_top + o.gap_size() * 0.6)
                .unwrap_or(FIELD_HEIGHT / 2.0);
            if e.state().mover.pos.y + MOVER_HEIGHT > target && e.state().mover.vel > 0.0 {
                e.flap();
            }
            e.on_frame(now);
            for o in &e.state().obstacles {
                if !spawned.contains(&o.id) {
                    spawned.push(o.id);
                }
            }
        }
        (e.state().clone(), spawned)
    }

    #[test]
    fn test_same_seed_same_run() {
        let (a, ids_a) = autopilot_run(42);
        let (b, ids_b) = autopilot_run(42);
        assert_eq!(a, b);
        assert_eq!(ids_a, ids_b);
        assert!(a.frame > 0);
    }

    #[test]
    fn test_reseed_replays_gap_sequence() {
        let store: SharedStore = Rc::new(MemoryStore::new());
        let (mut e, _sched) = engine_with(store, 7);
        e.start_game();
        e.step(1.0);
        let first_gap = e.state().obstacles[0].gap_top;

        e.state.phase = GamePhase::GameOver;
        e.reseed(7);
        e.start_game();
        e.step(1.0);
        assert_eq!(e.state().obstacles[0].gap_top, first_gap);
    }
}
