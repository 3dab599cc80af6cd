//! Skyhop entry point
//!
//! On wasm32 this wires LocalStorage, `requestAnimationFrame` and keyboard /
//! pointer / visibility input to the engine. Natively it runs a headless
//! autopilot session against a JSON store in the user data directory.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use skyhop::GameConfig;
    use skyhop::ScoreBook;
    use skyhop::persistence::{LocalStore, MemoryStore, SharedStore};
    use skyhop::platform::Debouncer;
    use skyhop::platform::web::RafScheduler;
    use skyhop::sim::{Engine, GameListener, GamePhase, LogListener};

    type SharedEngine = Rc<RefCell<Engine>>;

    fn set_text(id: &str, text: &str) {
        if let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(id: &str, visible: bool) {
        if let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        {
            let _ = el.class_list().toggle_with_force("hidden", !visible);
        }
    }

    /// Keeps the HUD text in sync with the run
    struct Hud;

    impl GameListener for Hud {
        fn on_game_start(&mut self) {
            set_text("hud-score", "0");
            set_visible("start-screen", false);
            set_visible("game-over", false);
        }

        fn on_score(&mut self, score: u64) {
            set_text("hud-score", &score.to_string());
        }

        fn on_game_over(&mut self, score: u64, best: u64) {
            set_text("final-score", &score.to_string());
            set_text("best-score", &best.to_string());
            set_visible("game-over", true);
        }
    }

    fn open_store() -> SharedStore {
        match LocalStore::open() {
            Ok(store) => Rc::new(store),
            Err(e) => {
                log::warn!("LocalStorage unavailable ({}), scores won't persist", e);
                MemoryStore::shared()
            }
        }
    }

    /// Flap while playing, otherwise start a new run
    fn primary_action(engine: &SharedEngine) {
        let mut e = engine.borrow_mut();
        match e.phase() {
            GamePhase::Playing => {
                e.flap();
            }
            GamePhase::Start | GamePhase::GameOver => {
                e.start_game();
            }
            GamePhase::Paused => {}
        }
    }

    pub fn run() {
        log::info!("Skyhop starting...");

        let Some(window) = web_sys::window() else {
            log::error!("No window");
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };
        let Some(scheduler) = RafScheduler::new() else {
            log::error!("No animation frame scheduler");
            return;
        };

        let store = open_store();
        let config = GameConfig::load(store.clone());
        let scores = ScoreBook::load(store);
        set_text("best-score", &scores.best().to_string());

        let slot = scheduler.callback_slot();
        let seed = js_sys::Date::now() as u64;
        let engine: SharedEngine = Rc::new(RefCell::new(Engine::new(
            config,
            scores,
            Box::new(scheduler),
            seed,
        )));
        {
            let mut e = engine.borrow_mut();
            e.add_listener(Box::new(LogListener));
            e.add_listener(Box::new(Hud));
        }
        log::info!("Engine initialized with seed: {}", seed);

        // Frame loop
        {
            let engine = engine.clone();
            *slot.borrow_mut() = Some(Closure::new(move |time: f64| {
                let mut e = engine.borrow_mut();
                let show_fps = e.config().settings().show_fps;
                if let Some(frame) = e.on_frame(time) {
                    if show_fps {
                        set_text("hud-fps", &frame.fps.to_string());
                    }
                }
            }));
        }

        let debounce = Rc::new(RefCell::new(Debouncer::default()));

        // Keyboard
        {
            let engine = engine.clone();
            let debounce = debounce.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let key = event.key();
                let is_action = matches!(key.as_str(), " " | "ArrowUp");
                let is_pause = matches!(key.as_str(), "p" | "P" | "Escape");
                if !is_action && !is_pause {
                    return;
                }
                event.prevent_default();
                if !debounce.borrow_mut().accept(js_sys::Date::now()) {
                    return;
                }
                if is_action {
                    primary_action(&engine);
                } else {
                    engine.borrow_mut().toggle_pause();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse click
        {
            let engine = engine.clone();
            let debounce = debounce.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                if debounce.borrow_mut().accept(js_sys::Date::now()) {
                    primary_action(&engine);
                }
            });
            let _ = window
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch
        {
            let engine = engine.clone();
            let debounce = debounce.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::TouchEvent| {
                event.prevent_default();
                if debounce.borrow_mut().accept(js_sys::Date::now()) {
                    primary_action(&engine);
                }
            });
            let _ = window
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Auto-pause when the tab is hidden
        {
            let engine = engine.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden
                    && engine.borrow_mut().pause()
                {
                    log::info!("Auto-paused (tab hidden)");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        set_visible("loading", false);
        set_visible("start-screen", true);
        log::info!("Skyhop running!");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Skyhop (native) starting...");

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u64>().ok())
        .unwrap_or_else(|| chrono::Utc::now().timestamp_millis() as u64);

    let summary = native::run_autopilot(seed);
    println!(
        "seed {}: score {} in {} frames (best {}, rank {})",
        seed,
        summary.score,
        summary.frames,
        summary.best,
        summary
            .rank
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::rc::Rc;

    use directories::ProjectDirs;

    use skyhop::consts::*;
    use skyhop::persistence::{FileStore, MemoryStore, SharedStore};
    use skyhop::platform::{ManualScheduler, Scheduler};
    use skyhop::sim::{Engine, GamePhase, LogListener};
    use skyhop::{GameConfig, ScoreBook};

    /// Simulated wall-clock advance per frame callback
    const FRAME_MS: f64 = 17.0;
    /// Stop a run that never crashes
    const MAX_FRAMES: u32 = 60 * 60 * 5;

    pub struct Summary {
        pub score: u64,
        pub frames: u64,
        pub best: u64,
        pub rank: Option<usize>,
    }

    fn open_store() -> SharedStore {
        match ProjectDirs::from("", "", "skyhop") {
            Some(dirs) => {
                let store = FileStore::open(dirs.data_dir().join("skyhop.json"));
                log::info!("Using store at {}", store.path().display());
                Rc::new(store)
            }
            None => {
                log::warn!("No data directory, scores won't persist");
                MemoryStore::shared()
            }
        }
    }

    /// Height the autopilot tries to hold: a bit below the middle of the
    /// next gap, or mid-field when none is ahead
    fn target_y(engine: &Engine) -> f32 {
        engine
            .state()
            .obstacles
            .iter()
            .find(|o| o.trailing_edge() >= MOVER_X)
            .map(|o| o.gap_top + o.gap_size() * 0.65)
            .unwrap_or((FIELD_HEIGHT - GROUND_HEIGHT) / 2.0)
    }

    pub fn run_autopilot(seed: u64) -> Summary {
        let store = open_store();
        let config = GameConfig::load(store.clone());
        let scores = ScoreBook::load(store);
        // Simulated time starts at the wall clock
        let scheduler = ManualScheduler::starting_at(chrono::Utc::now().timestamp_millis() as f64);

        let mut engine = Engine::new(config, scores, Box::new(scheduler.clone()), seed);
        engine.add_listener(Box::new(LogListener));
        engine.start_game();

        let mut callbacks = 0;
        while engine.phase() == GamePhase::Playing && callbacks < MAX_FRAMES {
            if !scheduler.take_pending() {
                break;
            }
            let now = scheduler.advance(FRAME_MS);
            let mover = engine.state().mover;
            if mover.vel > 0.0 && mover.pos.y + MOVER_HEIGHT > target_y(&engine) {
                engine.flap();
            }
            engine.on_frame(now);
            callbacks += 1;
        }

        let state = engine.state();
        let (score, frames) = (state.score, state.frame);
        let timestamp = scheduler.now();
        let scores = engine.scores_mut();
        let rank = if scores.is_top_score(score) {
            scores.submit("Autopilot", score, timestamp)
        } else {
            None
        };

        Summary {
            score,
            frames,
            best: scores.best(),
            rank,
        }
    }
}
