//! Browser frame scheduling (wasm32)

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::Scheduler;

/// Callback invoked with the `requestAnimationFrame` timestamp
pub type FrameCallback = Closure<dyn FnMut(f64)>;

/// Shared slot holding the frame callback. Filled after the engine exists,
/// since the callback needs a handle to it.
pub type CallbackSlot = Rc<RefCell<Option<FrameCallback>>>;

/// `requestAnimationFrame`-backed scheduler
pub struct RafScheduler {
    window: web_sys::Window,
    performance: Option<web_sys::Performance>,
    callback: CallbackSlot,
    handle: Option<i32>,
}

impl RafScheduler {
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let performance = window.performance();
        Some(Self {
            window,
            performance,
            callback: Rc::new(RefCell::new(None)),
            handle: None,
        })
    }

    /// Slot to install the frame callback into
    pub fn callback_slot(&self) -> CallbackSlot {
        self.callback.clone()
    }
}

impl Scheduler for RafScheduler {
    fn now(&self) -> f64 {
        // Same time origin as the RAF timestamp
        match &self.performance {
            Some(p) => p.now(),
            None => js_sys::Date::now(),
        }
    }

    fn schedule_next_tick(&mut self) {
        self.cancel();
        let slot = self.callback.borrow();
        let Some(callback) = slot.as_ref() else {
            log::warn!("Frame requested before a callback was installed");
            return;
        };
        match self
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref())
        {
            Ok(handle) => self.handle = Some(handle),
            Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
        }
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.window.cancel_animation_frame(handle);
        }
    }
}
