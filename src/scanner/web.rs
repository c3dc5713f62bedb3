// requestAnimationFrame-backed scheduler for the scan loop

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

use super::scan_loop::{FrameHandle, FrameScheduler};

/// One persistent closure, re-registered for every tick.
#[derive(Clone, Default)]
pub struct AnimationFrameScheduler {
    callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
}

impl AnimationFrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// What runs on each tick. Set once, before the first `request_tick`.
    pub fn set_callback<F>(&self, mut on_tick: F)
    where
        F: FnMut() + 'static,
    {
        let closure = Closure::wrap(Box::new(move |_timestamp: f64| on_tick()) as Box<dyn FnMut(f64)>);
        *self.callback.borrow_mut() = Some(closure);
    }
}

impl FrameScheduler for AnimationFrameScheduler {
    fn request_tick(&mut self) -> Option<FrameHandle> {
        let window = web_sys::window()?;
        let callback = self.callback.borrow();
        let callback = callback.as_ref()?;
        window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .ok()
            .map(FrameHandle)
    }

    fn cancel_tick(&mut self, handle: FrameHandle) {
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(handle.0);
        }
    }
}
