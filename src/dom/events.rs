// ============================================================================
// EVENT HANDLING
// ============================================================================
// Listeners on the modal's own elements live as long as the modal (which is
// created once), so their closures are forgotten. Document-level listeners
// must be removable: see `DocumentListener`.
// ============================================================================

use wasm_bindgen::prelude::*;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::convert::FromWasmAbi;
use web_sys::{Element, EventTarget};

/// Registers `handler` for `event_type` on `element` for the page lifetime.
pub fn on_event<E, F>(element: &Element, event_type: &str, handler: F) -> Result<(), JsValue>
where
    E: FromWasmAbi + 'static,
    F: FnMut(E) + 'static,
{
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(E)>);
    element.add_event_listener_with_callback(event_type, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

pub fn on_click<F>(element: &Element, handler: F) -> Result<(), JsValue>
where
    F: FnMut(web_sys::MouseEvent) + 'static,
{
    on_event(element, "click", handler)
}

/// Listener on `document`, removed when dropped.
pub struct DocumentListener<E: FromWasmAbi + 'static> {
    target: EventTarget,
    event_type: &'static str,
    closure: Closure<dyn FnMut(E)>,
}

impl<E: FromWasmAbi + 'static> DocumentListener<E> {
    pub fn add<F>(event_type: &'static str, handler: F) -> Result<Self, JsValue>
    where
        F: FnMut(E) + 'static,
    {
        let target: EventTarget = crate::dom::document()
            .ok_or_else(|| JsValue::from_str("No document"))?
            .into();
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(E)>);
        target.add_event_listener_with_callback(event_type, closure.as_ref().unchecked_ref())?;
        Ok(Self {
            target,
            event_type,
            closure,
        })
    }
}

impl<E: FromWasmAbi + 'static> Drop for DocumentListener<E> {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event_type, self.closure.as_ref().unchecked_ref());
    }
}
