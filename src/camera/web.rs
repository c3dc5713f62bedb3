// ============================================================================
// WEB CAMERA - navigator.mediaDevices + <video>/<canvas> bindings
// ============================================================================
// Constraint objects and capability snapshots cross the JS boundary as JSON,
// so their shapes stay plain Rust structs (see models::camera).
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use futures_channel::oneshot;
use futures_util::future::{select, Either};
use gloo_timers::callback::Timeout;
use gloo_timers::future::TimeoutFuture;
use js_sys::{Function, Object, Promise, Reflect, JSON};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, Event, HtmlCanvasElement, HtmlElement, HtmlVideoElement};

use super::traits::{MediaDevices, MediaStream, VideoSurface, VideoTrack};
use crate::models::{
    DeviceError, Frame, StreamRequest, TrackCapabilities, TrackConstraint, TrackError, VideoReadyError,
    ViewportRect,
};

/// `HTMLMediaElement.HAVE_METADATA`
const HAVE_METADATA: u16 = 1;
/// `HTMLMediaElement.HAVE_ENOUGH_DATA`
const HAVE_ENOUGH_DATA: u16 = 4;

/// `"NotAllowedError: Permission denied"` out of a thrown DOMException.
pub(crate) fn js_error_text(err: &JsValue) -> String {
    let field = |name: &str| {
        Reflect::get(err, &JsValue::from_str(name))
            .ok()
            .and_then(|v| v.as_string())
            .filter(|s| !s.is_empty())
    };
    match (field("name"), field("message")) {
        (Some(name), Some(message)) => format!("{}: {}", name, message),
        (Some(text), None) | (None, Some(text)) => text,
        (None, None) => err.as_string().unwrap_or_else(|| format!("{:?}", err)),
    }
}

fn method(target: &JsValue, name: &str) -> Option<Function> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .and_then(|f| f.dyn_into::<Function>().ok())
}

// ----------------------------------------------------------------------------
// Devices / stream / track
// ----------------------------------------------------------------------------

#[derive(Clone)]
pub struct WebMediaDevices {
    devices: Option<web_sys::MediaDevices>,
}

impl WebMediaDevices {
    /// `navigator.mediaDevices.getUserMedia` if present (absent on insecure
    /// origins and some in-app browsers).
    pub fn detect() -> Self {
        let devices = web_sys::window()
            .map(|w| w.navigator())
            .and_then(|nav| Reflect::get(&nav, &JsValue::from_str("mediaDevices")).ok())
            .filter(|d| !d.is_undefined() && !d.is_null())
            .filter(|d| method(d, "getUserMedia").is_some())
            .map(|d| d.unchecked_into::<web_sys::MediaDevices>());
        if devices.is_none() {
            log::warn!("⚠️ [CAMERA] navigator.mediaDevices.getUserMedia not available");
        }
        Self { devices }
    }
}

impl MediaDevices for WebMediaDevices {
    type Stream = WebMediaStream;

    fn is_supported(&self) -> bool {
        self.devices.is_some()
    }

    async fn acquire(&self, request: &StreamRequest) -> Result<WebMediaStream, DeviceError> {
        let devices = self
            .devices
            .as_ref()
            .ok_or_else(|| DeviceError("mediaDevices unavailable".to_string()))?;
        let json = serde_json::to_string(request).map_err(|e| DeviceError(e.to_string()))?;
        let constraints = JSON::parse(&json).map_err(|e| DeviceError(js_error_text(&e)))?;

        let promise = devices
            .get_user_media_with_constraints(constraints.unchecked_ref())
            .map_err(|e| DeviceError(js_error_text(&e)))?;
        let stream = JsFuture::from(promise)
            .await
            .map_err(|e| DeviceError(js_error_text(&e)))?;
        Ok(WebMediaStream {
            stream: stream.unchecked_into(),
        })
    }
}

#[derive(Clone)]
pub struct WebMediaStream {
    stream: web_sys::MediaStream,
}

impl MediaStream for WebMediaStream {
    type Track = WebVideoTrack;

    fn video_track(&self) -> Option<WebVideoTrack> {
        let track = self.stream.get_video_tracks().get(0);
        if track.is_undefined() {
            return None;
        }
        Some(WebVideoTrack {
            track: track.unchecked_into(),
        })
    }

    fn stop_all(&self) {
        for track in self.stream.get_tracks().iter() {
            track.unchecked_into::<web_sys::MediaStreamTrack>().stop();
        }
    }
}

#[derive(Clone)]
pub struct WebVideoTrack {
    track: web_sys::MediaStreamTrack,
}

impl WebVideoTrack {
    fn capabilities_json(&self) -> Option<String> {
        // Firefox has no getCapabilities().
        let get = method(&self.track, "getCapabilities")?;
        let caps = get.call0(&self.track).ok()?;
        JSON::stringify(&caps).ok()?.as_string()
    }
}

impl VideoTrack for WebVideoTrack {
    fn capabilities(&self) -> TrackCapabilities {
        self.capabilities_json()
            .map(|json| TrackCapabilities::from_json(&json))
            .unwrap_or_default()
    }

    async fn apply(&self, constraint: &TrackConstraint) -> Result<(), TrackError> {
        let value = JSON::parse(&constraint.to_json()).map_err(|e| TrackError(js_error_text(&e)))?;
        let apply = method(&self.track, "applyConstraints")
            .ok_or_else(|| TrackError("applyConstraints not supported".to_string()))?;
        let result = apply
            .call1(&self.track, &value)
            .map_err(|e| TrackError(js_error_text(&e)))?;
        JsFuture::from(Promise::resolve(&result))
            .await
            .map(|_| ())
            .map_err(|e| TrackError(js_error_text(&e)))
    }
}

// ----------------------------------------------------------------------------
// Surface
// ----------------------------------------------------------------------------

#[derive(Clone)]
pub struct WebVideoSurface {
    video: HtmlVideoElement,
    canvas: HtmlCanvasElement,
    context: Rc<RefCell<Option<CanvasRenderingContext2d>>>,
    focus_ring: HtmlElement,
    focus_ms: u32,
}

impl WebVideoSurface {
    pub fn new(video: HtmlVideoElement, canvas: HtmlCanvasElement, focus_ring: HtmlElement, focus_ms: u32) -> Self {
        Self {
            video,
            canvas,
            context: Rc::new(RefCell::new(None)),
            focus_ring,
            focus_ms,
        }
    }

    /// 2D context created once with `willReadFrequently`, since every frame
    /// is read back.
    fn context(&self) -> Option<CanvasRenderingContext2d> {
        if let Some(ctx) = self.context.borrow().as_ref() {
            return Some(ctx.clone());
        }
        let options = Object::new();
        Reflect::set(&options, &JsValue::from_str("willReadFrequently"), &JsValue::TRUE).ok()?;
        let ctx = self
            .canvas
            .get_context_with_context_options("2d", &options)
            .ok()??
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        *self.context.borrow_mut() = Some(ctx.clone());
        Some(ctx)
    }

    /// Resolves on `loadedmetadata`, fails on the element's `error` event.
    async fn wait_for_metadata(&self) -> Result<(), VideoReadyError> {
        if self.video.ready_state() >= HAVE_METADATA {
            return Ok(());
        }

        let (tx, rx) = oneshot::channel::<Result<(), VideoReadyError>>();
        let slot = Rc::new(RefCell::new(Some(tx)));

        let on_loaded = {
            let slot = slot.clone();
            Closure::wrap(Box::new(move |_e: Event| {
                if let Some(tx) = slot.borrow_mut().take() {
                    let _ = tx.send(Ok(()));
                }
            }) as Box<dyn FnMut(Event)>)
        };
        let on_error = {
            let slot = slot.clone();
            Closure::wrap(Box::new(move |e: Event| {
                if let Some(tx) = slot.borrow_mut().take() {
                    let _ = tx.send(Err(VideoReadyError::Element(format!("{} event on video", e.type_()))));
                }
            }) as Box<dyn FnMut(Event)>)
        };
        self.video.set_onloadedmetadata(Some(on_loaded.as_ref().unchecked_ref()));
        self.video.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        let result = rx
            .await
            .unwrap_or_else(|_| Err(VideoReadyError::Element("video listener dropped".to_string())));
        self.clear_handlers();
        result
    }

    fn clear_handlers(&self) {
        self.video.set_onloadedmetadata(None);
        self.video.set_onerror(None);
    }

    async fn wait_until_playing(&self) -> Result<(), VideoReadyError> {
        self.wait_for_metadata().await?;
        let promise = self.video.play().map_err(|e| {
            log::warn!("⚠️ [CAMERA] play() threw: {}", js_error_text(&e));
            VideoReadyError::Timeout
        })?;
        JsFuture::from(promise).await.map_err(|e| {
            log::warn!("⚠️ [CAMERA] play() rejected: {}", js_error_text(&e));
            VideoReadyError::Timeout
        })?;
        Ok(())
    }
}

impl VideoSurface for WebVideoSurface {
    type Stream = WebMediaStream;

    async fn attach(&mut self, stream: &WebMediaStream, timeout_ms: u32) -> Result<(), VideoReadyError> {
        self.video.set_src_object(Some(&stream.stream));
        let ready = Box::pin(self.wait_until_playing());
        let timeout = Box::pin(TimeoutFuture::new(timeout_ms));
        match select(ready, timeout).await {
            Either::Left((result, _)) => result,
            Either::Right(_) => {
                self.clear_handlers();
                Err(VideoReadyError::Timeout)
            }
        }
    }

    fn detach(&mut self) {
        self.clear_handlers();
        let _ = self.video.pause();
        self.video.set_src_object(None);
    }

    fn capture_frame(&mut self) -> Option<Frame> {
        if self.video.ready_state() < HAVE_ENOUGH_DATA {
            return None;
        }
        let (width, height) = (self.video.video_width(), self.video.video_height());
        if width == 0 || height == 0 {
            return None;
        }
        if self.canvas.width() != width || self.canvas.height() != height {
            self.canvas.set_width(width);
            self.canvas.set_height(height);
        }

        let ctx = self.context()?;
        ctx.draw_image_with_html_video_element(&self.video, 0.0, 0.0).ok()?;
        let image = ctx
            .get_image_data(0.0, 0.0, width as f64, height as f64)
            .ok()?;
        Some(Frame {
            rgba: image.data().0,
            width,
            height,
        })
    }

    fn set_scale(&mut self, level: f64) {
        let style = self.video.style();
        let result = if (level - 1.0).abs() < f64::EPSILON {
            style.remove_property("transform").map(|_| ())
        } else {
            style.set_property("transform", &format!("scale({})", level))
        };
        if let Err(e) = result {
            log::warn!("⚠️ [ZOOM] Could not set video transform: {}", js_error_text(&e));
        }
    }

    fn viewport(&self) -> ViewportRect {
        let rect = self.video.get_bounding_client_rect();
        ViewportRect {
            left: rect.left(),
            top: rect.top(),
            width: rect.width(),
            height: rect.height(),
        }
    }

    fn show_focus_indicator(&mut self, client_x: f64, client_y: f64) {
        // The ring lives in the camera container, which the video fills.
        let rect = self.viewport();
        let style = self.focus_ring.style();
        let _ = style.set_property("left", &format!("{}px", client_x - rect.left));
        let _ = style.set_property("top", &format!("{}px", client_y - rect.top));
        let _ = self.focus_ring.class_list().add_1("active");

        let ring = self.focus_ring.clone();
        Timeout::new(self.focus_ms, move || {
            let _ = ring.class_list().remove_1("active");
        })
        .forget();
    }
}
