// ============================================================================
// SCANNER VIEW - "connect a TV" modal DOM
// ============================================================================
// Rendered once and toggled with the `active` class. The controller only
// talks to it through `ScannerView`.
// ============================================================================

use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlCanvasElement, HtmlElement, HtmlInputElement, HtmlVideoElement};

use crate::dom::{add_class, append_child, remove_class, set_class_name, set_text_content, ElementBuilder};
use crate::viewmodels::{ScannerView, StatusKind, ZoomControl};

/// Handles the driver wires events to.
#[derive(Clone)]
pub struct ScannerElements {
    pub root: Element,
    pub backdrop: Element,
    pub close_button: Element,
    pub title: Element,
    pub instructions: Element,
    pub status: Element,
    pub camera: Element,
    pub video: HtmlVideoElement,
    pub canvas: HtmlCanvasElement,
    pub focus_ring: HtmlElement,
    pub zoom_wrap: Element,
    pub zoom_input: HtmlInputElement,
    pub zoom_value: Element,
}

pub fn render_scanner_modal() -> Result<ScannerElements, JsValue> {
    let root = ElementBuilder::new("div")?
        .id("tv-scanner-modal")?
        .class("tv-scanner-modal")
        .attr("role", "dialog")?
        .attr("aria-modal", "true")?
        .build();

    let backdrop = ElementBuilder::new("div")?
        .class("tv-scanner-backdrop")
        .build();

    let title = ElementBuilder::new("h2")?
        .class("tv-scanner-title")
        .build();

    let close_button = ElementBuilder::new("button")?
        .class("tv-scanner-close")
        .attr("type", "button")?
        .attr("aria-label", "Close")?
        .text("✕")
        .build();

    let header = ElementBuilder::new("div")?
        .class("tv-scanner-header")
        .child(&title)?
        .child(&close_button)?
        .build();

    // playsinline + muted: iOS refuses inline autoplay otherwise.
    let video: HtmlVideoElement = ElementBuilder::new("video")?
        .class("tv-scanner-video")
        .attr("playsinline", "")?
        .attr("muted", "")?
        .attr("autoplay", "")?
        .build_as()?;
    video.set_muted(true);

    let canvas: HtmlCanvasElement = ElementBuilder::new("canvas")?
        .class("tv-scanner-canvas")
        .attr("hidden", "")?
        .build_as()?;

    let focus_ring: HtmlElement = ElementBuilder::new("div")?
        .class("tv-scanner-focus")
        .build_as()?;

    let camera = ElementBuilder::new("div")?
        .class("tv-scanner-camera")
        .build();
    append_child(&camera, &video)?;
    append_child(&camera, &canvas)?;
    append_child(&camera, &focus_ring)?;

    let zoom_input: HtmlInputElement = ElementBuilder::new("input")?
        .class("tv-scanner-zoom-input")
        .attr("type", "range")?
        .attr("step", "0.1")?
        .build_as()?;
    let zoom_value = ElementBuilder::new("span")?
        .class("tv-scanner-zoom-value")
        .text("1.0x")
        .build();
    let zoom_wrap = ElementBuilder::new("div")?
        .class("tv-scanner-zoom hidden")
        .child(&zoom_input)?
        .child(&zoom_value)?
        .build();

    let instructions = ElementBuilder::new("p")?
        .class("tv-scanner-instructions")
        .build();

    let status = ElementBuilder::new("div")?
        .class("tv-scanner-status")
        .attr("aria-live", "polite")?
        .build();

    let content = ElementBuilder::new("div")?
        .class("tv-scanner-content")
        .child(&header)?
        .child(&camera)?
        .child(&zoom_wrap)?
        .child(&instructions)?
        .child(&status)?
        .build();

    append_child(&root, &backdrop)?;
    append_child(&root, &content)?;

    Ok(ScannerElements {
        root,
        backdrop,
        close_button,
        title,
        instructions,
        status,
        camera,
        video,
        canvas,
        focus_ring,
        zoom_wrap,
        zoom_input,
        zoom_value,
    })
}

fn status_class(kind: StatusKind) -> &'static str {
    match kind {
        StatusKind::Info => "tv-scanner-status info",
        StatusKind::Success => "tv-scanner-status success",
        StatusKind::Error => "tv-scanner-status error",
    }
}

pub struct WebScannerView {
    elements: ScannerElements,
}

impl WebScannerView {
    pub fn new(elements: ScannerElements) -> Self {
        Self { elements }
    }
}

impl ScannerView for WebScannerView {
    fn open(&mut self, title: &str, instructions: &str) {
        set_text_content(&self.elements.title, title);
        set_text_content(&self.elements.instructions, instructions);
        set_text_content(&self.elements.status, "");
        if let Err(e) = add_class(&self.elements.root, "active") {
            log::error!("❌ [MODAL] Could not show modal: {:?}", e);
        }
    }

    fn close(&mut self) {
        set_text_content(&self.elements.status, "");
        if let Err(e) = remove_class(&self.elements.root, "active") {
            log::error!("❌ [MODAL] Could not hide modal: {:?}", e);
        }
    }

    fn set_status(&mut self, text: &str, kind: StatusKind) {
        set_text_content(&self.elements.status, text);
        set_class_name(&self.elements.status, status_class(kind));
    }

    fn configure_zoom(&mut self, control: Option<ZoomControl>) {
        let result = match control {
            None => add_class(&self.elements.zoom_wrap, "hidden"),
            Some(control) => {
                let input = &self.elements.zoom_input;
                input.set_min(&control.min.to_string());
                input.set_max(&control.max.to_string());
                input.set_value(&control.value.to_string());
                set_text_content(&self.elements.zoom_value, &format!("{:.1}x", control.value));
                remove_class(&self.elements.zoom_wrap, "hidden")
            }
        };
        if let Err(e) = result {
            log::warn!("⚠️ [ZOOM] Could not update zoom control: {:?}", e);
        }
    }

    fn set_zoom_readout(&mut self, level: f64) {
        set_text_content(&self.elements.zoom_value, &format!("{:.1}x", level));
    }
}
