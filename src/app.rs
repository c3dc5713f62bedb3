// ============================================================================
// APP - browser driver of the TV scanner modal
// ============================================================================
// Owns the controller behind Rc<RefCell<..>> and turns DOM events, animation
// frames and finished futures into controller calls. A borrow is never held
// across an await: jobs are taken out under a short borrow, awaited, then
// committed under a fresh one.
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{KeyboardEvent, MouseEvent, PointerEvent};

use crate::camera::web::{WebMediaDevices, WebVideoSurface};
use crate::config::CONFIG;
use crate::dom::{append_child, body, on_click, on_event, DocumentListener};
use crate::models::TvKind;
use crate::scanner::web::AnimationFrameScheduler;
use crate::scanner::RqrrDecoder;
use crate::services::ApiClient;
use crate::utils::BuiltinTexts;
use crate::viewmodels::{ModalController, ScannerParts, ScannerPlatform, SubmitTicket};
use crate::views::{render_scanner_modal, ScannerElements, WebScannerView};

pub struct WebPlatform;

impl ScannerPlatform for WebPlatform {
    type Devices = WebMediaDevices;
    type Surface = WebVideoSurface;
    type Scheduler = AnimationFrameScheduler;
    type Decoder = RqrrDecoder;
    type Transport = ApiClient;
    type View = WebScannerView;
}

type Controller = Rc<RefCell<ModalController<WebPlatform>>>;

/// Cheap handle shared by every listener.
#[derive(Clone)]
pub struct ScannerApp {
    controller: Controller,
    api: ApiClient,
    escape: Rc<RefCell<Option<DocumentListener<KeyboardEvent>>>>,
}

impl ScannerApp {
    /// Renders the (hidden) modal into `<body>` and wires its events.
    pub fn new() -> Result<Self, JsValue> {
        let elements = render_scanner_modal()?;
        append_child(&body()?, &elements.root)?;

        let scheduler = AnimationFrameScheduler::new();
        let api = ApiClient::new();
        let parts = ScannerParts::<WebPlatform> {
            devices: WebMediaDevices::detect(),
            surface: WebVideoSurface::new(
                elements.video.clone(),
                elements.canvas.clone(),
                elements.focus_ring.clone(),
                CONFIG.focus_indicator_ms,
            ),
            scheduler: scheduler.clone(),
            decoder: RqrrDecoder,
            transport: api.clone(),
            view: WebScannerView::new(elements.clone()),
        };
        let controller = ModalController::new(parts, Box::new(BuiltinTexts::default()), &CONFIG);

        let app = Self {
            controller: Rc::new(RefCell::new(controller)),
            api,
            escape: Rc::new(RefCell::new(None)),
        };

        {
            let app = app.clone();
            scheduler.set_callback(move || app.on_frame());
        }
        app.wire(&elements)?;
        log::info!("📺 [MODAL] TV scanner ready");
        Ok(app)
    }

    fn wire(&self, elements: &ScannerElements) -> Result<(), JsValue> {
        {
            let app = self.clone();
            on_click(&elements.close_button, move |_e: MouseEvent| app.close())?;
        }
        {
            let app = self.clone();
            on_click(&elements.backdrop, move |_e: MouseEvent| app.close())?;
        }
        {
            let app = self.clone();
            let input = elements.zoom_input.clone();
            on_event(&elements.zoom_input, "input", move |_e: web_sys::Event| {
                match input.value().parse::<f64>() {
                    Ok(level) => app.zoom(level),
                    Err(_) => log::debug!("🔍 [ZOOM] Ignoring non-numeric slider value"),
                }
            })?;
        }
        {
            let app = self.clone();
            on_event(&elements.camera, "pointerdown", move |e: PointerEvent| {
                app.tap(e.client_x() as f64, e.client_y() as f64)
            })?;
        }
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.controller.borrow().is_open()
    }

    pub fn open(&self, kind: TvKind, subscription_link: Option<String>, base_path: Option<String>) {
        let pending = {
            let mut controller = self.controller.borrow_mut();
            controller.set_subscription_link(subscription_link);
            let was_open = controller.is_open();
            let pending = controller.show(kind);
            if !controller.is_open() {
                return;
            }
            if !was_open {
                self.api.set_base_path(base_path.as_deref());
            }
            pending
        };
        self.install_escape();

        if let Some(pending) = pending {
            let controller = self.controller.clone();
            spawn_local(async move {
                let outcome = pending.run().await;
                controller.borrow_mut().finish_start(outcome);
            });
        }
    }

    pub fn close(&self) {
        self.controller.borrow_mut().hide();
        self.escape.borrow_mut().take();
    }

    fn install_escape(&self) {
        if self.escape.borrow().is_some() {
            return;
        }
        let app = self.clone();
        let listener = DocumentListener::add("keydown", move |e: KeyboardEvent| {
            if e.key() == "Escape" {
                // Closing drops this listener; do it outside its own callback.
                let app = app.clone();
                spawn_local(async move { app.close() });
            }
        });
        match listener {
            Ok(listener) => *self.escape.borrow_mut() = Some(listener),
            Err(e) => log::warn!("⚠️ [MODAL] Escape key listener not installed: {:?}", e),
        }
    }

    fn on_frame(&self) {
        let ticket = self.controller.borrow_mut().on_frame();
        if let Some(ticket) = ticket {
            self.submit(ticket);
        }
    }

    fn submit(&self, ticket: SubmitTicket<ApiClient>) {
        let app = self.clone();
        spawn_local(async move {
            let done = ticket.run().await;
            let close = app.controller.borrow_mut().finish_submit(done);
            if close {
                let generation = app.controller.borrow().generation();
                Timeout::new(CONFIG.success_close_delay_ms, move || {
                    app.controller.borrow_mut().close_if_current(generation);
                    if !app.is_open() {
                        app.escape.borrow_mut().take();
                    }
                })
                .forget();
            }
        });
    }

    fn zoom(&self, level: f64) {
        let job = self.controller.borrow().zoom_job(level);
        if let Some(job) = job {
            let controller = self.controller.clone();
            spawn_local(async move {
                let done = job.run().await;
                controller.borrow_mut().finish_zoom(done);
            });
        }
    }

    fn tap(&self, client_x: f64, client_y: f64) {
        let job = self.controller.borrow_mut().handle_tap(client_x, client_y);
        if let Some(job) = job {
            spawn_local(job.run());
        }
    }
}
