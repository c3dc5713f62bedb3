// ============================================================================
// HAPP TV CONNECT - QR-to-TV pairing scanner (Rust + WASM)
// ============================================================================
// Layers:
// - models:     shared data + error taxonomy
// - camera:     session, zoom, focus (traits + web bindings)
// - scanner:    scan loop, QR decode, payload parsing
// - services:   pairing request + HTTP client
// - viewmodels: modal lifecycle
// - views/dom:  modal DOM (wasm only)
// - app:        browser driver (wasm only)
// ============================================================================

pub mod camera;
pub mod config;
pub mod models;
pub mod scanner;
pub mod services;
pub mod utils;
pub mod viewmodels;

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod views;

#[cfg(test)]
mod testing;

#[cfg(target_arch = "wasm32")]
pub use web_entry::*;

#[cfg(target_arch = "wasm32")]
mod web_entry {
    use std::cell::RefCell;

    use wasm_bindgen::prelude::*;
    use wasm_logger::Config;

    use crate::app::ScannerApp;
    use crate::config::CONFIG;
    use crate::models::TvKind;

    // The modal is created on first open and lives for the page.
    thread_local! {
        static APP: RefCell<Option<ScannerApp>> = RefCell::new(None);
    }

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();

        let level = if CONFIG.is_logging_enabled() {
            log::Level::Debug
        } else {
            log::Level::Warn
        };
        wasm_logger::init(Config::new(level));
        log::info!("🚀 [APP] TV connect scanner loaded (base path {})", CONFIG.base_path);
        Ok(())
    }

    fn app() -> Result<ScannerApp, JsValue> {
        APP.with(|cell| {
            if let Some(app) = cell.borrow().as_ref() {
                return Ok(app.clone());
            }
            let app = ScannerApp::new()?;
            *cell.borrow_mut() = Some(app.clone());
            Ok(app)
        })
    }

    /// Opens the scanner. `kind` is `"androidtv"` or `"appletv"`.
    #[wasm_bindgen]
    pub fn open_tv_scanner(
        kind: &str,
        subscription_link: Option<String>,
        base_path: Option<String>,
    ) -> Result<(), JsValue> {
        let app = app()?;
        app.open(TvKind::parse(kind), subscription_link, base_path);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn close_tv_scanner() {
        let app = APP.with(|cell| cell.borrow().clone());
        if let Some(app) = app {
            app.close();
        }
    }

    #[wasm_bindgen]
    pub fn is_tv_scanner_open() -> bool {
        APP.with(|cell| cell.borrow().as_ref().map(|app| app.is_open()).unwrap_or(false))
    }
}
