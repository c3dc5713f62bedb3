// QR scanning: frame loop, decode capability and payload parsing

pub mod decoder;
pub mod payload;
pub mod scan_loop;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use decoder::{QrDecoder, RqrrDecoder};
pub use payload::{extract, extract_str, DEVICE_PREFIX};
pub use scan_loop::{FrameHandle, FrameScheduler, ScanLoop, ScanState};
