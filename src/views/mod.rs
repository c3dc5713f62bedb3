pub mod scanner;

pub use scanner::{render_scanner_modal, ScannerElements, WebScannerView};
