pub mod scanner_viewmodel;

pub use scanner_viewmodel::{
    ModalController, ModalState, ScanPhase, ScannerParts, ScannerPlatform, ScannerView, StatusKind,
    SubmitDone, SubmitTicket, ZoomControl,
};
