// ============================================================================
// SCANNER VIEWMODEL - lifecycle of the "connect a TV" modal
// ============================================================================
// Hidden -> Showing(Starting) -> Showing(Scanning) -> Showing(Detected) -> Hidden
// Cancel (close button, backdrop, Escape) hides from any Showing state and
// always stops the camera first.
//
// Nothing here awaits while holding `&mut self`: async work is handed out as
// jobs (PendingStart, ZoomJob, FocusJob, SubmitTicket) and committed back
// through the matching finish_* method, which drops stale results.
// ============================================================================

use crate::camera::{
    Activation, CameraSession, FocusJob, MediaDevices, PendingStart, StartOutcome, TrackOf, VideoSurface,
    ZoomController, ZoomJob, ZoomJobDone,
};
use crate::config::ScannerConfig;
use crate::models::{CameraError, PairingCode, SubmitError, TvKind, ZoomMode, ZoomState};
use crate::scanner::{self, FrameScheduler, QrDecoder};
use crate::services::{PairingSubmitter, PairingTransport};
use crate::utils::i18n::TextSource;

/// Everything the modal needs from the host, as one bundle of types.
pub trait ScannerPlatform {
    type Devices: MediaDevices;
    type Surface: VideoSurface<Stream = <Self::Devices as MediaDevices>::Stream>;
    type Scheduler: FrameScheduler;
    type Decoder: QrDecoder;
    type Transport: PairingTransport;
    type View: ScannerView;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// Range input shown under the video.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomControl {
    pub min: f64,
    pub max: f64,
    pub value: f64,
}

impl ZoomControl {
    pub fn from_state(state: &ZoomState) -> Option<Self> {
        match (state.mode, state.bounds) {
            (ZoomMode::Unsupported, _) | (_, None) => None,
            (_, Some(bounds)) => Some(Self {
                min: bounds.min,
                max: bounds.max,
                value: state.current_level,
            }),
        }
    }
}

/// Modal DOM as seen by the controller.
pub trait ScannerView {
    fn open(&mut self, title: &str, instructions: &str);
    fn close(&mut self);
    fn set_status(&mut self, text: &str, kind: StatusKind);
    /// `None` hides the zoom control.
    fn configure_zoom(&mut self, control: Option<ZoomControl>);
    fn set_zoom_readout(&mut self, level: f64);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Starting,
    Scanning,
    Detected,
    CameraFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalState {
    Hidden,
    Showing(ScanPhase),
}

/// Host handles the controller is built from.
pub struct ScannerParts<P: ScannerPlatform> {
    pub devices: P::Devices,
    pub surface: P::Surface,
    pub scheduler: P::Scheduler,
    pub decoder: P::Decoder,
    pub transport: P::Transport,
    pub view: P::View,
}

/// Pairing request for one detected code, run off-borrow.
pub struct SubmitTicket<T> {
    generation: u64,
    submitter: PairingSubmitter<T>,
    code: PairingCode,
    link: Option<String>,
}

pub struct SubmitDone {
    generation: u64,
    result: Result<(), SubmitError>,
}

impl<T: PairingTransport> SubmitTicket<T> {
    pub fn code(&self) -> &PairingCode {
        &self.code
    }

    pub async fn run(self) -> SubmitDone {
        let result = self.submitter.submit(&self.code, self.link.as_deref()).await;
        SubmitDone {
            generation: self.generation,
            result,
        }
    }
}

type Session<P> = CameraSession<
    <P as ScannerPlatform>::Devices,
    <P as ScannerPlatform>::Surface,
    <P as ScannerPlatform>::Scheduler,
>;

pub struct ModalController<P: ScannerPlatform> {
    session: Session<P>,
    decoder: P::Decoder,
    submitter: PairingSubmitter<P::Transport>,
    view: P::View,
    texts: Box<dyn TextSource>,
    state: ModalState,
    kind: TvKind,
    subscription_link: Option<String>,
    generation: u64,
}

impl<P: ScannerPlatform> ModalController<P> {
    pub fn new(parts: ScannerParts<P>, texts: Box<dyn TextSource>, config: &ScannerConfig) -> Self {
        let (zoom_min, zoom_max) = config.zoom_limits();
        let session = CameraSession::new(
            parts.devices,
            parts.surface,
            parts.scheduler,
            ZoomController::new(zoom_min, zoom_max),
            config.video_ready_timeout_ms,
        );
        Self {
            session,
            decoder: parts.decoder,
            submitter: PairingSubmitter::new(parts.transport),
            view: parts.view,
            texts,
            state: ModalState::Hidden,
            kind: TvKind::default(),
            subscription_link: None,
            generation: 0,
        }
    }

    pub fn state(&self) -> ModalState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != ModalState::Hidden
    }

    pub fn kind(&self) -> TvKind {
        self.kind
    }

    /// Bumped on every show and hide.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn session(&self) -> &Session<P> {
        &self.session
    }

    /// The page owns the link; it may change while the modal is open.
    pub fn set_subscription_link(&mut self, link: Option<String>) {
        self.subscription_link = link.filter(|l| !l.is_empty());
    }

    fn text(&self, key: &str, default: &str) -> String {
        self.texts.text_or(key, default)
    }

    fn status(&mut self, key: &str, default: &str, kind: StatusKind) {
        let text = self.text(key, default);
        self.view.set_status(&text, kind);
    }

    /// Opens the modal and hands out the camera start. Ignored while open.
    pub fn show(&mut self, kind: TvKind) -> Option<PendingStart<P::Devices, P::Surface>> {
        if self.is_open() {
            log::debug!("📺 [MODAL] Already open, ignoring show");
            return None;
        }

        self.kind = kind;
        self.generation += 1;
        self.state = ModalState::Showing(ScanPhase::Starting);

        let title = self.text(kind.title_key(), kind.default_title());
        let instructions = self.text("tv_camera_instructions", "Point camera at QR code from TV");
        self.view.open(&title, &instructions);
        self.view.configure_zoom(None);
        self.status("camera_starting", "Starting camera...", StatusKind::Info);
        log::info!("📺 [MODAL] Opened for {:?}", kind);

        match self.session.prepare_start() {
            Ok(pending) => Some(pending),
            Err(e) => {
                self.camera_failed(&e);
                None
            }
        }
    }

    /// Commits the camera start. Starts scanning on success.
    pub fn finish_start(&mut self, outcome: StartOutcome<<P::Devices as MediaDevices>::Stream>) {
        match self.session.activate(outcome) {
            Activation::Active(zoom) => {
                self.state = ModalState::Showing(ScanPhase::Scanning);
                self.view.configure_zoom(ZoomControl::from_state(&zoom));
                self.status("tv_camera_instructions", "Point camera at QR code from TV", StatusKind::Info);
                self.session.start_scanning();
            }
            Activation::Failed(e) => self.camera_failed(&e),
            Activation::Stale => log::debug!("📺 [MODAL] Dropped a stale camera start"),
        }
    }

    fn camera_failed(&mut self, error: &CameraError) {
        log::error!("❌ [MODAL] Camera failed: {}", error);
        self.state = ModalState::Showing(ScanPhase::CameraFailed);
        self.view.configure_zoom(None);
        self.status(error.i18n_key(), error.default_message(), StatusKind::Error);
    }

    /// One animation frame. On detection the camera is released, the
    /// payload parsed, and the pairing request handed out.
    pub fn on_frame(&mut self) -> Option<SubmitTicket<P::Transport>> {
        if self.state != ModalState::Showing(ScanPhase::Scanning) {
            return None;
        }
        let payload = self.session.tick(&self.decoder)?;

        self.state = ModalState::Showing(ScanPhase::Detected);
        self.session.stop();
        self.view.configure_zoom(None);
        self.status("qr_detected", "QR detected", StatusKind::Success);

        match scanner::extract(&payload) {
            Ok(code) => {
                log::info!("🔑 [MODAL] Pairing code {} ({:?})", code.value, code.source);
                self.status("sending_to_tv", "Sending to TV...", StatusKind::Info);
                Some(SubmitTicket {
                    generation: self.generation,
                    submitter: self.submitter.clone(),
                    code,
                    link: self.subscription_link.clone(),
                })
            }
            Err(e) => {
                log::warn!("⚠️ [MODAL] QR not usable: {} ({:?})", e, e.detail());
                self.status(e.i18n_key(), e.default_message(), StatusKind::Error);
                None
            }
        }
    }

    /// Shows the submit result. `true` means the modal should close after
    /// the success delay (see `close_if_current`).
    pub fn finish_submit(&mut self, done: SubmitDone) -> bool {
        if done.generation != self.generation || self.state != ModalState::Showing(ScanPhase::Detected) {
            log::debug!("📺 [MODAL] Dropped a stale submit result");
            return false;
        }
        match done.result {
            Ok(()) => {
                self.status("subscription_sent_success", "Subscription sent to TV!", StatusKind::Success);
                true
            }
            Err(SubmitError::NoLink) => {
                self.status("no_subscription_link", "No subscription link", StatusKind::Error);
                false
            }
            Err(SubmitError::Remote { message }) => {
                let base = self.text("tv_send_error", "Failed to send subscription");
                let text = match message {
                    Some(message) => format!("{}: {}", base, message),
                    None => base,
                };
                self.view.set_status(&text, StatusKind::Error);
                false
            }
        }
    }

    /// Delayed close after success; a no-op if the modal was reopened meanwhile.
    pub fn close_if_current(&mut self, generation: u64) {
        if generation == self.generation {
            self.hide();
        }
    }

    /// Cancel from any state. Stops the camera before hiding.
    pub fn hide(&mut self) {
        if !self.is_open() {
            return;
        }
        self.session.stop();
        self.view.configure_zoom(None);
        self.view.close();
        self.state = ModalState::Hidden;
        self.generation += 1;
        log::info!("📺 [MODAL] Closed");
    }

    pub fn zoom_job(&self, level: f64) -> Option<ZoomJob<TrackOf<P::Devices>, P::Surface>> {
        if self.state != ModalState::Showing(ScanPhase::Scanning) || !self.session.is_active() {
            return None;
        }
        Some(self.session.zoom_job(level))
    }

    pub fn finish_zoom(&mut self, done: ZoomJobDone) {
        match self.session.commit_zoom(done) {
            Some(Ok(applied)) => self.view.set_zoom_readout(applied.level),
            Some(Err(e)) => log::debug!("🔍 [ZOOM] Ignored: {}", e),
            None => {}
        }
    }

    pub fn handle_tap(&mut self, client_x: f64, client_y: f64) -> Option<FocusJob<TrackOf<P::Devices>>> {
        if self.state != ModalState::Showing(ScanPhase::Scanning) {
            return None;
        }
        self.session.handle_tap(client_x, client_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ConstraintTier, Frame, NumericRange, TrackCapabilities, TrackConstraint, TransportError, TvPairResponse,
        VideoReadyError, ViewportRect,
    };
    use crate::scanner::ScanState;
    use crate::testing::{
        EmptyTexts, FakeDevices, FakePlatform, FakeSurface, FakeTransport, ManualScheduler, RecordingView,
        ScriptedDecoder,
    };
    use crate::utils::i18n::BuiltinTexts;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;

    struct Harness {
        devices: FakeDevices,
        surface: FakeSurface,
        scheduler: ManualScheduler,
        decoder: ScriptedDecoder,
        transport: FakeTransport,
        view: RecordingView,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                devices: FakeDevices::new(),
                surface: FakeSurface::new(),
                scheduler: ManualScheduler::new(),
                decoder: ScriptedDecoder::new(vec![]),
                transport: FakeTransport::new(vec![]),
                view: RecordingView::new(),
            }
        }

        fn controller_with(&self, texts: Box<dyn TextSource>) -> ModalController<FakePlatform> {
            let parts = ScannerParts::<FakePlatform> {
                devices: self.devices.clone(),
                surface: self.surface.clone(),
                scheduler: self.scheduler.clone(),
                decoder: self.decoder.clone(),
                transport: self.transport.clone(),
                view: self.view.clone(),
            };
            ModalController::new(parts, texts, &ScannerConfig::default())
        }

        fn controller(&self) -> ModalController<FakePlatform> {
            self.controller_with(Box::new(BuiltinTexts::new("en")))
        }

        fn frames(&self, n: usize) {
            self.surface.push_frames(n, Frame { rgba: vec![0; 4], width: 1, height: 1 });
        }
    }

    async fn open(ctrl: &mut ModalController<FakePlatform>) {
        let pending = ctrl.show(TvKind::AndroidTv).expect("camera start");
        let outcome = pending.run().await;
        ctrl.finish_start(outcome);
    }

    fn success() -> Result<TvPairResponse, TransportError> {
        Ok(serde_json::from_str(r#"{"success": true}"#).unwrap())
    }

    #[tokio::test]
    async fn full_flow_detect_extract_submit_close() {
        let h = Harness::new();
        h.decoder.push(Ok(None));
        h.decoder.push(Ok(Some("call 54321 now".into())));
        h.transport.push(success());
        h.frames(2);
        let mut ctrl = h.controller();
        ctrl.set_subscription_link(Some("https://sub.example/abc".into()));

        open(&mut ctrl).await;
        assert_eq!(ctrl.state(), ModalState::Showing(ScanPhase::Scanning));
        assert_eq!(h.view.title(), "Android TV Connection");
        assert_eq!(h.scheduler.requested(), 1);

        assert!(ctrl.on_frame().is_none());
        let ticket = ctrl.on_frame().expect("submit ticket");
        assert_eq!(ticket.code().as_str(), "54321");
        assert_eq!(ctrl.state(), ModalState::Showing(ScanPhase::Detected));
        // Camera released before the network call.
        assert!(!ctrl.session().is_active());
        assert!(h.devices.issued()[0].is_stopped());

        let done = ticket.run().await;
        assert!(ctrl.finish_submit(done));
        assert_eq!(
            h.view.last_status(),
            Some(("Subscription sent to TV!".to_string(), StatusKind::Success))
        );
        assert_eq!(h.transport.requests()[0].data, STANDARD.encode("https://sub.example/abc"));

        let generation = ctrl.generation();
        ctrl.close_if_current(generation);
        assert_eq!(ctrl.state(), ModalState::Hidden);
        assert!(!h.view.is_open());
    }

    #[tokio::test]
    async fn apple_tv_uses_its_own_title() {
        let h = Harness::new();
        let mut ctrl = h.controller();
        ctrl.show(TvKind::AppleTv);
        assert_eq!(h.view.title(), "Apple TV Connection");
        assert_eq!(h.view.instructions(), "Point camera at QR code from TV");
        assert_eq!(h.view.last_status(), Some(("Starting camera...".to_string(), StatusKind::Info)));
    }

    #[tokio::test]
    async fn call_site_defaults_when_no_translation() {
        let h = Harness::new();
        let mut ctrl = h.controller_with(Box::new(EmptyTexts));
        ctrl.show(TvKind::AndroidTv);
        assert_eq!(h.view.title(), "Android TV Connection");
    }

    #[tokio::test]
    async fn unsupported_camera_keeps_modal_open_with_error() {
        let mut h = Harness::new();
        h.devices = FakeDevices::unsupported();
        let mut ctrl = h.controller();

        assert!(ctrl.show(TvKind::AndroidTv).is_none());
        assert_eq!(ctrl.state(), ModalState::Showing(ScanPhase::CameraFailed));
        assert!(h.view.is_open());
        assert_eq!(
            h.view.last_status(),
            Some(("Camera is not supported on this device".to_string(), StatusKind::Error))
        );
        assert_eq!(h.scheduler.requested(), 0);
        assert!(ctrl.on_frame().is_none());
    }

    #[tokio::test]
    async fn acquisition_failure_never_starts_the_loop() {
        let mut h = Harness::new();
        h.devices = FakeDevices::new().failing_first(ConstraintTier::ALL.len());
        let mut ctrl = h.controller();

        open(&mut ctrl).await;
        assert_eq!(ctrl.state(), ModalState::Showing(ScanPhase::CameraFailed));
        assert_eq!(
            h.view.last_status(),
            Some(("Could not access camera".to_string(), StatusKind::Error))
        );
        assert_eq!(h.scheduler.requested(), 0);
    }

    #[tokio::test]
    async fn video_timeout_is_reported_and_camera_released() {
        let h = Harness::new();
        h.surface.fail_attach(VideoReadyError::Timeout);
        let mut ctrl = h.controller();

        open(&mut ctrl).await;
        assert_eq!(
            h.view.last_status(),
            Some(("Camera did not start in time".to_string(), StatusKind::Error))
        );
        assert!(h.devices.issued()[0].is_stopped());
    }

    #[tokio::test]
    async fn cancel_during_start_releases_late_stream() {
        let h = Harness::new();
        let mut ctrl = h.controller();

        let pending = ctrl.show(TvKind::AndroidTv).unwrap();
        ctrl.hide();
        let outcome = pending.run().await;
        ctrl.finish_start(outcome);

        assert_eq!(ctrl.state(), ModalState::Hidden);
        assert!(h.devices.issued()[0].is_stopped());
        assert!(!ctrl.session().is_active());
        assert_eq!(h.scheduler.requested(), 0);
    }

    #[tokio::test]
    async fn cancel_while_scanning_stops_camera_and_tick() {
        let h = Harness::new();
        let mut ctrl = h.controller();
        open(&mut ctrl).await;
        let tick = h.scheduler.last_handle().unwrap();

        ctrl.hide();
        assert_eq!(ctrl.state(), ModalState::Hidden);
        assert_eq!(h.scheduler.cancelled(), vec![tick]);
        assert!(h.devices.issued()[0].is_stopped());
        assert_eq!(ctrl.session().scan_state(), ScanState::Idle);
        assert_eq!(h.view.closes(), 1);

        ctrl.hide();
        assert_eq!(h.view.closes(), 1);
    }

    #[tokio::test]
    async fn reopening_starts_from_clean_zoom() {
        let mut h = Harness::new();
        h.devices = FakeDevices::new().with_capabilities(TrackCapabilities {
            zoom: Some(NumericRange { min: Some(1.0), max: Some(2.0), step: None }),
            ..Default::default()
        });
        let mut ctrl = h.controller();
        open(&mut ctrl).await;
        let done = ctrl.zoom_job(1.5).unwrap().run().await;
        ctrl.finish_zoom(done);
        assert_eq!(ctrl.session().zoom_state().current_level, 1.5);
        ctrl.hide();

        open(&mut ctrl).await;
        assert_eq!(ctrl.session().zoom_state().current_level, 1.0);
        assert_eq!(
            h.view.zoom_control(),
            Some(ZoomControl { min: 1.0, max: 2.0, value: 1.0 })
        );
    }

    #[tokio::test]
    async fn software_zoom_shows_control_and_updates_readout() {
        let h = Harness::new();
        let mut ctrl = h.controller();
        open(&mut ctrl).await;
        assert_eq!(h.view.zoom_control(), Some(ZoomControl { min: 1.0, max: 3.0, value: 1.0 }));

        let done = ctrl.zoom_job(2.0).unwrap().run().await;
        ctrl.finish_zoom(done);
        assert_eq!(h.surface.scale(), 2.0);
        assert_eq!(h.view.readouts(), vec![2.0]);
    }

    #[tokio::test]
    async fn tap_focuses_only_while_scanning() {
        let mut h = Harness::new();
        h.devices = FakeDevices::new().with_capabilities(TrackCapabilities {
            focus_mode: vec!["continuous".into()],
            ..Default::default()
        });
        h.surface.set_viewport(ViewportRect { left: 0.0, top: 0.0, width: 100.0, height: 100.0 });
        let mut ctrl = h.controller();
        assert!(ctrl.handle_tap(50.0, 50.0).is_none());

        open(&mut ctrl).await;
        let job = ctrl.handle_tap(50.0, 50.0).expect("focus job");
        job.run().await;
        let track = h.devices.issued()[0].track().unwrap();
        assert!(matches!(track.applied()[0], TrackConstraint::Focus { .. }));
    }

    #[tokio::test]
    async fn malformed_payload_shows_generic_error_and_sends_nothing() {
        let h = Harness::new();
        h.decoder.push(Ok(Some("happ://send_to_device/%%%".into())));
        h.frames(1);
        let mut ctrl = h.controller();
        ctrl.set_subscription_link(Some("link".into()));
        open(&mut ctrl).await;

        assert!(ctrl.on_frame().is_none());
        assert_eq!(ctrl.state(), ModalState::Showing(ScanPhase::Detected));
        assert_eq!(
            h.view.last_status(),
            Some(("Unable to recognize QR code".to_string(), StatusKind::Error))
        );
        assert!(h.transport.requests().is_empty());
        assert!(!ctrl.session().is_active());
    }

    #[tokio::test]
    async fn payload_without_code_says_not_found() {
        let h = Harness::new();
        h.decoder.push(Ok(Some("hello".into())));
        h.frames(1);
        let mut ctrl = h.controller();
        open(&mut ctrl).await;

        assert!(ctrl.on_frame().is_none());
        assert_eq!(h.view.last_status(), Some(("Code not found".to_string(), StatusKind::Error)));
    }

    #[tokio::test]
    async fn missing_link_is_reported_without_request() {
        let h = Harness::new();
        h.decoder.push(Ok(Some("12345".into())));
        h.frames(1);
        let mut ctrl = h.controller();
        open(&mut ctrl).await;

        let done = ctrl.on_frame().unwrap().run().await;
        assert!(!ctrl.finish_submit(done));
        assert_eq!(h.view.last_status(), Some(("No subscription link".to_string(), StatusKind::Error)));
        assert!(h.transport.requests().is_empty());
        assert!(ctrl.is_open());
    }

    #[tokio::test]
    async fn remote_error_message_is_shown() {
        let h = Harness::new();
        h.decoder.push(Ok(Some("12345".into())));
        h.transport.push(Ok(serde_json::from_str(r#"{"success": false, "error": "TV offline"}"#).unwrap()));
        h.frames(1);
        let mut ctrl = h.controller();
        ctrl.set_subscription_link(Some("link".into()));
        open(&mut ctrl).await;

        let done = ctrl.on_frame().unwrap().run().await;
        assert!(!ctrl.finish_submit(done));
        assert_eq!(
            h.view.last_status(),
            Some(("Failed to send subscription: TV offline".to_string(), StatusKind::Error))
        );
    }

    #[tokio::test]
    async fn submit_result_after_cancel_is_dropped() {
        let h = Harness::new();
        h.decoder.push(Ok(Some("12345".into())));
        h.transport.push(success());
        h.frames(1);
        let mut ctrl = h.controller();
        ctrl.set_subscription_link(Some("link".into()));
        open(&mut ctrl).await;

        let ticket = ctrl.on_frame().unwrap();
        let generation = ctrl.generation();
        ctrl.hide();
        let done = ticket.run().await;
        assert!(!ctrl.finish_submit(done));

        // Reopened before the delayed close fired: stays open.
        open(&mut ctrl).await;
        ctrl.close_if_current(generation);
        assert!(ctrl.is_open());
    }

    #[tokio::test]
    async fn show_while_open_is_ignored() {
        let h = Harness::new();
        let mut ctrl = h.controller();
        open(&mut ctrl).await;
        assert!(ctrl.show(TvKind::AppleTv).is_none());
        assert_eq!(ctrl.kind(), TvKind::AndroidTv);
        assert_eq!(h.devices.attempts().len(), 1);
    }
}
