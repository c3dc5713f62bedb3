// ============================================================================
// TEST FAKES - recording stand-ins for the browser collaborators
// ============================================================================
// Every fake is a cheap Rc handle: clone it into the code under test and keep
// one copy in the test to script behaviour and inspect what happened.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::camera::{MediaDevices, MediaStream, VideoSurface, VideoTrack};
use crate::models::{
    DecodeError, DeviceError, Frame, StreamRequest, TrackCapabilities, TrackConstraint, TrackError,
    TransportError, TvPairRequest, TvPairResponse, VideoReadyError, ViewportRect,
};
use crate::scanner::{FrameHandle, FrameScheduler, QrDecoder};
use crate::services::PairingTransport;
use crate::utils::i18n::TextSource;
use crate::viewmodels::{ScannerPlatform, ScannerView, StatusKind, ZoomControl};

// ----------------------------------------------------------------------------
// Camera
// ----------------------------------------------------------------------------

#[derive(Default)]
struct TrackInner {
    capabilities: TrackCapabilities,
    reject: bool,
    applied: Vec<TrackConstraint>,
    stopped: bool,
}

#[derive(Clone, Default)]
pub struct FakeTrack {
    inner: Rc<RefCell<TrackInner>>,
}

impl FakeTrack {
    pub fn with_capabilities(capabilities: TrackCapabilities) -> Self {
        let track = Self::default();
        track.inner.borrow_mut().capabilities = capabilities;
        track
    }

    pub fn reject_constraints(&self, reject: bool) {
        self.inner.borrow_mut().reject = reject;
    }

    /// Every constraint sent, rejected ones included.
    pub fn applied(&self) -> Vec<TrackConstraint> {
        self.inner.borrow().applied.clone()
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.borrow().stopped
    }
}

impl VideoTrack for FakeTrack {
    fn capabilities(&self) -> TrackCapabilities {
        self.inner.borrow().capabilities.clone()
    }

    async fn apply(&self, constraint: &TrackConstraint) -> Result<(), TrackError> {
        let mut inner = self.inner.borrow_mut();
        inner.applied.push(constraint.clone());
        if inner.reject {
            Err(TrackError("OverconstrainedError".to_string()))
        } else {
            Ok(())
        }
    }
}

#[derive(Clone)]
pub struct FakeStream {
    track: Option<FakeTrack>,
    stopped: Rc<Cell<bool>>,
}

impl FakeStream {
    pub fn track(&self) -> Option<FakeTrack> {
        self.track.clone()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.get()
    }
}

impl MediaStream for FakeStream {
    type Track = FakeTrack;

    fn video_track(&self) -> Option<FakeTrack> {
        self.track.clone()
    }

    fn stop_all(&self) {
        self.stopped.set(true);
        if let Some(track) = &self.track {
            track.inner.borrow_mut().stopped = true;
        }
    }
}

struct DevicesInner {
    supported: bool,
    fail_first: usize,
    capabilities: TrackCapabilities,
    attempts: Vec<StreamRequest>,
    issued: Vec<FakeStream>,
}

/// `getUserMedia` stand-in: rejects the first `n` requests, then hands out
/// streams with one video track.
#[derive(Clone)]
pub struct FakeDevices {
    inner: Rc<RefCell<DevicesInner>>,
}

impl FakeDevices {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(DevicesInner {
                supported: true,
                fail_first: 0,
                capabilities: TrackCapabilities::default(),
                attempts: Vec::new(),
                issued: Vec::new(),
            })),
        }
    }

    pub fn unsupported() -> Self {
        let devices = Self::new();
        devices.inner.borrow_mut().supported = false;
        devices
    }

    pub fn failing_first(self, n: usize) -> Self {
        self.inner.borrow_mut().fail_first = n;
        self
    }

    pub fn with_capabilities(self, capabilities: TrackCapabilities) -> Self {
        self.inner.borrow_mut().capabilities = capabilities;
        self
    }

    pub fn attempts(&self) -> Vec<StreamRequest> {
        self.inner.borrow().attempts.clone()
    }

    pub fn issued(&self) -> Vec<FakeStream> {
        self.inner.borrow().issued.clone()
    }
}

impl MediaDevices for FakeDevices {
    type Stream = FakeStream;

    fn is_supported(&self) -> bool {
        self.inner.borrow().supported
    }

    async fn acquire(&self, request: &StreamRequest) -> Result<FakeStream, DeviceError> {
        let mut inner = self.inner.borrow_mut();
        inner.attempts.push(request.clone());
        let attempt = inner.attempts.len();
        if attempt <= inner.fail_first {
            return Err(DeviceError(format!("tier {} rejected", attempt)));
        }
        let stream = FakeStream {
            track: Some(FakeTrack::with_capabilities(inner.capabilities.clone())),
            stopped: Rc::new(Cell::new(false)),
        };
        inner.issued.push(stream.clone());
        Ok(stream)
    }
}

struct SurfaceInner {
    attach_result: Result<(), VideoReadyError>,
    stall_attach: bool,
    attached: bool,
    attach_timeouts: Vec<u32>,
    frames: VecDeque<Frame>,
    scale: f64,
    viewport: ViewportRect,
    focus_indicators: Vec<(f64, f64)>,
}

#[derive(Clone)]
pub struct FakeSurface {
    inner: Rc<RefCell<SurfaceInner>>,
}

impl FakeSurface {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SurfaceInner {
                attach_result: Ok(()),
                stall_attach: false,
                attached: false,
                attach_timeouts: Vec::new(),
                frames: VecDeque::new(),
                scale: 1.0,
                viewport: ViewportRect { left: 0.0, top: 0.0, width: 640.0, height: 480.0 },
                focus_indicators: Vec::new(),
            })),
        }
    }

    pub fn fail_attach(&self, error: VideoReadyError) {
        self.inner.borrow_mut().attach_result = Err(error);
    }

    /// Next attaches bind the stream but never report ready, like a video
    /// element whose metadata never arrives.
    pub fn stall_attach(&self) {
        self.inner.borrow_mut().stall_attach = true;
    }

    pub fn push_frames(&self, n: usize, frame: Frame) {
        let mut inner = self.inner.borrow_mut();
        for _ in 0..n {
            inner.frames.push_back(frame.clone());
        }
    }

    pub fn set_viewport(&self, viewport: ViewportRect) {
        self.inner.borrow_mut().viewport = viewport;
    }

    pub fn scale(&self) -> f64 {
        self.inner.borrow().scale
    }

    pub fn is_attached(&self) -> bool {
        self.inner.borrow().attached
    }

    pub fn attach_timeouts(&self) -> Vec<u32> {
        self.inner.borrow().attach_timeouts.clone()
    }

    pub fn focus_indicators(&self) -> Vec<(f64, f64)> {
        self.inner.borrow().focus_indicators.clone()
    }
}

impl VideoSurface for FakeSurface {
    type Stream = FakeStream;

    async fn attach(&mut self, _stream: &FakeStream, timeout_ms: u32) -> Result<(), VideoReadyError> {
        let stall = {
            let mut inner = self.inner.borrow_mut();
            inner.attach_timeouts.push(timeout_ms);
            inner.attached = true;
            inner.stall_attach
        };
        if stall {
            futures_util::future::pending::<()>().await;
        }
        self.inner.borrow().attach_result.clone()
    }

    fn detach(&mut self) {
        self.inner.borrow_mut().attached = false;
    }

    fn capture_frame(&mut self) -> Option<Frame> {
        self.inner.borrow_mut().frames.pop_front()
    }

    fn set_scale(&mut self, level: f64) {
        self.inner.borrow_mut().scale = level;
    }

    fn viewport(&self) -> ViewportRect {
        self.inner.borrow().viewport
    }

    fn show_focus_indicator(&mut self, client_x: f64, client_y: f64) {
        self.inner.borrow_mut().focus_indicators.push((client_x, client_y));
    }
}

// ----------------------------------------------------------------------------
// Scanner
// ----------------------------------------------------------------------------

#[derive(Default)]
struct SchedulerInner {
    next: i32,
    requested: usize,
    cancelled: Vec<FrameHandle>,
    last: Option<FrameHandle>,
}

/// Hands out increasing handles; ticks are fired by the test itself.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requested(&self) -> usize {
        self.inner.borrow().requested
    }

    pub fn cancelled(&self) -> Vec<FrameHandle> {
        self.inner.borrow().cancelled.clone()
    }

    pub fn last_handle(&self) -> Option<FrameHandle> {
        self.inner.borrow().last
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_tick(&mut self) -> Option<FrameHandle> {
        let mut inner = self.inner.borrow_mut();
        inner.requested += 1;
        inner.next += 1;
        let handle = FrameHandle(inner.next);
        inner.last = Some(handle);
        Some(handle)
    }

    fn cancel_tick(&mut self, handle: FrameHandle) {
        self.inner.borrow_mut().cancelled.push(handle);
    }
}

/// Returns scripted results in order, then `Ok(None)` forever.
#[derive(Clone, Default)]
pub struct ScriptedDecoder {
    script: Rc<RefCell<VecDeque<Result<Option<String>, DecodeError>>>>,
    calls: Rc<Cell<usize>>,
}

impl ScriptedDecoder {
    pub fn new(script: Vec<Result<Option<String>, DecodeError>>) -> Self {
        Self {
            script: Rc::new(RefCell::new(script.into())),
            calls: Rc::new(Cell::new(0)),
        }
    }

    pub fn push(&self, result: Result<Option<String>, DecodeError>) {
        self.script.borrow_mut().push_back(result);
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl QrDecoder for ScriptedDecoder {
    fn decode(&self, _rgba: &[u8], _width: u32, _height: u32) -> Result<Option<String>, DecodeError> {
        self.calls.set(self.calls.get() + 1);
        self.script.borrow_mut().pop_front().unwrap_or(Ok(None))
    }
}

// ----------------------------------------------------------------------------
// Pairing
// ----------------------------------------------------------------------------

#[derive(Default)]
struct TransportInner {
    responses: VecDeque<Result<TvPairResponse, TransportError>>,
    requests: Vec<TvPairRequest>,
}

#[derive(Clone, Default)]
pub struct FakeTransport {
    inner: Rc<RefCell<TransportInner>>,
}

impl FakeTransport {
    pub fn new(responses: Vec<Result<TvPairResponse, TransportError>>) -> Self {
        let transport = Self::default();
        transport.inner.borrow_mut().responses = responses.into();
        transport
    }

    pub fn push(&self, response: Result<TvPairResponse, TransportError>) {
        self.inner.borrow_mut().responses.push_back(response);
    }

    pub fn requests(&self) -> Vec<TvPairRequest> {
        self.inner.borrow().requests.clone()
    }
}

impl PairingTransport for FakeTransport {
    async fn post_pairing(&self, request: &TvPairRequest) -> Result<TvPairResponse, TransportError> {
        let mut inner = self.inner.borrow_mut();
        inner.requests.push(request.clone());
        inner
            .responses
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("no scripted response".to_string())))
    }
}

// ----------------------------------------------------------------------------
// View + texts
// ----------------------------------------------------------------------------

#[derive(Default)]
struct ViewInner {
    open: bool,
    closes: usize,
    title: String,
    instructions: String,
    statuses: Vec<(String, StatusKind)>,
    zoom_control: Option<ZoomControl>,
    readouts: Vec<f64>,
}

#[derive(Clone, Default)]
pub struct RecordingView {
    inner: Rc<RefCell<ViewInner>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.inner.borrow().open
    }

    pub fn closes(&self) -> usize {
        self.inner.borrow().closes
    }

    pub fn title(&self) -> String {
        self.inner.borrow().title.clone()
    }

    pub fn instructions(&self) -> String {
        self.inner.borrow().instructions.clone()
    }

    pub fn last_status(&self) -> Option<(String, StatusKind)> {
        self.inner.borrow().statuses.last().cloned()
    }

    /// Zoom control as last configured.
    pub fn zoom_control(&self) -> Option<ZoomControl> {
        self.inner.borrow().zoom_control
    }

    pub fn readouts(&self) -> Vec<f64> {
        self.inner.borrow().readouts.clone()
    }
}

impl ScannerView for RecordingView {
    fn open(&mut self, title: &str, instructions: &str) {
        let mut inner = self.inner.borrow_mut();
        inner.open = true;
        inner.title = title.to_string();
        inner.instructions = instructions.to_string();
    }

    fn close(&mut self) {
        let mut inner = self.inner.borrow_mut();
        inner.open = false;
        inner.closes += 1;
    }

    fn set_status(&mut self, text: &str, kind: StatusKind) {
        self.inner.borrow_mut().statuses.push((text.to_string(), kind));
    }

    fn configure_zoom(&mut self, control: Option<ZoomControl>) {
        self.inner.borrow_mut().zoom_control = control;
    }

    fn set_zoom_readout(&mut self, level: f64) {
        self.inner.borrow_mut().readouts.push(level);
    }
}

/// Text source with no translations at all.
pub struct EmptyTexts;

impl TextSource for EmptyTexts {
    fn text(&self, _key: &str) -> Option<String> {
        None
    }
}

pub struct FakePlatform;

impl ScannerPlatform for FakePlatform {
    type Devices = FakeDevices;
    type Surface = FakeSurface;
    type Scheduler = ManualScheduler;
    type Decoder = ScriptedDecoder;
    type Transport = FakeTransport;
    type View = RecordingView;
}
