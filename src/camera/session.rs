// ============================================================================
// CAMERA SESSION - exclusive owner of stream, track, zoom state and scan loop
// ============================================================================
// A session spans start() .. stop(). Everything scoped to it (track, zoom
// bounds, pending scan tick) is dropped on stop() so the next start() is
// clean. Async steps run on cloned handles and are committed back only if
// the session generation did not move in the meantime. An acquisition still
// in flight when stop() runs is aborted and never touches the surface again.
// ============================================================================

use futures_util::future::{AbortHandle, AbortRegistration, Abortable};

use super::focus::{FocusController, FocusJob};
use super::traits::{MediaDevices, MediaStream, VideoSurface, VideoTrack};
use super::zoom::{ZoomApplied, ZoomController};
use crate::models::{CameraError, ConstraintTier, PairingPayload, ZoomError, ZoomState};
use crate::scanner::{FrameScheduler, QrDecoder, ScanLoop, ScanState};

pub type TrackOf<M> = <<M as MediaDevices>::Stream as MediaStream>::Track;

/// Result of a finished acquisition, tagged with the generation it was
/// started for.
pub struct StartOutcome<St> {
    generation: u64,
    result: Result<St, CameraError>,
}

/// Acquisition that runs without borrowing the session.
pub struct PendingStart<M, V> {
    generation: u64,
    devices: M,
    surface: V,
    timeout_ms: u32,
    cancel: AbortRegistration,
}

impl<M, V> PendingStart<M, V>
where
    M: MediaDevices,
    V: VideoSurface<Stream = M::Stream>,
{
    pub async fn run(mut self) -> StartOutcome<M::Stream> {
        let result = acquire(&self.devices, &mut self.surface, self.timeout_ms, self.cancel).await;
        StartOutcome {
            generation: self.generation,
            result,
        }
    }
}

/// Walks the constraint tiers until one is accepted, then waits for the
/// video element to play. Once `cancel` fires the surface belongs to a newer
/// session: a late stream is released without attaching, and an aborted
/// ready-wait returns without detaching.
async fn acquire<M, V>(
    devices: &M,
    surface: &mut V,
    timeout_ms: u32,
    cancel: AbortRegistration,
) -> Result<M::Stream, CameraError>
where
    M: MediaDevices,
    V: VideoSurface<Stream = M::Stream>,
{
    if !devices.is_supported() {
        log::error!("❌ [CAMERA] Camera API not available");
        return Err(CameraError::Unsupported);
    }

    let cancelled = cancel.handle();
    let mut last_error = None;
    let mut acquired = None;
    for tier in ConstraintTier::ALL {
        match devices.acquire(&tier.request()).await {
            Ok(stream) => {
                log::info!("📷 [CAMERA] Stream acquired with {:?}", tier);
                acquired = Some(stream);
                break;
            }
            Err(e) => {
                log::warn!("⚠️ [CAMERA] {:?} rejected: {}", tier, e);
                if cancelled.is_aborted() {
                    return Err(CameraError::Cancelled);
                }
                last_error = Some(e);
            }
        }
    }

    let stream = acquired.ok_or_else(|| {
        CameraError::Unavailable(
            last_error
                .map(|e| e.0)
                .unwrap_or_else(|| "no camera".to_string()),
        )
    })?;

    // getUserMedia cannot be interrupted, so a cancel during the permission
    // prompt is only seen here.
    if cancelled.is_aborted() {
        log::info!("🧹 [CAMERA] Start cancelled while acquiring, releasing stream");
        stream.stop_all();
        return Err(CameraError::Cancelled);
    }

    let attached = Abortable::new(surface.attach(&stream, timeout_ms), cancel).await;
    match attached {
        Ok(Ok(())) => Ok(stream),
        Ok(Err(e)) => {
            log::error!("❌ [CAMERA] Video never became ready: {}", e);
            stream.stop_all();
            surface.detach();
            Err(e.into())
        }
        Err(_aborted) => {
            log::info!("🧹 [CAMERA] Start cancelled while waiting for video, releasing stream");
            stream.stop_all();
            Err(CameraError::Cancelled)
        }
    }
}

/// What `activate` did with a finished acquisition.
#[derive(Debug, Clone, PartialEq)]
pub enum Activation {
    Active(ZoomState),
    Failed(CameraError),
    /// The session was stopped or restarted meanwhile; the stream was released.
    Stale,
}

/// Zoom change computed against the current session, applied off-borrow.
pub struct ZoomJob<T, V> {
    generation: u64,
    zoom: ZoomController,
    track: Option<T>,
    surface: V,
    level: f64,
}

pub struct ZoomJobDone {
    generation: u64,
    zoom: ZoomController,
    result: Result<ZoomApplied, ZoomError>,
}

impl<T, V> ZoomJob<T, V>
where
    T: VideoTrack,
    V: VideoSurface,
{
    pub async fn run(mut self) -> ZoomJobDone {
        let result = self.zoom.apply(self.track.as_ref(), &mut self.surface, self.level).await;
        ZoomJobDone {
            generation: self.generation,
            zoom: self.zoom,
            result,
        }
    }
}

pub struct CameraSession<M, V, S>
where
    M: MediaDevices,
    V: VideoSurface<Stream = M::Stream>,
    S: FrameScheduler,
{
    devices: M,
    surface: V,
    stream: Option<M::Stream>,
    track: Option<TrackOf<M>>,
    active: bool,
    zoom: ZoomController,
    scan: ScanLoop<S>,
    generation: u64,
    ready_timeout_ms: u32,
    pending: Option<AbortHandle>,
}

impl<M, V, S> CameraSession<M, V, S>
where
    M: MediaDevices,
    V: VideoSurface<Stream = M::Stream>,
    S: FrameScheduler,
{
    pub fn new(devices: M, surface: V, scheduler: S, zoom: ZoomController, ready_timeout_ms: u32) -> Self {
        Self {
            devices,
            surface,
            stream: None,
            track: None,
            active: false,
            zoom,
            scan: ScanLoop::new(scheduler),
            generation: 0,
            ready_timeout_ms,
            pending: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn track(&self) -> Option<&TrackOf<M>> {
        self.track.as_ref()
    }

    pub fn zoom_state(&self) -> ZoomState {
        self.zoom.state()
    }

    pub fn scan_state(&self) -> ScanState {
        self.scan.state()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Tears down any previous session and hands out the acquisition job.
    pub fn prepare_start(&mut self) -> Result<PendingStart<M, V>, CameraError> {
        self.stop();
        if !self.devices.is_supported() {
            log::error!("❌ [CAMERA] Camera API not available");
            return Err(CameraError::Unsupported);
        }
        let (handle, cancel) = AbortHandle::new_pair();
        self.pending = Some(handle);
        Ok(PendingStart {
            generation: self.generation,
            devices: self.devices.clone(),
            surface: self.surface.clone(),
            timeout_ms: self.ready_timeout_ms,
            cancel,
        })
    }

    /// Commits a finished acquisition if it still belongs to this session.
    /// A stale outcome only has its stream released; the surface is left to
    /// whichever session owns it now.
    pub fn activate(&mut self, outcome: StartOutcome<M::Stream>) -> Activation {
        if outcome.generation != self.generation || self.active {
            if let Ok(stream) = outcome.result {
                log::info!("🧹 [CAMERA] Releasing stream of a cancelled start");
                stream.stop_all();
            }
            return Activation::Stale;
        }
        self.pending = None;

        let stream = match outcome.result {
            Ok(stream) => stream,
            Err(e) => {
                self.stop();
                return Activation::Failed(e);
            }
        };

        let track = match stream.video_track() {
            Some(track) => track,
            None => {
                stream.stop_all();
                self.stop();
                return Activation::Failed(CameraError::Unavailable("stream has no video track".to_string()));
            }
        };

        let zoom = self.zoom.detect_capabilities(&track.capabilities());
        self.stream = Some(stream);
        self.track = Some(track);
        self.active = true;
        log::info!("✅ [CAMERA] Session {} active", self.generation);
        Activation::Active(zoom)
    }

    /// `prepare_start` + `run` + `activate` in one go, for callers that can
    /// hold the session across the await.
    pub async fn start(&mut self) -> Result<ZoomState, CameraError> {
        let pending = self.prepare_start()?;
        let outcome = pending.run().await;
        match self.activate(outcome) {
            Activation::Active(zoom) => Ok(zoom),
            Activation::Failed(e) => Err(e),
            Activation::Stale => Err(CameraError::Cancelled),
        }
    }

    pub fn start_scanning(&mut self) {
        if self.active {
            self.scan.start();
        }
    }

    /// One scan-loop tick against the session's surface.
    pub fn tick<D: QrDecoder>(&mut self, decoder: &D) -> Option<PairingPayload> {
        self.scan.tick(&mut self.surface, decoder)
    }

    pub fn zoom_job(&self, level: f64) -> ZoomJob<TrackOf<M>, V> {
        ZoomJob {
            generation: self.generation,
            zoom: self.zoom,
            track: self.track.clone(),
            surface: self.surface.clone(),
            level,
        }
    }

    /// Keeps the zoom result only if the session is still the same one.
    pub fn commit_zoom(&mut self, done: ZoomJobDone) -> Option<Result<ZoomApplied, ZoomError>> {
        if done.generation != self.generation || !self.active {
            return None;
        }
        self.zoom = done.zoom;
        Some(done.result)
    }

    pub async fn apply_zoom(&mut self, level: f64) -> Result<ZoomApplied, ZoomError> {
        self.zoom.apply(self.track.as_ref(), &mut self.surface, level).await
    }

    pub fn handle_tap(&mut self, client_x: f64, client_y: f64) -> Option<FocusJob<TrackOf<M>>> {
        FocusController::handle_tap(
            self.track.as_ref(),
            &mut self.surface,
            self.scan.is_running(),
            client_x,
            client_y,
        )
    }

    /// Releases everything. Idempotent, safe before any start.
    pub fn stop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
        self.scan.stop();
        if let Some(stream) = self.stream.take() {
            stream.stop_all();
            log::info!("🛑 [CAMERA] Session {} stopped", self.generation);
        }
        self.track = None;
        self.surface.detach();
        self.surface.set_scale(1.0);
        self.zoom.reset();
        self.active = false;
        self.generation += 1;
    }
}
