// ============================================================================
// SCAN LOOP - Idle -> Sampling -> (Detected | Idle)
// ============================================================================
// Driven by an external frame scheduler: every scheduled tick grabs the
// freshest frame, runs one decode, and either schedules the next tick or
// stops on the first payload.
// ============================================================================

use super::decoder::QrDecoder;
use crate::camera::VideoSurface;
use crate::models::PairingPayload;

/// Opaque handle of a scheduled tick (`requestAnimationFrame` id on the web).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHandle(pub i32);

/// Host facility that calls back once per animation frame.
pub trait FrameScheduler {
    /// Schedules one tick. `None` if the host refused.
    fn request_tick(&mut self) -> Option<FrameHandle>;

    fn cancel_tick(&mut self, handle: FrameHandle);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Sampling,
    Detected,
}

pub struct ScanLoop<S: FrameScheduler> {
    scheduler: S,
    state: ScanState,
    pending: Option<FrameHandle>,
}

impl<S: FrameScheduler> ScanLoop<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            state: ScanState::Idle,
            pending: None,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ScanState::Sampling
    }

    pub fn pending_tick(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Starts sampling. Ignored while already sampling.
    pub fn start(&mut self) {
        if self.state == ScanState::Sampling {
            return;
        }
        log::info!("📷 [SCAN] Scan loop started");
        self.state = ScanState::Sampling;
        self.schedule();
    }

    /// Cancels the pending tick and returns to `Idle`. Safe from any state.
    pub fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_tick(handle);
        }
        if self.state != ScanState::Idle {
            log::debug!("📷 [SCAN] Scan loop stopped ({:?})", self.state);
        }
        self.state = ScanState::Idle;
    }

    /// One scheduled tick. Returns the payload on the first successful
    /// decode; the loop is then `Detected` and schedules nothing more.
    pub fn tick<V, D>(&mut self, surface: &mut V, decoder: &D) -> Option<PairingPayload>
    where
        V: VideoSurface,
        D: QrDecoder,
    {
        // The handle that fired is spent.
        self.pending = None;
        if self.state != ScanState::Sampling {
            return None;
        }

        if let Some(frame) = surface.capture_frame() {
            match decoder.decode(&frame.rgba, frame.width, frame.height) {
                Ok(Some(text)) if !text.is_empty() => {
                    log::info!("✅ [SCAN] QR detected ({} chars)", text.len());
                    self.state = ScanState::Detected;
                    return Some(PairingPayload::new(text));
                }
                Ok(_) => {}
                Err(e) => log::debug!("📷 [SCAN] Decode error treated as no code: {}", e),
            }
        }

        self.schedule();
        None
    }

    fn schedule(&mut self) {
        self.pending = self.scheduler.request_tick();
        if self.pending.is_none() {
            log::warn!("⚠️ [SCAN] Frame scheduler refused a tick");
        }
    }
}
