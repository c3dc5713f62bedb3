// ============================================================================
// ZOOM CONTROLLER - hardware zoom with per-call software fallback
// ============================================================================

use super::traits::{VideoSurface, VideoTrack};
use crate::models::{TrackCapabilities, TrackConstraint, ZoomBounds, ZoomError, ZoomMode, ZoomState};

/// How a zoom level ended up on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomPath {
    Hardware,
    Software,
    /// Hardware zoom was rejected for this call, the scale transform was used.
    SoftwareFallback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomApplied {
    pub level: f64,
    pub path: ZoomPath,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomController {
    state: ZoomState,
    limits: ZoomBounds,
}

impl ZoomController {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            state: ZoomState::default(),
            limits: ZoomBounds { min, max },
        }
    }

    pub fn state(&self) -> ZoomState {
        self.state
    }

    /// Decides the session's zoom strategy from the track's advertised
    /// capabilities. Called once per session.
    pub fn detect_capabilities(&mut self, capabilities: &TrackCapabilities) -> ZoomState {
        let hardware = capabilities
            .zoom
            .and_then(|range| range.bounds())
            .map(|(min, max)| ZoomBounds {
                min: min.max(self.limits.min),
                max: max.min(self.limits.max),
            })
            .filter(|bounds| bounds.min < bounds.max);

        self.state = match hardware {
            Some(bounds) => {
                log::info!("🔍 [ZOOM] Hardware zoom {:.2}x - {:.2}x", bounds.min, bounds.max);
                ZoomState {
                    mode: ZoomMode::Hardware,
                    bounds: Some(bounds),
                    current_level: bounds.min,
                }
            }
            None => {
                log::info!("🔍 [ZOOM] No usable hardware zoom, using scale transform");
                ZoomState {
                    mode: ZoomMode::Software,
                    bounds: Some(self.limits),
                    current_level: self.limits.min,
                }
            }
        };
        self.state
    }

    /// Applies `level` (clamped to the session bounds). Hardware failures fall
    /// back to the scale transform for this call only.
    pub async fn apply<T, V>(
        &mut self,
        track: Option<&T>,
        surface: &mut V,
        level: f64,
    ) -> Result<ZoomApplied, ZoomError>
    where
        T: VideoTrack,
        V: VideoSurface,
    {
        if !level.is_finite() {
            return Err(ZoomError::InvalidLevel(level));
        }
        let bounds = match (self.state.mode, self.state.bounds) {
            (ZoomMode::Unsupported, _) | (_, None) => return Err(ZoomError::Inactive),
            (_, Some(bounds)) => bounds,
        };
        let level = bounds.clamp(level);

        let path = match (self.state.mode, track) {
            (ZoomMode::Hardware, Some(track)) => {
                match track.apply(&TrackConstraint::Zoom(level)).await {
                    Ok(()) => {
                        surface.set_scale(1.0);
                        ZoomPath::Hardware
                    }
                    Err(e) => {
                        log::warn!("⚠️ [ZOOM] Hardware zoom rejected ({}), scaling video instead", e);
                        surface.set_scale(level);
                        ZoomPath::SoftwareFallback
                    }
                }
            }
            (ZoomMode::Hardware, None) => {
                surface.set_scale(level);
                ZoomPath::SoftwareFallback
            }
            _ => {
                surface.set_scale(level);
                ZoomPath::Software
            }
        };

        self.state.current_level = level;
        log::debug!("🔍 [ZOOM] {:.2}x via {:?}", level, path);
        Ok(ZoomApplied { level, path })
    }

    /// Back to defaults; no bounds survive into the next session.
    pub fn reset(&mut self) {
        self.state = ZoomState::default();
    }
}

impl Default for ZoomController {
    fn default() -> Self {
        let (min, max) = crate::config::CONFIG.zoom_limits();
        Self::new(min, max)
    }
}
