// ============================================================================
// FOCUS CONTROLLER - tap-to-focus, best effort
// ============================================================================

use super::traits::{VideoSurface, VideoTrack};
use crate::models::{FocusCapability, FocusMode, NormalizedPoint, TrackConstraint};

/// Focus request computed for one tap, ready to be sent to the track.
#[derive(Debug, Clone)]
pub struct FocusJob<T> {
    track: T,
    constraint: TrackConstraint,
}

impl<T: VideoTrack> FocusJob<T> {
    pub fn constraint(&self) -> &TrackConstraint {
        &self.constraint
    }

    /// Sends the request. Failures are logged and dropped.
    pub async fn run(self) {
        if let Err(e) = self.track.apply(&self.constraint).await {
            log::debug!("🎯 [FOCUS] Focus request ignored by camera: {}", e);
        }
    }
}

pub struct FocusController;

impl FocusController {
    /// Maps a tap (client coordinates) to a focus request.
    ///
    /// No-op while not scanning, without a track, or when the track
    /// advertises no focus control at all. Otherwise the focus ring is shown
    /// right away, before the request is sent.
    pub fn handle_tap<T, V>(
        track: Option<&T>,
        surface: &mut V,
        scanning: bool,
        client_x: f64,
        client_y: f64,
    ) -> Option<FocusJob<T>>
    where
        T: VideoTrack,
        V: VideoSurface,
    {
        let track = match track {
            Some(track) if scanning => track,
            _ => return None,
        };

        let point = surface.viewport().normalize(client_x, client_y);
        let constraint = Self::constraint_for(track.capabilities().focus_capability(), point)?;
        surface.show_focus_indicator(client_x, client_y);
        log::debug!("🎯 [FOCUS] Tap at ({:.2}, {:.2}) -> {:?}", point.x, point.y, constraint);
        Some(FocusJob {
            track: track.clone(),
            constraint,
        })
    }

    fn constraint_for(capability: FocusCapability, point: NormalizedPoint) -> Option<TrackConstraint> {
        match capability {
            FocusCapability::Continuous => Some(TrackConstraint::Focus {
                mode: FocusMode::Continuous,
                point: Some(point),
            }),
            FocusCapability::SingleShot => Some(TrackConstraint::Focus {
                mode: FocusMode::SingleShot,
                point: Some(point),
            }),
            FocusCapability::ManualDistance => Some(TrackConstraint::Focus {
                mode: FocusMode::Manual,
                point: None,
            }),
            FocusCapability::None => None,
        }
    }
}
