use serde::{Deserialize, Serialize};

// ============================================================================
// CAMERA MODELS - constraints, capability snapshots, zoom/focus state
// ============================================================================

/// One step of the camera acquisition fallback chain, most specific first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintTier {
    /// Rear camera, ideal 640x480
    RearIdeal,
    /// Rear camera, at least 320x240
    RearMinimum,
    /// Rear camera, any resolution
    RearAny,
    /// Whatever camera the device has
    AnyCamera,
}

impl ConstraintTier {
    pub const ALL: [ConstraintTier; 4] = [
        ConstraintTier::RearIdeal,
        ConstraintTier::RearMinimum,
        ConstraintTier::RearAny,
        ConstraintTier::AnyCamera,
    ];

    /// `getUserMedia` constraint object for this tier.
    pub fn request(&self) -> StreamRequest {
        let video = match self {
            ConstraintTier::RearIdeal => VideoRequest::Spec(VideoSpec {
                facing_mode: Some("environment".to_string()),
                width: Some(Dimension::ideal(640)),
                height: Some(Dimension::ideal(480)),
            }),
            ConstraintTier::RearMinimum => VideoRequest::Spec(VideoSpec {
                facing_mode: Some("environment".to_string()),
                width: Some(Dimension::min(320)),
                height: Some(Dimension::min(240)),
            }),
            ConstraintTier::RearAny => VideoRequest::Spec(VideoSpec {
                facing_mode: Some("environment".to_string()),
                width: None,
                height: None,
            }),
            ConstraintTier::AnyCamera => VideoRequest::Any(true),
        };
        StreamRequest { video, audio: false }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamRequest {
    pub video: VideoRequest,
    pub audio: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VideoRequest {
    Any(bool),
    Spec(VideoSpec),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facing_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<Dimension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<Dimension>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Dimension {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ideal: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,
}

impl Dimension {
    pub fn ideal(value: u32) -> Self {
        Self { ideal: Some(value), min: None }
    }

    pub fn min(value: u32) -> Self {
        Self { ideal: None, min: Some(value) }
    }
}

/// Numeric capability range as reported by `getCapabilities()`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct NumericRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
}

impl NumericRange {
    /// Both ends present and finite.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match (self.min, self.max) {
            (Some(min), Some(max)) if min.is_finite() && max.is_finite() => Some((min, max)),
            _ => None,
        }
    }
}

/// Live capability snapshot of a video track. Read fresh on every use.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackCapabilities {
    pub zoom: Option<NumericRange>,
    pub focus_mode: Vec<String>,
    pub focus_distance: Option<NumericRange>,
}

impl TrackCapabilities {
    /// Parses the JSON form of a `MediaTrackCapabilities` object. Anything
    /// unreadable is treated as "no capabilities".
    pub fn from_json(json: &str) -> Self {
        serde_json::from_str(json).unwrap_or_else(|e| {
            log::debug!("🔍 [CAMERA] Unreadable capabilities ({}): {}", e, json);
            Self::default()
        })
    }

    pub fn focus_capability(&self) -> FocusCapability {
        if self.focus_mode.iter().any(|mode| mode == "continuous") {
            FocusCapability::Continuous
        } else if !self.focus_mode.is_empty() {
            FocusCapability::SingleShot
        } else if self.focus_distance.is_some() {
            FocusCapability::ManualDistance
        } else {
            FocusCapability::None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusCapability {
    Continuous,
    SingleShot,
    ManualDistance,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FocusMode {
    Continuous,
    SingleShot,
    Manual,
}

/// Point in [0,1]x[0,1] relative to the rendered video box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

/// Constraint applied to a live track through `applyConstraints`.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackConstraint {
    Zoom(f64),
    Focus {
        mode: FocusMode,
        point: Option<NormalizedPoint>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AdvancedConstraint {
    #[serde(skip_serializing_if = "Option::is_none")]
    zoom: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    focus_mode: Option<FocusMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    points_of_interest: Option<Vec<NormalizedPoint>>,
}

#[derive(Serialize)]
struct ConstraintSet {
    advanced: Vec<AdvancedConstraint>,
}

impl TrackConstraint {
    /// JSON body for `track.applyConstraints({ advanced: [...] })`.
    pub fn to_json(&self) -> String {
        let advanced = match self {
            TrackConstraint::Zoom(level) => AdvancedConstraint {
                zoom: Some(*level),
                focus_mode: None,
                points_of_interest: None,
            },
            TrackConstraint::Focus { mode, point } => AdvancedConstraint {
                zoom: None,
                focus_mode: Some(*mode),
                points_of_interest: point.map(|p| vec![p]),
            },
        };
        serde_json::to_string(&ConstraintSet { advanced: vec![advanced] })
            .unwrap_or_else(|_| "{}".to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomMode {
    Hardware,
    Software,
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomBounds {
    pub min: f64,
    pub max: f64,
}

impl ZoomBounds {
    pub fn clamp(&self, level: f64) -> f64 {
        level.clamp(self.min, self.max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomState {
    pub mode: ZoomMode,
    pub bounds: Option<ZoomBounds>,
    pub current_level: f64,
}

impl Default for ZoomState {
    fn default() -> Self {
        Self {
            mode: ZoomMode::Unsupported,
            bounds: None,
            current_level: 1.0,
        }
    }
}

/// RGBA frame grabbed from the video element.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Rendered box of the video element in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewportRect {
    /// Client point -> normalized point, clamped to the box.
    pub fn normalize(&self, client_x: f64, client_y: f64) -> NormalizedPoint {
        let ratio = |offset: f64, extent: f64| {
            if extent > 0.0 {
                (offset / extent).clamp(0.0, 1.0)
            } else {
                0.5
            }
        };
        NormalizedPoint {
            x: ratio(client_x - self.left, self.width),
            y: ratio(client_y - self.top, self.height),
        }
    }
}
