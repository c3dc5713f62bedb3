use thiserror::Error;

// ============================================================================
// ERRORS - scanner error taxonomy
// ============================================================================

/// Camera could not be brought up for a scanning session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    #[error("camera API is not available on this platform")]
    Unsupported,
    #[error("no camera could be acquired: {0}")]
    Unavailable(String),
    #[error("video did not become ready in time")]
    Timeout,
    #[error("video element failed: {0}")]
    VideoError(String),
    #[error("camera start was cancelled")]
    Cancelled,
}

impl CameraError {
    pub fn i18n_key(&self) -> &'static str {
        match self {
            CameraError::Unsupported => "camera_not_supported",
            CameraError::Timeout => "camera_timeout",
            CameraError::Unavailable(_) | CameraError::VideoError(_) | CameraError::Cancelled => {
                "tv_camera_error"
            }
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            CameraError::Unsupported => "Camera is not supported on this device",
            CameraError::Timeout => "Camera did not start in time",
            CameraError::Unavailable(_) | CameraError::VideoError(_) | CameraError::Cancelled => {
                "Could not access camera"
            }
        }
    }
}

/// A single `getUserMedia` request was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct DeviceError(pub String);

/// `applyConstraints` was rejected by the track.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TrackError(pub String);

/// The video element never reached playback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VideoReadyError {
    #[error("timed out waiting for video metadata or playback")]
    Timeout,
    #[error("video element error: {0}")]
    Element(String),
}

impl From<VideoReadyError> for CameraError {
    fn from(err: VideoReadyError) -> Self {
        match err {
            VideoReadyError::Timeout => CameraError::Timeout,
            VideoReadyError::Element(detail) => CameraError::VideoError(detail),
        }
    }
}

/// QR payload could not be turned into a pairing code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("uid field missing in device payload")]
    MissingField,
    #[error("uid field is empty in device payload")]
    EmptyField,
    #[error("malformed device payload: {detail}")]
    MalformedEncoding { detail: String },
    #[error("code not found in QR data")]
    NotFound,
}

impl ExtractionError {
    /// Diagnostic detail, never shown to the user.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ExtractionError::MalformedEncoding { detail } => Some(detail),
            _ => None,
        }
    }

    pub fn i18n_key(&self) -> &'static str {
        match self {
            ExtractionError::NotFound => "qr_code_not_found",
            _ => "qr_parse_error",
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            ExtractionError::NotFound => "Code not found",
            _ => "Unable to recognize QR code",
        }
    }
}

/// Pairing request could not be delivered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("no subscription link to send")]
    NoLink,
    #[error("{}", .message.as_deref().unwrap_or("failed to send subscription to TV"))]
    Remote { message: Option<String> },
}

/// Transport-level failure of an outbound API call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("HTTP {status}: unreadable response")]
    Http { status: u16 },
    #[error("serialization error: {0}")]
    Serialization(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ZoomError {
    #[error("no active camera session")]
    Inactive,
    #[error("invalid zoom level {0}")]
    InvalidLevel(f64),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("QR decode failed: {0}")]
pub struct DecodeError(pub String);
