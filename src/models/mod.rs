pub mod camera;
pub mod errors;
pub mod pairing;

pub use camera::{
    ConstraintTier, FocusCapability, FocusMode, Frame, NormalizedPoint, NumericRange,
    StreamRequest, TrackCapabilities, TrackConstraint, ViewportRect, ZoomBounds, ZoomMode,
    ZoomState,
};
pub use errors::{
    CameraError, DecodeError, DeviceError, ExtractionError, SubmitError, TrackError,
    TransportError, VideoReadyError, ZoomError,
};
pub use pairing::{CodeSource, PairingCode, PairingPayload, TvKind, TvPairRequest, TvPairResponse};
