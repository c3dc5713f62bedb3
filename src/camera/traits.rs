use crate::models::{
    DeviceError, Frame, StreamRequest, TrackCapabilities, TrackConstraint, TrackError,
    VideoReadyError, ViewportRect,
};

/// Camera acquisition API of the host (`navigator.mediaDevices`).
#[allow(async_fn_in_trait)]
pub trait MediaDevices: Clone {
    type Stream: MediaStream;

    /// `false` when the platform has no camera API at all.
    fn is_supported(&self) -> bool;

    /// One `getUserMedia` request; no retries here.
    async fn acquire(&self, request: &StreamRequest) -> Result<Self::Stream, DeviceError>;
}

/// A live camera stream.
pub trait MediaStream {
    type Track: VideoTrack;

    fn video_track(&self) -> Option<Self::Track>;

    /// Stops every track of the stream.
    fn stop_all(&self);
}

/// The active video track of a stream.
#[allow(async_fn_in_trait)]
pub trait VideoTrack: Clone {
    /// Fresh snapshot; devices change what they report while adjusting.
    fn capabilities(&self) -> TrackCapabilities;

    async fn apply(&self, constraint: &TrackConstraint) -> Result<(), TrackError>;
}

/// The video element (plus its off-screen canvas and focus ring) the stream
/// is rendered into. Cheap handle, cloned into pending jobs.
#[allow(async_fn_in_trait)]
pub trait VideoSurface: Clone {
    type Stream;

    /// Binds the stream and waits for metadata and playback, bounded by
    /// `timeout_ms`.
    async fn attach(&mut self, stream: &Self::Stream, timeout_ms: u32) -> Result<(), VideoReadyError>;

    /// Clears the element source.
    fn detach(&mut self);

    /// Current frame at native resolution, `None` until enough data is buffered.
    fn capture_frame(&mut self) -> Option<Frame>;

    /// Visual scale transform standing in for hardware zoom. `1.0` removes it.
    fn set_scale(&mut self, level: f64);

    fn viewport(&self) -> ViewportRect;

    /// Transient focus ring at a client point.
    fn show_focus_indicator(&mut self, client_x: f64, client_y: f64);
}
