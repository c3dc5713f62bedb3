// Camera access with platform-specific implementations

#[cfg(target_arch = "wasm32")]
pub mod web;

pub mod focus;
pub mod session;
pub mod traits;
pub mod zoom;

pub use focus::{FocusController, FocusJob};
pub use session::{Activation, CameraSession, PendingStart, StartOutcome, TrackOf, ZoomJob, ZoomJobDone};
pub use traits::{MediaDevices, MediaStream, VideoSurface, VideoTrack};
pub use zoom::{ZoomApplied, ZoomController, ZoomPath};
