//! Frame orchestration: payload lookup, resolve, stabilize, validate.
//!
//! [`FrameTracker::process`] is called once per decoded frame and returns a
//! fresh [`DetectionResult`]. All cross-frame state (both stabilizers, the
//! optional median window and the cached viewport mapping) lives inside
//! the tracker.

mod error;
mod event;
mod params;
mod pipeline;
mod result;

pub use error::{DetectError, ParamsError};
pub use event::MarkerEvent;
pub use params::{MarkerSource, TrackerParams};
pub use pipeline::FrameTracker;
pub use result::{DetectionResult, ALIGN_MESSAGE};
