//! Per-frame page tracking.
//!
//! Each processed camera frame flows through:
//! - template lookup by marker payload,
//! - marker stabilization (analysis space),
//! - page bounds resolution from the marker's own edges,
//! - mapping into preview space and page stabilization,
//! - a rotation/perspective validity gate.
//!
//! [`FrameTracker`] owns all mutable state. It is driven synchronously,
//! one frame at a time; [`spawn_tracker_worker`] runs it on its own
//! thread behind a latest-frame-wins slot.

mod median;
mod resolver;
mod stabilizer;
mod tracker;
mod validator;
mod worker;

pub use median::QuadMedianFilter;
pub use resolver::{
    EdgeVectorResolver, HomographyResolver, PageBoundsResolver, ResolveError, ResolverKind,
};
pub use stabilizer::{QuadStabilizer, StabilizerParams, StabilizerState};
pub use tracker::{
    DetectError, DetectionResult, FrameTracker, MarkerEvent, MarkerSource, ParamsError,
    TrackerParams, ALIGN_MESSAGE,
};
pub use validator::{BoundsValidator, ValidationIssue, ValidatorParams};
pub use worker::{spawn_tracker_worker, FrameInput, FrameOutput, FrameSlot, TrackerWorker};
