//! Core geometry for locating a printed page from a fiducial marker.
//!
//! This crate is purely geometric. It knows nothing about templates,
//! decoders or temporal filtering; those live in `pagelock-template` and
//! `pagelock-tracker`.
//!
//! Coordinate spaces used throughout the workspace:
//! - *analysis space*: pixels of the frame handed to the barcode decoder,
//! - *preview space*: pixels of the on-screen viewport,
//! - *marker-unit space*: the marker's own square is the unit square.

mod homography;
mod logger;
mod quad;
mod viewport;

pub use homography::{homography_from_4pt, Homography};
pub use quad::{distance, BoundingRect, Quad, ScaleOffset};
pub use viewport::{compute_scale_offset, FrameSize, ViewportError, ViewportMapper};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
