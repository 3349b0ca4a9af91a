//! Locate a printed page on screen from the QR marker printed on it.
//!
//! This is the facade over the `pagelock-*` crates:
//! - `pagelock::core`: quads, viewport mapping, homographies, logging.
//! - `pagelock::template`: page templates and the payload matcher.
//! - `pagelock::tracker`: per-frame tracking, stabilization, validation.
//! - [`io`]: JSON configuration, recorded sessions and replay reports.
//!
//! ## Quickstart
//!
//! ```
//! use pagelock::core::{FrameSize, Quad};
//! use pagelock::template::TemplateMatcher;
//! use pagelock::tracker::{FrameTracker, MarkerEvent, TrackerParams};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut tracker = FrameTracker::new(TemplateMatcher::default(), TrackerParams::default())?;
//! tracker.set_source(FrameSize::new(1080.0, 1920.0), 0);
//! tracker.set_preview(FrameSize::new(540.0, 960.0));
//!
//! let marker = Quad::from_rect(100.0, 1700.0, 50.0, 50.0);
//! let event = MarkerEvent::new("04o", marker.corners());
//! let mut result = tracker.process(Some(&event))?;
//! for _ in 0..2 {
//!     result = tracker.process(Some(&event))?;
//! }
//! assert!(result.match_found);
//! # Ok(())
//! # }
//! ```

pub use pagelock_core as core;
pub use pagelock_template as template;
pub use pagelock_tracker as tracker;

pub use pagelock_core::{FrameSize, Quad};
pub use pagelock_template::{PageTemplate, TemplateMatcher, TemplateTable};
pub use pagelock_tracker::{DetectionResult, FrameTracker, MarkerEvent, TrackerParams};

pub mod io;
