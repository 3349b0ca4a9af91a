use pagelock_core::Quad;
use pagelock_template::PageTemplate;
use serde::{Deserialize, Serialize};

/// Guidance shown while the page box is valid but not yet stable.
pub const ALIGN_MESSAGE: &str = "Align camera with page";

/// Output of one processed frame.
///
/// Overlays are in preview pixels, already rounded. Nothing here is
/// carried over to the next frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// True only when the page box is valid and both tracks are stable.
    pub match_found: bool,
    pub payload: Option<String>,
    pub template: Option<PageTemplate>,
    /// Present only together with `match_found`.
    pub page_overlay: Option<Quad>,
    pub marker_overlay: Option<Quad>,
    pub validation_message: Option<String>,
}

impl DetectionResult {
    /// Result exposing only the marker overlay.
    pub fn marker_only(marker_overlay: Quad) -> Self {
        Self {
            marker_overlay: Some(marker_overlay),
            ..Self::default()
        }
    }

    /// True when nothing at all was tracked this frame.
    pub fn is_empty(&self) -> bool {
        self.marker_overlay.is_none() && self.page_overlay.is_none()
    }
}
