//! Page layouts compiled into the binary.

use nalgebra::Point2;
use pagelock_core::Quad;

use crate::PageTemplate;

/// Layouts for the printed forms currently in circulation.
///
/// Both forms carry the marker in the bottom-left corner of the page, so
/// the page extends upwards (negative y) and to the right of the marker.
pub fn builtin_templates() -> Vec<PageTemplate> {
    vec![
        PageTemplate::new(
            "04o",
            "1",
            Quad::new(
                Point2::new(0.0, -25.0),
                Point2::new(15.0, -25.0),
                Point2::new(15.0, 1.0),
                Point2::new(0.0, 1.0),
            ),
        ),
        PageTemplate::new(
            "P01 V1F T02 S000",
            "1",
            Quad::new(
                Point2::new(0.0, -11.5),
                Point2::new(9.5, -11.5),
                Point2::new(9.5, 1.0),
                Point2::new(0.0, 1.0),
            ),
        ),
    ]
}
