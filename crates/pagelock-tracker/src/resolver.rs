//! Page bounds from the observed marker and a template.
//!
//! Both strategies work in whatever pixel space the marker quad is given
//! in; the tracker feeds them analysis-space quads.

use nalgebra::Point2;
use pagelock_core::{homography_from_4pt, Quad};
use pagelock_template::PageTemplate;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("marker quad is degenerate; no projective mapping from the unit square")]
    DegenerateMarker,
    #[error("page corner maps to infinity under the marker homography")]
    PointAtInfinity,
}

/// Derives the page quadrilateral from a marker quadrilateral.
pub trait PageBoundsResolver {
    fn resolve(&self, marker: &Quad, template: &PageTemplate) -> Result<Quad, ResolveError>;
}

/// Resolver strategy selectable from configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverKind {
    #[default]
    EdgeVector,
    Homography,
}

impl ResolverKind {
    pub fn build(self) -> Box<dyn PageBoundsResolver + Send> {
        match self {
            ResolverKind::EdgeVector => Box::new(EdgeVectorResolver),
            ResolverKind::Homography => Box::new(HomographyResolver),
        }
    }
}

/// Extrapolates the page along the marker's own top and left edge vectors.
///
/// Each layout corner `(u, v)` lands at `top_left + u * e_top + v * e_left`,
/// the affine image of the layout. A rectangular layout therefore becomes a
/// parallelogram: it carries the marker's rotation and shear but not true
/// perspective foreshortening. Accurate for small to moderate tilt and free
/// of the blow-ups a 4-point homography shows when the marker is small on
/// screen.
#[derive(Clone, Copy, Debug, Default)]
pub struct EdgeVectorResolver;

impl PageBoundsResolver for EdgeVectorResolver {
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip_all))]
    fn resolve(&self, marker: &Quad, template: &PageTemplate) -> Result<Quad, ResolveError> {
        let origin = marker.top_left;
        let e_top = marker.top_right - origin;
        let e_left = marker.bottom_left - origin;

        Ok(template
            .layout
            .map(|p| origin + e_top * p.x + e_left * p.y))
    }
}

/// Maps the template layout through the homography taking the unit square
/// onto the observed marker.
///
/// Models perspective exactly for a planar page, but is numerically
/// fragile for small or nearly degenerate markers. Pair it with a tight
/// stabilizer jump threshold.
#[derive(Clone, Copy, Debug, Default)]
pub struct HomographyResolver;

impl PageBoundsResolver for HomographyResolver {
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip_all))]
    fn resolve(&self, marker: &Quad, template: &PageTemplate) -> Result<Quad, ResolveError> {
        let unit = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        let h = homography_from_4pt(&unit, &marker.corners())
            .ok_or(ResolveError::DegenerateMarker)?;
        h.apply_quad(&template.layout)
            .ok_or(ResolveError::PointAtInfinity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use pagelock_template::PageExtent;

    fn marker() -> Quad {
        Quad::from_rect(100.0, 100.0, 100.0, 100.0)
    }

    fn tall_template() -> PageTemplate {
        PageTemplate::from_extent(
            "t",
            "",
            PageExtent {
                offset_x: 0.0,
                offset_y: 1.0,
                width_units: 1.0,
                height_units: 2.0,
            },
        )
    }

    #[test]
    fn edge_vector_reproduces_reference_coordinates_exactly() {
        let page = EdgeVectorResolver
            .resolve(&marker(), &tall_template())
            .expect("resolve");
        assert_eq!(page.top_left, Point2::new(100.0, 0.0));
        assert_eq!(page.top_right, Point2::new(200.0, 0.0));
        assert_eq!(page.bottom_right, Point2::new(200.0, 200.0));
        assert_eq!(page.bottom_left, Point2::new(100.0, 200.0));
    }

    #[test]
    fn edge_vector_follows_marker_rotation() {
        let tilted = marker().apply_rotation(20.0, Some(Point2::new(100.0, 100.0)));
        let page = EdgeVectorResolver
            .resolve(&tilted, &tall_template())
            .expect("resolve");
        assert_abs_diff_eq!(page.rotation_angle_deg(), 20.0, epsilon = 1e-3);
        let sides = page.side_lengths();
        assert_abs_diff_eq!(sides[0], 100.0, epsilon = 1e-3);
        assert_abs_diff_eq!(sides[1], 200.0, epsilon = 1e-3);
    }

    #[test]
    fn strategies_agree_on_affine_markers() {
        let sheared = Quad::new(
            Point2::new(50.0, 60.0),
            Point2::new(130.0, 70.0),
            Point2::new(140.0, 150.0),
            Point2::new(60.0, 140.0),
        );
        let t = pagelock_template::TemplateTable::builtin()
            .get("P01 V1F T02 S000")
            .cloned()
            .expect("builtin");
        let a = EdgeVectorResolver.resolve(&sheared, &t).expect("edge");
        let b = HomographyResolver.resolve(&sheared, &t).expect("homography");
        for (p, q) in a.corners().iter().zip(b.corners().iter()) {
            assert_abs_diff_eq!(p.x, q.x, epsilon = 0.05);
            assert_abs_diff_eq!(p.y, q.y, epsilon = 0.05);
        }
    }

    #[test]
    fn edge_vector_maps_every_layout_corner() {
        // a trapezoid layout; reading only the extent would square it off
        let layout = Quad::new(
            Point2::new(0.0, -10.0),
            Point2::new(8.0, -12.0),
            Point2::new(9.0, 1.0),
            Point2::new(-1.0, 1.0),
        );
        let t = PageTemplate::new("trapezoid", "", layout);
        let marker = Quad::from_rect(100.0, 100.0, 10.0, 10.0);

        let page = EdgeVectorResolver.resolve(&marker, &t).expect("edge");
        assert_eq!(page.top_left, Point2::new(100.0, 0.0));
        assert_eq!(page.top_right, Point2::new(180.0, -20.0));
        assert_eq!(page.bottom_right, Point2::new(190.0, 110.0));
        assert_eq!(page.bottom_left, Point2::new(90.0, 110.0));

        let h = HomographyResolver.resolve(&marker, &t).expect("homography");
        for (p, q) in page.corners().iter().zip(h.corners().iter()) {
            assert_abs_diff_eq!(p.x, q.x, epsilon = 0.05);
            assert_abs_diff_eq!(p.y, q.y, epsilon = 0.05);
        }
    }

    #[test]
    fn homography_rejects_collapsed_marker() {
        let collapsed = Quad::from_rect(10.0, 10.0, 0.0, 0.0);
        assert_eq!(
            HomographyResolver.resolve(&collapsed, &tall_template()),
            Err(ResolveError::DegenerateMarker)
        );
    }

    #[test]
    fn kind_builds_matching_strategy() {
        let t = tall_template();
        let page = ResolverKind::Homography
            .build()
            .resolve(&marker(), &t)
            .expect("resolve");
        assert_abs_diff_eq!(page.top_left.y, 0.0, epsilon = 1e-3);
        let json = serde_json::to_string(&ResolverKind::EdgeVector).expect("ser");
        assert_eq!(json, "\"edge_vector\"");
    }
}
