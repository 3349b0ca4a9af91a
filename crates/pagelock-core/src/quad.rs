//! Immutable four-corner polygon and the point-wise transforms applied to it.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::FrameSize;

/// Euclidean distance between two points.
#[inline]
pub fn distance(p: Point2<f32>, q: Point2<f32>) -> f32 {
    (q - p).norm()
}

/// Affine map `p -> p * scale + offset` from a source space into a
/// destination space.
///
/// `offset` is expressed in destination-space pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScaleOffset {
    pub scale: Vector2<f32>,
    pub offset: Vector2<f32>,
}

impl ScaleOffset {
    pub fn identity() -> Self {
        Self::new(Vector2::new(1.0, 1.0), Vector2::zeros())
    }

    pub fn new(scale: Vector2<f32>, offset: Vector2<f32>) -> Self {
        Self { scale, offset }
    }

    pub fn uniform(scale: f32, offset: Vector2<f32>) -> Self {
        Self::new(Vector2::new(scale, scale), offset)
    }

    /// Offset mapped back into source space (`-offset / scale`).
    #[inline]
    pub fn offset_in_source(&self) -> Vector2<f32> {
        Vector2::new(
            -self.offset.x / self.scale.x,
            -self.offset.y / self.scale.y,
        )
    }

    #[inline]
    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        let src = self.offset_in_source();
        Point2::new(
            (p.x - src.x) * self.scale.x,
            (p.y - src.y) * self.scale.y,
        )
    }

    /// Mapping from the destination space back into the source space.
    pub fn inverse(&self) -> Self {
        let scale = Vector2::new(1.0 / self.scale.x, 1.0 / self.scale.y);
        let offset = Vector2::new(-self.offset.x * scale.x, -self.offset.y * scale.y);
        Self { scale, offset }
    }
}

impl Default for ScaleOffset {
    fn default() -> Self {
        Self::identity()
    }
}

/// Axis-aligned integer rectangle enclosing a quad.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl BoundingRect {
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

/// Four ordered corners: top-left, top-right, bottom-right, bottom-left.
///
/// The winding is clockwise in image coordinates (y pointing down). No
/// operation ever permutes the corners; every transform acts point-wise
/// and returns a new value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub top_left: Point2<f32>,
    pub top_right: Point2<f32>,
    pub bottom_right: Point2<f32>,
    pub bottom_left: Point2<f32>,
}

impl Quad {
    pub fn new(
        top_left: Point2<f32>,
        top_right: Point2<f32>,
        bottom_right: Point2<f32>,
        bottom_left: Point2<f32>,
    ) -> Self {
        Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }

    /// Build from corners already ordered TL, TR, BR, BL.
    pub fn from_corners(c: [Point2<f32>; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }

    /// Build from a decoder corner list.
    ///
    /// The caller guarantees TL, TR, BR, BL order. Returns `None` unless
    /// exactly four points are given.
    pub fn from_slice(points: &[Point2<f32>]) -> Option<Self> {
        let corners: [Point2<f32>; 4] = points.try_into().ok()?;
        Some(Self::from_corners(corners))
    }

    /// Axis-aligned rectangle with origin `(x, y)`.
    pub fn from_rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(
            Point2::new(x, y),
            Point2::new(x + width, y),
            Point2::new(x + width, y + height),
            Point2::new(x, y + height),
        )
    }

    #[inline]
    pub fn corners(&self) -> [Point2<f32>; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// Apply `f` to every corner, preserving order.
    #[inline]
    pub fn map(&self, mut f: impl FnMut(Point2<f32>) -> Point2<f32>) -> Self {
        Self::new(
            f(self.top_left),
            f(self.top_right),
            f(self.bottom_right),
            f(self.bottom_left),
        )
    }

    /// Pair corners of `self` and `other` in order and combine them.
    #[inline]
    pub fn zip_map(
        &self,
        other: &Quad,
        mut f: impl FnMut(Point2<f32>, Point2<f32>) -> Point2<f32>,
    ) -> Self {
        Self::new(
            f(self.top_left, other.top_left),
            f(self.top_right, other.top_right),
            f(self.bottom_right, other.bottom_right),
            f(self.bottom_left, other.bottom_left),
        )
    }

    /// Mean of the four corners.
    pub fn centroid(&self) -> Point2<f32> {
        let sum = self.top_left.coords
            + self.top_right.coords
            + self.bottom_right.coords
            + self.bottom_left.coords;
        Point2::from(sum / 4.0)
    }

    /// Edge lengths in order: top, right, bottom, left.
    pub fn side_lengths(&self) -> [f32; 4] {
        [
            distance(self.top_left, self.top_right),
            distance(self.top_right, self.bottom_right),
            distance(self.bottom_left, self.bottom_right),
            distance(self.top_left, self.bottom_left),
        ]
    }

    /// Largest distance between corresponding corners.
    pub fn max_corner_distance(&self, other: &Quad) -> f32 {
        self.corners()
            .iter()
            .zip(other.corners().iter())
            .map(|(&a, &b)| distance(a, b))
            .fold(0.0, f32::max)
    }

    /// Angle of the top edge relative to the x axis, degrees in (-180, 180].
    pub fn rotation_angle_deg(&self) -> f32 {
        let d = self.top_right - self.top_left;
        let deg = d.y.atan2(d.x).to_degrees();
        if deg <= -180.0 {
            deg + 360.0
        } else {
            deg
        }
    }

    pub fn scale(&self, sx: f32, sy: f32) -> Self {
        self.map(|p| Point2::new(p.x * sx, p.y * sy))
    }

    pub fn scale_with_offset(&self, so: &ScaleOffset) -> Self {
        self.map(|p| so.apply(p))
    }

    pub fn translate(&self, by: Vector2<f32>) -> Self {
        self.map(|p| p + by)
    }

    /// Rotate every corner by `angle_deg` about `pivot` (default: centroid).
    ///
    /// Positive angles turn the x axis towards the y axis, so in image
    /// coordinates they appear clockwise and add to `rotation_angle_deg`.
    pub fn apply_rotation(&self, angle_deg: f32, pivot: Option<Point2<f32>>) -> Self {
        let pivot = pivot.unwrap_or_else(|| self.centroid());
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        self.map(|p| {
            let dx = p.x - pivot.x;
            let dy = p.y - pivot.y;
            Point2::new(
                pivot.x + dx * cos - dy * sin,
                pivot.y + dx * sin + dy * cos,
            )
        })
    }

    /// Per-corner linear interpolation `self * (1 - t) + other * t`.
    pub fn lerp(&self, other: &Quad, t: f32) -> Self {
        self.zip_map(other, |a, b| Point2::from(a.coords * (1.0 - t) + b.coords * t))
    }

    /// Round every coordinate to the nearest integer.
    pub fn round(&self) -> Self {
        self.map(|p| Point2::new(p.x.round(), p.y.round()))
    }

    /// Translate so the axis-aligned bounding box starts at the origin.
    pub fn normalize(&self) -> Self {
        let (min, _) = self.extent();
        self.translate(-min.coords)
    }

    /// Clamp every corner into `[0, width] x [0, height]`.
    pub fn clamp_to(&self, size: FrameSize) -> Self {
        self.map(|p| Point2::new(p.x.clamp(0.0, size.width), p.y.clamp(0.0, size.height)))
    }

    /// Keep the bottom edge and pull the top edge towards it so that only
    /// `fraction` of the height remains. `fraction` is clamped to `[0, 1]`.
    pub fn fill_from_bottom(&self, fraction: f32) -> Self {
        let t = fraction.clamp(0.0, 1.0);
        let towards = |bottom: Point2<f32>, top: Point2<f32>| bottom + (top - bottom) * t;
        Self::new(
            towards(self.bottom_left, self.top_left),
            towards(self.bottom_right, self.top_right),
            self.bottom_right,
            self.bottom_left,
        )
    }

    /// Smallest integer rectangle containing every corner.
    pub fn bounding_rect(&self) -> BoundingRect {
        let (min, max) = self.extent();
        BoundingRect {
            left: min.x.floor() as i32,
            top: min.y.floor() as i32,
            right: max.x.ceil() as i32,
            bottom: max.y.ceil() as i32,
        }
    }

    /// Closed polygon contour for rendering; the consumer closes it.
    pub fn to_path_points(&self) -> [Point2<f32>; 4] {
        self.corners()
    }

    fn extent(&self) -> (Point2<f32>, Point2<f32>) {
        let mut min = Point2::new(f32::INFINITY, f32::INFINITY);
        let mut max = Point2::new(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for p in self.corners() {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        (min, max)
    }
}
