//! Rectangle and segment helpers shared by the world and the physics backend.

use geo::algorithm::Distance;
use geo::{Euclidean, Point, coord};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle described by its center and full extents.
///
/// Matches the convention of the world configuration, where obstacles and
/// hazards are given as `(x, y, w, h)` with `(x, y)` the rectangle center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Center x coordinate.
    pub x: f32,
    /// Center y coordinate.
    pub y: f32,
    /// Full width.
    pub w: f32,
    /// Full height.
    pub h: f32,
}

impl Rect {
    /// Creates a rectangle from its `(x, y, w, h)` tuple form.
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Minimum x edge of the rectangle.
    pub fn min_x(&self) -> f32 {
        self.x - self.w / 2.0
    }

    /// Maximum x edge of the rectangle.
    pub fn max_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    /// Minimum y edge of the rectangle.
    pub fn min_y(&self) -> f32 {
        self.y - self.h / 2.0
    }

    /// Maximum y edge of the rectangle.
    pub fn max_y(&self) -> f32 {
        self.y + self.h / 2.0
    }

    /// Axis-aligned point-in-rectangle test.
    ///
    /// Edges count as inside, matching the lethal hazard containment rule.
    pub fn contains(&self, point: &Array1<f32>) -> bool {
        point[0] >= self.min_x()
            && point[0] <= self.max_x()
            && point[1] >= self.min_y()
            && point[1] <= self.max_y()
    }

    /// Euclidean distance from a point to the closest point of the rectangle.
    ///
    /// Returns 0.0 when the point lies inside the rectangle.
    pub fn distance_to(&self, point: &Array1<f32>) -> f32 {
        let p = Point::new(point[0], point[1]);
        let rect = geo::Rect::new(
            coord! { x: self.min_x(), y: self.min_y() },
            coord! { x: self.max_x(), y: self.max_y() },
        );
        Euclidean.distance(&p, &rect.to_polygon())
    }
}

/// Returns the closest point on segment `[a, b]` to `point`.
///
/// Used by the planar backend to resolve circle/segment contacts, where the
/// contact normal is also needed (plain distance is not enough).
pub fn closest_point_on_segment(
    a: &Array1<f32>,
    b: &Array1<f32>,
    point: &Array1<f32>,
) -> Array1<f32> {
    let ab = b - a;
    let len_sq = ab[0] * ab[0] + ab[1] * ab[1];
    if len_sq <= f32::EPSILON {
        return a.clone();
    }
    let ap = point - a;
    let t = ((ap[0] * ab[0] + ap[1] * ab[1]) / len_sq).clamp(0.0, 1.0);
    a + &(ab * t)
}
