//! Convex shapes and the geometric queries the collision pipeline consumes.
//!
//! Every shape is immutable local-space geometry. Placement is always an
//! explicit [`Transform`] argument, so one shape can be queried at many
//! placements without being copied or mutated.

pub mod aabb;
pub mod capsule;
pub mod circle;
pub mod ellipse;
pub mod feature;
pub mod interval;
pub mod link;
pub mod mass;
pub mod polygon;
pub mod segment;
pub mod shape;
pub mod slice;
pub mod transform;

use glam::Vec2;

use crate::error::CollisionError;

pub use self::aabb::Aabb;
pub use self::capsule::Capsule;
pub use self::circle::Circle;
pub use self::ellipse::Ellipse;
pub use self::feature::{EdgeFeature, Feature, Vertex};
pub use self::interval::Interval;
pub use self::link::Link;
pub use self::mass::MassData;
pub use self::polygon::Polygon;
pub use self::segment::Segment;
pub use self::shape::{Shape, ShapeKind};
pub use self::slice::Slice;
pub use self::transform::Transform;

/// Squared length below which a vector is treated as zero.
pub(crate) const ZERO_LENGTH_SQUARED: f32 = 1e-12;

/// Geometric queries on a convex shape.
///
/// Directions passed to [`Convex::support`] and [`Convex::farthest_feature`]
/// need not be normalized; axes passed to [`Convex::project`] must be.
pub trait Convex {
    fn kind(&self) -> ShapeKind;

    /// Local-space centroid.
    fn center(&self) -> Vec2;

    /// Largest distance from the centroid to any point of the shape.
    fn radius(&self) -> f32;

    /// World-space point of the shape farthest along `direction`.
    fn support(&self, direction: Vec2, transform: &Transform) -> Vec2;

    /// Projection of the shape onto the unit `axis`.
    fn project(&self, axis: Vec2, transform: &Transform) -> Interval {
        let max = self.support(axis, transform).dot(axis);
        let min = self.support(-axis, transform).dot(axis);
        Interval::new(min, max)
    }

    /// Whether the world-space `point` lies inside the shape.
    fn contains(&self, point: Vec2, transform: &Transform) -> bool;

    /// World-space foci: points the separating axis test must aim axes at
    /// on the other shape (circle centres, capsule segment endpoints).
    fn foci(&self, _transform: &Transform) -> Vec<Vec2> {
        Vec::new()
    }

    /// Candidate separating axes (unit length) for the separating axis test.
    ///
    /// `foci` are the other shape's foci. Shapes without a finite axis set
    /// return [`CollisionError::Unsupported`].
    fn axes(&self, _foci: &[Vec2], _transform: &Transform) -> Result<Vec<Vec2>, CollisionError> {
        Err(CollisionError::Unsupported(self.kind()))
    }

    /// The vertex or edge farthest along `direction`, in world space.
    fn farthest_feature(&self, direction: Vec2, transform: &Transform) -> Feature;

    /// World-space bounding box.
    fn aabb(&self, transform: &Transform) -> Aabb {
        let max_x = self.support(Vec2::X, transform).x;
        let min_x = self.support(Vec2::NEG_X, transform).x;
        let max_y = self.support(Vec2::Y, transform).y;
        let min_y = self.support(Vec2::NEG_Y, transform).y;
        Aabb::new(Vec2::new(min_x, min_y), Vec2::new(max_x, max_y))
    }

    /// Mass properties for a uniform `density`.
    fn mass(&self, density: f32) -> MassData;

    /// Downcast used by the link post-processor.
    fn as_link(&self) -> Option<&Link> {
        None
    }
}

/// Right-hand perpendicular `(y, -x)`: the outward normal of a
/// counter-clockwise edge.
#[inline]
pub(crate) fn right_perp(v: Vec2) -> Vec2 {
    Vec2::new(v.y, -v.x)
}

/// The point of `points` nearest to `target`.
pub(crate) fn closest_point(points: &[Vec2], target: Vec2) -> Option<Vec2> {
    points.iter().copied().min_by(|a, b| {
        a.distance_squared(target)
            .total_cmp(&b.distance_squared(target))
    })
}

/// Axes from each focus to the nearest of `points`, skipping zero-length ones.
pub(crate) fn focus_axes(points: &[Vec2], foci: &[Vec2]) -> Vec<Vec2> {
    foci.iter()
        .filter_map(|f| closest_point(points, *f).map(|p| p - *f))
        .filter(|axis| axis.length_squared() > ZERO_LENGTH_SQUARED)
        .map(Vec2::normalize)
        .collect()
}

/// Closest point on segment `a`-`b` to `p`, with the segment parameter.
pub(crate) fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> (Vec2, f32) {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= ZERO_LENGTH_SQUARED {
        return (a, 0.0);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (a + ab * t, t)
}
