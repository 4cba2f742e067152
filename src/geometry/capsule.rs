//! Capsule: a rectangle capped by two half-discs along its longer axis.

use std::f32::consts::PI;

use glam::Vec2;

use crate::error::{CollisionError, ShapeError};

use super::{
    closest_point_on_segment, focus_axes, Convex, Feature, Interval, MassData, ShapeKind,
    Transform, Vertex,
};

/// Minimum |direction . side normal| for the flat side to be reported as the
/// farthest feature instead of a point on a cap.
const EDGE_FEATURE_THRESHOLD: f32 = 0.98;

#[derive(Debug, Clone, PartialEq)]
pub struct Capsule {
    /// Unit direction of the long axis.
    axis: Vec2,
    /// Distance from the centre to each cap focus.
    half_length: f32,
    cap_radius: f32,
}

impl Capsule {
    /// Capsule filling a `width` x `height` box. The longer side becomes the
    /// long axis; equal sides are rejected (that would be a circle).
    pub fn new(width: f32, height: f32) -> Result<Self, ShapeError> {
        for (name, value) in [("width", width), ("height", height)] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ShapeError::NonPositive { name, value });
            }
        }
        if (width - height).abs() <= f32::EPSILON * width.max(height) {
            return Err(ShapeError::DegenerateCapsule);
        }
        let (axis, long, short) = if width > height {
            (Vec2::X, width, height)
        } else {
            (Vec2::Y, height, width)
        };
        let cap_radius = short * 0.5;
        Ok(Self {
            axis,
            half_length: long * 0.5 - cap_radius,
            cap_radius,
        })
    }

    pub fn cap_radius(&self) -> f32 {
        self.cap_radius
    }

    /// Local cap centres.
    pub fn local_foci(&self) -> [Vec2; 2] {
        [
            -self.axis * self.half_length,
            self.axis * self.half_length,
        ]
    }

    fn world_foci(&self, transform: &Transform) -> [Vec2; 2] {
        let [f1, f2] = self.local_foci();
        [transform.transform_point(f1), transform.transform_point(f2)]
    }

    /// Local normal of the upper flat side.
    fn side_normal(&self) -> Vec2 {
        self.axis.perp()
    }
}

impl Convex for Capsule {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Capsule
    }

    fn center(&self) -> Vec2 {
        Vec2::ZERO
    }

    fn radius(&self) -> f32 {
        self.half_length + self.cap_radius
    }

    fn support(&self, direction: Vec2, transform: &Transform) -> Vec2 {
        let local = transform.inverse_rotate(direction).normalize_or_zero();
        let [f1, f2] = self.local_foci();
        let focus = if local.dot(self.axis) >= 0.0 { f2 } else { f1 };
        transform.transform_point(focus + local * self.cap_radius)
    }

    fn project(&self, axis: Vec2, transform: &Transform) -> Interval {
        let [f1, f2] = self.world_foci(transform);
        let (a, b) = (f1.dot(axis), f2.dot(axis));
        Interval::new(a.min(b) - self.cap_radius, a.max(b) + self.cap_radius)
    }

    fn contains(&self, point: Vec2, transform: &Transform) -> bool {
        let local = transform.inverse_transform_point(point);
        let [f1, f2] = self.local_foci();
        let (closest, _) = closest_point_on_segment(local, f1, f2);
        closest.distance_squared(local) <= self.cap_radius * self.cap_radius
    }

    fn foci(&self, transform: &Transform) -> Vec<Vec2> {
        self.world_foci(transform).to_vec()
    }

    fn axes(&self, foci: &[Vec2], transform: &Transform) -> Result<Vec<Vec2>, CollisionError> {
        let mut axes = vec![transform.rotate(self.side_normal())];
        axes.extend(focus_axes(&self.world_foci(transform), foci));
        Ok(axes)
    }

    fn farthest_feature(&self, direction: Vec2, transform: &Transform) -> Feature {
        let local = transform.inverse_rotate(direction).normalize_or_zero();
        let side = self.side_normal();
        let along_side = local.dot(side);
        if along_side.abs() < EDGE_FEATURE_THRESHOLD {
            return Feature::Point(Vertex::unindexed(self.support(direction, transform)));
        }

        let [f1, f2] = self.local_foci();
        let offset = side * self.cap_radius;
        let vertex = |p: Vec2, i: usize| Vertex::indexed(transform.transform_point(p), i);
        if along_side > 0.0 {
            Feature::edge(vertex(f2 + offset, 2), vertex(f1 + offset, 3), 2, direction)
        } else {
            Feature::edge(vertex(f1 - offset, 0), vertex(f2 - offset, 1), 0, direction)
        }
    }

    fn mass(&self, density: f32) -> MassData {
        let r = self.cap_radius;
        let length = 2.0 * self.half_length;
        let height = 2.0 * r;

        let rect_mass = density * length * height;
        let rect_inertia = rect_mass * (length * length + height * height) / 12.0;

        // Two half-discs, each moved from its own centroid out to its cap.
        let disc_mass = density * PI * r * r;
        let centroid_offset = 4.0 * r / (3.0 * PI);
        let distance = self.half_length + centroid_offset;
        let disc_inertia =
            disc_mass * (0.5 * r * r - centroid_offset * centroid_offset + distance * distance);

        MassData::new(rect_mass + disc_mass, Vec2::ZERO, rect_inertia + disc_inertia)
    }
}
