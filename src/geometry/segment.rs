//! Line segment shape.

use glam::Vec2;

use crate::error::{CollisionError, ShapeError};

use super::{
    closest_point_on_segment, focus_axes, right_perp, Aabb, Convex, Feature, Interval, MassData,
    ShapeKind, Transform, Vertex, ZERO_LENGTH_SQUARED,
};

/// Squared distance within which a point counts as lying on a segment.
const ON_SEGMENT_SQUARED: f32 = 1e-8;

/// A two-sided segment between two local points.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    p1: Vec2,
    p2: Vec2,
    normal: Vec2,
    length: f32,
}

impl Segment {
    pub fn new(p1: Vec2, p2: Vec2) -> Result<Self, ShapeError> {
        if p1.distance_squared(p2) <= ZERO_LENGTH_SQUARED {
            return Err(ShapeError::CoincidentVertices(0, 1));
        }
        Ok(Self {
            p1,
            p2,
            normal: right_perp(p2 - p1).normalize(),
            length: p1.distance(p2),
        })
    }

    pub fn p1(&self) -> Vec2 {
        self.p1
    }

    pub fn p2(&self) -> Vec2 {
        self.p2
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    /// Local unit normal, the right-hand perpendicular of `p2 - p1`.
    pub fn normal(&self) -> Vec2 {
        self.normal
    }

    pub(crate) fn world_points(&self, transform: &Transform) -> [Vec2; 2] {
        [
            transform.transform_point(self.p1),
            transform.transform_point(self.p2),
        ]
    }
}

impl Convex for Segment {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Segment
    }

    fn center(&self) -> Vec2 {
        (self.p1 + self.p2) * 0.5
    }

    fn radius(&self) -> f32 {
        self.length * 0.5
    }

    fn support(&self, direction: Vec2, transform: &Transform) -> Vec2 {
        let local = transform.inverse_rotate(direction);
        let p = if self.p1.dot(local) >= self.p2.dot(local) {
            self.p1
        } else {
            self.p2
        };
        transform.transform_point(p)
    }

    fn project(&self, axis: Vec2, transform: &Transform) -> Interval {
        let [a, b] = self.world_points(transform);
        Interval::new(a.dot(axis).min(b.dot(axis)), a.dot(axis).max(b.dot(axis)))
    }

    fn contains(&self, point: Vec2, transform: &Transform) -> bool {
        let local = transform.inverse_transform_point(point);
        let (closest, _) = closest_point_on_segment(local, self.p1, self.p2);
        closest.distance_squared(local) <= ON_SEGMENT_SQUARED
    }

    fn axes(&self, foci: &[Vec2], transform: &Transform) -> Result<Vec<Vec2>, CollisionError> {
        let mut axes = vec![transform.rotate(self.normal)];
        axes.extend(focus_axes(&self.world_points(transform), foci));
        Ok(axes)
    }

    fn farthest_feature(&self, direction: Vec2, transform: &Transform) -> Feature {
        let [a, b] = self.world_points(transform);
        Feature::edge(Vertex::indexed(a, 0), Vertex::indexed(b, 1), 0, direction)
    }

    fn aabb(&self, transform: &Transform) -> Aabb {
        let [a, b] = self.world_points(transform);
        Aabb::new(a.min(b), a.max(b))
    }

    fn mass(&self, density: f32) -> MassData {
        let mass = density * self.length;
        MassData::new(mass, self.center(), mass * self.length * self.length / 12.0)
    }
}
