//! Circle shape.

use std::f32::consts::PI;

use glam::Vec2;

use crate::error::{CollisionError, ShapeError};

use super::{Aabb, Convex, Feature, Interval, MassData, ShapeKind, Transform, Vertex};

/// A circle, optionally offset from the local origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    center: Vec2,
    radius: f32,
}

impl Circle {
    /// Circle of `radius` centred on the local origin.
    pub fn new(radius: f32) -> Result<Self, ShapeError> {
        Self::at(Vec2::ZERO, radius)
    }

    /// Circle of `radius` centred on the local point `center`.
    pub fn at(center: Vec2, radius: f32) -> Result<Self, ShapeError> {
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(ShapeError::NonPositive {
                name: "radius",
                value: radius,
            });
        }
        Ok(Self { center, radius })
    }

    /// World-space centre.
    #[inline]
    pub fn world_center(&self, transform: &Transform) -> Vec2 {
        transform.transform_point(self.center)
    }
}

impl Convex for Circle {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Circle
    }

    fn center(&self) -> Vec2 {
        self.center
    }

    fn radius(&self) -> f32 {
        self.radius
    }

    fn support(&self, direction: Vec2, transform: &Transform) -> Vec2 {
        self.world_center(transform) + direction.normalize_or_zero() * self.radius
    }

    fn project(&self, axis: Vec2, transform: &Transform) -> Interval {
        let c = self.world_center(transform).dot(axis);
        Interval::new(c - self.radius, c + self.radius)
    }

    fn contains(&self, point: Vec2, transform: &Transform) -> bool {
        self.world_center(transform).distance_squared(point) <= self.radius * self.radius
    }

    fn foci(&self, transform: &Transform) -> Vec<Vec2> {
        vec![self.world_center(transform)]
    }

    fn axes(&self, foci: &[Vec2], transform: &Transform) -> Result<Vec<Vec2>, CollisionError> {
        let c = self.world_center(transform);
        Ok(foci
            .iter()
            .filter_map(|f| (*f - c).try_normalize())
            .collect())
    }

    fn farthest_feature(&self, direction: Vec2, transform: &Transform) -> Feature {
        Feature::Point(Vertex::unindexed(self.support(direction, transform)))
    }

    fn aabb(&self, transform: &Transform) -> Aabb {
        let c = self.world_center(transform);
        Aabb::new(c - Vec2::splat(self.radius), c + Vec2::splat(self.radius))
    }

    fn mass(&self, density: f32) -> MassData {
        let mass = density * PI * self.radius * self.radius;
        MassData::new(mass, self.center, 0.5 * mass * self.radius * self.radius)
    }
}
