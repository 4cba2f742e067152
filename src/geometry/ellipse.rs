//! Axis-aligned (in local space) ellipse. Only usable with GJK.

use std::f32::consts::PI;

use glam::Vec2;

use super::{Convex, Feature, MassData, ShapeKind, Transform, Vertex, ZERO_LENGTH_SQUARED};
use crate::error::ShapeError;

#[derive(Debug, Clone, PartialEq)]
pub struct Ellipse {
    half_width: f32,
    half_height: f32,
}

impl Ellipse {
    pub fn new(width: f32, height: f32) -> Result<Self, ShapeError> {
        for (name, value) in [("width", width), ("height", height)] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ShapeError::NonPositive { name, value });
            }
        }
        Ok(Self {
            half_width: width * 0.5,
            half_height: height * 0.5,
        })
    }

    pub fn half_width(&self) -> f32 {
        self.half_width
    }

    pub fn half_height(&self) -> f32 {
        self.half_height
    }

    fn local_support(&self, d: Vec2) -> Vec2 {
        let a2 = self.half_width * self.half_width;
        let b2 = self.half_height * self.half_height;
        let denom = (a2 * d.x * d.x + b2 * d.y * d.y).sqrt();
        if denom * denom <= ZERO_LENGTH_SQUARED {
            return Vec2::ZERO;
        }
        Vec2::new(a2 * d.x, b2 * d.y) / denom
    }
}

impl Convex for Ellipse {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Ellipse
    }

    fn center(&self) -> Vec2 {
        Vec2::ZERO
    }

    fn radius(&self) -> f32 {
        self.half_width.max(self.half_height)
    }

    fn support(&self, direction: Vec2, transform: &Transform) -> Vec2 {
        let local = transform.inverse_rotate(direction);
        transform.transform_point(self.local_support(local))
    }

    fn contains(&self, point: Vec2, transform: &Transform) -> bool {
        let p = transform.inverse_transform_point(point);
        let x = p.x / self.half_width;
        let y = p.y / self.half_height;
        x * x + y * y <= 1.0
    }

    fn farthest_feature(&self, direction: Vec2, transform: &Transform) -> Feature {
        Feature::Point(Vertex::unindexed(self.support(direction, transform)))
    }

    fn mass(&self, density: f32) -> MassData {
        let (a, b) = (self.half_width, self.half_height);
        let mass = density * PI * a * b;
        MassData::new(mass, Vec2::ZERO, mass * (a * a + b * b) * 0.25)
    }
}
