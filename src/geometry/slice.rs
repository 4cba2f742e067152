//! Circular sector ("pie slice") shape.

use std::f32::consts::PI;

use glam::Vec2;

use crate::error::{CollisionError, ShapeError};

use super::{right_perp, Convex, Feature, MassData, ShapeKind, Transform, Vertex};

/// A circular sector with its apex at the local origin, opening symmetrically
/// about +x.
///
/// Vertex 0 is the apex, 1 the lower arc end and 2 the upper arc end. Edge 0
/// runs apex to lower end and edge 2 runs upper end to apex.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    radius: f32,
    theta: f32,
    cos_half: f32,
    vertices: [Vec2; 3],
    /// Outward normals of edge 0 and edge 2.
    normals: [Vec2; 2],
    center: Vec2,
    bounding_radius: f32,
}

impl Slice {
    /// Slice of the given `radius` spanning `theta` radians, `0 < theta <= pi`.
    pub fn new(radius: f32, theta: f32) -> Result<Self, ShapeError> {
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(ShapeError::NonPositive {
                name: "radius",
                value: radius,
            });
        }
        if !(theta > 0.0 && theta <= PI) {
            return Err(ShapeError::OutOfRange {
                name: "theta",
                value: theta,
                min: 0.0,
                max: PI,
            });
        }
        let alpha = theta * 0.5;
        let (sin, cos) = alpha.sin_cos();
        let apex = Vec2::ZERO;
        let lower = Vec2::new(cos, -sin) * radius;
        let upper = Vec2::new(cos, sin) * radius;
        let center = Vec2::new(2.0 * radius * sin / (3.0 * alpha), 0.0);

        Ok(Self {
            radius,
            theta,
            cos_half: cos,
            vertices: [apex, lower, upper],
            normals: [
                right_perp(lower - apex).normalize(),
                right_perp(apex - upper).normalize(),
            ],
            center,
            bounding_radius: center.x.max(center.distance(upper)),
        })
    }

    pub fn theta(&self) -> f32 {
        self.theta
    }

    /// Whether the local unit direction points through the arc.
    fn in_arc(&self, local: Vec2) -> bool {
        local.x >= self.cos_half
    }
}

impl Convex for Slice {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Slice
    }

    fn center(&self) -> Vec2 {
        self.center
    }

    fn radius(&self) -> f32 {
        self.bounding_radius
    }

    fn support(&self, direction: Vec2, transform: &Transform) -> Vec2 {
        let local = transform.inverse_rotate(direction).normalize_or_zero();
        if self.in_arc(local) {
            return transform.transform_point(local * self.radius);
        }
        let best = self
            .vertices
            .iter()
            .copied()
            .max_by(|a, b| a.dot(local).total_cmp(&b.dot(local)))
            .unwrap_or(Vec2::ZERO);
        transform.transform_point(best)
    }

    fn contains(&self, point: Vec2, transform: &Transform) -> bool {
        let local = transform.inverse_transform_point(point);
        let length_sq = local.length_squared();
        if length_sq > self.radius * self.radius {
            return false;
        }
        length_sq == 0.0 || self.in_arc(local / length_sq.sqrt())
    }

    fn foci(&self, transform: &Transform) -> Vec<Vec2> {
        vec![transform.translation]
    }

    fn axes(&self, foci: &[Vec2], transform: &Transform) -> Result<Vec<Vec2>, CollisionError> {
        let apex = transform.translation;
        let mut axes: Vec<Vec2> = self.normals.iter().map(|n| transform.rotate(*n)).collect();
        axes.extend(foci.iter().filter_map(|f| (*f - apex).try_normalize()));
        Ok(axes)
    }

    fn farthest_feature(&self, direction: Vec2, transform: &Transform) -> Feature {
        let local = transform.inverse_rotate(direction).normalize_or_zero();
        if self.in_arc(local) {
            return Feature::Point(Vertex::unindexed(self.support(direction, transform)));
        }

        let vertex = |i: usize| Vertex::indexed(transform.transform_point(self.vertices[i]), i);
        let lower_edge = || Feature::edge(vertex(0), vertex(1), 0, direction);
        let upper_edge = || Feature::edge(vertex(2), vertex(0), 2, direction);

        let dots = self.vertices.map(|v| v.dot(local));
        if dots[1] > dots[0] && dots[1] >= dots[2] {
            lower_edge()
        } else if dots[2] > dots[0] && dots[2] > dots[1] {
            upper_edge()
        } else {
            // Apex: take whichever straight edge faces the direction more.
            let lower = (self.vertices[1] - self.vertices[0]).normalize();
            let upper = (self.vertices[0] - self.vertices[2]).normalize();
            if lower.dot(local).abs() <= upper.dot(local).abs() {
                lower_edge()
            } else {
                upper_edge()
            }
        }
    }

    fn mass(&self, density: f32) -> MassData {
        let alpha = self.theta * 0.5;
        let mass = density * self.radius * self.radius * alpha;
        // A sector's inertia about its apex is m r^2 / 2.
        let inertia = 0.5 * mass * self.radius * self.radius - mass * self.center.length_squared();
        MassData::new(mass, self.center, inertia)
    }
}
