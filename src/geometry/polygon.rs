//! Convex polygon shape.

use std::f32::consts::TAU;

use glam::Vec2;

use crate::error::{CollisionError, ShapeError};

use super::{
    focus_axes, right_perp, Aabb, Convex, Feature, Interval, MassData, ShapeKind, Transform,
    Vertex, ZERO_LENGTH_SQUARED,
};

/// A convex polygon with counter-clockwise winding.
///
/// Edge `i` runs from vertex `i` to vertex `i + 1` (wrapping) and its outward
/// normal is `normals[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Vec2>,
    normals: Vec<Vec2>,
    center: Vec2,
    radius: f32,
}

impl Polygon {
    /// Build a polygon from counter-clockwise local vertices.
    pub fn new(vertices: Vec<Vec2>) -> Result<Self, ShapeError> {
        let n = vertices.len();
        if n < 3 {
            return Err(ShapeError::TooFewVertices(n));
        }
        for i in 0..n {
            let j = (i + 1) % n;
            if vertices[i].distance_squared(vertices[j]) <= ZERO_LENGTH_SQUARED {
                return Err(ShapeError::CoincidentVertices(i, j));
            }
        }

        let mut signed_area = 0.0;
        for i in 0..n {
            signed_area += vertices[i].perp_dot(vertices[(i + 1) % n]);
        }
        signed_area *= 0.5;
        let scale = Aabb::from_points(&vertices).map_or(0.0, |b| b.extents().length_squared());
        if signed_area.abs() <= f32::EPSILON * scale {
            return Err(ShapeError::ZeroArea);
        }
        if signed_area < 0.0 {
            return Err(ShapeError::ClockwiseWinding);
        }
        let mut turning = 0.0;
        for i in 0..n {
            let e1 = vertices[(i + 1) % n] - vertices[i];
            let e2 = vertices[(i + 2) % n] - vertices[(i + 1) % n];
            let cross = e1.perp_dot(e2);
            if cross < 0.0 {
                return Err(ShapeError::NonConvex);
            }
            turning += cross.atan2(e1.dot(e2));
        }
        // Left turns only, but wound more than once (a star).
        if (turning - TAU).abs() > 1e-3 {
            return Err(ShapeError::NonConvex);
        }

        let normals = (0..n)
            .map(|i| right_perp(vertices[(i + 1) % n] - vertices[i]).normalize())
            .collect();
        let center = centroid(&vertices);
        let radius = vertices
            .iter()
            .map(|v| v.distance(center))
            .fold(0.0, f32::max);

        Ok(Self {
            vertices,
            normals,
            center,
            radius,
        })
    }

    /// Axis-aligned rectangle centred on the origin.
    pub fn rectangle(width: f32, height: f32) -> Result<Self, ShapeError> {
        check_positive("width", width)?;
        check_positive("height", height)?;
        let (hw, hh) = (width * 0.5, height * 0.5);
        Self::new(vec![
            Vec2::new(-hw, -hh),
            Vec2::new(hw, -hh),
            Vec2::new(hw, hh),
            Vec2::new(-hw, hh),
        ])
    }

    pub fn square(size: f32) -> Result<Self, ShapeError> {
        Self::rectangle(size, size)
    }

    /// Regular polygon of `count` vertices on a circle of `radius`, with the
    /// first vertex on the +x axis.
    pub fn regular(count: usize, radius: f32) -> Result<Self, ShapeError> {
        if count < 3 {
            return Err(ShapeError::TooFewVertices(count));
        }
        check_positive("radius", radius)?;
        let step = TAU / count as f32;
        Self::new(
            (0..count)
                .map(|i| Vec2::from_angle(step * i as f32) * radius)
                .collect(),
        )
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn normals(&self) -> &[Vec2] {
        &self.normals
    }

    fn world_vertices(&self, transform: &Transform) -> Vec<Vec2> {
        self.vertices
            .iter()
            .map(|v| transform.transform_point(*v))
            .collect()
    }

    /// Index of the local vertex farthest along the local direction.
    fn max_vertex(&self, local_direction: Vec2) -> usize {
        let mut best = 0;
        let mut best_dot = self.vertices[0].dot(local_direction);
        for (i, v) in self.vertices.iter().enumerate().skip(1) {
            let d = v.dot(local_direction);
            if d > best_dot {
                best_dot = d;
                best = i;
            }
        }
        best
    }
}

fn check_positive(name: &'static str, value: f32) -> Result<(), ShapeError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ShapeError::NonPositive { name, value })
    }
}

/// Area-weighted centroid of a simple polygon.
fn centroid(vertices: &[Vec2]) -> Vec2 {
    let origin = vertices[0];
    let mut center = Vec2::ZERO;
    let mut area = 0.0;
    for i in 1..vertices.len() - 1 {
        let e1 = vertices[i] - origin;
        let e2 = vertices[i + 1] - origin;
        let tri = 0.5 * e1.perp_dot(e2);
        area += tri;
        center += (e1 + e2) * (tri / 3.0);
    }
    origin + center / area
}

impl Convex for Polygon {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Polygon
    }

    fn center(&self) -> Vec2 {
        self.center
    }

    fn radius(&self) -> f32 {
        self.radius
    }

    fn support(&self, direction: Vec2, transform: &Transform) -> Vec2 {
        let local = transform.inverse_rotate(direction);
        transform.transform_point(self.vertices[self.max_vertex(local)])
    }

    fn project(&self, axis: Vec2, transform: &Transform) -> Interval {
        let local = transform.inverse_rotate(axis);
        let offset = transform.translation.dot(axis);
        let (mut min, mut max) = (f32::MAX, f32::MIN);
        for v in &self.vertices {
            let d = v.dot(local);
            min = min.min(d);
            max = max.max(d);
        }
        Interval::new(min + offset, max + offset)
    }

    fn contains(&self, point: Vec2, transform: &Transform) -> bool {
        let local = transform.inverse_transform_point(point);
        self.vertices
            .iter()
            .zip(&self.normals)
            .all(|(v, n)| n.dot(local - *v) <= 0.0)
    }

    fn axes(&self, foci: &[Vec2], transform: &Transform) -> Result<Vec<Vec2>, CollisionError> {
        let mut axes: Vec<Vec2> = self.normals.iter().map(|n| transform.rotate(*n)).collect();
        if !foci.is_empty() {
            axes.extend(focus_axes(&self.world_vertices(transform), foci));
        }
        Ok(axes)
    }

    fn farthest_feature(&self, direction: Vec2, transform: &Transform) -> Feature {
        let local = transform.inverse_rotate(direction);
        let n = self.vertices.len();
        let i = self.max_vertex(local);
        let prev = (i + n - 1) % n;
        let next = (i + 1) % n;

        let max = self.vertices[i];
        let left = (max - self.vertices[prev]).normalize();
        let right = (self.vertices[next] - max).normalize();

        let world = |k: usize| Vertex::indexed(transform.transform_point(self.vertices[k]), k);
        // The edge more perpendicular to the direction is the face.
        if right.dot(local).abs() <= left.dot(local).abs() {
            Feature::edge(world(i), world(next), i, direction)
        } else {
            Feature::edge(world(prev), world(i), prev, direction)
        }
    }

    fn aabb(&self, transform: &Transform) -> Aabb {
        let world = self.world_vertices(transform);
        Aabb::from_points(&world).unwrap_or_else(|| {
            Aabb::new(transform.translation, transform.translation)
        })
    }

    fn mass(&self, density: f32) -> MassData {
        // Triangle fan about the first vertex; inertia is accumulated about
        // that vertex and shifted to the centroid at the end.
        let origin = self.vertices[0];
        let mut area = 0.0;
        let mut center = Vec2::ZERO;
        let mut inertia = 0.0;
        for i in 1..self.vertices.len() - 1 {
            let e1 = self.vertices[i] - origin;
            let e2 = self.vertices[i + 1] - origin;
            let d = e1.perp_dot(e2);
            let tri = 0.5 * d;
            area += tri;
            center += (e1 + e2) * (tri / 3.0);

            let int_x2 = e1.x * e1.x + e2.x * e1.x + e2.x * e2.x;
            let int_y2 = e1.y * e1.y + e2.y * e1.y + e2.y * e2.y;
            inertia += (0.25 / 3.0) * d * (int_x2 + int_y2);
        }
        let mass = density * area;
        center /= area;
        let inertia = density * inertia - mass * center.length_squared();
        MassData::new(mass, origin + center, inertia)
    }
}
