//! Shape features used by manifold clipping and contact identity.

use glam::Vec2;

/// A (possibly interpolated) vertex with the index of the shape vertex it
/// came from, or `None` when it does not correspond to a shape vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub point: Vec2,
    pub index: Option<usize>,
}

impl Vertex {
    pub fn indexed(point: Vec2, index: usize) -> Self {
        Self {
            point,
            index: Some(index),
        }
    }

    pub fn unindexed(point: Vec2) -> Self {
        Self { point, index: None }
    }
}

/// An edge of a shape, in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeFeature {
    pub v1: Vertex,
    pub v2: Vertex,
    /// The endpoint farthest along the query direction.
    pub max: Vertex,
    /// Index of the edge on its shape.
    pub index: usize,
}

impl EdgeFeature {
    /// Edge vector from `v1` to `v2`.
    #[inline]
    pub fn edge(&self) -> Vec2 {
        self.v2.point - self.v1.point
    }
}

/// The part of a shape that is farthest along a direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Feature {
    Point(Vertex),
    Edge(EdgeFeature),
}

impl Feature {
    /// Build an edge feature, choosing `max` by projection onto `direction`.
    pub fn edge(v1: Vertex, v2: Vertex, index: usize, direction: Vec2) -> Self {
        let max = if v1.point.dot(direction) >= v2.point.dot(direction) {
            v1
        } else {
            v2
        };
        Feature::Edge(EdgeFeature { v1, v2, max, index })
    }
}
