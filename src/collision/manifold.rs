//! Contact manifolds: the points where two shapes touch.

use glam::Vec2;

/// Identity of a manifold point, used to match points across steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManifoldPointId {
    /// A point from a curved or vertex feature; matched by proximity.
    Distance,
    /// A clipped point, identified by the features that produced it.
    Indexed {
        reference_edge: usize,
        incident_edge: usize,
        incident_vertex: Option<usize>,
        /// Whether shape B supplied the reference edge.
        flipped: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManifoldPoint {
    /// World-space point, on the incident shape.
    pub point: Vec2,
    /// Penetration depth at this point.
    pub depth: f32,
    pub id: ManifoldPointId,
}

/// Up to two contact points sharing a normal.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifold {
    /// Unit normal from shape A to shape B.
    pub normal: Vec2,
    pub points: Vec<ManifoldPoint>,
}

impl Manifold {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}
