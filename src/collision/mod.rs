//! Narrow-phase collision detection and contact manifold generation.
//!
//! Detectors take two shapes with their placements and return owned results:
//! a [`Penetration`] when the shapes overlap, a [`Separation`] when they do
//! not. Touching shapes are neither colliding nor separated.

pub mod circle;
pub mod clipping;
pub mod epa;
pub mod fallback;
pub mod gjk;
pub mod link;
pub mod manifold;
pub mod sat;

use glam::Vec2;

use crate::error::CollisionError;
use crate::geometry::{Convex, Transform};

pub use self::circle::CircleDetector;
pub use self::clipping::ClippingManifoldSolver;
pub use self::epa::Epa;
pub use self::fallback::{DetectorKind, FallbackDetector};
pub use self::gjk::Gjk;
pub use self::link::LinkPostProcessor;
pub use self::manifold::{Manifold, ManifoldPoint, ManifoldPointId};
pub use self::sat::Sat;

/// Overlap of two shapes: moving shape B by `normal * depth` separates them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penetration {
    /// Unit normal pointing from shape A to shape B.
    pub normal: Vec2,
    pub depth: f32,
}

impl Penetration {
    pub fn new(normal: Vec2, depth: f32) -> Self {
        Self { normal, depth }
    }

    /// The same overlap seen from shape B.
    pub fn reversed(&self) -> Self {
        Self {
            normal: -self.normal,
            depth: self.depth,
        }
    }
}

/// Gap between two disjoint shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Separation {
    /// Unit normal pointing from shape A to shape B.
    pub normal: Vec2,
    pub distance: f32,
    /// Closest point on shape A.
    pub point_a: Vec2,
    /// Closest point on shape B.
    pub point_b: Vec2,
}

/// Overlap test between two convex shapes.
pub trait NarrowphaseDetector {
    /// Penetration of `b` into `a`, or `None` when they are disjoint or only
    /// touching.
    fn detect(
        &self,
        a: &dyn Convex,
        ta: &Transform,
        b: &dyn Convex,
        tb: &Transform,
    ) -> Result<Option<Penetration>, CollisionError>;

    fn intersects(
        &self,
        a: &dyn Convex,
        ta: &Transform,
        b: &dyn Convex,
        tb: &Transform,
    ) -> Result<bool, CollisionError> {
        Ok(self.detect(a, ta, b, tb)?.is_some())
    }
}

/// Closest-point query between two convex shapes.
pub trait DistanceDetector {
    /// Separation of two disjoint shapes, or `None` when they overlap or
    /// touch.
    fn distance(
        &self,
        a: &dyn Convex,
        ta: &Transform,
        b: &dyn Convex,
        tb: &Transform,
    ) -> Option<Separation>;
}
