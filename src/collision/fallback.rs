//! Per shape-pair choice between SAT and GJK.

use std::collections::HashMap;

use crate::error::CollisionError;
use crate::geometry::{Convex, ShapeKind, Transform};
use crate::physics::settings::Settings;

use super::{DistanceDetector, Gjk, NarrowphaseDetector, Penetration, Sat, Separation};

/// Which algorithm handles a pair of shape kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectorKind {
    Sat,
    Gjk,
}

/// Routes each pair to SAT or GJK through a table keyed by the (unordered)
/// pair of shape kinds. Pairs missing from the table use SAT, and any pair
/// SAT reports as unsupported is retried with GJK.
#[derive(Debug, Clone)]
pub struct FallbackDetector {
    sat: Sat,
    gjk: Gjk,
    table: HashMap<(ShapeKind, ShapeKind), DetectorKind>,
}

impl Default for FallbackDetector {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

fn key(a: ShapeKind, b: ShapeKind) -> (ShapeKind, ShapeKind) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl FallbackDetector {
    /// Detector with the default routing: curved pairs whose SAT axis sets
    /// are approximate go to GJK.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut detector = Self {
            sat: Sat,
            gjk: Gjk::from_settings(settings),
            table: HashMap::new(),
        };
        use ShapeKind::*;
        for kind in [Circle, Polygon, Ellipse, Segment, Link, Capsule, Slice] {
            detector.register(Ellipse, kind, DetectorKind::Gjk);
        }
        for kind in [Circle, Segment, Link, Capsule, Slice] {
            detector.register(Slice, kind, DetectorKind::Gjk);
        }
        detector.register(Capsule, Capsule, DetectorKind::Gjk);
        detector
    }

    /// Route pairs of `a` and `b` (in either order) to `detector`.
    pub fn register(&mut self, a: ShapeKind, b: ShapeKind, detector: DetectorKind) {
        self.table.insert(key(a, b), detector);
    }

    pub fn detector_for(&self, a: ShapeKind, b: ShapeKind) -> DetectorKind {
        self.table
            .get(&key(a, b))
            .copied()
            .unwrap_or(DetectorKind::Sat)
    }

    pub fn gjk(&self) -> &Gjk {
        &self.gjk
    }

    /// Penetration of the pair using whichever algorithm is registered.
    pub fn penetration(
        &self,
        a: &dyn Convex,
        ta: &Transform,
        b: &dyn Convex,
        tb: &Transform,
    ) -> Option<Penetration> {
        if self.detector_for(a.kind(), b.kind()) == DetectorKind::Sat {
            match self.sat.detect(a, ta, b, tb) {
                Ok(result) => return result,
                Err(CollisionError::Unsupported(kind)) => {
                    tracing::trace!(?kind, "SAT unsupported, falling back to GJK");
                }
            }
        }
        self.gjk.detect(a, ta, b, tb).unwrap_or_default()
    }
}

impl NarrowphaseDetector for FallbackDetector {
    fn detect(
        &self,
        a: &dyn Convex,
        ta: &Transform,
        b: &dyn Convex,
        tb: &Transform,
    ) -> Result<Option<Penetration>, CollisionError> {
        Ok(self.penetration(a, ta, b, tb))
    }
}

impl DistanceDetector for FallbackDetector {
    fn distance(
        &self,
        a: &dyn Convex,
        ta: &Transform,
        b: &dyn Convex,
        tb: &Transform,
    ) -> Option<Separation> {
        self.gjk.distance(a, ta, b, tb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Ellipse, Polygon};
    use glam::Vec2;

    #[test]
    fn test_default_routing() {
        let detector = FallbackDetector::default();
        assert_eq!(
            detector.detector_for(ShapeKind::Polygon, ShapeKind::Polygon),
            DetectorKind::Sat
        );
        assert_eq!(
            detector.detector_for(ShapeKind::Polygon, ShapeKind::Ellipse),
            DetectorKind::Gjk
        );
        assert_eq!(
            detector.detector_for(ShapeKind::Ellipse, ShapeKind::Polygon),
            DetectorKind::Gjk
        );
    }

    #[test]
    fn test_register_overrides_either_order() {
        let mut detector = FallbackDetector::default();
        detector.register(ShapeKind::Polygon, ShapeKind::Circle, DetectorKind::Gjk);
        assert_eq!(
            detector.detector_for(ShapeKind::Circle, ShapeKind::Polygon),
            DetectorKind::Gjk
        );
    }

    #[test]
    fn test_unsupported_sat_falls_back() {
        let mut detector = FallbackDetector::default();
        // Force SAT so the unsupported error path is taken.
        detector.register(ShapeKind::Ellipse, ShapeKind::Polygon, DetectorKind::Sat);
        let e = Ellipse::new(2.0, 1.0).unwrap();
        let square = Polygon::square(1.0).unwrap();
        let tb = Transform::from_translation(Vec2::new(1.4, 0.0));
        let p = detector
            .detect(&e, &Transform::identity(), &square, &tb)
            .unwrap()
            .expect("expected a collision");
        assert!((p.depth - 0.1).abs() < 1e-2);
    }
}
