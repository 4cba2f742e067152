//! Narrowphase: exact contact generation for one candidate pair.
//!
//! Detection (SAT or GJK through the fallback table), link post-processing,
//! then manifold clipping.

use crate::collision::{
    ClippingManifoldSolver, FallbackDetector, LinkPostProcessor, Manifold, Penetration,
};
use crate::geometry::{Convex, Transform};

use super::events::{FixtureRef, Flow, PhysicsEvent};
use super::settings::Settings;

/// One side of a candidate pair.
#[derive(Clone, Copy)]
pub struct PairSide<'a> {
    pub id: FixtureRef,
    pub shape: &'a dyn Convex,
    /// World placement of the shape.
    pub transform: Transform,
}

/// Per-pair contact pipeline.
#[derive(Debug, Clone, Default)]
pub struct Narrowphase {
    detector: FallbackDetector,
    manifolds: ClippingManifoldSolver,
    links: LinkPostProcessor,
}

impl Narrowphase {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            detector: FallbackDetector::from_settings(settings),
            manifolds: ClippingManifoldSolver,
            links: LinkPostProcessor,
        }
    }

    pub fn detector(&self) -> &FallbackDetector {
        &self.detector
    }

    /// Access to the detector table, e.g. to route a pair of shape kinds
    /// to a different algorithm.
    pub fn detector_mut(&mut self) -> &mut FallbackDetector {
        &mut self.detector
    }

    /// Penetration of two placed shapes after link correction.
    pub fn penetration(
        &self,
        a: &dyn Convex,
        ta: &Transform,
        b: &dyn Convex,
        tb: &Transform,
    ) -> Option<Penetration> {
        let penetration = self.detector.penetration(a, ta, b, tb)?;
        self.links.process(a, ta, b, tb, penetration)
    }

    /// Manifold for two placed shapes, without notifying anyone.
    pub fn detect_collision(
        &self,
        a: &dyn Convex,
        ta: &Transform,
        b: &dyn Convex,
        tb: &Transform,
    ) -> Option<Manifold> {
        let penetration = self.penetration(a, ta, b, tb)?;
        self.manifolds.manifold(&penetration, a, ta, b, tb)
    }

    /// Manifold for a candidate pair, emitting the narrowphase and manifold
    /// events. A halting listener drops the pair for this step.
    pub(crate) fn collide(
        &self,
        a: &PairSide<'_>,
        b: &PairSide<'_>,
        emit: &mut dyn FnMut(&PhysicsEvent<'_>) -> Flow,
    ) -> Option<Manifold> {
        let penetration = self.penetration(a.shape, &a.transform, b.shape, &b.transform)?;
        let event = PhysicsEvent::Narrowphase {
            a: a.id,
            b: b.id,
            penetration: &penetration,
        };
        if emit(&event) == Flow::Halt {
            return None;
        }

        let manifold =
            self.manifolds
                .manifold(&penetration, a.shape, &a.transform, b.shape, &b.transform)?;
        let event = PhysicsEvent::Manifold {
            a: a.id,
            b: b.id,
            manifold: &manifold,
        };
        if emit(&event) == Flow::Halt {
            return None;
        }
        Some(manifold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Circle, Link, Polygon};
    use glam::Vec2;

    #[test]
    fn test_box_on_box_gives_two_points() {
        let narrowphase = Narrowphase::default();
        let ground = Polygon::rectangle(10.0, 1.0).unwrap();
        let crate_ = Polygon::square(1.0).unwrap();
        let m = narrowphase
            .detect_collision(
                &ground,
                &Transform::identity(),
                &crate_,
                &Transform::from_translation(Vec2::new(0.0, 0.98)),
            )
            .expect("expected a manifold");
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn test_link_back_side_never_collides() {
        let narrowphase = Narrowphase::default();
        let links = Link::chain(&[Vec2::new(1.0, 0.0), Vec2::new(-1.0, 0.0)], false).unwrap();
        let ball = Circle::new(0.5).unwrap();
        let below = Transform::from_translation(Vec2::new(0.0, -0.3));
        assert!(narrowphase
            .detect_collision(&links[0], &Transform::identity(), &ball, &below)
            .is_none());
        let above = Transform::from_translation(Vec2::new(0.0, 0.3));
        assert!(narrowphase
            .detect_collision(&links[0], &Transform::identity(), &ball, &above)
            .is_some());
    }

    #[test]
    fn test_halting_listener_drops_pair() {
        let narrowphase = Narrowphase::default();
        let mut world = hecs::World::new();
        let (ea, eb) = (world.spawn(()), world.spawn(()));
        let circle = Circle::new(1.0).unwrap();
        let a = PairSide {
            id: FixtureRef {
                entity: ea,
                fixture: 0,
            },
            shape: &circle,
            transform: Transform::identity(),
        };
        let b = PairSide {
            id: FixtureRef {
                entity: eb,
                fixture: 0,
            },
            shape: &circle,
            transform: Transform::from_translation(Vec2::new(1.5, 0.0)),
        };

        let mut seen = Vec::new();
        let manifold = narrowphase.collide(&a, &b, &mut |event| {
            seen.push(matches!(event, PhysicsEvent::Narrowphase { .. }));
            Flow::Continue
        });
        assert!(manifold.is_some());
        assert_eq!(seen, vec![true, false]);

        let manifold = narrowphase.collide(&a, &b, &mut |event| match event {
            PhysicsEvent::Manifold { .. } => Flow::Halt,
            _ => Flow::Continue,
        });
        assert!(manifold.is_none());
    }
}
