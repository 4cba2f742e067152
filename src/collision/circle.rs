//! Closed-form circle/circle tests shared by SAT and GJK.

use glam::Vec2;

use crate::geometry::{Convex, ShapeKind, Transform, ZERO_LENGTH_SQUARED};

use super::{Penetration, Separation};

/// Exact detector for pairs of circles.
#[derive(Debug, Default, Clone, Copy)]
pub struct CircleDetector;

impl CircleDetector {
    /// Whether both shapes are circles and this detector applies.
    pub fn applies(a: &dyn Convex, b: &dyn Convex) -> bool {
        a.kind() == ShapeKind::Circle && b.kind() == ShapeKind::Circle
    }

    fn centers(
        a: &dyn Convex,
        ta: &Transform,
        b: &dyn Convex,
        tb: &Transform,
    ) -> (Vec2, Vec2) {
        (
            ta.transform_point(a.center()),
            tb.transform_point(b.center()),
        )
    }

    pub fn detect(
        &self,
        a: &dyn Convex,
        ta: &Transform,
        b: &dyn Convex,
        tb: &Transform,
    ) -> Option<Penetration> {
        let (ca, cb) = Self::centers(a, ta, b, tb);
        let radii = a.radius() + b.radius();
        let offset = cb - ca;
        let dist_sq = offset.length_squared();
        if dist_sq >= radii * radii {
            return None;
        }
        if dist_sq <= ZERO_LENGTH_SQUARED {
            // Concentric: any direction separates equally well.
            return Some(Penetration::new(Vec2::X, radii));
        }
        let dist = dist_sq.sqrt();
        Some(Penetration::new(offset / dist, radii - dist))
    }

    pub fn distance(
        &self,
        a: &dyn Convex,
        ta: &Transform,
        b: &dyn Convex,
        tb: &Transform,
    ) -> Option<Separation> {
        let (ca, cb) = Self::centers(a, ta, b, tb);
        let radii = a.radius() + b.radius();
        let offset = cb - ca;
        let dist = offset.length();
        if dist <= radii {
            return None;
        }
        let normal = offset / dist;
        Some(Separation {
            normal,
            distance: dist - radii,
            point_a: ca + normal * a.radius(),
            point_b: cb - normal * b.radius(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Circle;

    #[test]
    fn test_overlapping_circles() {
        let a = Circle::new(1.0).unwrap();
        let b = Circle::new(0.5).unwrap();
        let tb = Transform::from_translation(Vec2::new(0.0, 1.25));
        let p = CircleDetector
            .detect(&a, &Transform::identity(), &b, &tb)
            .expect("expected a collision");
        assert!((p.normal - Vec2::Y).length() < 1e-6);
        assert!((p.depth - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_touching_circles_do_not_collide() {
        let a = Circle::new(1.0).unwrap();
        let tb = Transform::from_translation(Vec2::new(2.0, 0.0));
        assert!(CircleDetector
            .detect(&a, &Transform::identity(), &a, &tb)
            .is_none());
        assert!(CircleDetector
            .distance(&a, &Transform::identity(), &a, &tb)
            .is_none());
    }

    #[test]
    fn test_separated_circles() {
        let a = Circle::new(1.0).unwrap();
        let tb = Transform::from_translation(Vec2::new(3.0, 0.0));
        let s = CircleDetector
            .distance(&a, &Transform::identity(), &a, &tb)
            .expect("expected a separation");
        assert!((s.distance - 1.0).abs() < 1e-6);
        assert!((s.point_a - Vec2::new(1.0, 0.0)).length() < 1e-6);
        assert!((s.point_b - Vec2::new(2.0, 0.0)).length() < 1e-6);
    }
}
