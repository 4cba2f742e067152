//! Separating axis test.

use glam::Vec2;

use crate::error::CollisionError;
use crate::geometry::{Convex, Transform};

use super::{CircleDetector, NarrowphaseDetector, Penetration};

/// Separating axis test for shapes with a finite set of candidate axes.
///
/// Shapes without one (ellipses) yield [`CollisionError::Unsupported`];
/// [`super::FallbackDetector`] reroutes those pairs to GJK.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sat;

impl Sat {
    fn candidate_axes(
        a: &dyn Convex,
        ta: &Transform,
        b: &dyn Convex,
        tb: &Transform,
    ) -> Result<Vec<Vec2>, CollisionError> {
        let foci_a = a.foci(ta);
        let foci_b = b.foci(tb);
        let mut axes = a.axes(&foci_b, ta)?;
        axes.extend(b.axes(&foci_a, tb)?);
        Ok(axes)
    }
}

impl NarrowphaseDetector for Sat {
    fn detect(
        &self,
        a: &dyn Convex,
        ta: &Transform,
        b: &dyn Convex,
        tb: &Transform,
    ) -> Result<Option<Penetration>, CollisionError> {
        if CircleDetector::applies(a, b) {
            return Ok(CircleDetector.detect(a, ta, b, tb));
        }

        let mut best: Option<Penetration> = None;
        for axis in Self::candidate_axes(a, ta, b, tb)? {
            let pa = a.project(axis, ta);
            let pb = b.project(axis, tb);
            if !pa.overlaps(&pb) {
                return Ok(None);
            }
            // Either push B forward along the axis or back against it; the
            // cheaper direction also handles one interval containing the other.
            let forward = pa.max - pb.min;
            let backward = pb.max - pa.min;
            let candidate = if forward <= backward {
                Penetration::new(axis, forward)
            } else {
                Penetration::new(-axis, backward)
            };
            if best.map_or(true, |b| candidate.depth < b.depth) {
                best = Some(candidate);
            }
        }
        Ok(best.filter(|p| p.depth > 0.0))
    }

    fn intersects(
        &self,
        a: &dyn Convex,
        ta: &Transform,
        b: &dyn Convex,
        tb: &Transform,
    ) -> Result<bool, CollisionError> {
        if CircleDetector::applies(a, b) {
            return Ok(CircleDetector.detect(a, ta, b, tb).is_some());
        }
        for axis in Self::candidate_axes(a, ta, b, tb)? {
            if !a.project(axis, ta).overlaps(&b.project(axis, tb)) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Circle, Ellipse, Polygon, ShapeKind, Slice};
    use std::f32::consts::{FRAC_PI_2, PI};

    fn detect(
        a: &dyn Convex,
        ta: &Transform,
        b: &dyn Convex,
        tb: &Transform,
    ) -> Penetration {
        Sat.detect(a, ta, b, tb)
            .unwrap()
            .expect("expected a collision")
    }

    #[test]
    fn test_circle_vs_hexagon() {
        let circle = Circle::new(1.0).unwrap();
        let hex = Polygon::regular(6, 0.5).unwrap();
        let tc = Transform::identity();
        let th = Transform::from_translation(Vec2::new(1.25, 0.0));

        let p = detect(&circle, &tc, &hex, &th);
        assert!((p.depth - 0.25).abs() < 1e-3);
        assert!((p.normal - Vec2::X).length() < 1e-3);

        let p = detect(&hex, &th, &circle, &tc);
        assert!((p.depth - 0.25).abs() < 1e-3);
        assert!((p.normal - Vec2::NEG_X).length() < 1e-3);
    }

    #[test]
    fn test_touching_squares_do_not_collide() {
        let square = Polygon::square(1.0).unwrap();
        let tb = Transform::from_translation(Vec2::new(1.0, 0.0));
        assert!(!Sat.intersects(&square, &Transform::identity(), &square, &tb).unwrap());
        assert!(Sat
            .detect(&square, &Transform::identity(), &square, &tb)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_symmetric_normals() {
        let a = Polygon::rectangle(2.0, 1.0).unwrap();
        let b = Polygon::regular(5, 0.7).unwrap();
        let ta = Transform::new(Vec2::new(0.1, -0.2), 0.4);
        let tb = Transform::new(Vec2::new(1.2, 0.5), -1.1);
        let ab = detect(&a, &ta, &b, &tb);
        let ba = detect(&b, &tb, &a, &ta);
        assert!((ab.normal + ba.normal).length() < 1e-5);
        assert!((ab.depth - ba.depth).abs() < 1e-5);
    }

    #[test]
    fn test_contained_shape_pushes_out_the_short_way() {
        let big = Polygon::square(10.0).unwrap();
        let small = Polygon::square(1.0).unwrap();
        let tb = Transform::from_translation(Vec2::new(4.0, 0.0));
        let p = detect(&big, &Transform::identity(), &small, &tb);
        assert!((p.normal - Vec2::X).length() < 1e-6);
        assert!((p.depth - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_hexagon_inside_slice() {
        let slice = Slice::new(3.0, FRAC_PI_2).unwrap();
        let hex = Polygon::regular(6, 0.5).unwrap();
        let th = Transform::new(Vec2::new(1.5, 0.2), -PI / 12.0);
        let p = detect(&slice, &Transform::identity(), &hex, &th);
        let h = std::f32::consts::FRAC_1_SQRT_2;
        assert!((p.normal - Vec2::new(-h, h)).length() < 1e-3);
        assert!((p.depth - 1.3523).abs() < 1e-3);
    }

    #[test]
    fn test_ellipse_is_unsupported() {
        let e = Ellipse::new(2.0, 1.0).unwrap();
        let square = Polygon::square(1.0).unwrap();
        let t = Transform::identity();
        assert_eq!(
            Sat.detect(&e, &t, &square, &t),
            Err(CollisionError::Unsupported(ShapeKind::Ellipse))
        );
    }
}
