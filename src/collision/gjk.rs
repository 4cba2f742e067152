//! Gilbert-Johnson-Keerthi collision and distance queries.

use glam::Vec2;

use crate::error::CollisionError;
use crate::geometry::{Convex, Transform, ZERO_LENGTH_SQUARED};
use crate::physics::settings::Settings;

use super::{CircleDetector, DistanceDetector, Epa, NarrowphaseDetector, Penetration, Separation};

/// Distance of the origin from a simplex edge below which the shapes are
/// considered to be touching.
const TOUCHING_EPSILON: f32 = 1e-6;

/// A point of the Minkowski difference A - B, with the support points of
/// each shape that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinkowskiPoint {
    pub point: Vec2,
    pub support_a: Vec2,
    pub support_b: Vec2,
}

/// Support mapping of the Minkowski difference of two placed shapes.
pub(crate) struct MinkowskiDifference<'a> {
    a: &'a dyn Convex,
    ta: &'a Transform,
    b: &'a dyn Convex,
    tb: &'a Transform,
}

impl<'a> MinkowskiDifference<'a> {
    pub(crate) fn new(
        a: &'a dyn Convex,
        ta: &'a Transform,
        b: &'a dyn Convex,
        tb: &'a Transform,
    ) -> Self {
        Self { a, ta, b, tb }
    }

    pub(crate) fn support(&self, direction: Vec2) -> MinkowskiPoint {
        let support_a = self.a.support(direction, self.ta);
        let support_b = self.b.support(-direction, self.tb);
        MinkowskiPoint {
            point: support_a - support_b,
            support_a,
            support_b,
        }
    }

    /// Direction from A's centre to B's centre, or +x when they coincide.
    fn initial_direction(&self) -> Vec2 {
        let d = self.tb.transform_point(self.b.center()) - self.ta.transform_point(self.a.center());
        if d.length_squared() <= ZERO_LENGTH_SQUARED {
            Vec2::X
        } else {
            d
        }
    }
}

/// `(a x b) x c` in the plane.
#[inline]
fn triple_product(a: Vec2, b: Vec2, c: Vec2) -> Vec2 {
    c.perp() * a.perp_dot(b)
}

/// Outcome of one simplex refinement.
enum Step {
    Continue(Vec2),
    Enclosed,
    Touching,
}

/// GJK engine with an EPA expansion for penetration depth.
#[derive(Debug, Clone)]
pub struct Gjk {
    pub max_iterations: usize,
    /// Convergence tolerance of the distance query.
    pub distance_epsilon: f32,
    pub epa: Epa,
}

impl Default for Gjk {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl Gjk {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            max_iterations: settings.gjk_max_iterations,
            distance_epsilon: settings.gjk_distance_epsilon,
            epa: Epa::from_settings(settings),
        }
    }

    /// Run GJK until the simplex encloses the origin. Returns the enclosing
    /// triangle, or `None` when the shapes are disjoint or touching.
    fn enclose_origin(&self, md: &MinkowskiDifference<'_>) -> Option<Vec<MinkowskiPoint>> {
        let mut direction = md.initial_direction();
        let mut simplex = Vec::with_capacity(3);

        let first = md.support(direction);
        if first.point.dot(direction) <= 0.0 {
            return None;
        }
        simplex.push(first);
        direction = -direction;

        for _ in 0..self.max_iterations {
            let point = md.support(direction);
            if point.point.dot(direction) <= 0.0 {
                return None;
            }
            simplex.push(point);
            match refine(&mut simplex, md) {
                Step::Continue(next) => direction = next,
                Step::Enclosed => return Some(simplex),
                Step::Touching => return None,
            }
        }

        tracing::warn!(
            iterations = self.max_iterations,
            "GJK hit its iteration cap without enclosing the origin"
        );
        None
    }
}

/// Reduce the simplex to the feature nearest the origin and return the next
/// search direction.
fn refine(simplex: &mut Vec<MinkowskiPoint>, md: &MinkowskiDifference<'_>) -> Step {
    let a = simplex[simplex.len() - 1].point;
    let ao = -a;

    if simplex.len() == 3 {
        let b = simplex[1].point;
        let c = simplex[0].point;
        let ab = b - a;
        let ac = c - a;

        // Drop the vertex opposite the edge facing the origin and continue
        // from that edge; the segment case also catches a flat triangle.
        if triple_product(ab, ac, ac).dot(ao) >= 0.0 {
            simplex.remove(1);
            return refine(simplex, md);
        }
        if triple_product(ac, ab, ab).dot(ao) < 0.0 {
            return Step::Enclosed;
        }
        simplex.remove(0);
        return refine(simplex, md);
    }

    let b = simplex[0].point;
    let ab = b - a;
    let direction = triple_product(ab, ao, ab);
    let ab_len = ab.length();
    if ab_len * ab_len <= ZERO_LENGTH_SQUARED || (ab.perp_dot(ao) / ab_len).abs() > TOUCHING_EPSILON
    {
        return Step::Continue(direction);
    }

    // The origin lies on segment ab. It is on the boundary of the
    // difference unless both sides of the segment extend beyond it.
    let side = ab.perp();
    let left = md.support(side);
    if left.point.dot(side) <= TOUCHING_EPSILON {
        return Step::Touching;
    }
    if md.support(-side).point.dot(-side) <= TOUCHING_EPSILON {
        return Step::Touching;
    }
    simplex.insert(0, left);
    Step::Enclosed
}

/// Closest point to the origin on segment `a`-`b`.
fn closest_to_origin(a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= ZERO_LENGTH_SQUARED {
        return a;
    }
    let t = (-a.dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Whether the origin lies strictly inside triangle `abc`.
fn contains_origin(a: Vec2, b: Vec2, c: Vec2) -> bool {
    let sa = a.perp_dot(b);
    let sb = b.perp_dot(c);
    let sc = c.perp_dot(a);
    sa * sb > 0.0 && sa * sc > 0.0
}

/// Closest points on each shape from the final simplex segment.
fn closest_points(a: &MinkowskiPoint, b: &MinkowskiPoint) -> (Vec2, Vec2) {
    let l = b.point - a.point;
    let len_sq = l.length_squared();
    if len_sq <= ZERO_LENGTH_SQUARED {
        return (a.support_a, a.support_b);
    }
    let lambda = -l.dot(a.point) / len_sq;
    if lambda >= 1.0 {
        (b.support_a, b.support_b)
    } else if lambda <= 0.0 {
        (a.support_a, a.support_b)
    } else {
        let mu = 1.0 - lambda;
        (
            a.support_a * mu + b.support_a * lambda,
            a.support_b * mu + b.support_b * lambda,
        )
    }
}

fn separation(a: &MinkowskiPoint, b: &MinkowskiPoint, toward_origin: Vec2) -> Option<Separation> {
    let normal = toward_origin.try_normalize()?;
    let (point_a, point_b) = closest_points(a, b);
    let distance = -a.point.dot(normal);
    (distance > 0.0).then_some(Separation {
        normal,
        distance,
        point_a,
        point_b,
    })
}

impl NarrowphaseDetector for Gjk {
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
        let md = MinkowskiDifference::new(a, ta, b, tb);
        Ok(self
            .enclose_origin(&md)
            .and_then(|simplex| self.epa.expand(&simplex, &md)))
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
        Ok(self
            .enclose_origin(&MinkowskiDifference::new(a, ta, b, tb))
            .is_some())
    }
}

impl DistanceDetector for Gjk {
    fn distance(
        &self,
        a: &dyn Convex,
        ta: &Transform,
        b: &dyn Convex,
        tb: &Transform,
    ) -> Option<Separation> {
        if CircleDetector::applies(a, b) {
            return CircleDetector.distance(a, ta, b, tb);
        }

        let md = MinkowskiDifference::new(a, ta, b, tb);
        let mut direction = md.initial_direction();
        let mut p = md.support(direction);
        let mut q = md.support(-direction);
        let mut closest = closest_to_origin(p.point, q.point);

        for _ in 0..self.max_iterations {
            direction = -closest;
            if direction.length_squared() <= ZERO_LENGTH_SQUARED {
                // The origin is on the simplex: overlapping or touching.
                return None;
            }
            let r = md.support(direction);
            if contains_origin(p.point, q.point, r.point) {
                return None;
            }
            let progress = r.point.dot(direction) - p.point.dot(direction);
            if progress < self.distance_epsilon {
                return separation(&p, &q, direction);
            }
            let pr = closest_to_origin(p.point, r.point);
            let rq = closest_to_origin(r.point, q.point);
            if pr.length_squared() < rq.length_squared() {
                q = r;
                closest = pr;
            } else {
                p = r;
                closest = rq;
            }
        }

        tracing::warn!(
            iterations = self.max_iterations,
            "GJK distance hit its iteration cap; returning the current estimate"
        );
        separation(&p, &q, -closest)
    }
}
