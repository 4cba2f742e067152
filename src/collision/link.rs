//! Ghost-collision correction for chained one-sided segments.

use glam::Vec2;

use crate::geometry::{Convex, Link, Transform};

use super::Penetration;

/// Angular slack, in radians, before a normal counts as outside the wedge.
const WEDGE_TOLERANCE: f32 = 1e-3;

/// Limit on one side of a link's valid normal wedge.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Corner {
    /// The neighbour turns away from the solid side: normals may rotate up
    /// to the given angle toward the neighbour's normal.
    Convex(f32),
    /// The neighbour turns into the solid side, or there is none.
    Closed,
}

/// Rewrites or discards penetrations involving a [`Link`] so shapes slide
/// across the joints of a chain instead of catching on them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinkPostProcessor;

impl LinkPostProcessor {
    /// Corrected penetration for the pair, or `None` when the contact
    /// belongs to the back side or to a neighbouring link.
    pub fn process(
        &self,
        a: &dyn Convex,
        ta: &Transform,
        b: &dyn Convex,
        tb: &Transform,
        penetration: Penetration,
    ) -> Option<Penetration> {
        let mut penetration = penetration;
        if let Some(link) = a.as_link() {
            penetration = Self::correct(link, ta, b, tb, penetration)?;
        }
        if let Some(link) = b.as_link() {
            penetration = Self::correct(link, tb, a, ta, penetration.reversed())?.reversed();
        }
        Some(penetration)
    }

    /// `penetration` is oriented from the link to `other`.
    fn correct(
        link: &Link,
        tl: &Transform,
        other: &dyn Convex,
        to: &Transform,
        penetration: Penetration,
    ) -> Option<Penetration> {
        let v1 = tl.transform_point(link.p1());
        let v2 = tl.transform_point(link.p2());
        let normal = tl.rotate(link.normal());

        // One-sided: shapes whose centre is behind the link never collide
        // with it.
        let center = to.transform_point(other.center());
        if normal.dot(center - v1) < 0.0 {
            return None;
        }

        let edge = v2 - v1;
        let previous = link
            .previous()
            .map(|p| corner(v1 - tl.transform_point(p), edge, normal, true));
        let next = link
            .next()
            .map(|n| corner(edge, tl.transform_point(n) - v2, normal, false));

        let angle = signed_angle(normal, penetration.normal);
        let (limit, side) = if angle >= 0.0 {
            (next.unwrap_or(Corner::Closed), angle)
        } else {
            (previous.unwrap_or(Corner::Closed), -angle)
        };

        match limit {
            Corner::Convex(max) if side <= max + WEDGE_TOLERANCE => Some(penetration),
            Corner::Convex(_) => None,
            Corner::Closed if side <= WEDGE_TOLERANCE => Some(penetration),
            Corner::Closed => {
                // Snap to the link normal and measure depth along it.
                let depth = normal.dot(v1) - other.project(normal, to).min;
                (depth > 0.0).then(|| Penetration::new(normal, depth))
            }
        }
    }
}

/// Classify the joint between edges `incoming` and `outgoing`. `before`
/// selects whether the neighbour precedes the link (the wedge opens
/// clockwise from the normal) or follows it (counter-clockwise).
fn corner(incoming: Vec2, outgoing: Vec2, normal: Vec2, before: bool) -> Corner {
    // Normals rotate with the chain, so a left turn (counter-clockwise) is a
    // convex joint for right-hand normals.
    if incoming.perp_dot(outgoing) < 0.0 {
        return Corner::Closed;
    }
    let neighbour_edge = if before { incoming } else { outgoing };
    let neighbour_normal = Vec2::new(neighbour_edge.y, -neighbour_edge.x).normalize_or_zero();
    Corner::Convex(signed_angle(normal, neighbour_normal).abs())
}

/// Angle from `from` to `to`, positive counter-clockwise.
fn signed_angle(from: Vec2, to: Vec2) -> f32 {
    from.perp_dot(to).atan2(from.dot(to))
}
