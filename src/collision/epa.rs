//! Expanding polytope algorithm: penetration depth from a GJK simplex.

use glam::Vec2;

use crate::geometry::{right_perp, ZERO_LENGTH_SQUARED};
use crate::physics::settings::Settings;

use super::gjk::{MinkowskiDifference, MinkowskiPoint};
use super::Penetration;

#[derive(Debug, Clone)]
pub struct Epa {
    pub max_iterations: usize,
    /// Expansion stops once a new support point improves the closest edge
    /// distance by less than this, relative to the support point's distance
    /// from the origin (at least 1).
    pub epsilon: f32,
}

impl Default for Epa {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Edge of the expanding polygon nearest the origin.
struct ClosestEdge {
    index: usize,
    normal: Vec2,
    distance: f32,
}

impl Epa {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            max_iterations: settings.epa_max_iterations,
            epsilon: settings.epa_epsilon,
        }
    }

    /// Grow the origin-enclosing `simplex` against the boundary of the
    /// Minkowski difference until the nearest edge stops moving.
    pub(crate) fn expand(
        &self,
        simplex: &[MinkowskiPoint],
        md: &MinkowskiDifference<'_>,
    ) -> Option<Penetration> {
        let mut polygon: Vec<Vec2> = simplex.iter().map(|p| p.point).collect();
        if polygon.len() < 3 {
            return None;
        }
        if signed_area(&polygon) < 0.0 {
            polygon.reverse();
        }

        let mut best = closest_edge(&polygon)?;
        for _ in 0..self.max_iterations {
            let support = md.support(best.normal).point;
            let projection = support.dot(best.normal);
            let tolerance = self.epsilon * support.length().max(1.0);
            if projection - best.distance < tolerance {
                // Split the final edge once more; on curved boundaries this
                // halves the angular error of the normal.
                polygon.insert(best.index + 1, support);
                let refined = closest_edge(&polygon).unwrap_or(best);
                return penetration(&refined);
            }
            polygon.insert(best.index + 1, support);
            best = closest_edge(&polygon)?;
        }

        tracing::warn!(
            iterations = self.max_iterations,
            depth = best.distance,
            "EPA hit its iteration cap; using the closest edge found"
        );
        penetration(&best)
    }
}

fn penetration(edge: &ClosestEdge) -> Option<Penetration> {
    (edge.distance > 0.0).then(|| Penetration::new(edge.normal, edge.distance))
}

fn signed_area(polygon: &[Vec2]) -> f32 {
    let n = polygon.len();
    (0..n)
        .map(|i| polygon[i].perp_dot(polygon[(i + 1) % n]))
        .sum::<f32>()
        * 0.5
}

fn closest_edge(polygon: &[Vec2]) -> Option<ClosestEdge> {
    let n = polygon.len();
    let mut best: Option<ClosestEdge> = None;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        let edge = b - a;
        if edge.length_squared() <= ZERO_LENGTH_SQUARED {
            continue;
        }
        let normal = right_perp(edge).normalize();
        let distance = normal.dot(a);
        if best.as_ref().map_or(true, |e| distance < e.distance) {
            best = Some(ClosestEdge {
                index: i,
                normal,
                distance,
            });
        }
    }
    best
}
