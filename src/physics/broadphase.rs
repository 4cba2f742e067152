//! Broadphase collision detection using sweep and prune over fixture AABBs.

use crate::ecs::components::CollisionFilter;
use crate::geometry::Aabb;

/// A fixture's bounding box entered into the broad phase.
#[derive(Debug, Clone, Copy)]
pub struct Proxy {
    /// Expanded world-space bounds.
    pub aabb: Aabb,
    /// Index of the owning body in the step's body list.
    pub body: usize,
    pub fixture: usize,
    pub filter: CollisionFilter,
    pub dynamic: bool,
    /// Static, or dynamic and asleep.
    pub inactive: bool,
}

impl Proxy {
    /// Whether the pair is worth a narrow-phase test at all.
    fn accepts(&self, other: &Proxy) -> bool {
        self.body != other.body
            && (self.dynamic || other.dynamic)
            && !(self.inactive && other.inactive)
            && self.filter.allows(&other.filter)
    }
}

/// Sweep-and-prune broadphase: proxies sorted on x, overlap-tested on y.
#[derive(Debug, Default)]
pub struct SweepAndPrune {
    order: Vec<usize>,
}

impl SweepAndPrune {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find all pairs of proxies whose AABBs overlap, as indices into
    /// `proxies` with the lower index first.
    ///
    /// Pairs on the same body, between two non-dynamic bodies, between two
    /// inactive bodies, or rejected by the collision filters are skipped.
    pub fn find_pairs(&mut self, proxies: &[Proxy]) -> Vec<(usize, usize)> {
        self.order.clear();
        self.order.extend(0..proxies.len());
        // Stable, so equal bounds keep proxy order.
        self.order
            .sort_by(|&a, &b| proxies[a].aabb.min.x.total_cmp(&proxies[b].aabb.min.x));

        let mut pairs = Vec::new();
        for (i, &a) in self.order.iter().enumerate() {
            let pa = &proxies[a];
            for &b in &self.order[i + 1..] {
                let pb = &proxies[b];
                if pb.aabb.min.x > pa.aabb.max.x {
                    break;
                }
                if pa.aabb.min.y > pb.aabb.max.y || pb.aabb.min.y > pa.aabb.max.y {
                    continue;
                }
                if pa.accepts(pb) {
                    pairs.push((a.min(b), a.max(b)));
                }
            }
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn proxy(body: usize, min: Vec2, max: Vec2) -> Proxy {
        Proxy {
            aabb: Aabb::new(min, max),
            body,
            fixture: 0,
            filter: CollisionFilter::DEFAULT,
            dynamic: true,
            inactive: false,
        }
    }

    #[test]
    fn test_broadphase_overlapping() {
        let proxies = [
            proxy(0, Vec2::new(-1.0, -1.0), Vec2::new(1.0, 1.0)),
            proxy(1, Vec2::new(0.0, -1.0), Vec2::new(2.0, 1.0)),
        ];
        let pairs = SweepAndPrune::new().find_pairs(&proxies);
        assert_eq!(pairs, vec![(0, 1)]);
    }

    #[test]
    fn test_broadphase_no_overlap() {
        let proxies = [
            proxy(0, Vec2::new(-0.5, -0.5), Vec2::new(0.5, 0.5)),
            proxy(1, Vec2::new(9.5, -0.5), Vec2::new(10.5, 0.5)),
            // Overlaps on x only.
            proxy(2, Vec2::new(-0.5, 5.0), Vec2::new(0.5, 6.0)),
        ];
        let pairs = SweepAndPrune::new().find_pairs(&proxies);
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_broadphase_static_static_skipped() {
        let mut a = proxy(0, Vec2::splat(-1.0), Vec2::splat(1.0));
        let mut b = proxy(1, Vec2::splat(-1.0), Vec2::splat(1.0));
        a.dynamic = false;
        b.dynamic = false;
        a.inactive = true;
        b.inactive = true;
        assert!(SweepAndPrune::new().find_pairs(&[a, b]).is_empty());
    }

    #[test]
    fn test_same_body_sleeping_and_filtered_pairs_skipped() {
        let a = proxy(0, Vec2::splat(-1.0), Vec2::splat(1.0));
        let same_body = proxy(0, Vec2::splat(-1.0), Vec2::splat(1.0));
        assert!(SweepAndPrune::new().find_pairs(&[a, same_body]).is_empty());

        let mut sleeping = proxy(1, Vec2::splat(-1.0), Vec2::splat(1.0));
        sleeping.inactive = true;
        let mut ground = proxy(2, Vec2::splat(-1.0), Vec2::splat(1.0));
        ground.dynamic = false;
        ground.inactive = true;
        assert!(SweepAndPrune::new().find_pairs(&[sleeping, ground]).is_empty());

        let mut filtered = proxy(3, Vec2::splat(-1.0), Vec2::splat(1.0));
        filtered.filter.mask = 0;
        assert!(SweepAndPrune::new().find_pairs(&[a, filtered]).is_empty());
    }

    #[test]
    fn test_pairs_follow_sweep_order() {
        let proxies = [
            proxy(0, Vec2::new(2.0, 0.0), Vec2::new(3.0, 1.0)),
            proxy(1, Vec2::new(0.0, 0.0), Vec2::new(2.5, 1.0)),
            proxy(2, Vec2::new(1.0, 0.0), Vec2::new(2.2, 1.0)),
        ];
        let pairs = SweepAndPrune::new().find_pairs(&proxies);
        assert_eq!(pairs, vec![(1, 2), (0, 1), (0, 2)]);
    }
}
