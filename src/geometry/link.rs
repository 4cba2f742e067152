//! One-sided segments chained into smooth surfaces.

use glam::Vec2;

use crate::error::{CollisionError, ShapeError};

use super::{Aabb, Convex, Feature, Interval, MassData, Segment, ShapeKind, Transform};

/// A segment that only collides on the side its normal points to, and that
/// knows its neighbours' far vertices (ghost vertices) so contacts at the
/// shared corners do not catch.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    segment: Segment,
    previous: Option<Vec2>,
    next: Option<Vec2>,
}

impl Link {
    pub fn new(
        p1: Vec2,
        p2: Vec2,
        previous: Option<Vec2>,
        next: Option<Vec2>,
    ) -> Result<Self, ShapeError> {
        Ok(Self {
            segment: Segment::new(p1, p2)?,
            previous,
            next,
        })
    }

    /// Links joining consecutive `vertices`. A closed chain also links the
    /// last vertex back to the first.
    ///
    /// The solid side is to the right of the direction of travel, so a
    /// ground listed right to left has upward normals.
    pub fn chain(vertices: &[Vec2], closed: bool) -> Result<Vec<Link>, ShapeError> {
        let n = vertices.len();
        let min = if closed { 3 } else { 2 };
        if n < min {
            return Err(ShapeError::TooFewLinkVertices(n));
        }
        let count = if closed { n } else { n - 1 };
        let at = |i: isize| -> Option<Vec2> {
            if closed {
                Some(vertices[i.rem_euclid(n as isize) as usize])
            } else if i >= 0 && (i as usize) < n {
                Some(vertices[i as usize])
            } else {
                None
            }
        };

        (0..count as isize)
            .map(|i| {
                let p1 = at(i).ok_or(ShapeError::TooFewLinkVertices(n))?;
                let p2 = at(i + 1).ok_or(ShapeError::TooFewLinkVertices(n))?;
                Link::new(p1, p2, at(i - 1), at(i + 2))
            })
            .collect()
    }

    pub fn segment(&self) -> &Segment {
        &self.segment
    }

    pub fn p1(&self) -> Vec2 {
        self.segment.p1()
    }

    pub fn p2(&self) -> Vec2 {
        self.segment.p2()
    }

    /// Ghost vertex before `p1`.
    pub fn previous(&self) -> Option<Vec2> {
        self.previous
    }

    /// Ghost vertex after `p2`.
    pub fn next(&self) -> Option<Vec2> {
        self.next
    }

    /// Local unit normal of the solid side.
    pub fn normal(&self) -> Vec2 {
        self.segment.normal()
    }
}

impl Convex for Link {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Link
    }

    fn center(&self) -> Vec2 {
        self.segment.center()
    }

    fn radius(&self) -> f32 {
        self.segment.radius()
    }

    fn support(&self, direction: Vec2, transform: &Transform) -> Vec2 {
        self.segment.support(direction, transform)
    }

    fn project(&self, axis: Vec2, transform: &Transform) -> Interval {
        self.segment.project(axis, transform)
    }

    fn contains(&self, point: Vec2, transform: &Transform) -> bool {
        self.segment.contains(point, transform)
    }

    fn axes(&self, foci: &[Vec2], transform: &Transform) -> Result<Vec<Vec2>, CollisionError> {
        self.segment.axes(foci, transform)
    }

    fn farthest_feature(&self, direction: Vec2, transform: &Transform) -> Feature {
        self.segment.farthest_feature(direction, transform)
    }

    fn aabb(&self, transform: &Transform) -> Aabb {
        self.segment.aabb(transform)
    }

    fn mass(&self, density: f32) -> MassData {
        self.segment.mass(density)
    }

    fn as_link(&self) -> Option<&Link> {
        Some(self)
    }
}
