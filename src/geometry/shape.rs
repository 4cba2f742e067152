//! The closed set of shapes a fixture can carry.

use glam::Vec2;

use crate::error::CollisionError;

use super::{
    Aabb, Capsule, Circle, Convex, Ellipse, Feature, Interval, Link, MassData, Polygon, Segment,
    Slice, Transform,
};

/// Discriminant of a [`Shape`], used to key detector selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShapeKind {
    Circle,
    Polygon,
    Ellipse,
    Segment,
    Link,
    Capsule,
    Slice,
}

/// A convex collision shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle(Circle),
    Polygon(Polygon),
    Ellipse(Ellipse),
    Segment(Segment),
    Link(Link),
    Capsule(Capsule),
    Slice(Slice),
}

impl Shape {
    /// The variant as a trait object.
    pub fn as_convex(&self) -> &dyn Convex {
        match self {
            Shape::Circle(s) => s,
            Shape::Polygon(s) => s,
            Shape::Ellipse(s) => s,
            Shape::Segment(s) => s,
            Shape::Link(s) => s,
            Shape::Capsule(s) => s,
            Shape::Slice(s) => s,
        }
    }
}

impl Convex for Shape {
    fn kind(&self) -> ShapeKind {
        self.as_convex().kind()
    }

    fn center(&self) -> Vec2 {
        self.as_convex().center()
    }

    fn radius(&self) -> f32 {
        self.as_convex().radius()
    }

    fn support(&self, direction: Vec2, transform: &Transform) -> Vec2 {
        self.as_convex().support(direction, transform)
    }

    fn project(&self, axis: Vec2, transform: &Transform) -> Interval {
        self.as_convex().project(axis, transform)
    }

    fn contains(&self, point: Vec2, transform: &Transform) -> bool {
        self.as_convex().contains(point, transform)
    }

    fn foci(&self, transform: &Transform) -> Vec<Vec2> {
        self.as_convex().foci(transform)
    }

    fn axes(&self, foci: &[Vec2], transform: &Transform) -> Result<Vec<Vec2>, CollisionError> {
        self.as_convex().axes(foci, transform)
    }

    fn farthest_feature(&self, direction: Vec2, transform: &Transform) -> Feature {
        self.as_convex().farthest_feature(direction, transform)
    }

    fn aabb(&self, transform: &Transform) -> Aabb {
        self.as_convex().aabb(transform)
    }

    fn mass(&self, density: f32) -> MassData {
        self.as_convex().mass(density)
    }

    fn as_link(&self) -> Option<&Link> {
        match self {
            Shape::Link(link) => Some(link),
            _ => None,
        }
    }
}

macro_rules! impl_from_shape {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Shape {
                fn from(shape: $variant) -> Self {
                    Shape::$variant(shape)
                }
            }
        )*
    };
}

impl_from_shape!(Circle, Polygon, Ellipse, Segment, Link, Capsule, Slice);
