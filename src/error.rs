//! Error types.

use thiserror::Error;

use crate::geometry::ShapeKind;

/// Rejected shape construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    #[error("polygon requires at least 3 vertices, got {0}")]
    TooFewVertices(usize),
    #[error("vertices {0} and {1} are coincident")]
    CoincidentVertices(usize, usize),
    #[error("polygon is not convex")]
    NonConvex,
    #[error("polygon vertices must be wound counter-clockwise")]
    ClockwiseWinding,
    #[error("polygon has zero area")]
    ZeroArea,
    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f32 },
    #[error("{name} must lie in ({min}, {max}], got {value}")]
    OutOfRange {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("capsule width and height must differ (use a circle instead)")]
    DegenerateCapsule,
    #[error("a link chain requires at least 2 vertices, got {0}")]
    TooFewLinkVertices(usize),
    #[error("a collider requires at least one fixture")]
    NoFixtures,
}

/// Failure raised by a narrow-phase detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CollisionError {
    /// The shape has no finite set of separating axes; use GJK instead.
    #[error("separating axis test is not supported for {0:?} shapes")]
    Unsupported(ShapeKind),
}

/// Invalid simulation settings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f64 },
    #[error("{name} must be at least 1")]
    ZeroIterations { name: &'static str },
    #[error("baumgarte factor must lie in (0, 1], got {0}")]
    Baumgarte(f32),
}

/// Umbrella error for world-level operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Collision(#[from] CollisionError),
    #[error("entity {0:?} has no rigid body")]
    MissingBody(hecs::Entity),
    #[error("joint connects entity {0:?} to itself")]
    SelfJoint(hecs::Entity),
}

pub type Result<T, E = PhysicsError> = std::result::Result<T, E>;
