//! Rein 2D Physics
//!
//! A 2D rigid body physics engine on top of the hecs ECS.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! 1. **geometry** - Convex shapes, transforms, bounds and mass properties
//! 2. **collision** - SAT, GJK/EPA, contact manifolds and link correction
//! 3. **ecs** - Components attached to hecs entities (bodies, colliders, joints)
//! 4. **physics** - Broadphase, contacts, islands, sequential impulse solver
//!    and the fixed-step [`PhysicsWorld`]
//!
//! # Features
//!
//! - `parallel` - solve islands on the rayon thread pool
//! - `serde` - (de)serialize [`Settings`] and plain data types

pub mod collision;
pub mod ecs;
pub mod error;
pub mod geometry;
pub mod physics;

// Re-export commonly used types
pub use collision::{
    ClippingManifoldSolver, FallbackDetector, Manifold, ManifoldPoint, ManifoldPointId,
    Penetration, Separation,
};
pub use ecs::prelude::*;
pub use error::{CollisionError, PhysicsError, SettingsError, ShapeError};
pub use geometry::{
    Aabb, Capsule, Circle, Convex, Ellipse, Link, MassData, Polygon, Segment, Shape, Slice,
};
pub use physics::events::{ContactPointEvent, FixtureRef, Flow, ListenerId, PhysicsEvent};
pub use physics::settings::{MixRule, Settings};
pub use physics::PhysicsWorld;

// Re-export glam for convenience
pub use glam;
