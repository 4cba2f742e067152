//! hecs integration: the components a simulated entity carries.

pub mod components;

pub mod prelude {
    pub use super::components::physics::{
        Collider, CollisionFilter, DistanceJoint, Fixture, Joint, RevoluteJoint, RigidBody,
        RigidBodyType, SleepInfo, SleepState,
    };
    pub use crate::geometry::Transform;
}
