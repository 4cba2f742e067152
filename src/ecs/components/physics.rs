//! Physics components for ECS entities.
//!
//! A simulated body is an entity carrying a [`Transform`] (the body origin
//! in world space), a [`RigidBody`] and usually a [`Collider`]. Adding
//! [`SleepInfo`] lets the body fall asleep. Joints are entities of their own
//! carrying a [`Joint`].

use glam::Vec2;

use crate::error::{PhysicsError, ShapeError};
use crate::geometry::{Convex, MassData, Shape, Transform};

/// Rigid body type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigidBodyType {
    /// Affected by forces and collisions.
    Dynamic,
    /// Immovable.
    Static,
    /// Position controlled by user, but affects dynamic bodies.
    Kinematic,
}

/// Rigid body component.
#[derive(Debug, Clone)]
pub struct RigidBody {
    pub body_type: RigidBodyType,
    pub linear_velocity: Vec2,
    /// Counter-clockwise, radians per second.
    pub angular_velocity: f32,
    pub force_accumulator: Vec2,
    pub torque_accumulator: f32,
    /// Linear damping factor (default: 0.01).
    pub linear_damping: f32,
    /// Angular damping factor (default: 0.01).
    pub angular_damping: f32,
    /// Gravity scale (default: 1.0).
    pub gravity_scale: f32,
    /// Mass set explicitly instead of derived from the collider.
    pub mass_override: Option<MassData>,
    mass: MassData,
    mass_dirty: bool,
}

impl RigidBody {
    fn with_type(body_type: RigidBodyType, damping: f32, gravity_scale: f32) -> Self {
        Self {
            body_type,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            force_accumulator: Vec2::ZERO,
            torque_accumulator: 0.0,
            linear_damping: damping,
            angular_damping: damping,
            gravity_scale,
            mass_override: None,
            mass: MassData::INFINITE,
            mass_dirty: true,
        }
    }

    /// Create a new dynamic rigid body. Its mass comes from the collider's
    /// fixture densities unless [`RigidBody::with_mass`] sets one.
    pub fn new_dynamic() -> Self {
        Self::with_type(RigidBodyType::Dynamic, 0.01, 1.0)
    }

    /// Create a new static rigid body.
    pub fn new_static() -> Self {
        Self::with_type(RigidBodyType::Static, 0.0, 0.0)
    }

    /// Create a new kinematic rigid body.
    pub fn new_kinematic() -> Self {
        Self::with_type(RigidBodyType::Kinematic, 0.0, 0.0)
    }

    pub fn with_mass(mut self, mass: MassData) -> Self {
        self.mass_override = Some(mass);
        self.mass_dirty = true;
        self
    }

    pub fn with_velocity(mut self, linear: Vec2, angular: f32) -> Self {
        self.linear_velocity = linear;
        self.angular_velocity = angular;
        self
    }

    pub fn is_dynamic(&self) -> bool {
        self.body_type == RigidBodyType::Dynamic
    }

    /// Mass properties used by the solver. Static and kinematic bodies
    /// always report [`MassData::INFINITE`].
    pub fn mass(&self) -> &MassData {
        &self.mass
    }

    /// Force the mass to be recomputed on the next step, e.g. after the
    /// collider's fixtures changed.
    pub fn mark_mass_dirty(&mut self) {
        self.mass_dirty = true;
    }

    pub(crate) fn needs_mass_update(&self) -> bool {
        self.mass_dirty
    }

    pub(crate) fn set_mass(&mut self, mass: MassData) {
        self.mass = if self.is_dynamic() {
            mass
        } else {
            MassData::INFINITE
        };
        self.mass_dirty = false;
    }

    /// Accumulate a force through the centre of mass.
    pub fn apply_force(&mut self, force: Vec2) {
        self.force_accumulator += force;
    }

    pub fn apply_torque(&mut self, torque: f32) {
        self.torque_accumulator += torque;
    }

    /// Accumulate a force applied at the world point `point`, given the
    /// body's world-space centre of mass.
    pub fn apply_force_at(&mut self, force: Vec2, point: Vec2, world_center: Vec2) {
        self.force_accumulator += force;
        self.torque_accumulator += (point - world_center).perp_dot(force);
    }

    /// Change velocity immediately by `impulse` applied at the world point
    /// `point`.
    pub fn apply_impulse_at(&mut self, impulse: Vec2, point: Vec2, world_center: Vec2) {
        if !self.is_dynamic() {
            return;
        }
        self.linear_velocity += impulse * self.mass.inverse_mass();
        self.angular_velocity +=
            (point - world_center).perp_dot(impulse) * self.mass.inverse_inertia();
    }
}

/// Sleep state of a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SleepState {
    #[default]
    Awake,
    Sleeping,
}

/// Opt-in sleeping. Bodies without this component never sleep.
#[derive(Debug, Clone, Copy, Default)]
pub struct SleepInfo {
    pub state: SleepState,
    /// Seconds the body has spent below the sleep thresholds.
    pub timer: f32,
}

impl SleepInfo {
    pub fn is_sleeping(&self) -> bool {
        self.state == SleepState::Sleeping
    }
}

/// Category/mask/group filtering between fixtures.
///
/// Two fixtures in the same non-zero group always collide when the group is
/// positive and never when it is negative; otherwise each fixture's mask
/// must accept the other's category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionFilter {
    pub category: u32,
    pub mask: u32,
    pub group: i32,
}

impl CollisionFilter {
    pub const DEFAULT: Self = Self {
        category: 1,
        mask: u32::MAX,
        group: 0,
    };

    pub fn allows(&self, other: &CollisionFilter) -> bool {
        if self.group != 0 && self.group == other.group {
            return self.group > 0;
        }
        (self.mask & other.category) != 0 && (other.mask & self.category) != 0
    }
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A shape attached to a body.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub shape: Shape,
    /// Placement of the shape relative to the body origin.
    pub local: Transform,
    /// Mass per unit area (default: 1.0).
    pub density: f32,
    /// Coulomb friction coefficient (default: 0.2).
    pub friction: f32,
    /// Coefficient of restitution (default: 0.0).
    pub restitution: f32,
    /// If true, generates contact events but no physics response.
    pub is_sensor: bool,
    pub filter: CollisionFilter,
}

impl Fixture {
    pub fn new(shape: impl Into<Shape>) -> Self {
        Self {
            shape: shape.into(),
            local: Transform::IDENTITY,
            density: 1.0,
            friction: 0.2,
            restitution: 0.0,
            is_sensor: false,
            filter: CollisionFilter::DEFAULT,
        }
    }

    pub fn with_local(mut self, local: Transform) -> Self {
        self.local = local;
        self
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn sensor(mut self) -> Self {
        self.is_sensor = true;
        self
    }

    pub fn with_filter(mut self, filter: CollisionFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Mass of the fixture in body-local coordinates.
    pub fn mass(&self) -> MassData {
        self.shape
            .mass(self.density.max(0.0))
            .placed(self.local.translation, self.local.rotation())
    }
}

/// Collision detection component: one or more fixtures.
#[derive(Debug, Clone)]
pub struct Collider {
    pub fixtures: Vec<Fixture>,
}

impl Collider {
    pub fn new(fixtures: Vec<Fixture>) -> Result<Self, ShapeError> {
        if fixtures.is_empty() {
            return Err(ShapeError::NoFixtures);
        }
        Ok(Self { fixtures })
    }

    /// A collider with a single default fixture.
    pub fn from_shape(shape: impl Into<Shape>) -> Self {
        Self {
            fixtures: vec![Fixture::new(shape)],
        }
    }

    pub fn from_fixture(fixture: Fixture) -> Self {
        Self {
            fixtures: vec![fixture],
        }
    }

    /// Combined mass of all fixtures, in body-local coordinates.
    pub fn mass(&self) -> MassData {
        let parts: Vec<MassData> = self.fixtures.iter().map(Fixture::mass).collect();
        MassData::combine(&parts)
    }
}

/// Keeps two anchor points at a fixed distance, optionally as a spring.
#[derive(Debug, Clone)]
pub struct DistanceJoint {
    pub body_a: hecs::Entity,
    pub body_b: hecs::Entity,
    /// Anchor on body A relative to its origin.
    pub local_anchor_a: Vec2,
    pub local_anchor_b: Vec2,
    pub rest_length: f32,
    /// Spring frequency in Hz; zero makes the joint rigid.
    pub frequency: f32,
    pub damping_ratio: f32,
    /// Whether the two bodies still collide with each other.
    pub collision_allowed: bool,
    pub(crate) impulse: f32,
}

impl DistanceJoint {
    /// Joint between world-space anchors on two bodies, with the current
    /// anchor distance as its rest length.
    pub fn between(
        world: &hecs::World,
        body_a: hecs::Entity,
        body_b: hecs::Entity,
        anchor_a: Vec2,
        anchor_b: Vec2,
    ) -> Result<Self, PhysicsError> {
        let (ta, tb) = joint_transforms(world, body_a, body_b)?;
        Ok(Self {
            body_a,
            body_b,
            local_anchor_a: ta.inverse_transform_point(anchor_a),
            local_anchor_b: tb.inverse_transform_point(anchor_b),
            rest_length: anchor_a.distance(anchor_b),
            frequency: 0.0,
            damping_ratio: 0.0,
            collision_allowed: false,
            impulse: 0.0,
        })
    }

    pub fn with_spring(mut self, frequency: f32, damping_ratio: f32) -> Self {
        self.frequency = frequency;
        self.damping_ratio = damping_ratio;
        self
    }

    /// Accumulated impulse from the last step.
    pub fn impulse(&self) -> f32 {
        self.impulse
    }
}

/// Pins two bodies together at a shared point, leaving rotation free.
#[derive(Debug, Clone)]
pub struct RevoluteJoint {
    pub body_a: hecs::Entity,
    pub body_b: hecs::Entity,
    pub local_anchor_a: Vec2,
    pub local_anchor_b: Vec2,
    pub collision_allowed: bool,
    pub(crate) impulse: Vec2,
}

impl RevoluteJoint {
    /// Joint pinning both bodies at the world point `anchor`.
    pub fn between(
        world: &hecs::World,
        body_a: hecs::Entity,
        body_b: hecs::Entity,
        anchor: Vec2,
    ) -> Result<Self, PhysicsError> {
        let (ta, tb) = joint_transforms(world, body_a, body_b)?;
        Ok(Self {
            body_a,
            body_b,
            local_anchor_a: ta.inverse_transform_point(anchor),
            local_anchor_b: tb.inverse_transform_point(anchor),
            collision_allowed: false,
            impulse: Vec2::ZERO,
        })
    }

    pub fn impulse(&self) -> Vec2 {
        self.impulse
    }
}

/// Joint component.
#[derive(Debug, Clone)]
pub enum Joint {
    Distance(DistanceJoint),
    Revolute(RevoluteJoint),
}

impl Joint {
    pub fn bodies(&self) -> (hecs::Entity, hecs::Entity) {
        match self {
            Joint::Distance(j) => (j.body_a, j.body_b),
            Joint::Revolute(j) => (j.body_a, j.body_b),
        }
    }

    pub fn collision_allowed(&self) -> bool {
        match self {
            Joint::Distance(j) => j.collision_allowed,
            Joint::Revolute(j) => j.collision_allowed,
        }
    }
}

impl From<DistanceJoint> for Joint {
    fn from(joint: DistanceJoint) -> Self {
        Joint::Distance(joint)
    }
}

impl From<RevoluteJoint> for Joint {
    fn from(joint: RevoluteJoint) -> Self {
        Joint::Revolute(joint)
    }
}

fn joint_transforms(
    world: &hecs::World,
    body_a: hecs::Entity,
    body_b: hecs::Entity,
) -> Result<(Transform, Transform), PhysicsError> {
    if body_a == body_b {
        return Err(PhysicsError::SelfJoint(body_a));
    }
    let transform = |entity| {
        world
            .get::<&Transform>(entity)
            .map(|t| *t)
            .map_err(|_| PhysicsError::MissingBody(entity))
    };
    Ok((transform(body_a)?, transform(body_b)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Circle, Polygon};

    #[test]
    fn test_filter_groups_override_masks() {
        let a = CollisionFilter {
            group: -1,
            ..CollisionFilter::DEFAULT
        };
        assert!(!a.allows(&a));
        let b = CollisionFilter {
            category: 2,
            mask: 1,
            group: 3,
        };
        let c = CollisionFilter {
            category: 4,
            mask: 4,
            group: 3,
        };
        assert!(b.allows(&c));
        let d = CollisionFilter {
            category: 4,
            mask: 4,
            group: 0,
        };
        assert!(!b.allows(&d));
        assert!(CollisionFilter::DEFAULT.allows(&CollisionFilter::DEFAULT));
    }

    #[test]
    fn test_collider_mass_combines_fixtures() {
        let left = Fixture::new(Polygon::square(1.0).unwrap())
            .with_local(Transform::from_translation(Vec2::new(-1.0, 0.0)));
        let right = Fixture::new(Polygon::square(1.0).unwrap())
            .with_local(Transform::from_translation(Vec2::new(1.0, 0.0)));
        let collider = Collider::new(vec![left, right]).unwrap();
        let mass = collider.mass();
        assert!((mass.mass - 2.0).abs() < 1e-5);
        assert!(mass.center.length() < 1e-5);
        // Two unit squares: 2 * (1/6 + 1).
        assert!((mass.inertia - 2.0 * (1.0 / 6.0 + 1.0)).abs() < 1e-4);
    }

    #[test]
    fn test_empty_collider_is_rejected() {
        assert_eq!(Collider::new(Vec::new()).err(), Some(ShapeError::NoFixtures));
    }

    #[test]
    fn test_static_body_keeps_infinite_mass() {
        let mut body = RigidBody::new_static();
        body.set_mass(Collider::from_shape(Circle::new(1.0).unwrap()).mass());
        assert_eq!(body.mass().inverse_mass(), 0.0);
    }

    #[test]
    fn test_joint_rejects_missing_and_self() {
        let mut world = hecs::World::new();
        let a = world.spawn((Transform::IDENTITY, RigidBody::new_dynamic()));
        let ghost = world.spawn(());
        assert_eq!(
            RevoluteJoint::between(&world, a, a, Vec2::ZERO).err(),
            Some(PhysicsError::SelfJoint(a))
        );
        assert_eq!(
            DistanceJoint::between(&world, a, ghost, Vec2::ZERO, Vec2::X).err(),
            Some(PhysicsError::MissingBody(ghost))
        );
    }
}
