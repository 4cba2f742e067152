//! Rigid body bookkeeping on the ECS world: mass, gravity, sleeping, and the
//! per-step snapshot the pipeline works on.

use glam::Vec2;

use crate::ecs::components::{Collider, RigidBody, RigidBodyType, SleepInfo, SleepState};
use crate::geometry::{MassData, Transform};

use super::island::{Island, IslandNode};
use super::settings::Settings;
use super::solver::BodyState;

/// One body for the duration of a step.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BodyRecord {
    pub entity: hecs::Entity,
    pub body_type: RigidBodyType,
    pub state: BodyState,
    pub sleep: Option<SleepInfo>,
}

impl BodyRecord {
    pub fn is_sleeping(&self) -> bool {
        self.sleep.is_some_and(|s| s.is_sleeping())
    }

    /// Static bodies and sleeping dynamic bodies do not move this step.
    pub fn is_inactive(&self) -> bool {
        self.body_type == RigidBodyType::Static
            || (self.body_type == RigidBodyType::Dynamic && self.is_sleeping())
    }

    pub fn node(&self) -> IslandNode {
        IslandNode {
            body_type: self.body_type,
            sleeping: self.is_sleeping(),
        }
    }

    pub fn wake(&mut self) {
        if let Some(sleep) = &mut self.sleep {
            sleep.state = SleepState::Awake;
            sleep.timer = 0.0;
        }
    }
}

/// Recompute mass properties of bodies whose mass is out of date.
///
/// Dynamic bodies without any mass get a unit point mass.
pub fn update_mass(world: &mut hecs::World) {
    for (_, (rb, collider)) in world.query_mut::<(&mut RigidBody, Option<&Collider>)>() {
        if !rb.needs_mass_update() {
            continue;
        }
        let mut mass = match (rb.mass_override, collider) {
            (Some(mass), _) => mass,
            (None, Some(collider)) => collider.mass(),
            (None, None) => MassData::INFINITE,
        };
        if rb.is_dynamic() && mass.mass <= 0.0 {
            mass = MassData::new(1.0, mass.center, 0.0);
        }
        rb.set_mass(mass);
    }
}

/// Apply gravity force to all dynamic rigid bodies.
pub fn apply_gravity(world: &mut hecs::World, gravity: Vec2) {
    for (_, (rb, sleep)) in world.query_mut::<(&mut RigidBody, Option<&SleepInfo>)>() {
        let is_sleeping = sleep.is_some_and(|s| s.is_sleeping());
        if rb.is_dynamic() && rb.mass().mass > 0.0 && !is_sleeping {
            rb.force_accumulator += gravity * rb.mass().mass * rb.gravity_scale;
        }
    }
}

/// Snapshot every body, ordered by entity id.
pub(crate) fn gather_bodies(world: &hecs::World) -> Vec<BodyRecord> {
    let mut records: Vec<BodyRecord> = world
        .query::<(&RigidBody, &Transform, Option<&SleepInfo>)>()
        .iter()
        .map(|(entity, (rb, transform, sleep))| {
            let mass = rb.mass();
            let dynamic = rb.is_dynamic();
            BodyRecord {
                entity,
                body_type: rb.body_type,
                state: BodyState {
                    transform: *transform,
                    center: transform.transform_point(mass.center),
                    linear_velocity: if rb.body_type == RigidBodyType::Static {
                        Vec2::ZERO
                    } else {
                        rb.linear_velocity
                    },
                    angular_velocity: if rb.body_type == RigidBodyType::Static {
                        0.0
                    } else {
                        rb.angular_velocity
                    },
                    inv_mass: if dynamic { mass.inverse_mass() } else { 0.0 },
                    inv_inertia: if dynamic { mass.inverse_inertia() } else { 0.0 },
                    force: rb.force_accumulator,
                    torque: rb.torque_accumulator,
                    linear_damping: rb.linear_damping,
                    angular_damping: rb.angular_damping,
                    dynamic,
                },
                sleep: sleep.copied(),
            }
        })
        .collect();
    records.sort_by_key(|r| r.entity.id());
    records
}

/// Move kinematic bodies by their velocities.
pub(crate) fn integrate_kinematic(records: &mut [BodyRecord], dt: f32) {
    for record in records
        .iter_mut()
        .filter(|r| r.body_type == RigidBodyType::Kinematic)
    {
        let state = &mut record.state;
        state.move_by(state.linear_velocity * dt, state.angular_velocity * dt);
    }
}

/// Wake the sleeping dynamic bodies of an island that was pulled in by an
/// awake body.
pub(crate) fn wake_island(records: &mut [BodyRecord], island: &Island) {
    for &body in &island.bodies {
        let record = &mut records[body];
        if record.body_type == RigidBodyType::Dynamic && record.is_sleeping() {
            tracing::trace!(entity = ?record.entity, "body woken by island");
            record.wake();
        }
    }
}

/// Advance the sleep timers of an island's dynamic bodies, putting the
/// whole island to sleep once every body has been slow for `sleep_time`.
/// Islands containing a body without [`SleepInfo`] never sleep.
pub(crate) fn update_island_sleep(
    records: &mut [BodyRecord],
    island: &Island,
    settings: &Settings,
    dt: f32,
) {
    let linear = settings.sleep_linear_velocity * settings.sleep_linear_velocity;
    let angular = settings.sleep_angular_velocity;
    let mut min_timer = f32::MAX;

    for &body in &island.bodies {
        let record = &mut records[body];
        if record.body_type != RigidBodyType::Dynamic {
            continue;
        }
        let slow = record.state.linear_velocity.length_squared() <= linear
            && record.state.angular_velocity.abs() <= angular;
        match &mut record.sleep {
            Some(sleep) if slow => {
                sleep.timer += dt;
                min_timer = min_timer.min(sleep.timer);
            }
            Some(sleep) => {
                sleep.timer = 0.0;
                min_timer = 0.0;
            }
            None => min_timer = 0.0,
        }
    }

    if min_timer < settings.sleep_time {
        return;
    }
    for &body in &island.bodies {
        let record = &mut records[body];
        if record.body_type != RigidBodyType::Dynamic {
            continue;
        }
        if let Some(sleep) = &mut record.sleep {
            sleep.state = SleepState::Sleeping;
        }
        record.state.linear_velocity = Vec2::ZERO;
        record.state.angular_velocity = 0.0;
    }
    tracing::debug!(bodies = island.bodies.len(), "island fell asleep");
}

/// Copy the snapshot back into the components.
pub(crate) fn write_back(world: &mut hecs::World, records: &[BodyRecord]) {
    for record in records {
        let Ok((rb, transform, sleep)) = world.query_one_mut::<(
            &mut RigidBody,
            &mut Transform,
            Option<&mut SleepInfo>,
        )>(record.entity) else {
            continue;
        };
        if rb.body_type == RigidBodyType::Static {
            continue;
        }
        *transform = record.state.transform;
        rb.linear_velocity = record.state.linear_velocity;
        rb.angular_velocity = record.state.angular_velocity;
        if let (Some(sleep), Some(info)) = (sleep, record.sleep) {
            *sleep = info;
        }
    }
}

/// Clear force and torque accumulators on all rigid bodies.
pub fn clear_forces(world: &mut hecs::World) {
    for (_, rb) in world.query_mut::<&mut RigidBody>() {
        rb.force_accumulator = Vec2::ZERO;
        rb.torque_accumulator = 0.0;
    }
}

/// Wake up a specific entity's rigid body, e.g. after changing its velocity
/// by hand.
pub fn wake_body(world: &mut hecs::World, entity: hecs::Entity) {
    if let Ok(mut sleep) = world.get::<&mut SleepInfo>(entity) {
        if sleep.is_sleeping() {
            sleep.state = SleepState::Awake;
            sleep.timer = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Polygon;

    #[test]
    fn test_mass_from_collider_and_override() {
        let mut world = hecs::World::new();
        let from_shape = world.spawn((
            Transform::IDENTITY,
            RigidBody::new_dynamic(),
            Collider::from_shape(Polygon::rectangle(2.0, 1.0).unwrap()),
        ));
        let overridden = world.spawn((
            Transform::IDENTITY,
            RigidBody::new_dynamic().with_mass(MassData::new(5.0, Vec2::ZERO, 1.0)),
            Collider::from_shape(Polygon::rectangle(2.0, 1.0).unwrap()),
        ));
        let bare = world.spawn((Transform::IDENTITY, RigidBody::new_dynamic()));

        update_mass(&mut world);

        let mass = |e| *world.get::<&RigidBody>(e).unwrap().mass();
        assert!((mass(from_shape).mass - 2.0).abs() < 1e-5);
        assert_eq!(mass(overridden).mass, 5.0);
        assert_eq!(mass(bare).mass, 1.0);
        assert_eq!(mass(bare).inverse_inertia(), 0.0);
    }

    #[test]
    fn test_gravity_skips_static_and_sleeping() {
        let mut world = hecs::World::new();
        let awake = world.spawn((Transform::IDENTITY, RigidBody::new_dynamic()));
        let asleep = world.spawn((
            Transform::IDENTITY,
            RigidBody::new_dynamic(),
            SleepInfo {
                state: SleepState::Sleeping,
                timer: 1.0,
            },
        ));
        let ground = world.spawn((Transform::IDENTITY, RigidBody::new_static()));
        update_mass(&mut world);

        apply_gravity(&mut world, Vec2::new(0.0, -10.0));
        assert_eq!(
            world.get::<&RigidBody>(awake).unwrap().force_accumulator,
            Vec2::new(0.0, -10.0)
        );
        assert_eq!(world.get::<&RigidBody>(asleep).unwrap().force_accumulator, Vec2::ZERO);
        assert_eq!(world.get::<&RigidBody>(ground).unwrap().force_accumulator, Vec2::ZERO);

        clear_forces(&mut world);
        assert_eq!(world.get::<&RigidBody>(awake).unwrap().force_accumulator, Vec2::ZERO);
    }

    #[test]
    fn test_island_sleeps_only_when_every_body_is_slow() {
        let mut world = hecs::World::new();
        world.spawn((Transform::IDENTITY, RigidBody::new_dynamic(), SleepInfo::default()));
        world.spawn((
            Transform::IDENTITY,
            RigidBody::new_dynamic().with_velocity(Vec2::new(1.0, 0.0), 0.0),
            SleepInfo::default(),
        ));
        update_mass(&mut world);
        let mut records = gather_bodies(&world);
        let island = Island {
            bodies: vec![0, 1],
            contacts: Vec::new(),
            joints: Vec::new(),
        };
        let settings = Settings::default();

        for _ in 0..60 {
            update_island_sleep(&mut records, &island, &settings, settings.dt());
        }
        assert!(records.iter().all(|r| !r.is_sleeping()));

        records[1].state.linear_velocity = Vec2::ZERO;
        for _ in 0..60 {
            update_island_sleep(&mut records, &island, &settings, settings.dt());
        }
        assert!(records.iter().all(BodyRecord::is_sleeping));

        write_back(&mut world, &records);
        let sleeping = world
            .query::<&SleepInfo>()
            .iter()
            .filter(|(_, s)| s.is_sleeping())
            .count();
        assert_eq!(sleeping, 2);
    }

    #[test]
    fn test_kinematic_body_moves_with_its_velocity() {
        let mut world = hecs::World::new();
        let platform = world.spawn((
            Transform::IDENTITY,
            RigidBody::new_kinematic().with_velocity(Vec2::new(2.0, 0.0), 0.0),
        ));
        update_mass(&mut world);
        let mut records = gather_bodies(&world);
        integrate_kinematic(&mut records, 0.5);
        write_back(&mut world, &records);
        assert!((world.get::<&Transform>(platform).unwrap().translation - Vec2::new(1.0, 0.0)).length() < 1e-6);
    }
}
