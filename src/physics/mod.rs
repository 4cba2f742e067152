//! CPU-based 2D physics engine with rigid body simulation and collision detection.
//!
//! # Architecture
//!
//! The physics pipeline runs in a fixed timestep loop:
//!
//! 1. Update mass properties
//! 2. Apply forces (gravity)
//! 3. Snapshot bodies
//! 4. Broadphase collision detection (sweep and prune over fixture AABBs)
//! 5. Narrowphase collision detection (SAT or GJK/EPA, link correction, clipping)
//! 6. Merge contact constraints (warm starting, begin/persist/end events)
//! 7. Build islands
//! 8. Solve islands (sequential impulse velocity and position phases)
//! 9. Integrate kinematic bodies, update sleep, write back to components
//! 10. Post-solve events
//! 11. Clear force accumulators

pub mod broadphase;
pub mod contact;
pub mod events;
pub mod island;
pub mod joint;
pub mod narrowphase;
pub mod rigid_body;
pub mod settings;
pub mod solver;

use std::collections::{HashMap, HashSet};

use crate::ecs::components::{Collider, Joint, RigidBodyType};
use crate::error::PhysicsError;
use crate::geometry::Convex;

use self::broadphase::{Proxy, SweepAndPrune};
use self::contact::{ContactConstraint, ContactConstraintId, ContactManager};
use self::events::{FixtureRef, Flow, ListenerId, Listeners, PhysicsEvent};
use self::island::IslandBuilder;
use self::joint::JointConstraint;
use self::narrowphase::{Narrowphase, PairSide};
use self::rigid_body::BodyRecord;
use self::settings::Settings;
use self::solver::{IslandJob, SequentialImpulses};

/// The main physics world managing simulation state.
#[derive(Debug)]
pub struct PhysicsWorld {
    settings: Settings,
    accumulator: f64,
    broadphase: SweepAndPrune,
    narrowphase: Narrowphase,
    contacts: ContactManager,
    islands: IslandBuilder,
    solver: SequentialImpulses,
    listeners: Listeners,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        let settings = Settings::default();
        Self {
            narrowphase: Narrowphase::from_settings(&settings),
            settings,
            accumulator: 0.0,
            broadphase: SweepAndPrune::new(),
            contacts: ContactManager::new(),
            islands: IslandBuilder::new(),
            solver: SequentialImpulses,
            listeners: Listeners::default(),
        }
    }
}

impl PhysicsWorld {
    /// Create a new physics world with the given settings.
    pub fn new(settings: Settings) -> Result<Self, PhysicsError> {
        settings.validate()?;
        Ok(Self {
            narrowphase: Narrowphase::from_settings(&settings),
            settings,
            ..Self::default()
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace the settings. Detector routing registered through
    /// [`PhysicsWorld::narrowphase_mut`] is reset to the defaults.
    pub fn set_settings(&mut self, settings: Settings) -> Result<(), PhysicsError> {
        settings.validate()?;
        self.narrowphase = Narrowphase::from_settings(&settings);
        self.settings = settings;
        Ok(())
    }

    pub fn narrowphase(&self) -> &Narrowphase {
        &self.narrowphase
    }

    pub fn narrowphase_mut(&mut self) -> &mut Narrowphase {
        &mut self.narrowphase
    }

    /// Contact constraints from the last step.
    pub fn contacts(&self) -> &ContactManager {
        &self.contacts
    }

    /// Register a listener for every [`PhysicsEvent`].
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&PhysicsEvent<'_>) -> Flow + Send + 'static,
    {
        self.listeners.subscribe(Box::new(listener))
    }

    /// Returns false when `id` was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Drop all contacts (reporting their end) and pending time.
    pub fn reset(&mut self) {
        let listeners = &mut self.listeners;
        self.contacts.clear(&mut |e| listeners.emit(e));
        self.accumulator = 0.0;
    }

    /// Step the physics simulation forward by `delta_time` seconds.
    ///
    /// Uses a fixed timestep accumulator to ensure deterministic simulation.
    /// Returns the number of fixed steps taken.
    pub fn step(&mut self, world: &mut hecs::World, delta_time: f64) -> u32 {
        let fixed = self.settings.fixed_timestep;
        self.accumulator += delta_time;

        let mut substeps = 0u32;
        while self.accumulator >= fixed && substeps < self.settings.max_substeps {
            self.fixed_step(world);
            self.accumulator -= fixed;
            substeps += 1;
        }

        // Clamp accumulator to avoid spiral of death
        if self.accumulator > fixed * self.settings.max_substeps as f64 {
            self.accumulator = 0.0;
        }
        substeps
    }

    /// Run exactly one fixed step.
    pub fn fixed_step(&mut self, world: &mut hecs::World) {
        let dt = self.settings.dt();

        // 1. Update mass properties
        rigid_body::update_mass(world);

        // 2. Apply forces (gravity)
        rigid_body::apply_gravity(world, self.settings.gravity);

        // 3. Snapshot bodies
        let mut bodies = rigid_body::gather_bodies(world);
        let indices: HashMap<hecs::Entity, usize> = bodies
            .iter()
            .enumerate()
            .map(|(i, b)| (b.entity, i))
            .collect();
        let joints = collect_joints(world, &indices);

        // 4-5. Broadphase and narrowphase
        let constraints = self.detect(world, &bodies, &joints);

        // 6. Merge with last step's constraints
        let listeners = &mut self.listeners;
        self.contacts.update(
            constraints,
            &self.settings,
            |id| match (indices.get(&id.body_a), indices.get(&id.body_b)) {
                (Some(&a), Some(&b)) => bodies[a].is_inactive() && bodies[b].is_inactive(),
                _ => false,
            },
            &mut |e| listeners.emit(e),
        );
        self.contacts.bind(&indices);
        self.pre_solve();
        wake_touched_by_kinematic(&mut bodies, self.contacts.constraints());

        // 7. Build islands
        let nodes: Vec<_> = bodies.iter().map(BodyRecord::node).collect();
        let edges: Vec<_> = self
            .contacts
            .constraints()
            .iter()
            .map(|c| c.is_solvable().then_some((c.body_a, c.body_b)))
            .collect();
        let joint_edges: Vec<_> = joints.iter().map(|j| (j.body_a, j.body_b)).collect();
        let islands = self.islands.build(&nodes, &edges, &joint_edges);

        // 8. Solve islands
        for island in &islands {
            rigid_body::wake_island(&mut bodies, island);
        }
        let (mut jobs, slots) = self.island_jobs(&bodies, &islands, &joints);
        self.solve_jobs(&mut jobs, dt);
        self.finish_jobs(world, &mut bodies, jobs, slots);

        // 9. Kinematic bodies, sleeping, write back
        rigid_body::integrate_kinematic(&mut bodies, dt);
        for island in &islands {
            rigid_body::update_island_sleep(&mut bodies, island, &self.settings, dt);
        }
        rigid_body::write_back(world, &bodies);

        // 10. Post-solve events
        if !self.listeners.is_empty() {
            for solved in self.contacts.solved_contacts() {
                self.listeners.emit(&PhysicsEvent::PostSolve(&solved));
            }
        }

        // 11. Clear force accumulators
        rigid_body::clear_forces(world);

        tracing::debug!(
            bodies = bodies.len(),
            constraints = self.contacts.len(),
            islands = islands.len(),
            "physics step"
        );
    }

    /// Candidate pairs through the broad and narrow phases.
    fn detect(
        &mut self,
        world: &hecs::World,
        bodies: &[BodyRecord],
        joints: &[JointEntry],
    ) -> Vec<ContactConstraint> {
        let proxies = build_proxies(world, bodies, self.settings.aabb_expansion);
        let pairs = self.broadphase.find_pairs(&proxies);

        let jointed: HashSet<(usize, usize)> = joints
            .iter()
            .filter(|j| !j.joint.collision_allowed())
            .map(|j| (j.body_a.min(j.body_b), j.body_a.max(j.body_b)))
            .collect();

        let mut constraints = Vec::new();
        for &(i, j) in &pairs {
            let (pa, pb) = (&proxies[i], &proxies[j]);
            if jointed.contains(&(pa.body.min(pb.body), pa.body.max(pb.body))) {
                continue;
            }
            let (ra, rb) = (&bodies[pa.body], &bodies[pb.body]);
            let id_a = FixtureRef {
                entity: ra.entity,
                fixture: pa.fixture,
            };
            let id_b = FixtureRef {
                entity: rb.entity,
                fixture: pb.fixture,
            };
            if self
                .listeners
                .emit(&PhysicsEvent::Broadphase { a: id_a, b: id_b })
                == Flow::Halt
            {
                continue;
            }

            let (Ok(ca), Ok(cb)) = (
                world.get::<&Collider>(ra.entity),
                world.get::<&Collider>(rb.entity),
            ) else {
                continue;
            };
            let (Some(fa), Some(fb)) = (ca.fixtures.get(pa.fixture), cb.fixtures.get(pb.fixture))
            else {
                continue;
            };

            let side_a = PairSide {
                id: id_a,
                shape: &fa.shape,
                transform: ra.state.transform.compose(&fa.local),
            };
            let side_b = PairSide {
                id: id_b,
                shape: &fb.shape,
                transform: rb.state.transform.compose(&fb.local),
            };
            let listeners = &mut self.listeners;
            let Some(manifold) = self
                .narrowphase
                .collide(&side_a, &side_b, &mut |e| listeners.emit(e))
            else {
                continue;
            };

            let id = ContactConstraintId {
                body_a: ra.entity,
                fixture_a: pa.fixture,
                body_b: rb.entity,
                fixture_b: pb.fixture,
            };
            constraints.push(ContactConstraint::new(
                id,
                (pa.body, pb.body),
                &manifold,
                &ra.state.transform,
                &rb.state.transform,
                self.settings.friction_mixing.mix(fa.friction, fb.friction),
                self.settings
                    .restitution_mixing
                    .mix(fa.restitution, fb.restitution),
                &self.settings,
                fa.is_sensor || fb.is_sensor,
            ));
        }

        tracing::debug!(
            proxies = proxies.len(),
            pairs = pairs.len(),
            constraints = constraints.len(),
            "collision detection"
        );
        constraints
    }

    /// Give listeners a last chance to disable constraints for this step.
    fn pre_solve(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        for constraint in self.contacts.constraints_mut().iter_mut() {
            if constraint.is_solvable()
                && self.listeners.emit(&PhysicsEvent::PreSolve(constraint)) == Flow::Halt
            {
                constraint.enabled = false;
            }
        }
    }

    /// Detach each island's bodies, constraints and joints. Constraints
    /// outside every island stay behind in the returned slots.
    fn island_jobs(
        &mut self,
        bodies: &[BodyRecord],
        islands: &[island::Island],
        joints: &[JointEntry],
    ) -> (Vec<IslandJob>, Vec<Option<ContactConstraint>>) {
        let mut slots: Vec<Option<ContactConstraint>> =
            std::mem::take(self.contacts.constraints_mut())
                .into_iter()
                .map(Some)
                .collect();
        let mut local = vec![usize::MAX; bodies.len()];

        let mut jobs = Vec::with_capacity(islands.len());
        for island in islands {
            let mut job = IslandJob::default();
            for (l, &g) in island.bodies.iter().enumerate() {
                local[g] = l;
                job.bodies.push(g);
                job.states.push(bodies[g].state);
            }
            for &ci in &island.contacts {
                if let Some(constraint) = slots[ci].take() {
                    job.contact_bodies
                        .push((local[constraint.body_a], local[constraint.body_b]));
                    job.contact_indices.push(ci);
                    job.contacts.push(constraint);
                }
            }
            for &ji in &island.joints {
                let entry = &joints[ji];
                job.joints.push(JointConstraint::new(
                    entry.entity,
                    &entry.joint,
                    local[entry.body_a],
                    local[entry.body_b],
                ));
            }
            for &g in &island.bodies {
                local[g] = usize::MAX;
            }
            jobs.push(job);
        }

        (jobs, slots)
    }

    fn solve_jobs(&self, jobs: &mut [IslandJob], dt: f32) {
        let (solver, settings) = (&self.solver, &self.settings);
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            jobs.par_iter_mut()
                .for_each(|job| solver.solve(job, settings, dt));
        }
        #[cfg(not(feature = "parallel"))]
        for job in jobs.iter_mut() {
            solver.solve(job, settings, dt);
        }
    }

    /// Write solved state back in island order.
    fn finish_jobs(
        &mut self,
        world: &mut hecs::World,
        bodies: &mut [BodyRecord],
        jobs: Vec<IslandJob>,
        mut slots: Vec<Option<ContactConstraint>>,
    ) {
        for job in jobs {
            for (state, &g) in job.states.iter().zip(&job.bodies) {
                if bodies[g].body_type == RigidBodyType::Dynamic {
                    bodies[g].state = *state;
                }
            }
            for (constraint, ci) in job.contacts.into_iter().zip(job.contact_indices) {
                slots[ci] = Some(constraint);
            }
            for solved in &job.joints {
                if let Ok(mut joint) = world.get::<&mut Joint>(solved.entity) {
                    solved.store(&mut joint);
                }
            }
        }
        *self.contacts.constraints_mut() = slots.into_iter().flatten().collect();
    }
}

/// A joint whose bodies both exist this step.
#[derive(Debug, Clone)]
struct JointEntry {
    entity: hecs::Entity,
    joint: Joint,
    body_a: usize,
    body_b: usize,
}

fn collect_joints(world: &hecs::World, indices: &HashMap<hecs::Entity, usize>) -> Vec<JointEntry> {
    let mut joints: Vec<JointEntry> = world
        .query::<&Joint>()
        .iter()
        .filter_map(|(entity, joint)| {
            let (a, b) = joint.bodies();
            match (indices.get(&a), indices.get(&b)) {
                (Some(&body_a), Some(&body_b)) if body_a != body_b => Some(JointEntry {
                    entity,
                    joint: joint.clone(),
                    body_a,
                    body_b,
                }),
                _ => {
                    tracing::warn!(?entity, "joint skipped: missing or identical bodies");
                    None
                }
            }
        })
        .collect();
    joints.sort_by_key(|j| j.entity.id());
    joints
}

fn build_proxies(world: &hecs::World, bodies: &[BodyRecord], expansion: f32) -> Vec<Proxy> {
    let mut proxies = Vec::new();
    for (index, record) in bodies.iter().enumerate() {
        let Ok(collider) = world.get::<&Collider>(record.entity) else {
            continue;
        };
        for (fixture_index, fixture) in collider.fixtures.iter().enumerate() {
            let transform = record.state.transform.compose(&fixture.local);
            proxies.push(Proxy {
                aabb: fixture.shape.aabb(&transform).expanded(expansion),
                body: index,
                fixture: fixture_index,
                filter: fixture.filter,
                dynamic: record.body_type == RigidBodyType::Dynamic,
                inactive: record.is_inactive(),
            });
        }
    }
    proxies
}

/// Sleeping bodies touched by a moving kinematic body wake up.
fn wake_touched_by_kinematic(bodies: &mut [BodyRecord], constraints: &[ContactConstraint]) {
    for constraint in constraints.iter().filter(|c| c.is_solvable()) {
        for (driver, other) in [
            (constraint.body_a, constraint.body_b),
            (constraint.body_b, constraint.body_a),
        ] {
            let moving = bodies[driver].body_type == RigidBodyType::Kinematic
                && (bodies[driver].state.linear_velocity != glam::Vec2::ZERO
                    || bodies[driver].state.angular_velocity != 0.0);
            if moving && bodies[other].is_sleeping() {
                bodies[other].wake();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{Fixture, RevoluteJoint, RigidBody, SleepInfo};
    use crate::geometry::{Circle, MassData, Polygon, Transform};
    use glam::Vec2;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn spawn_ground(world: &mut hecs::World) -> hecs::Entity {
        world.spawn((
            Transform::from_translation(Vec2::new(0.0, -0.5)),
            RigidBody::new_static(),
            Collider::from_shape(Polygon::rectangle(20.0, 1.0).unwrap()),
        ))
    }

    fn run(physics: &mut PhysicsWorld, world: &mut hecs::World, steps: usize) {
        for _ in 0..steps {
            physics.fixed_step(world);
        }
    }

    fn counter() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)))
    }

    #[test]
    fn test_free_fall() {
        let mut physics = PhysicsWorld::default();
        let mut world = hecs::World::new();
        let ball = world.spawn((
            Transform::from_translation(Vec2::new(0.0, 10.0)),
            RigidBody::new_dynamic(),
            Collider::from_shape(Circle::new(0.5).unwrap()),
        ));

        run(&mut physics, &mut world, 60);

        let rb = world.get::<&RigidBody>(ball).unwrap();
        assert!(rb.linear_velocity.y < -9.6 && rb.linear_velocity.y > -9.85);
        assert!(world.get::<&Transform>(ball).unwrap().translation.y < 6.0);
    }

    #[test]
    fn test_accumulator_runs_whole_steps() {
        let mut physics = PhysicsWorld::default();
        let mut world = hecs::World::new();
        world.spawn((Transform::IDENTITY, RigidBody::new_dynamic()));

        assert_eq!(physics.step(&mut world, 1.0 / 120.0), 0);
        assert_eq!(physics.step(&mut world, 1.0 / 120.0), 1);
        // Capped at max_substeps, leftover time dropped.
        assert_eq!(physics.step(&mut world, 1.0), 4);
        assert_eq!(physics.step(&mut world, 0.0), 0);
    }

    #[test]
    fn test_box_settles_on_ground() {
        let mut physics = PhysicsWorld::default();
        let mut world = hecs::World::new();
        spawn_ground(&mut world);
        let crate_ = world.spawn((
            Transform::from_translation(Vec2::new(0.0, 1.0)),
            RigidBody::new_dynamic(),
            Collider::from_shape(Polygon::square(1.0).unwrap()),
        ));

        run(&mut physics, &mut world, 180);

        let y = world.get::<&Transform>(crate_).unwrap().translation.y;
        assert!((y - 0.5).abs() < 0.02, "resting height {y}");
        assert!(world.get::<&RigidBody>(crate_).unwrap().linear_velocity.length() < 0.05);
        let constraint = physics
            .contacts()
            .constraints()
            .first()
            .expect("expected a contact");
        assert_eq!(constraint.contacts.len(), 2);
    }

    #[test]
    fn test_resting_contacts_persist_without_begin_or_end() {
        let mut physics = PhysicsWorld::default();
        let mut world = hecs::World::new();
        spawn_ground(&mut world);
        world.spawn((
            Transform::from_translation(Vec2::new(-3.0, 0.5)),
            RigidBody::new_dynamic().with_mass(MassData::new(1.0, Vec2::ZERO, 0.0)),
            Collider::from_shape(Polygon::square(1.0).unwrap()),
        ));
        world.spawn((
            Transform::from_translation(Vec2::new(3.0, 0.5)),
            RigidBody::new_dynamic(),
            Collider::from_shape(Circle::new(0.5).unwrap()),
        ));
        run(&mut physics, &mut world, 120);

        let (changes, persists) = counter();
        let (c, p) = (changes.clone(), persists.clone());
        physics.subscribe(move |event| {
            match event {
                PhysicsEvent::ContactBegin(_) | PhysicsEvent::ContactEnd(_) => {
                    c.fetch_add(1, Ordering::Relaxed);
                }
                PhysicsEvent::ContactPersist(_) => {
                    p.fetch_add(1, Ordering::Relaxed);
                }
                _ => {}
            }
            Flow::Continue
        });
        run(&mut physics, &mut world, 120);

        assert_eq!(changes.load(Ordering::Relaxed), 0);
        // Two box points and one circle point every step.
        assert_eq!(persists.load(Ordering::Relaxed), 3 * 120);
        // Points left out by the block solver carry no impulse.
        for constraint in physics.contacts().constraints() {
            let mut solved = constraint.contacts.iter().filter(|p| !p.is_ignored()).peekable();
            assert!(solved.peek().is_some());
            assert!(solved.all(|p| p.normal_impulse > 0.0), "{constraint:?}");
        }
    }

    #[test]
    fn test_resting_island_falls_asleep_and_keeps_contacts() {
        let mut physics = PhysicsWorld::default();
        let mut world = hecs::World::new();
        spawn_ground(&mut world);
        let crate_ = world.spawn((
            Transform::from_translation(Vec2::new(0.0, 0.6)),
            RigidBody::new_dynamic(),
            Collider::from_shape(Polygon::square(1.0).unwrap()),
            SleepInfo::default(),
        ));

        run(&mut physics, &mut world, 300);
        assert!(world.get::<&SleepInfo>(crate_).unwrap().is_sleeping());
        let resting = world.get::<&Transform>(crate_).unwrap().translation;

        let (ends, _) = counter();
        let e = ends.clone();
        physics.subscribe(move |event| {
            if let PhysicsEvent::ContactEnd(_) = event {
                e.fetch_add(1, Ordering::Relaxed);
            }
            Flow::Continue
        });
        run(&mut physics, &mut world, 30);
        assert_eq!(ends.load(Ordering::Relaxed), 0);
        assert_eq!(physics.contacts().len(), 1);
        assert_eq!(world.get::<&Transform>(crate_).unwrap().translation, resting);

        rigid_body::wake_body(&mut world, crate_);
        assert!(!world.get::<&SleepInfo>(crate_).unwrap().is_sleeping());
    }

    #[test]
    fn test_sensor_reports_without_response() {
        let mut physics = PhysicsWorld::default();
        let mut world = hecs::World::new();
        world.spawn((
            Transform::from_translation(Vec2::new(0.0, -0.5)),
            RigidBody::new_static(),
            Collider::from_fixture(Fixture::new(Polygon::rectangle(20.0, 1.0).unwrap()).sensor()),
        ));
        let ball = world.spawn((
            Transform::from_translation(Vec2::new(0.0, 1.0)),
            RigidBody::new_dynamic(),
            Collider::from_shape(Circle::new(0.25).unwrap()),
        ));

        let (begins, _) = counter();
        let b = begins.clone();
        physics.subscribe(move |event| {
            if let PhysicsEvent::ContactBegin(point) = event {
                assert!(point.sensor);
                b.fetch_add(1, Ordering::Relaxed);
            }
            Flow::Continue
        });
        run(&mut physics, &mut world, 120);

        assert!(begins.load(Ordering::Relaxed) > 0);
        assert!(world.get::<&Transform>(ball).unwrap().translation.y < -2.0);
    }

    #[test]
    fn test_halting_broadphase_listener_lets_bodies_pass() {
        let mut physics = PhysicsWorld::default();
        let mut world = hecs::World::new();
        spawn_ground(&mut world);
        let ball = world.spawn((
            Transform::from_translation(Vec2::new(0.0, 1.0)),
            RigidBody::new_dynamic(),
            Collider::from_shape(Circle::new(0.25).unwrap()),
        ));
        let listener = physics.subscribe(|event| match event {
            PhysicsEvent::Broadphase { .. } => Flow::Halt,
            _ => Flow::Continue,
        });

        run(&mut physics, &mut world, 60);
        assert!(physics.contacts().is_empty());
        assert!(world.get::<&Transform>(ball).unwrap().translation.y < 0.0);
        assert!(physics.unsubscribe(listener));
        assert!(!physics.unsubscribe(listener));
    }

    #[test]
    fn test_pendulum_keeps_its_length() {
        let mut physics = PhysicsWorld::default();
        let mut world = hecs::World::new();
        let pivot = world.spawn((Transform::IDENTITY, RigidBody::new_static()));
        let bob = world.spawn((
            Transform::from_translation(Vec2::new(2.0, 0.0)),
            RigidBody::new_dynamic(),
            Collider::from_shape(Circle::new(0.25).unwrap()),
        ));
        let joint = RevoluteJoint::between(&world, pivot, bob, Vec2::ZERO).unwrap();
        world.spawn((Joint::from(joint),));

        // Short of a quarter swing.
        run(&mut physics, &mut world, 40);

        let position = world.get::<&Transform>(bob).unwrap().translation;
        assert!((position.length() - 2.0).abs() < 0.05, "bob at {position}");
        assert!(position.y < -0.5);
    }

    #[test]
    fn test_spin_is_about_centre_of_mass() {
        let settings = Settings {
            gravity: Vec2::ZERO,
            ..Settings::default()
        };
        let mut physics = PhysicsWorld::new(settings).unwrap();
        let mut world = hecs::World::new();
        let body = world.spawn((
            Transform::IDENTITY,
            RigidBody::new_dynamic()
                .with_mass(MassData::new(1.0, Vec2::new(1.0, 0.0), 1.0))
                .with_velocity(Vec2::ZERO, 1.0),
        ));

        run(&mut physics, &mut world, 60);

        let transform = *world.get::<&Transform>(body).unwrap();
        let com = transform.transform_point(Vec2::new(1.0, 0.0));
        assert!((com - Vec2::new(1.0, 0.0)).length() < 1e-4, "{com:?}");
        // The body origin swings around the centre of mass.
        assert!(transform.translation.length() > 0.5, "{transform:?}");
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = Settings {
            fixed_timestep: 0.0,
            ..Settings::default()
        };
        assert!(PhysicsWorld::new(settings).is_err());
        let mut physics = PhysicsWorld::default();
        assert!(physics
            .set_settings(Settings {
                velocity_iterations: 0,
                ..Settings::default()
            })
            .is_err());
    }
}
