//! Sequential impulse contact and joint solver.
//!
//! Each island is solved on its own copy of the body state:
//!
//! 1. Integrate velocities (forces, damping)
//! 2. Initialize constraints (effective masses, restitution bias, block test)
//! 3. Warm start with last step's impulses
//! 4. Velocity iterations: joints, then friction before normal impulses
//! 5. Integrate positions, capped per step
//! 6. Position iterations until everything is within tolerance

use glam::{Mat2, Vec2};

use crate::geometry::Transform;

use super::contact::ContactConstraint;
use super::joint::JointConstraint;
use super::settings::Settings;

/// Island-local copy of a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    /// Body origin in world space.
    pub transform: Transform,
    /// World-space centre of mass.
    pub center: Vec2,
    pub linear_velocity: Vec2,
    pub angular_velocity: f32,
    pub inv_mass: f32,
    pub inv_inertia: f32,
    pub force: Vec2,
    pub torque: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Only dynamic bodies are integrated.
    pub dynamic: bool,
}

impl BodyState {
    /// Velocity of the material point at offset `r` from the centre.
    #[inline]
    pub fn velocity_at(&self, r: Vec2) -> Vec2 {
        self.linear_velocity + r.perp() * self.angular_velocity
    }

    #[inline]
    pub fn apply_impulse(&mut self, impulse: Vec2, r: Vec2) {
        self.linear_velocity += impulse * self.inv_mass;
        self.angular_velocity += self.inv_inertia * r.perp_dot(impulse);
    }

    /// Pseudo-impulse position correction with the rotation capped at
    /// `max_rotation`.
    pub fn apply_position_impulse(&mut self, impulse: Vec2, r: Vec2, max_rotation: f32) {
        let rotation =
            (self.inv_inertia * r.perp_dot(impulse)).clamp(-max_rotation, max_rotation);
        self.move_by(impulse * self.inv_mass, rotation);
    }

    /// Move the centre of mass by `translation` and rotate about it.
    pub fn move_by(&mut self, translation: Vec2, rotation: f32) {
        if rotation != 0.0 {
            self.transform.rotate_about(rotation, self.center);
        }
        self.transform.translate(translation);
        self.center += translation;
    }

    /// World position of a body-local point.
    #[inline]
    pub fn world_point(&self, local: Vec2) -> Vec2 {
        self.transform.transform_point(local)
    }
}

/// Everything one island needs, detached from the world so islands can be
/// solved independently.
#[derive(Debug, Default)]
pub struct IslandJob {
    /// Index of each state in the step's body list.
    pub bodies: Vec<usize>,
    pub states: Vec<BodyState>,
    /// Index of each constraint in the contact manager.
    pub contact_indices: Vec<usize>,
    pub contacts: Vec<ContactConstraint>,
    /// Island-local body indices of each constraint.
    pub contact_bodies: Vec<(usize, usize)>,
    pub joints: Vec<JointConstraint>,
}

/// Box2D-style sequential impulses with block solving of two-point
/// manifolds.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialImpulses;

impl SequentialImpulses {
    pub fn solve(&self, job: &mut IslandJob, settings: &Settings, dt: f32) {
        integrate_velocities(&mut job.states, dt);

        for (constraint, &(a, b)) in job.contacts.iter_mut().zip(&job.contact_bodies) {
            initialize_contact(constraint, &job.states[a], &job.states[b], settings);
        }
        for joint in &mut job.joints {
            joint.initialize(&job.states, settings, dt);
        }

        for (constraint, &(a, b)) in job.contacts.iter_mut().zip(&job.contact_bodies) {
            if settings.warm_starting {
                let (mut sa, mut sb) = (job.states[a], job.states[b]);
                warm_start_contact(constraint, &mut sa, &mut sb);
                job.states[a] = sa;
                job.states[b] = sb;
            } else {
                for contact in &mut constraint.contacts {
                    contact.normal_impulse = 0.0;
                    contact.tangent_impulse = 0.0;
                }
            }
        }
        for joint in &mut job.joints {
            joint.warm_start(&mut job.states, settings.warm_starting);
        }

        for _ in 0..settings.velocity_iterations {
            for joint in &mut job.joints {
                joint.solve_velocity(&mut job.states);
            }
            for (constraint, &(a, b)) in job.contacts.iter_mut().zip(&job.contact_bodies) {
                let (mut sa, mut sb) = (job.states[a], job.states[b]);
                solve_contact_velocity(constraint, &mut sa, &mut sb);
                job.states[a] = sa;
                job.states[b] = sb;
            }
        }

        integrate_positions(&mut job.states, settings, dt);

        for iteration in 0..settings.position_iterations {
            let mut min_separation = 0.0f32;
            for (constraint, &(a, b)) in job.contacts.iter().zip(&job.contact_bodies) {
                let (mut sa, mut sb) = (job.states[a], job.states[b]);
                min_separation =
                    min_separation.min(solve_contact_position(constraint, &mut sa, &mut sb, settings));
                job.states[a] = sa;
                job.states[b] = sb;
            }
            let contacts_ok = min_separation >= -3.0 * settings.linear_tolerance;

            let mut joints_ok = true;
            for joint in &mut job.joints {
                joints_ok &= joint.solve_position(&mut job.states, settings);
            }

            if contacts_ok && joints_ok {
                tracing::trace!(iteration, "position phase converged");
                break;
            }
        }
    }
}

fn integrate_velocities(states: &mut [BodyState], dt: f32) {
    for state in states.iter_mut().filter(|s| s.dynamic) {
        state.linear_velocity += state.force * state.inv_mass * dt;
        state.angular_velocity += state.torque * state.inv_inertia * dt;

        state.linear_velocity *= 1.0 / (1.0 + dt * state.linear_damping.max(0.0));
        state.angular_velocity *= 1.0 / (1.0 + dt * state.angular_damping.max(0.0));
    }
}

fn integrate_positions(states: &mut [BodyState], settings: &Settings, dt: f32) {
    for state in states.iter_mut().filter(|s| s.dynamic) {
        let translation = state.linear_velocity * dt;
        let distance = translation.length();
        if distance > settings.max_translation {
            state.linear_velocity *= settings.max_translation / distance;
        }
        let rotation = state.angular_velocity * dt;
        if rotation.abs() > settings.max_rotation {
            state.angular_velocity *= settings.max_rotation / rotation.abs();
        }
        state.move_by(state.linear_velocity * dt, state.angular_velocity * dt);
    }
}

fn initialize_contact(
    constraint: &mut ContactConstraint,
    sa: &BodyState,
    sb: &BodyState,
    settings: &Settings,
) {
    let (n, t) = (constraint.normal, constraint.tangent);
    let (ma, ia, mb, ib) = (sa.inv_mass, sa.inv_inertia, sb.inv_mass, sb.inv_inertia);

    for contact in &mut constraint.contacts {
        contact.ignored = false;
        contact.r_a = contact.point - sa.center;
        contact.r_b = contact.point - sb.center;

        let rn_a = contact.r_a.perp_dot(n);
        let rn_b = contact.r_b.perp_dot(n);
        let k_normal = ma + mb + ia * rn_a * rn_a + ib * rn_b * rn_b;
        contact.normal_mass = if k_normal > 0.0 { 1.0 / k_normal } else { 0.0 };

        let rt_a = contact.r_a.perp_dot(t);
        let rt_b = contact.r_b.perp_dot(t);
        let k_tangent = ma + mb + ia * rt_a * rt_a + ib * rt_b * rt_b;
        contact.tangent_mass = if k_tangent > 0.0 { 1.0 / k_tangent } else { 0.0 };

        let approach = n.dot(sb.velocity_at(contact.r_b) - sa.velocity_at(contact.r_a));
        contact.velocity_bias = if approach < -constraint.restitution_velocity {
            -constraint.restitution * approach
        } else {
            0.0
        };
    }

    constraint.block = false;
    if let [c1, c2] = constraint.contacts.as_mut_slice() {
        let rn1_a = c1.r_a.perp_dot(n);
        let rn1_b = c1.r_b.perp_dot(n);
        let rn2_a = c2.r_a.perp_dot(n);
        let rn2_b = c2.r_b.perp_dot(n);

        let k11 = ma + mb + ia * rn1_a * rn1_a + ib * rn1_b * rn1_b;
        let k22 = ma + mb + ia * rn2_a * rn2_a + ib * rn2_b * rn2_b;
        let k12 = ma + mb + ia * rn1_a * rn2_a + ib * rn1_b * rn2_b;

        if k11 * k11 < settings.max_condition * (k11 * k22 - k12 * k12) {
            constraint.k = Mat2::from_cols(Vec2::new(k11, k12), Vec2::new(k12, k22));
            constraint.normal_mass = constraint.k.inverse();
            constraint.block = true;
        } else {
            // Nearly parallel rows: solve only the deeper point.
            let shallower = if c1.depth < c2.depth { c1 } else { c2 };
            shallower.ignored = true;
            shallower.normal_impulse = 0.0;
            shallower.tangent_impulse = 0.0;
        }
    }
}

fn warm_start_contact(constraint: &ContactConstraint, sa: &mut BodyState, sb: &mut BodyState) {
    for contact in constraint.contacts.iter().filter(|c| !c.ignored) {
        let p = constraint.normal * contact.normal_impulse
            + constraint.tangent * contact.tangent_impulse;
        sa.apply_impulse(-p, contact.r_a);
        sb.apply_impulse(p, contact.r_b);
    }
}

fn solve_contact_velocity(constraint: &mut ContactConstraint, sa: &mut BodyState, sb: &mut BodyState) {
    let (n, t) = (constraint.normal, constraint.tangent);

    // Friction first: it is bounded by the normal impulse, and non-penetration
    // matters more.
    for contact in constraint.contacts.iter_mut().filter(|c| !c.ignored) {
        let dv = sb.velocity_at(contact.r_b) - sa.velocity_at(contact.r_a);
        let lambda = -contact.tangent_mass * dv.dot(t);
        let max_friction = constraint.friction * contact.normal_impulse;
        let accumulated =
            (contact.tangent_impulse + lambda).clamp(-max_friction, max_friction);
        let lambda = accumulated - contact.tangent_impulse;
        contact.tangent_impulse = accumulated;

        let p = t * lambda;
        sa.apply_impulse(-p, contact.r_a);
        sb.apply_impulse(p, contact.r_b);
    }

    if constraint.block {
        solve_block(constraint, sa, sb);
        return;
    }

    for contact in constraint.contacts.iter_mut().filter(|c| !c.ignored) {
        let dv = sb.velocity_at(contact.r_b) - sa.velocity_at(contact.r_a);
        let lambda = -contact.normal_mass * (dv.dot(n) - contact.velocity_bias);
        let accumulated = (contact.normal_impulse + lambda).max(0.0);
        let lambda = accumulated - contact.normal_impulse;
        contact.normal_impulse = accumulated;

        let p = n * lambda;
        sa.apply_impulse(-p, contact.r_a);
        sb.apply_impulse(p, contact.r_b);
    }
}

/// Two-point normal solve as a linear complementarity problem, trying the
/// four cases (both active, only first, only second, neither) in order.
fn solve_block(constraint: &mut ContactConstraint, sa: &mut BodyState, sb: &mut BodyState) {
    let n = constraint.normal;
    let (k, normal_mass) = (constraint.k, constraint.normal_mass);
    let [c1, c2] = constraint.contacts.as_mut_slice() else {
        return;
    };

    let a = Vec2::new(c1.normal_impulse, c2.normal_impulse);
    let dv1 = sb.velocity_at(c1.r_b) - sa.velocity_at(c1.r_a);
    let dv2 = sb.velocity_at(c2.r_b) - sa.velocity_at(c2.r_a);
    let b = Vec2::new(dv1.dot(n) - c1.velocity_bias, dv2.dot(n) - c2.velocity_bias) - k * a;

    let Some(x) = block_solution(k, normal_mass, b, c1.normal_mass, c2.normal_mass) else {
        return;
    };

    let d = x - a;
    let p1 = n * d.x;
    let p2 = n * d.y;
    sa.apply_impulse(-p1, c1.r_a);
    sa.apply_impulse(-p2, c2.r_a);
    sb.apply_impulse(p1, c1.r_b);
    sb.apply_impulse(p2, c2.r_b);
    c1.normal_impulse = x.x;
    c2.normal_impulse = x.y;
}

/// Impulses `x` with `x >= 0`, `K x + b >= 0` and complementarity, or
/// `None` when no case applies.
fn block_solution(k: Mat2, normal_mass: Mat2, b: Vec2, mass1: f32, mass2: f32) -> Option<Vec2> {
    // Both points active: K x + b = 0.
    let x = -(normal_mass * b);
    if x.x >= 0.0 && x.y >= 0.0 {
        return Some(x);
    }

    // Only the first point active.
    let x1 = -mass1 * b.x;
    if x1 >= 0.0 && k.x_axis.y * x1 + b.y >= 0.0 {
        return Some(Vec2::new(x1, 0.0));
    }

    // Only the second point active.
    let x2 = -mass2 * b.y;
    if x2 >= 0.0 && k.y_axis.x * x2 + b.x >= 0.0 {
        return Some(Vec2::new(0.0, x2));
    }

    // Neither: both points separating.
    (b.x >= 0.0 && b.y >= 0.0).then_some(Vec2::ZERO)
}

/// Returns the smallest separation seen (negative when penetrating).
fn solve_contact_position(
    constraint: &ContactConstraint,
    sa: &mut BodyState,
    sb: &mut BodyState,
    settings: &Settings,
) -> f32 {
    let n = constraint.normal;
    let mut min_separation = 0.0f32;

    for contact in constraint.contacts.iter().filter(|c| !c.ignored) {
        let pa = sa.world_point(contact.local_a);
        let pb = sb.world_point(contact.local_b);
        let separation = (pb - pa).dot(n) - contact.depth;
        min_separation = min_separation.min(separation);

        let point = (pa + pb) * 0.5;
        let r_a = point - sa.center;
        let r_b = point - sb.center;

        let c = (settings.baumgarte * (separation + settings.linear_tolerance))
            .clamp(-settings.max_linear_correction, 0.0);
        let rn_a = r_a.perp_dot(n);
        let rn_b = r_b.perp_dot(n);
        let k = sa.inv_mass + sb.inv_mass + sa.inv_inertia * rn_a * rn_a + sb.inv_inertia * rn_b * rn_b;
        let impulse = if k > 0.0 { -c / k } else { 0.0 };

        let p = n * impulse;
        sa.apply_position_impulse(-p, r_a, settings.max_angular_correction);
        sb.apply_position_impulse(p, r_b, settings.max_angular_correction);
    }
    min_separation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{Manifold, ManifoldPoint, ManifoldPointId};
    use crate::physics::contact::ContactConstraintId;

    fn state(center: Vec2, inv_mass: f32, inv_inertia: f32) -> BodyState {
        BodyState {
            transform: Transform::from_translation(center),
            center,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            inv_mass,
            inv_inertia,
            force: Vec2::ZERO,
            torque: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            dynamic: inv_mass > 0.0,
        }
    }

    fn resting_box_job(depth: f32, velocity: Vec2) -> IslandJob {
        let ground = state(Vec2::new(0.0, -0.5), 0.0, 0.0);
        let mut body = state(Vec2::new(0.0, 0.5 - depth), 1.0, 6.0);
        body.linear_velocity = velocity;

        let mut world = hecs::World::new();
        let id = ContactConstraintId {
            body_a: world.spawn(()),
            fixture_a: 0,
            body_b: world.spawn(()),
            fixture_b: 0,
        };
        let manifold = Manifold {
            normal: Vec2::Y,
            points: [-0.5, 0.5]
                .iter()
                .enumerate()
                .map(|(i, &x)| ManifoldPoint {
                    point: Vec2::new(x, -depth),
                    depth,
                    id: ManifoldPointId::Indexed {
                        reference_edge: 2,
                        incident_edge: 0,
                        incident_vertex: Some(i),
                        flipped: false,
                    },
                })
                .collect(),
        };
        let constraint = ContactConstraint::new(
            id,
            (0, 1),
            &manifold,
            &ground.transform,
            &body.transform,
            0.5,
            0.0,
            &Settings::default(),
            false,
        );
        IslandJob {
            bodies: vec![0, 1],
            states: vec![ground, body],
            contact_indices: vec![0],
            contacts: vec![constraint],
            contact_bodies: vec![(0, 1)],
            joints: Vec::new(),
        }
    }

    #[test]
    fn test_falling_box_is_stopped() {
        let settings = Settings::default();
        let mut job = resting_box_job(0.0, Vec2::new(0.0, -2.0));
        SequentialImpulses.solve(&mut job, &settings, settings.dt());

        let body = &job.states[1];
        assert!(body.linear_velocity.y.abs() < 1e-3, "{body:?}");
        assert!(body.angular_velocity.abs() < 1e-3);
        let impulses: Vec<f32> = job.contacts[0].contacts.iter().map(|c| c.normal_impulse).collect();
        assert!((impulses[0] - impulses[1]).abs() < 1e-3);
        assert!((impulses[0] + impulses[1] - 2.0).abs() < 1e-2);
        assert!(job.contacts[0].block);
    }

    #[test]
    fn test_penetration_is_reduced() {
        let settings = Settings::default();
        let mut job = resting_box_job(0.1, Vec2::ZERO);
        let before = job.states[1].center.y;
        SequentialImpulses.solve(&mut job, &settings, settings.dt());
        let after = job.states[1].center.y;
        assert!(after > before);
        assert!(after - before <= settings.max_linear_correction * settings.position_iterations as f32);
        // The static body never moves.
        assert_eq!(job.states[0].center, Vec2::new(0.0, -0.5));
    }

    #[test]
    fn test_friction_bounded_by_normal_impulse() {
        let settings = Settings::default();
        let mut job = resting_box_job(0.0, Vec2::new(5.0, -1.0));
        SequentialImpulses.solve(&mut job, &settings, settings.dt());
        for contact in &job.contacts[0].contacts {
            assert!(contact.tangent_impulse.abs() <= 0.5 * contact.normal_impulse + 1e-5);
        }
        assert!(job.states[1].linear_velocity.x > 0.0);
        assert!(job.states[1].linear_velocity.x < 5.0);
    }

    #[test]
    fn test_ill_conditioned_pair_ignores_shallower_point() {
        let settings = Settings::default();
        let mut job = resting_box_job(0.0, Vec2::new(0.0, -1.0));
        // Two nearly coincident points make the block matrix singular.
        let constraint = &mut job.contacts[0];
        constraint.contacts[1].point = constraint.contacts[0].point + Vec2::new(1e-4, 0.0);
        constraint.contacts[1].depth = 0.0;
        constraint.contacts[0].depth = 0.01;
        SequentialImpulses.solve(&mut job, &settings, settings.dt());

        let constraint = &job.contacts[0];
        assert!(!constraint.block);
        let solved: Vec<bool> = constraint.solved_contacts().map(|c| c.is_solved()).collect();
        assert_eq!(solved, vec![true, false]);
    }

    #[test]
    fn test_dependent_point_is_left_out() {
        let settings = Settings::default();
        let mut job = resting_box_job(0.0, Vec2::new(0.0, -2.0));
        // Without rotation both rows of the block matrix are identical.
        job.states[1].inv_inertia = 0.0;
        SequentialImpulses.solve(&mut job, &settings, settings.dt());

        let constraint = &job.contacts[0];
        assert!(!constraint.block);
        // Equal depths: the second point is dropped.
        assert!(!constraint.contacts[0].is_ignored());
        assert!(constraint.contacts[1].is_ignored());
        assert_eq!(constraint.contacts[1].normal_impulse, 0.0);
        assert!((constraint.contacts[0].normal_impulse - 2.0).abs() < 1e-2);
        assert!(job.states[1].linear_velocity.y.abs() < 1e-3);
    }

    #[test]
    fn test_translation_is_capped() {
        let settings = Settings::default();
        let mut states = vec![state(Vec2::ZERO, 1.0, 1.0)];
        states[0].linear_velocity = Vec2::new(1000.0, 0.0);
        integrate_positions(&mut states, &settings, settings.dt());
        assert!((states[0].center.x - settings.max_translation).abs() < 1e-4);
    }
}
