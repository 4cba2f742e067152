//! Joint constraints solved alongside contacts.

use std::f32::consts::TAU;

use glam::{Mat2, Vec2};

use crate::ecs::components::{DistanceJoint, Joint, RevoluteJoint};

use super::settings::Settings;
use super::solver::BodyState;

/// Solver-side view of a [`Joint`] component.
#[derive(Debug, Clone)]
pub struct JointConstraint {
    /// Entity carrying the joint component.
    pub entity: hecs::Entity,
    /// Island-local body indices.
    pub(crate) body_a: usize,
    pub(crate) body_b: usize,
    kind: JointKind,
}

#[derive(Debug, Clone)]
enum JointKind {
    Distance(DistanceSolver),
    Revolute(RevoluteSolver),
}

#[derive(Debug, Clone)]
struct DistanceSolver {
    local_anchor_a: Vec2,
    local_anchor_b: Vec2,
    rest_length: f32,
    frequency: f32,
    damping_ratio: f32,
    impulse: f32,
    r_a: Vec2,
    r_b: Vec2,
    u: Vec2,
    mass: f32,
    gamma: f32,
    bias: f32,
}

#[derive(Debug, Clone)]
struct RevoluteSolver {
    local_anchor_a: Vec2,
    local_anchor_b: Vec2,
    impulse: Vec2,
    r_a: Vec2,
    r_b: Vec2,
    mass: Mat2,
}

impl JointConstraint {
    pub fn new(entity: hecs::Entity, joint: &Joint, body_a: usize, body_b: usize) -> Self {
        let kind = match joint {
            Joint::Distance(j) => JointKind::Distance(DistanceSolver::from_joint(j)),
            Joint::Revolute(j) => JointKind::Revolute(RevoluteSolver::from_joint(j)),
        };
        Self {
            entity,
            body_a,
            body_b,
            kind,
        }
    }

    /// Copy the accumulated impulse back into the component.
    pub fn store(&self, joint: &mut Joint) {
        match (&self.kind, joint) {
            (JointKind::Distance(s), Joint::Distance(j)) => j.impulse = s.impulse,
            (JointKind::Revolute(s), Joint::Revolute(j)) => j.impulse = s.impulse,
            _ => {}
        }
    }

    pub(crate) fn initialize(&mut self, states: &[BodyState], settings: &Settings, dt: f32) {
        let (sa, sb) = (&states[self.body_a], &states[self.body_b]);
        match &mut self.kind {
            JointKind::Distance(s) => s.initialize(sa, sb, settings, dt),
            JointKind::Revolute(s) => s.initialize(sa, sb),
        }
    }

    pub(crate) fn warm_start(&mut self, states: &mut [BodyState], enabled: bool) {
        let (mut sa, mut sb) = (states[self.body_a], states[self.body_b]);
        match &mut self.kind {
            JointKind::Distance(s) => {
                if !enabled {
                    s.impulse = 0.0;
                }
                let p = s.u * s.impulse;
                sa.apply_impulse(-p, s.r_a);
                sb.apply_impulse(p, s.r_b);
            }
            JointKind::Revolute(s) => {
                if !enabled {
                    s.impulse = Vec2::ZERO;
                }
                sa.apply_impulse(-s.impulse, s.r_a);
                sb.apply_impulse(s.impulse, s.r_b);
            }
        }
        states[self.body_a] = sa;
        states[self.body_b] = sb;
    }

    pub(crate) fn solve_velocity(&mut self, states: &mut [BodyState]) {
        let (mut sa, mut sb) = (states[self.body_a], states[self.body_b]);
        match &mut self.kind {
            JointKind::Distance(s) => s.solve_velocity(&mut sa, &mut sb),
            JointKind::Revolute(s) => s.solve_velocity(&mut sa, &mut sb),
        }
        states[self.body_a] = sa;
        states[self.body_b] = sb;
    }

    /// Returns whether the joint is within tolerance.
    pub(crate) fn solve_position(&mut self, states: &mut [BodyState], settings: &Settings) -> bool {
        let (mut sa, mut sb) = (states[self.body_a], states[self.body_b]);
        let ok = match &mut self.kind {
            JointKind::Distance(s) => s.solve_position(&mut sa, &mut sb, settings),
            JointKind::Revolute(s) => s.solve_position(&mut sa, &mut sb, settings),
        };
        states[self.body_a] = sa;
        states[self.body_b] = sb;
        ok
    }
}

/// Offsets of the two anchors from their bodies' centres of mass.
fn anchor_offsets(sa: &BodyState, sb: &BodyState, local_a: Vec2, local_b: Vec2) -> (Vec2, Vec2) {
    (
        sa.world_point(local_a) - sa.center,
        sb.world_point(local_b) - sb.center,
    )
}

impl DistanceSolver {
    fn from_joint(joint: &DistanceJoint) -> Self {
        Self {
            local_anchor_a: joint.local_anchor_a,
            local_anchor_b: joint.local_anchor_b,
            rest_length: joint.rest_length.max(0.0),
            frequency: joint.frequency.max(0.0),
            damping_ratio: joint.damping_ratio.max(0.0),
            impulse: joint.impulse,
            r_a: Vec2::ZERO,
            r_b: Vec2::ZERO,
            u: Vec2::ZERO,
            mass: 0.0,
            gamma: 0.0,
            bias: 0.0,
        }
    }

    fn initialize(&mut self, sa: &BodyState, sb: &BodyState, settings: &Settings, dt: f32) {
        (self.r_a, self.r_b) = anchor_offsets(sa, sb, self.local_anchor_a, self.local_anchor_b);
        let d = (sb.center + self.r_b) - (sa.center + self.r_a);
        let length = d.length();
        self.u = if length > settings.linear_tolerance {
            d / length
        } else {
            Vec2::ZERO
        };

        let cr_a = self.r_a.perp_dot(self.u);
        let cr_b = self.r_b.perp_dot(self.u);
        let mut inv_mass =
            sa.inv_mass + sa.inv_inertia * cr_a * cr_a + sb.inv_mass + sb.inv_inertia * cr_b * cr_b;
        self.mass = if inv_mass != 0.0 { 1.0 / inv_mass } else { 0.0 };

        self.gamma = 0.0;
        self.bias = 0.0;
        if self.frequency > 0.0 {
            let error = length - self.rest_length;
            let omega = TAU * self.frequency;
            let damping = 2.0 * self.mass * self.damping_ratio * omega;
            let stiffness = self.mass * omega * omega;

            let gamma = dt * (damping + dt * stiffness);
            self.gamma = if gamma != 0.0 { 1.0 / gamma } else { 0.0 };
            self.bias = error * dt * stiffness * self.gamma;

            inv_mass += self.gamma;
            self.mass = if inv_mass != 0.0 { 1.0 / inv_mass } else { 0.0 };
        }
    }

    fn solve_velocity(&mut self, sa: &mut BodyState, sb: &mut BodyState) {
        let cdot = self.u.dot(sb.velocity_at(self.r_b) - sa.velocity_at(self.r_a));
        let impulse = -self.mass * (cdot + self.bias + self.gamma * self.impulse);
        self.impulse += impulse;

        let p = self.u * impulse;
        sa.apply_impulse(-p, self.r_a);
        sb.apply_impulse(p, self.r_b);
    }

    fn solve_position(&mut self, sa: &mut BodyState, sb: &mut BodyState, settings: &Settings) -> bool {
        // Springs are soft; no position correction.
        if self.frequency > 0.0 {
            return true;
        }
        let (r_a, r_b) = anchor_offsets(sa, sb, self.local_anchor_a, self.local_anchor_b);
        let d = (sb.center + r_b) - (sa.center + r_a);
        let length = d.length();
        let u = if length > 0.0 { d / length } else { Vec2::ZERO };
        let error = (length - self.rest_length)
            .clamp(-settings.max_linear_correction, settings.max_linear_correction);

        let p = u * (-self.mass * error);
        sa.apply_position_impulse(-p, r_a, settings.max_angular_correction);
        sb.apply_position_impulse(p, r_b, settings.max_angular_correction);

        error.abs() < settings.linear_tolerance
    }
}

impl RevoluteSolver {
    fn from_joint(joint: &RevoluteJoint) -> Self {
        Self {
            local_anchor_a: joint.local_anchor_a,
            local_anchor_b: joint.local_anchor_b,
            impulse: joint.impulse,
            r_a: Vec2::ZERO,
            r_b: Vec2::ZERO,
            mass: Mat2::ZERO,
        }
    }

    fn initialize(&mut self, sa: &BodyState, sb: &BodyState) {
        (self.r_a, self.r_b) = anchor_offsets(sa, sb, self.local_anchor_a, self.local_anchor_b);
        self.mass = point_mass(sa, sb, self.r_a, self.r_b).inverse();
        if !self.mass.is_finite() {
            self.mass = Mat2::ZERO;
        }
    }

    fn solve_velocity(&mut self, sa: &mut BodyState, sb: &mut BodyState) {
        let cdot = sb.velocity_at(self.r_b) - sa.velocity_at(self.r_a);
        let impulse = -(self.mass * cdot);
        self.impulse += impulse;
        sa.apply_impulse(-impulse, self.r_a);
        sb.apply_impulse(impulse, self.r_b);
    }

    fn solve_position(&mut self, sa: &mut BodyState, sb: &mut BodyState, settings: &Settings) -> bool {
        let (r_a, r_b) = anchor_offsets(sa, sb, self.local_anchor_a, self.local_anchor_b);
        let error = (sb.center + r_b) - (sa.center + r_a);

        let k = point_mass(sa, sb, r_a, r_b);
        let mut impulse = -(k.inverse() * error);
        if !impulse.is_finite() {
            impulse = Vec2::ZERO;
        }
        sa.apply_position_impulse(-impulse, r_a, settings.max_angular_correction);
        sb.apply_position_impulse(impulse, r_b, settings.max_angular_correction);

        error.length() <= settings.linear_tolerance
    }
}

/// Effective mass matrix (inverse) of a point-to-point constraint.
fn point_mass(sa: &BodyState, sb: &BodyState, r_a: Vec2, r_b: Vec2) -> Mat2 {
    let (ma, mb, ia, ib) = (sa.inv_mass, sb.inv_mass, sa.inv_inertia, sb.inv_inertia);
    let k11 = ma + mb + ia * r_a.y * r_a.y + ib * r_b.y * r_b.y;
    let k12 = -ia * r_a.x * r_a.y - ib * r_b.x * r_b.y;
    let k22 = ma + mb + ia * r_a.x * r_a.x + ib * r_b.x * r_b.x;
    Mat2::from_cols(Vec2::new(k11, k12), Vec2::new(k12, k22))
}
