//! Contact constraints and their persistence across steps.

use std::collections::HashMap;

use glam::{Mat2, Vec2};

use crate::collision::{Manifold, ManifoldPointId};
use crate::geometry::Transform;

use super::events::{ContactPointEvent, Flow, PhysicsEvent};
use super::settings::Settings;

/// Identity of a constraint: the two fixtures in contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContactConstraintId {
    pub body_a: hecs::Entity,
    pub fixture_a: usize,
    pub body_b: hecs::Entity,
    pub fixture_b: usize,
}

/// A single contact point within a constraint.
#[derive(Debug, Clone)]
pub struct Contact {
    pub id: ManifoldPointId,
    /// World-space point when the contact was generated.
    pub point: Vec2,
    pub depth: f32,
    /// Accumulated normal impulse.
    pub normal_impulse: f32,
    /// Accumulated friction impulse.
    pub tangent_impulse: f32,
    /// `point` relative to each body origin, in body coordinates.
    pub(crate) local_a: Vec2,
    pub(crate) local_b: Vec2,
    /// Set by the solver when this point is linearly dependent on its
    /// sibling and was left out.
    pub(crate) ignored: bool,

    // Per-step solver data.
    pub(crate) r_a: Vec2,
    pub(crate) r_b: Vec2,
    pub(crate) normal_mass: f32,
    pub(crate) tangent_mass: f32,
    pub(crate) velocity_bias: f32,
}

impl Contact {
    fn new(id: ManifoldPointId, point: Vec2, depth: f32, ta: &Transform, tb: &Transform) -> Self {
        Self {
            id,
            point,
            depth,
            normal_impulse: 0.0,
            tangent_impulse: 0.0,
            local_a: ta.inverse_transform_point(point),
            local_b: tb.inverse_transform_point(point),
            ignored: false,
            r_a: Vec2::ZERO,
            r_b: Vec2::ZERO,
            normal_mass: 0.0,
            tangent_mass: 0.0,
            velocity_bias: 0.0,
        }
    }

    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    /// Whether this point is the same physical contact as `old`.
    fn matches(&self, old: &Contact, max_distance_squared: f32) -> bool {
        match self.id {
            ManifoldPointId::Distance => {
                self.point.distance_squared(old.point) <= max_distance_squared
            }
            id => id == old.id,
        }
    }
}

/// All contact points between two fixtures, sharing one normal.
#[derive(Debug, Clone)]
pub struct ContactConstraint {
    pub id: ContactConstraintId,
    /// Unit normal from body A to body B.
    pub normal: Vec2,
    pub tangent: Vec2,
    pub friction: f32,
    pub restitution: f32,
    /// Approach speed above which restitution applies.
    pub restitution_velocity: f32,
    pub sensor: bool,
    pub contacts: Vec<Contact>,
    pub(crate) enabled: bool,
    /// Indices of the two bodies in the current step's body list.
    pub(crate) body_a: usize,
    pub(crate) body_b: usize,

    // Block solver data for two-point constraints.
    pub(crate) k: Mat2,
    pub(crate) normal_mass: Mat2,
    pub(crate) block: bool,
}

impl ContactConstraint {
    /// Constraint from a manifold, with anchors taken relative to the body
    /// transforms `ta` and `tb`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ContactConstraintId,
        bodies: (usize, usize),
        manifold: &Manifold,
        ta: &Transform,
        tb: &Transform,
        friction: f32,
        restitution: f32,
        settings: &Settings,
        sensor: bool,
    ) -> Self {
        let normal = manifold.normal;
        Self {
            id,
            normal,
            tangent: Vec2::new(normal.y, -normal.x),
            friction: friction.max(0.0),
            restitution: restitution.max(0.0),
            restitution_velocity: settings.restitution_velocity,
            sensor,
            contacts: manifold
                .points
                .iter()
                .map(|p| Contact::new(p.id, p.point, p.depth, ta, tb))
                .collect(),
            enabled: true,
            body_a: bodies.0,
            body_b: bodies.1,
            k: Mat2::ZERO,
            normal_mass: Mat2::ZERO,
            block: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the solver acts on this constraint.
    pub fn is_solvable(&self) -> bool {
        self.enabled && !self.sensor && !self.contacts.is_empty()
    }

    /// Post-solve report for each point.
    pub fn solved_contacts(&self) -> impl Iterator<Item = SolvedContact> + '_ {
        self.contacts.iter().map(move |c| SolvedContact {
            constraint: self.id,
            point: c.point,
            normal: self.normal,
            depth: c.depth,
            normal_impulse: c.normal_impulse,
            tangent_impulse: c.tangent_impulse,
            solved: !c.ignored,
        })
    }

    fn point_event(&self, contact: &Contact) -> ContactPointEvent {
        ContactPointEvent {
            constraint: self.id,
            point: contact.point,
            normal: self.normal,
            depth: contact.depth,
            sensor: self.sensor,
        }
    }
}

/// A contact point after the velocity and position phases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolvedContact {
    pub constraint: ContactConstraintId,
    pub point: Vec2,
    pub normal: Vec2,
    pub depth: f32,
    pub normal_impulse: f32,
    pub tangent_impulse: f32,
    solved: bool,
}

impl SolvedContact {
    /// False when the solver left this point out of the two-point block.
    pub fn is_solved(&self) -> bool {
        self.solved
    }
}

/// Owns the constraints between steps, carrying impulses over to matching
/// contacts and reporting contact begin/persist/end.
#[derive(Debug, Default)]
pub struct ContactManager {
    constraints: Vec<ContactConstraint>,
}

impl ContactManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constraints(&self) -> &[ContactConstraint] {
        &self.constraints
    }

    pub(crate) fn constraints_mut(&mut self) -> &mut Vec<ContactConstraint> {
        &mut self.constraints
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Replace last step's constraints with `incoming`.
    ///
    /// Old constraints with no incoming counterpart are kept unchanged
    /// when `keep` says so (the pair was not tested this step); otherwise
    /// they end.
    pub fn update(
        &mut self,
        incoming: Vec<ContactConstraint>,
        settings: &Settings,
        keep: impl Fn(&ContactConstraintId) -> bool,
        emit: &mut dyn FnMut(&PhysicsEvent<'_>) -> Flow,
    ) {
        let old = std::mem::take(&mut self.constraints);
        let old_index: HashMap<ContactConstraintId, usize> =
            old.iter().enumerate().map(|(i, c)| (c.id, i)).collect();
        let mut consumed = vec![false; old.len()];
        let max_distance_squared = settings.warm_start_distance * settings.warm_start_distance;

        let mut merged = Vec::with_capacity(incoming.len());
        for mut constraint in incoming {
            let mut halted = false;
            let previous = old_index.get(&constraint.id).map(|&i| {
                consumed[i] = true;
                &old[i]
            });

            let mut matched = vec![false; previous.map_or(0, |p| p.contacts.len())];
            for i in 0..constraint.contacts.len() {
                let found = previous.and_then(|prev| {
                    prev.contacts.iter().enumerate().find(|(j, o)| {
                        !matched[*j] && constraint.contacts[i].matches(o, max_distance_squared)
                    })
                });
                let event = match found {
                    Some((j, o)) => {
                        matched[j] = true;
                        if settings.warm_starting {
                            constraint.contacts[i].normal_impulse = o.normal_impulse;
                            constraint.contacts[i].tangent_impulse = o.tangent_impulse;
                        }
                        PhysicsEvent::ContactPersist(constraint.point_event(&constraint.contacts[i]))
                    }
                    None => {
                        PhysicsEvent::ContactBegin(constraint.point_event(&constraint.contacts[i]))
                    }
                };
                if emit(&event) == Flow::Halt {
                    halted = true;
                }
            }

            if let Some(prev) = previous {
                for (contact, _) in prev.contacts.iter().zip(&matched).filter(|(_, m)| !**m) {
                    emit(&PhysicsEvent::ContactEnd(prev.point_event(contact)));
                }
            }

            constraint.enabled = !halted;
            merged.push(constraint);
        }

        for (constraint, consumed) in old.into_iter().zip(consumed) {
            if consumed {
                continue;
            }
            if keep(&constraint.id) {
                merged.push(constraint);
            } else {
                for contact in &constraint.contacts {
                    emit(&PhysicsEvent::ContactEnd(constraint.point_event(contact)));
                }
            }
        }

        tracing::trace!(constraints = merged.len(), "contact constraints merged");
        self.constraints = merged;
    }

    /// Point every constraint at its bodies' indices for this step.
    pub(crate) fn bind(&mut self, indices: &HashMap<hecs::Entity, usize>) {
        for constraint in &mut self.constraints {
            if let (Some(&a), Some(&b)) = (
                indices.get(&constraint.id.body_a),
                indices.get(&constraint.id.body_b),
            ) {
                constraint.body_a = a;
                constraint.body_b = b;
            }
        }
    }

    /// End every constraint, e.g. when the world is cleared.
    pub fn clear(&mut self, emit: &mut dyn FnMut(&PhysicsEvent<'_>) -> Flow) {
        for constraint in std::mem::take(&mut self.constraints) {
            for contact in &constraint.contacts {
                emit(&PhysicsEvent::ContactEnd(constraint.point_event(contact)));
            }
        }
    }

    pub fn solved_contacts(&self) -> impl Iterator<Item = SolvedContact> + '_ {
        self.constraints
            .iter()
            .filter(|c| c.is_solvable())
            .flat_map(ContactConstraint::solved_contacts)
    }
}
