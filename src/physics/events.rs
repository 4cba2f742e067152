//! Collision and contact notifications.

use glam::Vec2;

use crate::collision::{Manifold, Penetration};

use super::contact::{ContactConstraint, ContactConstraintId, SolvedContact};

/// A fixture on a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixtureRef {
    pub entity: hecs::Entity,
    pub fixture: usize,
}

/// What a listener wants done with the pair or constraint an event is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flow {
    #[default]
    Continue,
    /// Stop processing the pair for this step, or disable the constraint
    /// for this step.
    Halt,
}

/// Handle returned by [`super::PhysicsWorld::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// One contact point as reported by begin, persist and end events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPointEvent {
    pub constraint: ContactConstraintId,
    pub point: Vec2,
    /// Unit normal from body A to body B.
    pub normal: Vec2,
    pub depth: f32,
    pub sensor: bool,
}

/// Everything a listener can observe during a step.
#[derive(Debug, Clone, Copy)]
pub enum PhysicsEvent<'a> {
    /// The broad phase found overlapping bounding boxes.
    Broadphase { a: FixtureRef, b: FixtureRef },
    /// The shapes overlap.
    Narrowphase {
        a: FixtureRef,
        b: FixtureRef,
        penetration: &'a Penetration,
    },
    /// Contact points were generated.
    Manifold {
        a: FixtureRef,
        b: FixtureRef,
        manifold: &'a Manifold,
    },
    ContactBegin(ContactPointEvent),
    ContactPersist(ContactPointEvent),
    ContactEnd(ContactPointEvent),
    /// A constraint is about to be solved.
    PreSolve(&'a ContactConstraint),
    /// A contact point after solving.
    PostSolve(&'a SolvedContact),
}

type Listener = Box<dyn FnMut(&PhysicsEvent<'_>) -> Flow + Send>;

/// Registered listeners, notified in subscription order.
#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, Listener)>,
}

impl Listeners {
    pub fn subscribe(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every listener sees the event; any `Halt` wins.
    pub fn emit(&mut self, event: &PhysicsEvent<'_>) -> Flow {
        let mut flow = Flow::Continue;
        for (_, listener) in &mut self.entries {
            if listener(event) == Flow::Halt {
                flow = Flow::Halt;
            }
        }
        flow
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}
