//! Grouping of bodies connected by contacts and joints.

use crate::ecs::components::RigidBodyType;

/// A body as seen by the island builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IslandNode {
    pub body_type: RigidBodyType,
    pub sleeping: bool,
}

/// Bodies that interact through contacts or joints and are solved together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Island {
    /// Indices into the step's body list. Static and kinematic bodies may
    /// also belong to other islands.
    pub bodies: Vec<usize>,
    /// Indices into the contact constraint list.
    pub contacts: Vec<usize>,
    pub joints: Vec<usize>,
}

#[derive(Debug, Clone, Copy)]
enum Edge {
    Contact(usize),
    Joint(usize),
}

/// Depth-first island search.
#[derive(Debug, Default)]
pub struct IslandBuilder {
    adjacency: Vec<Vec<(Edge, usize)>>,
    body_visited: Vec<bool>,
    contact_visited: Vec<bool>,
    joint_visited: Vec<bool>,
    stack: Vec<usize>,
}

impl IslandBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build islands seeded from awake dynamic bodies, in body order.
    ///
    /// `contacts[i]` is the body pair of contact constraint `i`, or `None`
    /// when that constraint does not link its bodies (disabled, sensor or
    /// without points). Sleeping dynamic bodies reached through an edge are
    /// pulled into the island.
    pub fn build(
        &mut self,
        nodes: &[IslandNode],
        contacts: &[Option<(usize, usize)>],
        joints: &[(usize, usize)],
    ) -> Vec<Island> {
        self.reset(nodes.len(), contacts.len(), joints.len());
        for (i, pair) in contacts.iter().enumerate() {
            if let Some((a, b)) = *pair {
                self.adjacency[a].push((Edge::Contact(i), b));
                self.adjacency[b].push((Edge::Contact(i), a));
            }
        }
        for (i, &(a, b)) in joints.iter().enumerate() {
            self.adjacency[a].push((Edge::Joint(i), b));
            self.adjacency[b].push((Edge::Joint(i), a));
        }

        let is_dynamic = |i: usize| nodes[i].body_type == RigidBodyType::Dynamic;
        let mut islands = Vec::new();
        let mut shared = Vec::new();

        for seed in 0..nodes.len() {
            if self.body_visited[seed] || !is_dynamic(seed) || nodes[seed].sleeping {
                continue;
            }

            let mut island = Island::default();
            self.stack.push(seed);
            self.body_visited[seed] = true;

            while let Some(body) = self.stack.pop() {
                island.bodies.push(body);
                // Static and kinematic bodies terminate the search.
                if !is_dynamic(body) {
                    continue;
                }
                for &(edge, other) in &self.adjacency[body] {
                    match edge {
                        Edge::Contact(i) if !self.contact_visited[i] => {
                            self.contact_visited[i] = true;
                            island.contacts.push(i);
                        }
                        Edge::Joint(i) if !self.joint_visited[i] => {
                            self.joint_visited[i] = true;
                            island.joints.push(i);
                        }
                        _ => continue,
                    }
                    if !self.body_visited[other] {
                        self.body_visited[other] = true;
                        if !is_dynamic(other) {
                            shared.push(other);
                        }
                        self.stack.push(other);
                    }
                }
            }

            // Shared bodies may join later islands too.
            for body in shared.drain(..) {
                self.body_visited[body] = false;
            }
            islands.push(island);
        }

        tracing::trace!(islands = islands.len(), "islands built");
        islands
    }

    fn reset(&mut self, bodies: usize, contacts: usize, joints: usize) {
        self.adjacency.iter_mut().for_each(Vec::clear);
        self.adjacency.resize_with(bodies, Vec::new);
        self.body_visited.clear();
        self.body_visited.resize(bodies, false);
        self.contact_visited.clear();
        self.contact_visited.resize(contacts, false);
        self.joint_visited.clear();
        self.joint_visited.resize(joints, false);
        self.stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(body_type: RigidBodyType) -> IslandNode {
        IslandNode {
            body_type,
            sleeping: false,
        }
    }

    #[test]
    fn test_static_body_does_not_join_islands() {
        // Two boxes resting on the same ground stay separate.
        let nodes = [
            node(RigidBodyType::Static),
            node(RigidBodyType::Dynamic),
            node(RigidBodyType::Dynamic),
        ];
        let contacts = [Some((0, 1)), Some((0, 2))];
        let islands = IslandBuilder::new().build(&nodes, &contacts, &[]);
        assert_eq!(islands.len(), 2);
        assert_eq!(islands[0].bodies, vec![1, 0]);
        assert_eq!(islands[0].contacts, vec![0]);
        assert_eq!(islands[1].bodies, vec![2, 0]);
        assert_eq!(islands[1].contacts, vec![1]);
    }

    #[test]
    fn test_stack_and_joint_form_one_island() {
        let nodes = [
            node(RigidBodyType::Static),
            node(RigidBodyType::Dynamic),
            node(RigidBodyType::Dynamic),
            node(RigidBodyType::Dynamic),
        ];
        let contacts = [Some((0, 1)), Some((1, 2)), None];
        let joints = [(2, 3)];
        let islands = IslandBuilder::new().build(&nodes, &contacts, &joints);
        assert_eq!(islands.len(), 1);
        let island = &islands[0];
        assert_eq!(island.bodies.len(), 4);
        assert_eq!(island.contacts.len(), 2);
        assert_eq!(island.joints, vec![0]);
    }

    #[test]
    fn test_sleeping_bodies_seed_nothing_but_are_pulled_in() {
        let mut asleep = node(RigidBodyType::Dynamic);
        asleep.sleeping = true;
        let nodes = [asleep, node(RigidBodyType::Dynamic), asleep];
        let contacts = [Some((0, 1))];
        let islands = IslandBuilder::new().build(&nodes, &contacts, &[]);
        assert_eq!(islands.len(), 1);
        let mut bodies = islands[0].bodies.clone();
        bodies.sort_unstable();
        assert_eq!(bodies, vec![0, 1]);
    }

    #[test]
    fn test_kinematic_body_terminates_search() {
        let nodes = [
            node(RigidBodyType::Dynamic),
            node(RigidBodyType::Kinematic),
            node(RigidBodyType::Dynamic),
        ];
        let contacts = [Some((0, 1)), Some((1, 2))];
        let islands = IslandBuilder::new().build(&nodes, &contacts, &[]);
        assert_eq!(islands.len(), 2);
        assert!(islands.iter().all(|i| i.bodies.contains(&1)));
    }
}
