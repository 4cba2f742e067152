//! Scene builders shared by the physics benchmarks.

use glam::Vec2;
use rein2d::ecs::components::CollisionFilter;
use rein2d::physics::broadphase::Proxy;
use rein2d::{Aabb, Circle, Collider, Polygon, PhysicsWorld, RigidBody, Transform};

/// Deterministic pseudo-random sequence in `[0, 1)`.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next_f32(&mut self) -> f32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 40) as f32 / (1u64 << 24) as f32
    }
}

/// `n` unit boxes scattered over a square sized so that each overlaps a
/// handful of neighbours.
pub fn setup_proxies(n: usize, spread: f32) -> Vec<Proxy> {
    let mut rng = Lcg::new(7);
    let side = (n as f32).sqrt() * spread;
    (0..n)
        .map(|i| {
            let center = Vec2::new(rng.next_f32() * side, rng.next_f32() * side);
            Proxy {
                aabb: Aabb::new(center - Vec2::splat(0.5), center + Vec2::splat(0.5)),
                body: i,
                fixture: 0,
                filter: CollisionFilter::DEFAULT,
                dynamic: true,
                inactive: false,
            }
        })
        .collect()
}

/// Ground plus `n` falling boxes and balls on a grid.
pub fn setup_scene(n: usize) -> anyhow::Result<(hecs::World, PhysicsWorld)> {
    let mut world = hecs::World::new();
    spawn_ground(&mut world, n as f32)?;

    let columns = (n as f32).sqrt().ceil() as usize;
    for i in 0..n {
        let position = Vec2::new(
            (i % columns) as f32 * 1.5 - columns as f32 * 0.75,
            1.0 + (i / columns) as f32 * 1.5,
        );
        let collider = if i % 2 == 0 {
            Collider::from_shape(Polygon::square(1.0)?)
        } else {
            Collider::from_shape(Circle::new(0.5)?)
        };
        world.spawn((
            Transform::from_translation(position),
            RigidBody::new_dynamic(),
            collider,
        ));
    }
    Ok((world, PhysicsWorld::default()))
}

/// A stacked pyramid of boxes resting on the ground, the classic solver
/// stress case.
pub fn setup_pyramid(rows: usize) -> anyhow::Result<(hecs::World, PhysicsWorld)> {
    let mut world = hecs::World::new();
    spawn_ground(&mut world, rows as f32 * 2.0)?;

    for row in 0..rows {
        let count = rows - row;
        let start = -(count as f32 - 1.0) * 0.5;
        for i in 0..count {
            world.spawn((
                Transform::from_translation(Vec2::new(start + i as f32, 0.5 + row as f32)),
                RigidBody::new_dynamic(),
                Collider::from_shape(Polygon::square(1.0)?),
            ));
        }
    }
    Ok((world, PhysicsWorld::default()))
}

fn spawn_ground(world: &mut hecs::World, width: f32) -> anyhow::Result<()> {
    world.spawn((
        Transform::from_translation(Vec2::new(0.0, -0.5)),
        RigidBody::new_static(),
        Collider::from_shape(Polygon::rectangle(width.max(10.0) * 4.0, 1.0)?),
    ));
    Ok(())
}
