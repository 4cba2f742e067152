//! Headless demo: a box pyramid, a pendulum and a sensor strip, stepped in
//! real-time-sized chunks and logged.
//!
//! Usage: `rein2d-app [settings.json] [seconds]`

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Context;
use glam::Vec2;
use rein2d::{
    Circle, Collider, Fixture, Flow, Joint, PhysicsEvent, PhysicsWorld, Polygon, RevoluteJoint,
    RigidBody, Settings, SleepInfo, Transform,
};

const FRAME: f64 = 1.0 / 60.0;

fn load_settings(path: Option<&str>) -> anyhow::Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading settings from {path}"))?;
    serde_json::from_str(&text).with_context(|| format!("parsing settings from {path}"))
}

fn build_scene(world: &mut hecs::World) -> anyhow::Result<hecs::Entity> {
    // Ground
    world.spawn((
        Transform::from_translation(Vec2::new(0.0, -0.5)),
        RigidBody::new_static(),
        Collider::from_shape(Polygon::rectangle(40.0, 1.0)?),
    ));

    // Pyramid
    let rows = 8;
    for row in 0..rows {
        let count = rows - row;
        let start = -(count as f32 - 1.0) * 0.5;
        for i in 0..count {
            world.spawn((
                Transform::from_translation(Vec2::new(start + i as f32, 0.5 + row as f32)),
                RigidBody::new_dynamic(),
                Collider::from_fixture(Fixture::new(Polygon::square(1.0)?).with_friction(0.6)),
                SleepInfo::default(),
            ));
        }
    }

    // Pendulum swinging into the pyramid
    let pivot = world.spawn((
        Transform::from_translation(Vec2::new(-6.0, 8.0)),
        RigidBody::new_static(),
    ));
    let bob = world.spawn((
        Transform::from_translation(Vec2::new(-12.0, 8.0)),
        RigidBody::new_dynamic(),
        Collider::from_fixture(Fixture::new(Circle::new(0.75)?).with_density(4.0)),
    ));
    let joint = RevoluteJoint::between(world, pivot, bob, Vec2::new(-6.0, 8.0))?;
    world.spawn((Joint::from(joint),));

    // Sensor strip to the right of the pyramid
    let sensor = world.spawn((
        Transform::from_translation(Vec2::new(8.0, 0.25)),
        RigidBody::new_static(),
        Collider::from_fixture(Fixture::new(Polygon::rectangle(4.0, 0.5)?).sensor()),
    ));
    Ok(sensor)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let settings = load_settings(args.first().map(String::as_str))?;
    let seconds: f64 = match args.get(1) {
        Some(s) => s.parse().with_context(|| format!("invalid duration {s:?}"))?,
        None => 10.0,
    };

    let mut world = hecs::World::new();
    let mut physics = PhysicsWorld::new(settings)?;
    let sensor = build_scene(&mut world)?;

    let begins = Arc::new(AtomicUsize::new(0));
    let sensor_hits = Arc::new(AtomicUsize::new(0));
    {
        let (begins, sensor_hits) = (begins.clone(), sensor_hits.clone());
        physics.subscribe(move |event| {
            if let PhysicsEvent::ContactBegin(point) = event {
                begins.fetch_add(1, Ordering::Relaxed);
                let id = point.constraint;
                if point.sensor && (id.body_a == sensor || id.body_b == sensor) {
                    sensor_hits.fetch_add(1, Ordering::Relaxed);
                }
            }
            Flow::Continue
        });
    }

    let frames = (seconds / FRAME).round() as usize;
    log::info!("simulating {frames} frames");
    for frame in 0..frames {
        physics.step(&mut world, FRAME);

        if frame % 60 == 0 {
            let sleeping = world
                .query::<&SleepInfo>()
                .iter()
                .filter(|(_, s)| s.is_sleeping())
                .count();
            log::info!(
                "t={:.1}s contacts={} sleeping={} begins={} sensor={}",
                frame as f64 * FRAME,
                physics.contacts().len(),
                sleeping,
                begins.load(Ordering::Relaxed),
                sensor_hits.load(Ordering::Relaxed),
            );
        }
    }

    let highest = world
        .query::<(&RigidBody, &Transform)>()
        .iter()
        .filter(|(_, (rb, _))| rb.is_dynamic())
        .map(|(_, (_, t))| t.translation.y)
        .fold(f32::MIN, f32::max);
    log::info!("done; highest dynamic body at y={highest:.2}");
    Ok(())
}
