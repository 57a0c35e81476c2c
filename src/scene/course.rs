use glam::Vec3;
use hecs::World;

use crate::backend::RigidBodyHandle;
use crate::config::ControllerConfig;
use crate::physics::PhysicsWorld;
use crate::scene::prefabs::{
    spawn_boulder, spawn_ground, spawn_obstacle, spawn_pickup, spawn_robot, spawn_wall,
};

/// Half-width of the walled arena.
pub const ARENA_HALF: f32 = 12.0;
pub const PICKUP_RADIUS: f32 = 1.2;

/// Build the practice course: a walled arena with a few blocks, a loose
/// boulder and a line of pickups ahead of spawn.
/// Returns the robot's body.
pub fn load_course(
    world: &mut World,
    physics: &mut PhysicsWorld,
    config: &ControllerConfig,
) -> RigidBodyHandle {
    spawn_ground(physics);

    // Perimeter.
    let thickness = 0.5;
    let height = 1.5;
    for (pos, half) in [
        (Vec3::new(0.0, height, ARENA_HALF), Vec3::new(ARENA_HALF, height, thickness)),
        (Vec3::new(0.0, height, -ARENA_HALF), Vec3::new(ARENA_HALF, height, thickness)),
        (Vec3::new(ARENA_HALF, height, 0.0), Vec3::new(thickness, height, ARENA_HALF)),
        (Vec3::new(-ARENA_HALF, height, 0.0), Vec3::new(thickness, height, ARENA_HALF)),
    ] {
        spawn_wall(world, physics, pos, half);
    }

    for &(x, z, h) in &[(-5.0_f32, 4.0_f32, 0.5_f32), (5.0, -3.0, 0.8), (-4.0, -6.0, 0.4)] {
        spawn_obstacle(world, physics, Vec3::new(x, h, z), Vec3::new(1.0, h, 1.0));
    }
    spawn_boulder(world, physics, Vec3::new(6.0, 0.6, 6.0), 0.6, 4.0);

    for z in [3.0_f32, 6.0, 9.0] {
        spawn_pickup(world, Vec3::new(0.0, 0.5, z), PICKUP_RADIUS);
    }

    let robot = spawn_robot(world, physics, &config.body, config.bounds.spawn);
    tracing::info!(
        entities = world.len(),
        bodies = physics.body_count(),
        colliders = physics.collider_count(),
        "course loaded"
    );
    robot
}
