use glam::{Mat4, Vec3};
use hecs::{Entity, World};

use crate::backend::{MaterialTag, RigidBodyHandle};
use crate::components::*;
use crate::config::BodyConfig;
use crate::physics::PhysicsWorld;

/// Infinite floor at y = 0. It only exists in physics.
pub fn spawn_ground(physics: &mut PhysicsWorld) {
    physics.add_ground();
}

/// Static axis-aligned box tagged as a wall.
pub fn spawn_wall(
    world: &mut World,
    physics: &mut PhysicsWorld,
    pos: Vec3,
    half_extents: Vec3,
) -> Entity {
    spawn_static_box(world, physics, pos, half_extents, MaterialTag::Wall)
}

/// Static axis-aligned box tagged as an obstacle.
pub fn spawn_obstacle(
    world: &mut World,
    physics: &mut PhysicsWorld,
    pos: Vec3,
    half_extents: Vec3,
) -> Entity {
    spawn_static_box(world, physics, pos, half_extents, MaterialTag::Obstacle)
}

fn spawn_static_box(
    world: &mut World,
    physics: &mut PhysicsWorld,
    pos: Vec3,
    half_extents: Vec3,
    material: MaterialTag,
) -> Entity {
    physics.add_static_box(pos, half_extents, material);
    let local = LocalTransform::new(pos);
    world.spawn((local, RenderTransform(local.matrix())))
}

fn spawn_dynamic(world: &mut World, body: RigidBodyHandle, pos: Vec3) -> Entity {
    world.spawn((
        PhysicsBody(body),
        LocalTransform::new(pos),
        PreviousPosition(pos),
        RenderTransform(Mat4::from_translation(pos)),
    ))
}

/// Loose obstacle ball that rolls and can be knocked around.
pub fn spawn_boulder(
    world: &mut World,
    physics: &mut PhysicsWorld,
    pos: Vec3,
    radius: f32,
    mass: f32,
) -> Entity {
    let body = physics.add_ball(pos, radius, mass, 0.1, 0.1, false, MaterialTag::Obstacle);
    spawn_dynamic(world, body, pos)
}

/// The controllable robot: a yaw-only sphere with the robot material.
pub fn spawn_robot(
    world: &mut World,
    physics: &mut PhysicsWorld,
    config: &BodyConfig,
    pos: Vec3,
) -> RigidBodyHandle {
    let body = physics.add_robot(config, pos);
    let entity = spawn_dynamic(world, body, pos);
    let _ = world.insert_one(entity, Robot);
    body
}

/// Collectible. It has no collider, so the robot passes through it.
pub fn spawn_pickup(world: &mut World, pos: Vec3, radius: f32) -> Entity {
    world.spawn((
        LocalTransform::new(pos),
        RenderTransform(Mat4::from_translation(pos)),
        Pickup { radius },
    ))
}
