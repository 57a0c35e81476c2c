use glam::{Mat4, Quat, Vec3};

use crate::backend::RigidBodyHandle;

/// Spatial transform with position and rotation. Dynamic bodies get theirs
/// pulled from physics after every step; the renderable copy lives in
/// `RenderTransform`.
#[derive(Clone, Copy, Debug)]
pub struct LocalTransform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl LocalTransform {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }
}

/// Previous physics-step position, stored for render interpolation.
pub struct PreviousPosition(pub Vec3);

/// World-space matrix handed to the rendering collaborator.
/// Written by the transform sync system, never read back by physics.
pub struct RenderTransform(pub Mat4);

/// Links an entity to the physics body that drives its transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhysicsBody(pub RigidBodyHandle);

/// Marker: this entity is the controlled robot.
pub struct Robot;

/// Collectible that disappears when the robot passes within `radius` while moving.
pub struct Pickup {
    pub radius: f32,
}
