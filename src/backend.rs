//! Physics backend abstraction.
//!
//! The controller never owns a rigid body. It holds a [`RigidBodyHandle`] and
//! goes through [`PhysicsBackend`] for every read, write and query. The crate
//! ships one implementation, the rapier world in [`crate::physics`].

use glam::{Quat, Vec3};

/// Non-owning reference to one physics body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RigidBodyHandle(pub rapier3d::prelude::RigidBodyHandle);

/// Surface type used to pick a contact material for a colliding pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MaterialTag {
    #[default]
    Default,
    Robot,
    Obstacle,
    Wall,
}

impl MaterialTag {
    pub fn name(self) -> &'static str {
        match self {
            MaterialTag::Default => "default",
            MaterialTag::Robot => "robot",
            MaterialTag::Obstacle => "obstacle",
            MaterialTag::Wall => "wall",
        }
    }

    /// Packed form stored in a collider's `user_data`.
    pub fn to_bits(self) -> u128 {
        match self {
            MaterialTag::Default => 0,
            MaterialTag::Robot => 1,
            MaterialTag::Obstacle => 2,
            MaterialTag::Wall => 3,
        }
    }

    /// Unknown values read as `Default`.
    pub fn from_bits(bits: u128) -> Self {
        match bits {
            1 => MaterialTag::Robot,
            2 => MaterialTag::Obstacle,
            3 => MaterialTag::Wall,
            _ => MaterialTag::Default,
        }
    }
}

/// Snapshot of a body's kinematic state.
///
/// Angular velocity is masked to yaw by the backend, so `x`/`z` read back as zero.
/// `force`/`torque` are the loads the next physics step will apply.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RigidBodyState {
    pub position: Vec3,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub orientation: Quat,
    pub force: Vec3,
    pub torque: Vec3,
    pub material: MaterialTag,
}

impl RigidBodyState {
    pub fn at_rest(position: Vec3, material: MaterialTag) -> Self {
        Self {
            position,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            force: Vec3::ZERO,
            torque: Vec3::ZERO,
            material,
        }
    }

    /// Speed in the XZ plane.
    pub fn horizontal_speed(&self) -> f32 {
        let v = self.linear_velocity;
        (v.x * v.x + v.z * v.z).sqrt()
    }

    /// Multiply the XZ velocity components, leaving `y` alone.
    pub fn scale_horizontal(&mut self, factor: f32) {
        self.linear_velocity.x *= factor;
        self.linear_velocity.z *= factor;
    }
}

/// Closest hit of a ray query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub point: Vec3,
}

/// Operations the controller needs from a physics engine.
pub trait PhysicsBackend {
    /// Current state of `body`, or `None` if it no longer exists.
    fn read_body(&self, body: RigidBodyHandle) -> Option<RigidBodyState>;

    /// Overwrite `body`'s kinematic state and loads. Unknown bodies are ignored.
    fn write_body(&mut self, body: RigidBodyHandle, state: &RigidBodyState);

    /// Add to the force applied on every step until the next `write_body`.
    fn apply_force(&mut self, body: RigidBodyHandle, force: Vec3);

    /// Instantaneous change in momentum.
    fn apply_impulse(&mut self, body: RigidBodyHandle, impulse: Vec3);

    /// Closest hit on the segment `origin → end`, skipping `exclude`.
    fn raycast_closest(
        &self,
        origin: Vec3,
        end: Vec3,
        exclude: Option<RigidBodyHandle>,
    ) -> Option<RayHit>;
}
