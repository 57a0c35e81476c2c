//! Physics-driven robot character controller with stun/slow status effects
//! and bunny-hop momentum. The robot is a rapier rigid body; the scene around
//! it is a `hecs` world.

pub mod backend;
pub mod components;
pub mod config;
pub mod controller;
pub mod engine;
pub mod fsm;
pub mod physics;
pub mod scene;
pub mod systems;
pub mod world;

pub use backend::{MaterialTag, PhysicsBackend, RayHit, RigidBodyHandle, RigidBodyState};
pub use config::{ConfigError, GameConfig};
pub use controller::{CharacterController, ControllerEvent};
pub use physics::PhysicsWorld;
pub use world::{GameWorld, TickReport};
