//! Game world coordinator.
//!
//! Owns the ECS scene, the rapier world, the collision bus and the robot's
//! controller and runs them in a fixed order every frame: physics sub-steps
//! with contact routing, controller update, pickups, render transforms.

use hecs::{Entity, World};

use crate::backend::{PhysicsBackend, RigidBodyHandle};
use crate::components::{LocalTransform, Pickup};
use crate::config::GameConfig;
use crate::controller::{CharacterController, CollisionEvent, ControllerEvent};
use crate::engine::input::MovementIntent;
use crate::physics::{ContactEvent, FixedStepper, PhysicsWorld};
use crate::scene::course::load_course;
use crate::systems::{pull_physics_poses, transform_sync_system, CollisionBus};

/// Slower than this and the robot brushes past pickups without collecting them.
pub const PICKUP_MIN_SPEED: f32 = 0.5;

/// What happened during one [`GameWorld::tick`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub substeps: u32,
    /// Contacts routed to the robot.
    pub contacts: usize,
    pub pickups_collected: u32,
}

pub struct GameWorld {
    world: World,
    physics: PhysicsWorld,
    config: GameConfig,
    stepper: FixedStepper,
    bus: CollisionBus,
    controller: CharacterController,
    pickups_collected: u32,
}

impl GameWorld {
    /// Build the practice course and a reset controller for its robot.
    pub fn new(config: GameConfig) -> Self {
        let mut world = World::new();
        let mut physics = PhysicsWorld::new(&config.physics);
        let robot = load_course(&mut world, &mut physics, &config.controller);
        Self::with_world(world, physics, robot, config)
    }

    /// Wrap an existing scene. `robot` must be a dynamic body in `physics`.
    pub fn with_world(
        world: World,
        physics: PhysicsWorld,
        robot: RigidBodyHandle,
        config: GameConfig,
    ) -> Self {
        let controller = CharacterController::new(robot, &config.controller);
        let mut game = Self {
            world,
            physics,
            stepper: FixedStepper::from_config(&config.physics),
            config,
            bus: CollisionBus::new(),
            controller,
            pickups_collected: 0,
        };
        game.reset();
        tracing::info!(
            entities = game.world.len(),
            bodies = game.physics.body_count(),
            "game world ready"
        );
        game
    }

    /// Put the robot back at spawn and clear all gameplay state.
    pub fn reset(&mut self) {
        self.stepper.reset();
        self.controller.reset(&mut self.physics, &mut self.bus);
    }

    /// Detach the controller from collision delivery.
    pub fn teardown(&mut self) {
        self.controller.teardown(&mut self.bus);
    }

    /// Advance by one frame of `frame_dt` seconds at gameplay time `now` (ms).
    ///
    /// Controller events queue up until [`Self::drain_events`]. Call it every
    /// frame: past [`crate::controller::MAX_PENDING_EVENTS`] the oldest are
    /// dropped.
    pub fn tick(&mut self, frame_dt: f32, now: u64, intent: &MovementIntent) -> TickReport {
        let mut report = TickReport {
            substeps: self.stepper.advance(frame_dt),
            ..Default::default()
        };

        for _ in 0..report.substeps {
            let contacts = self.physics.step();
            pull_physics_poses(&mut self.world, &self.physics);
            report.contacts += self.route_contacts(&contacts, now);
        }

        self.controller.update(&mut self.physics, intent, frame_dt, now);
        report.pickups_collected = self.collect_pickups();
        transform_sync_system(&mut self.world, self.stepper.alpha());
        report
    }

    fn route_contacts(&mut self, contacts: &[ContactEvent], now: u64) -> usize {
        let Some(sub) = self.controller.subscription() else {
            return 0;
        };
        let mut routed = 0;
        for (to, contact) in self.bus.dispatch(contacts) {
            if to != sub {
                continue;
            }
            let event =
                CollisionEvent::new(contact.normal, contact.other_material, contact.pre_velocity);
            self.controller.on_collision(&mut self.physics, &event, now);
            routed += 1;
        }
        routed
    }

    fn collect_pickups(&mut self) -> u32 {
        let Some(robot) = self.physics.read_body(self.controller.body()) else {
            return 0;
        };
        if robot.linear_velocity.length() <= PICKUP_MIN_SPEED {
            return 0;
        }

        let taken: Vec<Entity> = self
            .world
            .query::<(&LocalTransform, &Pickup)>()
            .iter()
            .filter(|(_, (local, pickup))| local.position.distance(robot.position) < pickup.radius)
            .map(|(e, _)| e)
            .collect();

        for &entity in &taken {
            let _ = self.world.despawn(entity);
        }
        let count = taken.len() as u32;
        if count > 0 {
            self.pickups_collected += count;
            tracing::debug!(total = self.pickups_collected, "pickup collected");
        }
        count
    }

    pub fn controller(&self) -> &CharacterController {
        &self.controller
    }

    pub fn drain_events(&mut self) -> Vec<ControllerEvent> {
        self.controller.drain_events()
    }

    pub fn pickups_collected(&self) -> u32 {
        self.pickups_collected
    }

    pub fn bus(&self) -> &CollisionBus {
        &self.bus
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.physics
    }
}
