//! The robot character controller.
//!
//! [`CharacterController`] turns a [`MovementIntent`] into forces and
//! impulses on a physics body it does not own, and turns contacts on that
//! body into gameplay: stun, slow, bounce-back and bunny-hop momentum.

mod animation;
mod bhop;
mod collision;
mod ground;
mod status;

pub use animation::{AnimationClip, AnimationCue, AnimationDirector, LocomotionSample};
pub use bhop::BunnyHopState;
pub use collision::{CollisionEvent, CollisionOutcome, CollisionResolver};
pub use ground::GroundDetector;
pub use status::{EffectKind, EffectVisualChanged, StatusEffect, StatusEffectEngine};

use std::collections::VecDeque;

use glam::{Quat, Vec3};

use crate::backend::{MaterialTag, PhysicsBackend, RigidBodyHandle, RigidBodyState};
use crate::config::ControllerConfig;
use crate::engine::input::MovementIntent;
use crate::systems::{CollisionBus, CollisionSubscription};

/// Undrained events beyond this drop the oldest first.
pub const MAX_PENDING_EVENTS: usize = 256;

/// Things the rest of the game may want to react to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControllerEvent {
    /// Tint on or off for a status effect.
    EffectVisualChanged { kind: EffectKind, active: bool },
    AnimationCue { clip: AnimationClip, crossfade: f32 },
    Jumped { air_hop: bool, bonus: f32 },
    /// Fell or flew out of bounds and was put back at spawn.
    Respawned,
}

impl From<EffectVisualChanged> for ControllerEvent {
    fn from(change: EffectVisualChanged) -> Self {
        ControllerEvent::EffectVisualChanged {
            kind: change.kind,
            active: change.active,
        }
    }
}

impl From<AnimationCue> for ControllerEvent {
    fn from(cue: AnimationCue) -> Self {
        ControllerEvent::AnimationCue {
            clip: cue.clip,
            crossfade: cue.crossfade,
        }
    }
}

pub struct CharacterController {
    config: ControllerConfig,
    body: RigidBodyHandle,
    status: StatusEffectEngine,
    ground: GroundDetector,
    resolver: CollisionResolver,
    bhop: BunnyHopState,
    animation: AnimationDirector,
    /// Yaw in radians. Positive turns left.
    heading: f32,
    on_ground: bool,
    /// Set while jump is held after it fired, so holding does not repeat.
    jump_latch: bool,
    position: Vec3,
    events: VecDeque<ControllerEvent>,
}

impl CharacterController {
    pub fn new(body: RigidBodyHandle, config: &ControllerConfig) -> Self {
        Self {
            config: config.clone(),
            body,
            status: StatusEffectEngine::new(&config.status),
            ground: GroundDetector::new(&config.ground),
            resolver: CollisionResolver::new(&config.collision, &config.status),
            bhop: BunnyHopState::new(&config.bhop),
            animation: AnimationDirector::new(&config.animation),
            heading: 0.0,
            on_ground: false,
            jump_latch: false,
            position: config.bounds.spawn,
            events: VecDeque::new(),
        }
    }

    /// Put the robot back at spawn with a clean slate and (re)subscribe it to
    /// collisions.
    pub fn reset<B: PhysicsBackend>(&mut self, backend: &mut B, bus: &mut CollisionBus) {
        self.resolver.attach(bus, self.body);
        self.resolver.reset();

        let material = backend
            .read_body(self.body)
            .map(|s| s.material)
            .unwrap_or(MaterialTag::Robot);
        let spawn = self.config.bounds.spawn;
        backend.write_body(self.body, &RigidBodyState::at_rest(spawn, material));

        self.heading = 0.0;
        self.on_ground = false;
        self.jump_latch = false;
        self.position = spawn;
        self.bhop.reset();
        self.ground.reset();
        self.status.reset();
        self.collect_visual_changes();

        self.animation.reset();
        self.emit(ControllerEvent::AnimationCue {
            clip: AnimationClip::Idle,
            crossfade: self.config.animation.crossfade_secs,
        });
        tracing::debug!(?spawn, "controller reset");
    }

    /// Drop the collision subscription. The body itself is left in the world.
    pub fn teardown(&mut self, bus: &mut CollisionBus) {
        self.resolver.detach(bus);
    }

    /// Run one gameplay tick.
    ///
    /// `dt` is the frame time in seconds and `now` the gameplay clock in
    /// milliseconds. Contacts for this tick must already have gone through
    /// [`Self::on_collision`].
    ///
    /// Movement force is a level, not a pulse: it is cleared here and
    /// re-applied from `intent`, then acts on every physics step until the
    /// next update.
    pub fn update<B: PhysicsBackend>(
        &mut self,
        backend: &mut B,
        intent: &MovementIntent,
        dt: f32,
        now: u64,
    ) {
        self.status.tick(now);
        self.collect_visual_changes();

        let multiplier = self.status.movement_multiplier();
        let move_force = self.config.movement.move_force * multiplier;
        let max_speed = self.config.movement.max_speed * multiplier;

        let was_on_ground = self.on_ground;
        self.on_ground = self.ground.is_grounded(&*backend, self.body, now);
        if !was_on_ground && self.on_ground {
            self.bhop.on_landing();
        }

        let Some(mut state) = backend.read_body(self.body) else {
            return;
        };

        let speed = state.horizontal_speed();
        if speed > max_speed {
            state.scale_horizontal(max_speed / speed);
        }
        state.force = Vec3::ZERO;
        state.torque = Vec3::ZERO;
        state.orientation = self.orientation();
        backend.write_body(self.body, &state);

        let can_move = self.status.can_move();
        let mut jumped = false;
        if intent.jump && !self.jump_latch && can_move {
            self.jump_latch = true;
            jumped = self.try_jump(backend, &state, now);
        } else if !intent.jump {
            self.jump_latch = false;
        }

        if self.on_ground && !intent.jump {
            self.bhop.on_idle_tick();
        }

        let mut moving = false;
        if can_move {
            let forward = self.forward();
            if intent.forward {
                backend.apply_force(self.body, forward * move_force);
                moving = true;
            }
            if intent.backward {
                backend.apply_force(self.body, -forward * move_force);
                moving = true;
            }

            let turn = self.config.movement.turn_speed * self.status.turn_multiplier() * dt;
            if intent.turn_left {
                self.heading += turn;
            }
            if intent.turn_right {
                self.heading -= turn;
            }
            if intent.turning() {
                if let Some(mut state) = backend.read_body(self.body) {
                    state.orientation = self.orientation();
                    backend.write_body(self.body, &state);
                }
            }
        }

        if let Some(mut state) = backend.read_body(self.body) {
            let bounds = &self.config.bounds;
            if state.position.y > bounds.max_y || state.position.y < bounds.min_y {
                tracing::debug!(y = state.position.y, "robot out of bounds, respawning");
                state.position = bounds.spawn;
                state.linear_velocity = Vec3::ZERO;
                state.angular_velocity = Vec3::ZERO;
                backend.write_body(self.body, &state);
                self.emit(ControllerEvent::Respawned);
            }
            self.position = state.position;
        }

        let incapacitated = self.status.is_stunned()
            && self.status.stun().movement_multiplier <= self.config.animation.heavy_stun_factor;
        let sample = LocomotionSample {
            jumped,
            moving,
            incapacitated,
        };
        if let Some(cue) = self.animation.update(dt, sample) {
            self.emit(cue.into());
        }
    }

    /// Grounded jump or air-hop. Returns whether the jump clip should play.
    fn try_jump<B: PhysicsBackend>(
        &mut self,
        backend: &mut B,
        state: &RigidBodyState,
        now: u64,
    ) -> bool {
        let forward = self.forward();
        let m = self.status.movement_multiplier();

        if self.on_ground {
            let jump = &self.config.jump;
            let impulse = Vec3::new(
                forward.x * jump.lateral * m,
                jump.vertical * self.status.vertical_jump_multiplier(),
                forward.z * jump.forward * m,
            );
            backend.apply_impulse(self.body, impulse);
            self.bhop.add_ground(now);
            self.ground.invalidate();
            self.emit(ControllerEvent::Jumped {
                air_hop: false,
                bonus: self.bhop.bonus(),
            });
            tracing::debug!(bonus = self.bhop.bonus(), "jump");
            return true;
        }

        if self.bhop.air_hop_ready(now, state.horizontal_speed()) {
            let push = self.bhop.air_hop_force() * m;
            let impulse = Vec3::new(
                forward.x * push,
                self.bhop.air_hop_vertical_force() * m,
                forward.z * push,
            );
            backend.apply_impulse(self.body, impulse);
            self.bhop.add_air(now);
            self.emit(ControllerEvent::Jumped {
                air_hop: true,
                bonus: self.bhop.bonus(),
            });
            tracing::debug!(bonus = self.bhop.bonus(), "air hop");
        }
        false
    }

    /// Feed one contact on the robot's body through the collision resolver.
    pub fn on_collision<B: PhysicsBackend>(
        &mut self,
        backend: &mut B,
        event: &CollisionEvent,
        now: u64,
    ) -> CollisionOutcome {
        let Some(mut state) = backend.read_body(self.body) else {
            return CollisionOutcome::default();
        };
        let forward = self.forward();
        let outcome = self
            .resolver
            .resolve(event, &mut state, forward, &mut self.status, now);
        if outcome.grounded {
            self.ground.mark_grounded();
        }
        if outcome.stunned {
            self.bhop.on_stun();
        }
        if outcome.bounced || outcome.landed || outcome.stunned {
            backend.write_body(self.body, &state);
        }
        self.collect_visual_changes();
        outcome
    }

    fn collect_visual_changes(&mut self) {
        for change in self.status.drain_visual_changes() {
            self.emit(change.into());
        }
    }

    fn emit(&mut self, event: ControllerEvent) {
        if self.events.len() == MAX_PENDING_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn body(&self) -> RigidBodyHandle {
        self.body
    }

    pub fn subscription(&self) -> Option<CollisionSubscription> {
        self.resolver.subscription()
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn heading(&self) -> f32 {
        self.heading
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_rotation_y(self.heading)
    }

    /// Unit heading vector in the XZ plane. Heading zero faces +Z.
    pub fn forward(&self) -> Vec3 {
        self.orientation() * Vec3::Z
    }

    pub fn on_ground(&self) -> bool {
        self.on_ground
    }

    pub fn bonus(&self) -> f32 {
        self.bhop.bonus()
    }

    pub fn status(&self) -> &StatusEffectEngine {
        &self.status
    }

    pub fn animation(&self) -> AnimationClip {
        self.animation.current()
    }

    /// Events since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<ControllerEvent> {
        self.events.drain(..).collect()
    }
}
