use glam::Vec3;

use crate::backend::{MaterialTag, RigidBodyHandle, RigidBodyState};
use crate::config::{CollisionConfig, StatusConfig};
use crate::systems::{CollisionBus, CollisionSubscription};

use super::status::StatusEffectEngine;

/// One contact as the robot sees it.
#[derive(Clone, Copy, Debug)]
pub struct CollisionEvent {
    /// Unit normal pointing from the other surface toward the robot.
    pub normal: Vec3,
    pub other_material: MaterialTag,
    /// XZ speed before the contact solver ran.
    pub horizontal_speed: f32,
    /// Vertical velocity before the contact solver ran.
    pub vertical_velocity: f32,
}

impl CollisionEvent {
    pub fn new(normal: Vec3, other_material: MaterialTag, pre_velocity: Vec3) -> Self {
        Self {
            normal,
            other_material,
            horizontal_speed: (pre_velocity.x * pre_velocity.x + pre_velocity.z * pre_velocity.z)
                .sqrt(),
            vertical_velocity: pre_velocity.y,
        }
    }
}

/// What a resolved collision did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollisionOutcome {
    pub grounded: bool,
    pub stunned: bool,
    pub slowed: bool,
    pub bounced: bool,
    pub landed: bool,
}

impl CollisionOutcome {
    pub fn ignored(&self) -> bool {
        *self == Self::default()
    }
}

/// Turns raw contacts into gameplay: ground reports, stun/slow, bounce-back
/// and soft landings on top of obstacles.
pub struct CollisionResolver {
    config: CollisionConfig,
    stun_duration_ms: u64,
    slow_duration_ms: u64,
    slow_multiplier: f32,
    last_processed: Option<u64>,
    subscription: Option<CollisionSubscription>,
}

impl CollisionResolver {
    pub fn new(config: &CollisionConfig, status: &StatusConfig) -> Self {
        Self {
            config: config.clone(),
            stun_duration_ms: status.stun_duration_ms,
            slow_duration_ms: status.slow_duration_ms,
            slow_multiplier: status.slow_multiplier,
            last_processed: None,
            subscription: None,
        }
    }

    /// Subscribe `body` to contacts, dropping any previous subscription first.
    pub fn attach(
        &mut self,
        bus: &mut CollisionBus,
        body: RigidBodyHandle,
    ) -> CollisionSubscription {
        self.detach(bus);
        let sub = bus.subscribe(body);
        self.subscription = Some(sub);
        sub
    }

    pub fn detach(&mut self, bus: &mut CollisionBus) {
        if let Some(sub) = self.subscription.take() {
            bus.unsubscribe(sub);
        }
    }

    pub fn subscription(&self) -> Option<CollisionSubscription> {
        self.subscription
    }

    /// Forget the processing cooldown. The subscription is left alone.
    pub fn reset(&mut self) {
        self.last_processed = None;
    }

    /// Apply the gameplay consequences of `event` to `body`.
    ///
    /// `forward` is the robot's current heading; bounces push against it.
    pub fn resolve(
        &mut self,
        event: &CollisionEvent,
        body: &mut RigidBodyState,
        forward: Vec3,
        status: &mut StatusEffectEngine,
        now: u64,
    ) -> CollisionOutcome {
        let mut outcome = CollisionOutcome::default();
        let c = &self.config;

        if self
            .last_processed
            .is_some_and(|t| now.saturating_sub(t) < c.cooldown_ms)
        {
            return outcome;
        }

        let n = event.normal;
        if n.y > c.ground_normal_y {
            outcome.grounded = true;
            return outcome;
        }

        if n.x.abs() > c.lateral_normal || n.z.abs() > c.lateral_normal {
            let v = event.horizontal_speed;
            if v > c.stun_speed {
                outcome.stunned = status.try_apply_stun(now, self.stun_duration_ms, body);
            } else if v > c.slow_speed {
                status.apply_slow(now, self.slow_duration_ms, self.slow_multiplier);
                outcome.slowed = true;
            }

            let bounce = (v * c.bounce_scale).min(c.bounce_cap);
            body.linear_velocity.x -= forward.x * bounce;
            body.linear_velocity.z -= forward.z * bounce;
            body.scale_horizontal(c.bounce_retention);
            outcome.bounced = true;
            tracing::debug!(
                speed = v,
                material = event.other_material.name(),
                stunned = outcome.stunned,
                slowed = outcome.slowed,
                "lateral hit"
            );
        }

        if n.y > c.landing_normal_y && event.vertical_velocity < -c.landing_fall_speed {
            let vy = body.linear_velocity.y;
            body.linear_velocity.y = (vy * c.landing_vertical_retention).max(-c.landing_max_fall);
            body.scale_horizontal(c.landing_horizontal_retention);
            outcome.landed = true;
        }

        self.last_processed = Some(now);
        outcome
    }
}
