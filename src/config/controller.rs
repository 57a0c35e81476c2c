//! Gameplay tuning for the robot controller.
//!
//! Every section deserializes with defaults, so a config file only needs to
//! name the values it changes. Durations are milliseconds on the gameplay
//! clock; speeds are world units per second.

use glam::Vec3;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub body: BodyConfig,
    pub movement: MovementConfig,
    pub jump: JumpConfig,
    pub bhop: BhopConfig,
    pub status: StatusConfig,
    pub collision: CollisionConfig,
    pub ground: GroundConfig,
    pub bounds: WorldBounds,
    pub animation: AnimationConfig,
}

/// Physical body the controller drives.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    pub radius: f32,
    pub mass: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            radius: 0.4,
            mass: 2.0,
            linear_damping: 0.3,
            angular_damping: 0.7,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub move_force: f32,
    pub max_speed: f32,
    /// Radians per second.
    pub turn_speed: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            move_force: 50.0,
            max_speed: 6.8,
            turn_speed: 2.5,
        }
    }
}

/// Grounded jump impulse coefficients.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JumpConfig {
    /// Multiplies the heading's x component.
    pub lateral: f32,
    pub vertical: f32,
    /// Multiplies the heading's z component.
    pub forward: f32,
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            lateral: 0.65,
            vertical: 10.0,
            forward: 0.90,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BhopConfig {
    pub ground_increment: f32,
    pub ground_cap: f32,
    pub air_increment: f32,
    pub air_cap: f32,
    /// Minimum time between two jumps for an air-hop to fire.
    pub min_air_hop_spacing_ms: u64,
    /// Horizontal speed required for an air-hop.
    pub min_air_hop_speed: f32,
    pub air_base_force: f32,
    pub air_bonus_scale: f32,
    pub air_vertical_force: f32,
    /// Applied once when landing after being airborne.
    pub landing_decay: f32,
    /// Applied every tick while grounded and not jumping.
    pub idle_decay: f32,
    /// Applied when a stun lands.
    pub stun_retention: f32,
}

impl Default for BhopConfig {
    fn default() -> Self {
        Self {
            ground_increment: 1.6,
            ground_cap: 10.0,
            air_increment: 1.15,
            air_cap: 14.0,
            min_air_hop_spacing_ms: 300,
            min_air_hop_speed: 1.8,
            air_base_force: 0.42,
            air_bonus_scale: 0.26,
            air_vertical_force: 0.015,
            landing_decay: 0.9,
            idle_decay: 0.97,
            stun_retention: 0.3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    pub stun_duration_ms: u64,
    pub stun_cooldown_ms: u64,
    /// Movement left while stunned.
    pub stun_movement_factor: f32,
    /// Turning left while stunned.
    pub stun_turn_factor: f32,
    /// Vertical velocity kept when a stun hits a falling body.
    pub stun_fall_retention: f32,
    pub stun_jump_floor: f32,
    pub slow_duration_ms: u64,
    pub slow_multiplier: f32,
    pub slow_jump_floor: f32,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            stun_duration_ms: 1200,
            stun_cooldown_ms: 2500,
            stun_movement_factor: 0.15,
            stun_turn_factor: 0.3,
            stun_fall_retention: 0.7,
            stun_jump_floor: 0.2,
            slow_duration_ms: 2500,
            slow_multiplier: 0.25,
            slow_jump_floor: 0.4,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    pub cooldown_ms: u64,
    /// `normal.y` above this is a ground contact.
    pub ground_normal_y: f32,
    /// `|normal.x|` or `|normal.z|` above this is a lateral hit.
    pub lateral_normal: f32,
    pub stun_speed: f32,
    pub slow_speed: f32,
    pub bounce_scale: f32,
    pub bounce_cap: f32,
    pub bounce_retention: f32,
    /// `normal.y` above this with a fast fall is a landing on top of something.
    pub landing_normal_y: f32,
    pub landing_fall_speed: f32,
    pub landing_vertical_retention: f32,
    pub landing_max_fall: f32,
    pub landing_horizontal_retention: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 400,
            ground_normal_y: 0.7,
            lateral_normal: 0.4,
            stun_speed: 5.5,
            slow_speed: 1.8,
            bounce_scale: 0.8,
            bounce_cap: 4.0,
            bounce_retention: 0.7,
            landing_normal_y: 0.3,
            landing_fall_speed: 1.0,
            landing_vertical_retention: 0.3,
            landing_max_fall: 1.0,
            landing_horizontal_retention: 0.2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    pub sample_interval_ms: u64,
    pub ray_length: f32,
    pub max_vertical_speed: f32,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 250,
            ray_length: 0.6,
            max_vertical_speed: 0.5,
        }
    }
}

/// Vertical safety rail. Leaving `[min_y, max_y]` teleports the robot to `spawn`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorldBounds {
    pub min_y: f32,
    pub max_y: f32,
    pub spawn: Vec3,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            min_y: -3.0,
            max_y: 8.0,
            spawn: Vec3::new(0.0, 1.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub crossfade_secs: f32,
    /// How long the one-shot jump clip holds before locomotion takes over again.
    pub jump_hold_secs: f32,
    /// Stuns at or below this movement factor freeze the robot in Idle.
    pub heavy_stun_factor: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            crossfade_secs: 0.3,
            jump_hold_secs: 0.6,
            heavy_stun_factor: 0.1,
        }
    }
}
