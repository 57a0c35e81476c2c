//! Stun and Slow status effects.
//!
//! Each effect is a two-state machine, Inactive and Active. Only the apply
//! operations activate an effect and only [`StatusEffectEngine::tick`]
//! deactivates one, once its end time has passed.

use glam::Vec3;

use crate::backend::RigidBodyState;
use crate::config::StatusConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectKind {
    Stun,
    Slow,
}

/// Emitted on every activation and expiry so the renderer can tint the robot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EffectVisualChanged {
    pub kind: EffectKind,
    pub active: bool,
}

#[derive(Clone, Debug)]
pub struct StatusEffect {
    pub kind: EffectKind,
    pub active: bool,
    /// Gameplay-clock millisecond at which the effect expires.
    pub end_time: u64,
    pub movement_multiplier: f32,
    /// Always 1.0 for Slow.
    pub turn_multiplier: f32,
    /// `None` until the first successful application.
    pub last_applied: Option<u64>,
    pub cooldown_ms: u64,
    /// Lower bound on how far this effect may scale the vertical jump impulse.
    pub jump_floor: f32,
}

impl StatusEffect {
    fn new(kind: EffectKind, movement: f32, turn: f32, cooldown_ms: u64, jump_floor: f32) -> Self {
        Self {
            kind,
            active: false,
            end_time: 0,
            movement_multiplier: movement,
            turn_multiplier: turn,
            last_applied: None,
            cooldown_ms,
            jump_floor,
        }
    }

    fn in_cooldown(&self, now: u64) -> bool {
        self.last_applied
            .is_some_and(|t| now.saturating_sub(t) < self.cooldown_ms)
    }
}

pub struct StatusEffectEngine {
    stun: StatusEffect,
    slow: StatusEffect,
    stun_fall_retention: f32,
    visual_changes: Vec<EffectVisualChanged>,
}

impl StatusEffectEngine {
    pub fn new(config: &StatusConfig) -> Self {
        Self {
            stun: StatusEffect::new(
                EffectKind::Stun,
                config.stun_movement_factor,
                config.stun_turn_factor,
                config.stun_cooldown_ms,
                config.stun_jump_floor,
            ),
            slow: StatusEffect::new(
                EffectKind::Slow,
                config.slow_multiplier,
                1.0,
                0,
                config.slow_jump_floor,
            ),
            stun_fall_retention: config.stun_fall_retention,
            visual_changes: Vec::new(),
        }
    }

    /// Stun the robot unless a previous stun is still cooling down.
    ///
    /// On success the body is dampened in the same call: horizontal velocity
    /// drops to the stun movement factor, a fall is slowed, and spin stops.
    pub fn try_apply_stun(&mut self, now: u64, duration_ms: u64, body: &mut RigidBodyState) -> bool {
        if self.stun.in_cooldown(now) {
            tracing::debug!(now, "stun rejected: cooling down");
            return false;
        }
        let was_active = self.stun.active;
        self.stun.active = true;
        self.stun.end_time = now + duration_ms;
        self.stun.last_applied = Some(now);

        body.scale_horizontal(self.stun.movement_multiplier);
        let vy = body.linear_velocity.y;
        body.linear_velocity.y = (vy * self.stun_fall_retention).max(vy);
        body.angular_velocity = Vec3::ZERO;

        if !was_active {
            self.visual_changes.push(EffectVisualChanged {
                kind: EffectKind::Stun,
                active: true,
            });
        }
        tracing::debug!(now, duration_ms, "robot stunned");
        true
    }

    /// Slow the robot. Never rejected; an active slow is extended, never shortened.
    pub fn apply_slow(&mut self, now: u64, duration_ms: u64, multiplier: f32) {
        let was_active = self.slow.active;
        let end = now + duration_ms;
        self.slow.end_time = if was_active {
            self.slow.end_time.max(end)
        } else {
            end
        };
        self.slow.active = true;
        self.slow.movement_multiplier = multiplier;
        self.slow.last_applied = Some(now);

        if !was_active {
            self.visual_changes.push(EffectVisualChanged {
                kind: EffectKind::Slow,
                active: true,
            });
        }
        tracing::debug!(now, duration_ms, multiplier, "robot slowed");
    }

    /// Expire effects whose end time has been reached.
    pub fn tick(&mut self, now: u64) {
        for effect in [&mut self.stun, &mut self.slow] {
            if effect.active && now >= effect.end_time {
                effect.active = false;
                self.visual_changes.push(EffectVisualChanged {
                    kind: effect.kind,
                    active: false,
                });
                tracing::debug!(now, kind = ?effect.kind, "status effect ended");
            }
        }
    }

    /// Product of the active effects' movement multipliers, 1.0 when none.
    pub fn movement_multiplier(&self) -> f32 {
        self.active_effects()
            .map(|e| e.movement_multiplier)
            .product()
    }

    pub fn turn_multiplier(&self) -> f32 {
        if self.stun.active {
            self.stun.turn_multiplier
        } else {
            1.0
        }
    }

    /// Like [`Self::movement_multiplier`], but each effect is floored at its
    /// jump floor so a slowed or stunned robot can still get off the ground.
    pub fn vertical_jump_multiplier(&self) -> f32 {
        self.active_effects()
            .map(|e| e.movement_multiplier.max(e.jump_floor))
            .product()
    }

    /// Whether the robot may steer at all. A stun with a zero movement
    /// factor incapacitates completely.
    pub fn can_move(&self) -> bool {
        !self.stun.active || self.stun.movement_multiplier > 0.0
    }

    pub fn is_stunned(&self) -> bool {
        self.stun.active
    }

    pub fn is_slowed(&self) -> bool {
        self.slow.active
    }

    pub fn stun(&self) -> &StatusEffect {
        &self.stun
    }

    pub fn slow(&self) -> &StatusEffect {
        &self.slow
    }

    pub fn drain_visual_changes(&mut self) -> Vec<EffectVisualChanged> {
        std::mem::take(&mut self.visual_changes)
    }

    /// Clear both effects and their cooldown history.
    pub fn reset(&mut self) {
        for effect in [&mut self.stun, &mut self.slow] {
            if effect.active {
                self.visual_changes.push(EffectVisualChanged {
                    kind: effect.kind,
                    active: false,
                });
            }
            effect.active = false;
            effect.end_time = 0;
            effect.last_applied = None;
        }
    }

    fn active_effects(&self) -> impl Iterator<Item = &StatusEffect> {
        [&self.stun, &self.slow].into_iter().filter(|e| e.active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MaterialTag;
    use approx::assert_relative_eq;

    fn engine() -> StatusEffectEngine {
        StatusEffectEngine::new(&StatusConfig::default())
    }

    fn moving_body() -> RigidBodyState {
        let mut body = RigidBodyState::at_rest(Vec3::ZERO, MaterialTag::Robot);
        body.linear_velocity = Vec3::new(6.0, -2.0, 0.0);
        body.angular_velocity = Vec3::new(0.0, 1.5, 0.0);
        body
    }

    #[test]
    fn test_neutral_multipliers() {
        let fx = engine();
        assert_eq!(fx.movement_multiplier(), 1.0);
        assert_eq!(fx.turn_multiplier(), 1.0);
        assert_eq!(fx.vertical_jump_multiplier(), 1.0);
        assert!(fx.can_move());
    }

    #[test]
    fn test_stun_dampens_body() {
        let mut fx = engine();
        let mut body = moving_body();
        assert!(fx.try_apply_stun(10_000, 1200, &mut body));
        assert_relative_eq!(body.linear_velocity.x, 6.0 * 0.15);
        // Falling: keep 70% of the fall speed.
        assert_relative_eq!(body.linear_velocity.y, -1.4);
        assert_eq!(body.angular_velocity, Vec3::ZERO);
        assert_eq!(fx.stun().end_time, 11_200);
        assert_relative_eq!(fx.turn_multiplier(), 0.3);
    }

    #[test]
    fn test_stun_keeps_upward_velocity() {
        let mut fx = engine();
        let mut body = moving_body();
        body.linear_velocity.y = 3.0;
        fx.try_apply_stun(0, 1200, &mut body);
        assert_relative_eq!(body.linear_velocity.y, 3.0);
    }

    #[test]
    fn test_stun_cooldown() {
        let mut fx = engine();
        let mut body = moving_body();
        assert!(fx.try_apply_stun(1_000, 1200, &mut body));
        let end = fx.stun().end_time;
        let before = body;

        for now in [1_001, 2_000, 3_499] {
            assert!(!fx.try_apply_stun(now, 1200, &mut body));
            assert_eq!(fx.stun().end_time, end);
            assert_eq!(body, before);
        }
        assert!(fx.try_apply_stun(3_500, 1200, &mut body));
        assert_eq!(fx.stun().end_time, 4_700);
    }

    #[test]
    fn test_first_stun_at_time_zero_is_allowed() {
        let mut fx = engine();
        assert!(fx.try_apply_stun(0, 1200, &mut moving_body()));
    }

    #[test]
    fn test_slow_extends_never_shortens() {
        let mut fx = engine();
        fx.apply_slow(5_000, 2500, 0.25);
        fx.apply_slow(5_100, 2500, 0.25);
        assert_eq!(fx.slow().end_time, 7_600);

        // A shorter reapplication leaves the later end in place but takes the new multiplier.
        fx.apply_slow(5_200, 100, 0.5);
        assert_eq!(fx.slow().end_time, 7_600);
        assert_relative_eq!(fx.movement_multiplier(), 0.5);
    }

    #[test]
    fn test_tick_expires_each_effect_independently() {
        let mut fx = engine();
        fx.try_apply_stun(0, 1200, &mut moving_body());
        fx.apply_slow(0, 2500, 0.25);
        assert_relative_eq!(fx.movement_multiplier(), 0.15 * 0.25);
        assert_relative_eq!(fx.vertical_jump_multiplier(), 0.2 * 0.4);

        fx.tick(1_199);
        assert!(fx.is_stunned());
        fx.tick(1_200);
        assert!(!fx.is_stunned());
        assert!(fx.is_slowed());
        assert_relative_eq!(fx.movement_multiplier(), 0.25);

        fx.tick(2_500);
        assert!(!fx.is_slowed());
        assert_eq!(fx.movement_multiplier(), 1.0);
    }

    #[test]
    fn test_visual_changes_follow_transitions() {
        let mut fx = engine();
        fx.apply_slow(0, 100, 0.25);
        fx.apply_slow(50, 100, 0.25);
        fx.tick(150);
        let changes = fx.drain_visual_changes();
        assert_eq!(
            changes,
            vec![
                EffectVisualChanged { kind: EffectKind::Slow, active: true },
                EffectVisualChanged { kind: EffectKind::Slow, active: false },
            ]
        );
        assert!(fx.drain_visual_changes().is_empty());
    }

    #[test]
    fn test_zero_stun_factor_blocks_movement() {
        let config = StatusConfig {
            stun_movement_factor: 0.0,
            ..StatusConfig::default()
        };
        let mut fx = StatusEffectEngine::new(&config);
        fx.try_apply_stun(0, 1200, &mut moving_body());
        assert!(!fx.can_move());
    }

    #[test]
    fn test_reset_clears_cooldown() {
        let mut fx = engine();
        fx.try_apply_stun(0, 1200, &mut moving_body());
        fx.apply_slow(0, 2500, 0.25);
        fx.reset();
        assert!(!fx.is_stunned() && !fx.is_slowed());
        assert!(fx.try_apply_stun(10, 1200, &mut moving_body()));
    }
}
