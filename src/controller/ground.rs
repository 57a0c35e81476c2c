use glam::Vec3;

use crate::backend::{PhysicsBackend, RigidBodyHandle};
use crate::config::GroundConfig;

/// Throttled grounded check.
///
/// Casts a short ray straight down from the body centre at most once per
/// sample interval and caches the answer in between. A hit only counts while
/// the body is vertically still, which filters out the frames where it is
/// bouncing through the ground contact.
pub struct GroundDetector {
    config: GroundConfig,
    last_sample: Option<u64>,
    grounded: bool,
}

impl GroundDetector {
    pub fn new(config: &GroundConfig) -> Self {
        Self {
            config: config.clone(),
            last_sample: None,
            grounded: false,
        }
    }

    pub fn is_grounded<B: PhysicsBackend>(
        &mut self,
        backend: &B,
        body: RigidBodyHandle,
        now: u64,
    ) -> bool {
        if let Some(last) = self.last_sample {
            if now.saturating_sub(last) < self.config.sample_interval_ms {
                return self.grounded;
            }
        }
        self.last_sample = Some(now);

        let Some(state) = backend.read_body(body) else {
            self.grounded = false;
            return false;
        };
        let origin = state.position;
        let end = origin - Vec3::Y * self.config.ray_length;
        let stable = state.linear_velocity.y.abs() < self.config.max_vertical_speed;

        self.grounded = match backend.raycast_closest(origin, end, Some(body)) {
            Some(hit) => hit.distance < self.config.ray_length && stable,
            None => false,
        };
        self.grounded
    }

    /// Report grounded until the next ray sample, for a ground contact seen
    /// between samples. The sampling schedule is left alone.
    pub fn mark_grounded(&mut self) {
        self.grounded = true;
    }

    /// Force the next query to cast a fresh ray.
    pub fn invalidate(&mut self) {
        self.last_sample = None;
    }

    pub fn reset(&mut self) {
        self.last_sample = None;
        self.grounded = false;
    }
}
