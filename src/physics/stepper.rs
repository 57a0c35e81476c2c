use crate::config::PhysicsWorldConfig;

/// Splits wall-clock frame time into fixed physics steps.
///
/// At most `max_substeps` steps run per frame. Time beyond that is dropped
/// instead of being carried, so one long hitch cannot snowball into ever
/// longer frames.
pub struct FixedStepper {
    pub fixed_dt: f32,
    pub max_substeps: u32,
    accumulator: f32,
}

impl FixedStepper {
    pub fn new(fixed_dt: f32, max_substeps: u32) -> Self {
        Self {
            fixed_dt,
            max_substeps: max_substeps.max(1),
            accumulator: 0.0,
        }
    }

    pub fn from_config(config: &PhysicsWorldConfig) -> Self {
        Self::new(config.fixed_dt, config.max_substeps)
    }

    /// Add `frame_dt` and return how many fixed steps to run now.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.max(0.0);
        let mut steps = 0;
        while self.accumulator >= self.fixed_dt && steps < self.max_substeps {
            self.accumulator -= self.fixed_dt;
            steps += 1;
        }
        if steps == self.max_substeps {
            self.accumulator %= self.fixed_dt;
        }
        steps
    }

    /// How far into the next step the current frame falls (0..1).
    pub fn alpha(&self) -> f32 {
        (self.accumulator / self.fixed_dt).clamp(0.0, 1.0)
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
