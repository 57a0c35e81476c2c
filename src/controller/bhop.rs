use crate::config::BhopConfig;

/// Bunny-hop momentum.
///
/// Grounded jumps build the bonus up to `ground_cap`; air-hops can push it
/// further, to `air_cap`. Landing and standing around bleed it off.
#[derive(Clone, Debug)]
pub struct BunnyHopState {
    config: BhopConfig,
    bonus: f32,
    last_jump: Option<u64>,
}

impl BunnyHopState {
    pub fn new(config: &BhopConfig) -> Self {
        Self {
            config: config.clone(),
            bonus: 0.0,
            last_jump: None,
        }
    }

    pub fn bonus(&self) -> f32 {
        self.bonus
    }

    pub fn last_jump(&self) -> Option<u64> {
        self.last_jump
    }

    /// A grounded jump fired at `now`.
    pub fn add_ground(&mut self, now: u64) {
        self.bonus = (self.bonus + self.config.ground_increment).min(self.config.ground_cap);
        self.last_jump = Some(now);
    }

    /// An air-hop fired at `now`.
    pub fn add_air(&mut self, now: u64) {
        self.bonus = (self.bonus + self.config.air_increment).min(self.config.air_cap);
        self.last_jump = Some(now);
    }

    /// Whether the airborne jump gates are open: enough time since the last
    /// jump and enough horizontal speed to carry.
    pub fn air_hop_ready(&self, now: u64, horizontal_speed: f32) -> bool {
        let spaced = match self.last_jump {
            Some(t) => now.saturating_sub(t) > self.config.min_air_hop_spacing_ms,
            None => true,
        };
        spaced && horizontal_speed > self.config.min_air_hop_speed
    }

    /// Horizontal air-hop impulse magnitude before status scaling.
    pub fn air_hop_force(&self) -> f32 {
        self.config.air_base_force + self.bonus * self.config.air_bonus_scale
    }

    pub fn air_hop_vertical_force(&self) -> f32 {
        self.config.air_vertical_force
    }

    pub fn on_landing(&mut self) {
        self.decay(self.config.landing_decay);
    }

    pub fn on_idle_tick(&mut self) {
        self.decay(self.config.idle_decay);
    }

    pub fn on_stun(&mut self) {
        self.decay(self.config.stun_retention);
    }

    pub fn decay(&mut self, factor: f32) {
        self.bonus *= factor;
    }

    pub fn reset(&mut self) {
        self.bonus = 0.0;
        self.last_jump = None;
    }
}
