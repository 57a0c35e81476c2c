use std::time::Instant;

/// Monotonic millisecond clock used for gameplay timers (cooldowns, effect
/// durations, ground sampling). Separate from the simulation `dt`, so effect
/// lengths stay real-time under variable sub-stepping.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Wall clock anchored at construction.
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Clock that only moves when told to. Used for headless runs and tests.
#[derive(Default)]
pub struct ManualClock {
    now: u64,
    // Sub-millisecond remainder carried between `advance_secs` calls.
    carry: f64,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: start_ms,
            carry: 0.0,
        }
    }

    pub fn advance_secs(&mut self, secs: f32) {
        let total = self.carry + secs.max(0.0) as f64 * 1000.0;
        let whole = total.floor();
        self.now += whole as u64;
        self.carry = total - whole;
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now
    }
}

/// Measures the wall time between successive frames.
pub struct FrameTimer {
    last: Instant,
    pub dt: f32,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
            dt: 0.0,
        }
    }

    pub fn tick(&mut self) {
        let now = Instant::now();
        self.dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}
