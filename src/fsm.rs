/// Small finite-state-machine container.
///
/// `S` is the state type (usually a fieldless enum). The machine remembers the
/// current and previous state and how long it has sat in the current one.
/// Deciding *when* to transition is left to the owner.
///
/// # Usage
/// ```
/// # use hopbot::fsm::StateMachine;
/// #[derive(Clone, Copy, PartialEq, Debug)]
/// enum Light { Red, Green }
///
/// let mut fsm = StateMachine::new(Light::Red);
/// fsm.tick(0.5);
/// assert!(fsm.go(Light::Green));
/// assert!(fsm.just_entered());
/// assert_eq!(fsm.previous, Light::Red);
/// ```
#[derive(Clone, Debug)]
pub struct StateMachine<S: Copy + PartialEq> {
    pub state: S,
    pub previous: S,
    /// Seconds spent in the current state. Reset to 0.0 on each transition.
    pub elapsed: f32,
    entered_this_tick: bool,
}

impl<S: Copy + PartialEq> StateMachine<S> {
    /// Start in `initial`. `just_entered()` is `true` until the first `tick`.
    pub fn new(initial: S) -> Self {
        Self {
            state: initial,
            previous: initial,
            elapsed: 0.0,
            entered_this_tick: true,
        }
    }

    /// Move to `next` if it differs from the current state.
    /// Returns whether a transition happened.
    pub fn go(&mut self, next: S) -> bool {
        if self.state == next {
            return false;
        }
        self.force_go(next);
        true
    }

    /// Re-enter `next` even if it is already current (restarts `elapsed`).
    pub fn force_go(&mut self, next: S) {
        self.previous = std::mem::replace(&mut self.state, next);
        self.elapsed = 0.0;
        self.entered_this_tick = true;
    }

    /// Advance the in-state timer and clear the `just_entered` flag.
    /// Call once per tick **before** evaluating transitions.
    pub fn tick(&mut self, dt: f32) {
        self.elapsed += dt;
        self.entered_this_tick = false;
    }

    /// `true` only during the tick in which the current state was entered.
    pub fn just_entered(&self) -> bool {
        self.entered_this_tick
    }

    /// Jump straight to `state` with no history, as if freshly constructed.
    pub fn reset(&mut self, state: S) {
        *self = Self::new(state);
    }
}
