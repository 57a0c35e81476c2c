use crate::config::AnimationConfig;
use crate::fsm::StateMachine;

/// Clips in the robot asset, by the index the renderer plays them at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationClip {
    Idle,
    Walking,
    Jump,
    Dance,
    Death,
}

impl AnimationClip {
    pub fn clip_index(self) -> usize {
        match self {
            AnimationClip::Dance => 0,
            AnimationClip::Death => 1,
            AnimationClip::Idle => 2,
            AnimationClip::Jump => 3,
            AnimationClip::Walking => 10,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AnimationClip::Idle => "idle",
            AnimationClip::Walking => "walking",
            AnimationClip::Jump => "jump",
            AnimationClip::Dance => "dance",
            AnimationClip::Death => "death",
        }
    }
}

/// Request to crossfade to `clip`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationCue {
    pub clip: AnimationClip,
    pub crossfade: f32,
}

/// What the controller did this tick, as far as animation cares.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocomotionSample {
    pub jumped: bool,
    pub moving: bool,
    /// Stunned hard enough that the robot should stand frozen.
    pub incapacitated: bool,
}

/// Picks the clip to play from the locomotion state.
///
/// Jump is a one-shot: it holds for `jump_hold_secs` and then hands back to
/// Idle or Walking.
pub struct AnimationDirector {
    fsm: StateMachine<AnimationClip>,
    crossfade: f32,
    jump_hold: f32,
}

impl AnimationDirector {
    pub fn new(config: &AnimationConfig) -> Self {
        Self {
            fsm: StateMachine::new(AnimationClip::Idle),
            crossfade: config.crossfade_secs,
            jump_hold: config.jump_hold_secs,
        }
    }

    pub fn current(&self) -> AnimationClip {
        self.fsm.state
    }

    pub fn update(&mut self, dt: f32, sample: LocomotionSample) -> Option<AnimationCue> {
        self.fsm.tick(dt);

        if sample.jumped {
            self.fsm.force_go(AnimationClip::Jump);
            return Some(self.cue());
        }

        let holding_jump =
            self.fsm.state == AnimationClip::Jump && self.fsm.elapsed < self.jump_hold;
        if holding_jump && !sample.incapacitated {
            return None;
        }

        let next = if sample.moving && !sample.incapacitated {
            AnimationClip::Walking
        } else {
            AnimationClip::Idle
        };
        self.fsm.go(next).then(|| self.cue())
    }

    pub fn reset(&mut self) {
        self.fsm.reset(AnimationClip::Idle);
    }

    fn cue(&self) -> AnimationCue {
        AnimationCue {
            clip: self.fsm.state,
            crossfade: self.crossfade,
        }
    }
}
