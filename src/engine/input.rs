use std::collections::{HashMap, HashSet};

/// Named actions the controller understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    Jump,
}

/// Boolean movement intent read once per tick. Conflicting flags are allowed:
/// forward + backward both apply and cancel in the force sum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MovementIntent {
    pub forward: bool,
    pub backward: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    pub jump: bool,
}

impl MovementIntent {
    pub fn turning(&self) -> bool {
        self.turn_left || self.turn_right
    }
}

/// Key name → action table. Several keys may map to one action.
pub struct KeyBindings {
    map: HashMap<String, Action>,
}

impl KeyBindings {
    pub fn empty() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn bind(&mut self, key: &str, action: Action) -> &mut Self {
        self.map.insert(key.to_string(), action);
        self
    }

    pub fn action(&self, key: &str) -> Option<Action> {
        self.map.get(key).copied()
    }
}

impl Default for KeyBindings {
    /// Action names, arrow keys and WASD, plus space for jump.
    fn default() -> Self {
        let mut b = Self::empty();
        b.bind("up", Action::Up)
            .bind("ArrowUp", Action::Up)
            .bind("w", Action::Up)
            .bind("down", Action::Down)
            .bind("ArrowDown", Action::Down)
            .bind("s", Action::Down)
            .bind("left", Action::Left)
            .bind("ArrowLeft", Action::Left)
            .bind("a", Action::Left)
            .bind("right", Action::Right)
            .bind("ArrowRight", Action::Right)
            .bind("d", Action::Right)
            .bind("jump", Action::Jump)
            .bind("space", Action::Jump);
        b
    }
}

/// Pressed-key set maintained by whatever collects device input.
#[derive(Default)]
pub struct InputState {
    pub keys: HashSet<String>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: &str) {
        self.keys.insert(key.to_string());
    }

    pub fn release(&mut self, key: &str) {
        self.keys.remove(key);
    }

    pub fn release_all(&mut self) {
        self.keys.clear();
    }

    /// Collapse the held keys into one intent snapshot. Unbound keys are ignored.
    pub fn intent(&self, bindings: &KeyBindings) -> MovementIntent {
        let mut intent = MovementIntent::default();
        for key in &self.keys {
            match bindings.action(key) {
                Some(Action::Up) => intent.forward = true,
                Some(Action::Down) => intent.backward = true,
                Some(Action::Left) => intent.turn_left = true,
                Some(Action::Right) => intent.turn_right = true,
                Some(Action::Jump) => intent.jump = true,
                None => {}
            }
        }
        intent
    }
}
