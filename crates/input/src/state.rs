use crate::keys::MovementKey;
use glam::Vec2;

/// The four movement booleans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementKeys {
    pub forward: bool,
    pub left: bool,
    pub backward: bool,
    pub right: bool,
}

impl MovementKeys {
    pub fn is_pressed(&self, key: MovementKey) -> bool {
        match key {
            MovementKey::Forward => self.forward,
            MovementKey::Left => self.left,
            MovementKey::Backward => self.backward,
            MovementKey::Right => self.right,
        }
    }

    fn slot(&mut self, key: MovementKey) -> &mut bool {
        match key {
            MovementKey::Forward => &mut self.forward,
            MovementKey::Left => &mut self.left,
            MovementKey::Backward => &mut self.backward,
            MovementKey::Right => &mut self.right,
        }
    }

    pub fn any(&self) -> bool {
        self.forward || self.left || self.backward || self.right
    }

    /// Signed (forward, sideways) movement axis for the pressed keys.
    pub fn axis(&self) -> Vec2 {
        MovementKey::ALL
            .into_iter()
            .filter(|k| self.is_pressed(*k))
            .map(|k| {
                let (f, s) = k.axis();
                Vec2::new(f, s)
            })
            .sum()
    }
}

/// Keyboard and pointer state shared between event handlers and the frame.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keys: MovementKeys,
    pointer_delta: Vec2,
    pointer_locked: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> &MovementKeys {
        &self.keys
    }

    pub fn press(&mut self, key: MovementKey) {
        *self.keys.slot(key) = true;
    }

    /// Releasing a key that is not held is a no-op.
    pub fn release(&mut self, key: MovementKey) {
        *self.keys.slot(key) = false;
    }

    pub fn set_key(&mut self, key: MovementKey, pressed: bool) {
        if pressed {
            self.press(key);
        } else {
            self.release(key);
        }
    }

    /// Release every key, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.keys = MovementKeys::default();
    }

    pub fn pointer_locked(&self) -> bool {
        self.pointer_locked
    }

    /// Lock or release the pointer. Releasing discards pending movement.
    pub fn set_pointer_locked(&mut self, locked: bool) {
        if self.pointer_locked != locked {
            tracing::debug!(locked, "pointer lock changed");
        }
        self.pointer_locked = locked;
        if !locked {
            self.pointer_delta = Vec2::ZERO;
        }
    }

    /// Add raw pointer movement. Ignored while the pointer is not locked.
    pub fn accumulate_pointer(&mut self, dx: f32, dy: f32) {
        if self.pointer_locked {
            self.pointer_delta += Vec2::new(dx, dy);
        }
    }

    pub fn pending_pointer_delta(&self) -> Vec2 {
        self.pointer_delta
    }

    /// Drain the pointer movement accumulated since the last call.
    pub fn take_pointer_delta(&mut self) -> Vec2 {
        std::mem::take(&mut self.pointer_delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release() {
        let mut input = InputState::new();
        input.press(MovementKey::Forward);
        assert!(input.keys().forward);
        assert!(input.keys().any());
        input.release(MovementKey::Forward);
        assert!(!input.keys().forward);
        assert!(!input.keys().any());
    }

    #[test]
    fn releasing_unpressed_key_leaves_state_unchanged() {
        let mut input = InputState::new();
        input.press(MovementKey::Left);
        let before = *input.keys();
        input.release(MovementKey::Right);
        input.release(MovementKey::Backward);
        assert_eq!(*input.keys(), before);

        let mut empty = InputState::new();
        for key in MovementKey::ALL {
            empty.release(key);
        }
        assert_eq!(*empty.keys(), MovementKeys::default());
    }

    #[test]
    fn repeated_press_is_idempotent() {
        let mut input = InputState::new();
        input.press(MovementKey::Right);
        input.press(MovementKey::Right);
        input.release(MovementKey::Right);
        assert!(!input.keys().right);
    }

    #[test]
    fn keys_are_independent() {
        let mut input = InputState::new();
        input.set_key(MovementKey::Forward, true);
        input.set_key(MovementKey::Right, true);
        assert_eq!(
            *input.keys(),
            MovementKeys {
                forward: true,
                right: true,
                ..MovementKeys::default()
            }
        );
        assert_eq!(input.keys().axis(), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn opposing_keys_sum_to_zero_axis() {
        let mut input = InputState::new();
        for key in MovementKey::ALL {
            input.press(key);
        }
        assert_eq!(input.keys().axis(), Vec2::ZERO);
        input.release_all();
        assert!(!input.keys().any());
    }

    #[test]
    fn pointer_ignored_while_unlocked() {
        let mut input = InputState::new();
        input.accumulate_pointer(10.0, 5.0);
        assert_eq!(input.take_pointer_delta(), Vec2::ZERO);
    }

    #[test]
    fn pointer_accumulates_and_drains() {
        let mut input = InputState::new();
        input.set_pointer_locked(true);
        input.accumulate_pointer(3.0, -1.0);
        input.accumulate_pointer(2.0, 4.0);
        assert_eq!(input.pending_pointer_delta(), Vec2::new(5.0, 3.0));
        assert_eq!(input.take_pointer_delta(), Vec2::new(5.0, 3.0));
        assert_eq!(input.take_pointer_delta(), Vec2::ZERO);
    }

    #[test]
    fn unlocking_discards_pending_movement() {
        let mut input = InputState::new();
        input.set_pointer_locked(true);
        input.accumulate_pointer(7.0, 7.0);
        input.set_pointer_locked(false);
        assert!(!input.pointer_locked());
        assert_eq!(input.take_pointer_delta(), Vec2::ZERO);
    }
}
