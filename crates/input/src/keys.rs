/// One of the four movement keys.
///
/// The host maps its own key codes onto these; anything that does not map is
/// ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementKey {
    /// `W`
    Forward,
    /// `A`
    Left,
    /// `S`
    Backward,
    /// `D`
    Right,
}

impl MovementKey {
    pub const ALL: [MovementKey; 4] = [
        MovementKey::Forward,
        MovementKey::Left,
        MovementKey::Backward,
        MovementKey::Right,
    ];

    /// Signed (forward, sideways) contribution of this key.
    pub fn axis(self) -> (f32, f32) {
        match self {
            MovementKey::Forward => (1.0, 0.0),
            MovementKey::Backward => (-1.0, 0.0),
            MovementKey::Left => (0.0, -1.0),
            MovementKey::Right => (0.0, 1.0),
        }
    }
}
