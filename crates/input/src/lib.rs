//! Input State: pressed movement keys and accumulated pointer movement.
//!
//! # Invariants
//! - Key state is only changed by explicit press/release calls.
//! - Pointer deltas are only accumulated while the pointer is locked, and are
//!   drained exactly once per frame.

pub mod keys;
pub mod state;

pub use keys::MovementKey;
pub use state::{InputState, MovementKeys};
