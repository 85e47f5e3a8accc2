//! Rendering Adapter: everything about a frame that does not touch the GPU.
//!
//! # Invariants
//! - Camera pitch stays within [-π/2, π/2].
//! - The overlay is the same size as the 3D surface after every resize.
//! - A tick runs reticle, clear, camera, draw, schedule in that order.
//! - Targets never mutate the scene.

mod camera;
mod debug;
mod render_loop;
mod reticle;
mod state;

pub use camera::FlyCamera;
pub use debug::{DebugTextTarget, describe_scene};
pub use render_loop::{FrameTarget, LoopPhase, RenderLoop, RenderLoopError};
pub use reticle::{Reticle, Segment};
pub use state::{ModelStatus, ViewerState};
