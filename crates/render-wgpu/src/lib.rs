//! wgpu render backend for the viewer.
//!
//! Draws the loaded model with its MTL materials under one ambient and one
//! directional light. Textures missing from a material fall back to white.
//!
//! # Invariants
//! - Renderer never mutates the scene graph or camera.
//! - Each model node is uploaded to the GPU at most once.
//! - Clearing and drawing are separate passes so callers control ordering.

mod context;
mod gpu;
mod shaders;

pub use context::{AdapterAttempt, GpuContext, GpuInitError};
pub use gpu::{DEPTH_FORMAT, WgpuRenderer};
pub use shaders::MODEL_SHADER;
