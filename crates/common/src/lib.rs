//! Shared types for the flyview workspace.
//!
//! # Invariants
//! - `Viewport` dimensions are never zero; resizing clamps to 1x1.
//! - Configuration defaults reproduce the viewer's built-in constants.

pub mod config;
pub mod types;

pub use config::{
    CameraConfig, ConfigError, LightingConfig, PlacementConfig, ReticleConfig, ViewerConfig,
    WindowConfig,
};
pub use types::{Aabb, Transform, Viewport};
