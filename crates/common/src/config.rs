//! Viewer configuration.
//!
//! Every field has a default, so a YAML file only needs the values it wants
//! to change. The defaults reproduce the viewer's built-in behavior.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors from loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Top-level viewer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Directory containing the `obj/` asset folder.
    pub asset_dir: PathBuf,
    /// Base name of the model; loads `obj/<model>.mtl` and `obj/<model>.obj`.
    pub model: String,
    /// Seconds the camera advances per frame. Not measured from real time.
    pub timestep: f32,
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub placement: PlacementConfig,
    pub lighting: LightingConfig,
    pub reticle: ReticleConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from("."),
            model: "cobb".into(),
            timestep: 0.016,
            window: WindowConfig::default(),
            camera: CameraConfig::default(),
            placement: PlacementConfig::default(),
            lighting: LightingConfig::default(),
            reticle: ReticleConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Cobb Cafe".into(),
            width: 1280,
            height: 720,
        }
    }
}

/// Projection and controller constants for the fly camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Units per second.
    pub speed: f32,
    /// Radians per pixel of pointer movement.
    pub sensitivity: f32,
    pub start_position: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 50.0,
            near: 0.1,
            far: 1000.0,
            speed: 20.0,
            sensitivity: 0.002,
            start_position: Vec3::ZERO,
        }
    }
}

/// Where the loaded model is placed relative to its parent node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub position: Vec3,
    /// Uniform scale; non-uniform scale distorts the model.
    pub scale: f32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, -1.0, -5.0),
            scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub ambient_color: Vec3,
    pub ambient_intensity: f32,
    pub directional_color: Vec3,
    pub directional_intensity: f32,
    /// Light position; the light shines from here toward the origin.
    pub directional_position: Vec3,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient_color: Vec3::splat(64.0 / 255.0),
            ambient_intensity: 1.0,
            directional_color: Vec3::ONE,
            directional_intensity: 1.0,
            directional_position: Vec3::new(5.0, 10.0, 7.5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReticleConfig {
    /// Half-length of each crosshair arm, in pixels.
    pub arm_length: f32,
    pub line_width: f32,
    pub color: [u8; 4],
}

impl Default for ReticleConfig {
    fn default() -> Self {
        Self {
            arm_length: 5.0,
            line_width: 2.0,
            color: [255, 255, 255, 255],
        }
    }
}

impl ViewerConfig {
    /// Parse a YAML document. Missing fields keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.is_empty() {
            return Err(ConfigError::Invalid("model name is empty".into()));
        }
        if !(self.timestep.is_finite() && self.timestep >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "timestep must be a non-negative number, got {}",
                self.timestep
            )));
        }
        let cam = &self.camera;
        if !(cam.near > 0.0 && cam.far > cam.near) {
            return Err(ConfigError::Invalid(format!(
                "camera clip planes must satisfy 0 < near < far, got near={} far={}",
                cam.near, cam.far
            )));
        }
        if !(cam.fov_degrees > 0.0 && cam.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "fov_degrees must be in (0, 180), got {}",
                cam.fov_degrees
            )));
        }
        if self.lighting.directional_position == Vec3::ZERO {
            return Err(ConfigError::Invalid(
                "directional light position must not be the origin".into(),
            ));
        }
        Ok(())
    }
}
