use crate::camera::FlyCamera;
use crate::reticle::Reticle;
use flyview_assets::{AssetError, LoadedModel};
use flyview_common::{ViewerConfig, Viewport};
use flyview_input::{InputState, MovementKey};
use flyview_scene::{NodeId, SceneError, SceneGraph};

/// Progress of the single model load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelStatus {
    Pending,
    Loaded(NodeId),
    Failed(String),
}

/// Everything the frame update reads or writes, in one place.
///
/// Only the UI thread touches this; event handlers and the render loop get
/// it by `&mut`.
#[derive(Debug)]
pub struct ViewerState {
    pub camera: FlyCamera,
    pub input: InputState,
    pub scene: SceneGraph,
    viewport: Viewport,
    overlay: Viewport,
    model_status: ModelStatus,
    config: ViewerConfig,
}

impl ViewerState {
    pub fn new(config: ViewerConfig, viewport: Viewport) -> Self {
        Self {
            camera: FlyCamera::from_config(&config.camera, viewport.aspect()),
            input: InputState::new(),
            scene: SceneGraph::with_lighting(&config.lighting),
            viewport,
            overlay: viewport,
            model_status: ModelStatus::Pending,
            config,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Size of the 3D surface.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Size of the 2D overlay.
    pub fn overlay(&self) -> Viewport {
        self.overlay
    }

    pub fn model_status(&self) -> &ModelStatus {
        &self.model_status
    }

    /// Seconds the camera advances per tick.
    pub fn timestep(&self) -> f32 {
        self.config.timestep
    }

    /// Resize the 3D surface and the overlay together.
    pub fn resize(&mut self, width: u32, height: u32) -> Viewport {
        let viewport = Viewport::new(width, height);
        self.viewport = viewport;
        self.overlay = viewport;
        self.camera.aspect = viewport.aspect();
        tracing::debug!(width = viewport.width, height = viewport.height, "viewport resized");
        viewport
    }

    pub fn key_changed(&mut self, key: MovementKey, pressed: bool) {
        self.input.set_key(key, pressed);
    }

    pub fn pointer_moved(&mut self, dx: f32, dy: f32) {
        self.input.accumulate_pointer(dx, dy);
    }

    pub fn set_pointer_locked(&mut self, locked: bool) {
        self.input.set_pointer_locked(locked);
    }

    /// Focus loss: drop held keys and release the pointer.
    pub fn focus_lost(&mut self) {
        self.input.release_all();
        self.input.set_pointer_locked(false);
    }

    /// Apply the pointer movement gathered since the last frame, then move.
    pub fn advance_camera(&mut self, dt: f32) {
        let delta = self.input.take_pointer_delta();
        self.camera.update(self.input.keys(), delta, dt);
    }

    pub fn reticle(&self) -> Reticle {
        Reticle::centered(self.overlay, &self.config.reticle)
    }

    /// Take the result of the asset load. Returns the model node when this
    /// call attached it.
    pub fn on_model_loaded(&mut self, result: Result<LoadedModel, AssetError>) -> Option<NodeId> {
        match result {
            Ok(model) => match self.scene.attach_model(model, &self.config.placement) {
                Ok(id) => {
                    self.model_status = ModelStatus::Loaded(id);
                    Some(id)
                }
                Err(SceneError::ModelAlreadyAttached(existing)) => {
                    tracing::warn!(node = %existing, "ignoring repeated model load");
                    None
                }
                Err(e) => {
                    tracing::error!("failed to attach model: {e}");
                    self.model_status = ModelStatus::Failed(e.to_string());
                    None
                }
            },
            Err(e) => {
                tracing::error!(model = %self.config.model, "failed to load model: {e}");
                if !matches!(self.model_status, ModelStatus::Loaded(_)) {
                    self.model_status = ModelStatus::Failed(e.to_string());
                }
                None
            }
        }
    }
}
