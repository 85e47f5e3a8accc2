use crate::camera::FlyCamera;
use crate::reticle::Reticle;
use crate::state::ViewerState;
use flyview_scene::SceneGraph;

/// Renderer-agnostic output for one frame. All frame sinks implement this.
///
/// Targets read the scene and camera. They never mutate them.
pub trait FrameTarget {
    /// Redraw the 2D crosshair overlay.
    fn draw_reticle(&mut self, reticle: &Reticle);

    /// Clear the 3D surface to the background color.
    fn clear(&mut self);

    /// Draw the scene from the camera.
    fn draw_scene(&mut self, scene: &SceneGraph, camera: &FlyCamera);

    /// Ask for the next frame on the display's refresh cadence.
    fn schedule_next(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    Uninitialized,
    Running { frames: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderLoopError {
    #[error("render loop has not been started")]
    NotStarted,
    #[error("render loop is already running")]
    AlreadyRunning,
}

/// Drives ticks once the surface exists. There is no stopped state; the loop
/// ends when the window does.
#[derive(Debug)]
pub struct RenderLoop {
    phase: LoopPhase,
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderLoop {
    pub fn new() -> Self {
        Self {
            phase: LoopPhase::Uninitialized,
        }
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, LoopPhase::Running { .. })
    }

    pub fn frames(&self) -> u64 {
        match self.phase {
            LoopPhase::Uninitialized => 0,
            LoopPhase::Running { frames } => frames,
        }
    }

    /// Enter the running phase. The caller requests the first frame once the
    /// surface is ready to present.
    pub fn start(&mut self) -> Result<(), RenderLoopError> {
        if self.is_running() {
            return Err(RenderLoopError::AlreadyRunning);
        }
        self.phase = LoopPhase::Running { frames: 0 };
        tracing::info!("render loop started");
        Ok(())
    }

    /// One frame: reticle, clear, camera step, draw, schedule. Returns the
    /// number of completed frames.
    pub fn tick(
        &mut self,
        state: &mut ViewerState,
        target: &mut impl FrameTarget,
    ) -> Result<u64, RenderLoopError> {
        let LoopPhase::Running { frames } = self.phase else {
            return Err(RenderLoopError::NotStarted);
        };

        target.draw_reticle(&state.reticle());
        target.clear();
        state.advance_camera(state.timestep());
        target.draw_scene(&state.scene, &state.camera);
        target.schedule_next();

        let frames = frames + 1;
        self.phase = LoopPhase::Running { frames };
        tracing::trace!(frame = frames, "frame ticked");
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flyview_common::{ViewerConfig, Viewport};
    use flyview_input::MovementKey;
    use glam::Vec3;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Reticle(glam::Vec2),
        Clear,
        Draw(Vec3),
        Schedule,
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
    }

    impl FrameTarget for Recorder {
        fn draw_reticle(&mut self, reticle: &Reticle) {
            self.calls.push(Call::Reticle(reticle.center()));
        }

        fn clear(&mut self) {
            self.calls.push(Call::Clear);
        }

        fn draw_scene(&mut self, _scene: &SceneGraph, camera: &FlyCamera) {
            self.calls.push(Call::Draw(camera.position));
        }

        fn schedule_next(&mut self) {
            self.calls.push(Call::Schedule);
        }
    }

    fn state() -> ViewerState {
        ViewerState::new(ViewerConfig::default(), Viewport::new(800, 600))
    }

    #[test]
    fn tick_before_start_fails() {
        let mut lp = RenderLoop::new();
        let mut target = Recorder::default();
        let err = lp.tick(&mut state(), &mut target).unwrap_err();
        assert_eq!(err, RenderLoopError::NotStarted);
        assert!(target.calls.is_empty());
    }

    #[test]
    fn start_twice_fails() {
        let mut lp = RenderLoop::new();
        lp.start().unwrap();
        assert_eq!(lp.start(), Err(RenderLoopError::AlreadyRunning));
        assert!(lp.is_running());
    }

    #[test]
    fn tick_runs_steps_in_order() {
        let mut lp = RenderLoop::new();
        let mut s = state();
        let mut target = Recorder::default();
        lp.start().unwrap();

        s.key_changed(MovementKey::Forward, true);
        assert_eq!(lp.tick(&mut s, &mut target).unwrap(), 1);

        let step = s.camera.speed * s.timestep();
        assert_eq!(target.calls.len(), 4);
        assert_eq!(target.calls[0], Call::Reticle(glam::Vec2::new(400.0, 300.0)));
        assert_eq!(target.calls[1], Call::Clear);
        match target.calls[2] {
            Call::Draw(p) => assert!((p - Vec3::new(0.0, 0.0, -step)).length() < 1e-6),
            ref other => panic!("expected draw, got {other:?}"),
        }
        assert_eq!(target.calls[3], Call::Schedule);
    }

    #[test]
    fn frames_count_up() {
        let mut lp = RenderLoop::new();
        let mut s = state();
        let mut target = Recorder::default();
        assert_eq!(lp.phase(), LoopPhase::Uninitialized);
        lp.start().unwrap();
        for _ in 0..10 {
            lp.tick(&mut s, &mut target).unwrap();
        }
        assert_eq!(lp.phase(), LoopPhase::Running { frames: 10 });
        assert_eq!(lp.frames(), 10);
        assert_eq!(s.camera.position, Vec3::ZERO);
    }

    #[test]
    fn reticle_follows_resize() {
        let mut lp = RenderLoop::new();
        let mut s = state();
        let mut target = Recorder::default();
        lp.start().unwrap();
        s.resize(1920, 1080);
        lp.tick(&mut s, &mut target).unwrap();
        assert!(target.calls.contains(&Call::Reticle(glam::Vec2::new(960.0, 540.0))));
    }
}
