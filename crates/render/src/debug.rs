use crate::camera::FlyCamera;
use crate::render_loop::FrameTarget;
use crate::reticle::Reticle;
use flyview_scene::{NodeKind, SceneGraph};
use std::fmt::Write;

/// Debug text target for running without a GPU.
///
/// Each frame appends a human-readable description of what would have been
/// drawn. Useful for headless runs, logging, and testing the frame interface.
#[derive(Debug, Default)]
pub struct DebugTextTarget {
    frame: String,
    frames: Vec<String>,
    scheduled: u64,
}

impl DebugTextTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed frame transcripts, oldest first.
    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&str> {
        self.frames.last().map(String::as_str)
    }

    /// How many times a next frame was requested.
    pub fn scheduled(&self) -> u64 {
        self.scheduled
    }
}

impl FrameTarget for DebugTextTarget {
    fn draw_reticle(&mut self, reticle: &Reticle) {
        let c = reticle.center();
        let _ = writeln!(
            self.frame,
            "Reticle: center=({:.1}, {:.1}) width={:.1}",
            c.x, c.y, reticle.line_width
        );
    }

    fn clear(&mut self) {
        self.frame.push_str("Clear: black\n");
    }

    fn draw_scene(&mut self, scene: &SceneGraph, camera: &FlyCamera) {
        let p = camera.position;
        let _ = writeln!(
            self.frame,
            "Camera: pos=({:.2}, {:.2}, {:.2}) yaw={:.3} pitch={:.3}",
            p.x, p.y, p.z, camera.yaw, camera.pitch
        );
        self.frame.push_str(&describe_scene(scene));
    }

    fn schedule_next(&mut self) {
        self.scheduled += 1;
        if !self.frame.is_empty() {
            self.frames.push(std::mem::take(&mut self.frame));
        }
    }
}

/// One line per scene node, indented by depth.
pub fn describe_scene(scene: &SceneGraph) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Scene ({} nodes) ===", scene.len());
    let mut stack = vec![(scene.root(), 0usize)];
    while let Some((id, depth)) = stack.pop() {
        let Some(node) = scene.node(id) else {
            continue;
        };
        let p = node.transform.position;
        let kind = match &node.kind {
            NodeKind::Group => "group".to_string(),
            NodeKind::AmbientLight(light) => format!("ambient intensity={:.2}", light.intensity),
            NodeKind::DirectionalLight(light) => {
                format!("directional intensity={:.2}", light.intensity)
            }
            NodeKind::Model(model) => format!(
                "model {} meshes={} triangles={}",
                model.name,
                model.meshes.len(),
                model.triangle_count()
            ),
        };
        let _ = writeln!(
            out,
            "{:indent$}{id} {} [{kind}] pos=({:.2}, {:.2}, {:.2})",
            "",
            node.name,
            p.x,
            p.y,
            p.z,
            indent = depth * 2
        );
        for child in node.children().iter().rev() {
            stack.push((*child, depth + 1));
        }
    }
    out
}
