use anyhow::Result;
use flyview_assets::{FsSource, SceneLoader};
use flyview_common::{ViewerConfig, Viewport};
use flyview_render::{DebugTextTarget, RenderLoop, ViewerState};
use std::fmt::Write;

/// Load the model, run `frames` ticks against the text target and return the
/// transcript. A failed load still renders the empty scene.
pub fn run(config: ViewerConfig, frames: u64) -> Result<String> {
    let loader = SceneLoader::new(FsSource::new(&config.asset_dir));
    let loaded = pollster::block_on(loader.load(&config.model));

    let viewport = Viewport::new(config.window.width, config.window.height);
    let mut state = ViewerState::new(config, viewport);
    state.on_model_loaded(loaded);

    let mut render_loop = RenderLoop::new();
    let mut target = DebugTextTarget::new();
    render_loop.start()?;
    for _ in 0..frames {
        render_loop.tick(&mut state, &mut target)?;
    }

    let mut out = String::new();
    writeln!(out, "Model: {:?}", state.model_status())?;
    for (i, frame) in target.frames().iter().enumerate() {
        writeln!(out, "--- frame {} ---", i + 1)?;
        out.push_str(frame);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let obj = dir.path().join("obj");
        std::fs::create_dir(&obj).unwrap();
        std::fs::write(obj.join("cobb.mtl"), "newmtl Tile\nKd 0.8 0.8 0.8\n").unwrap();
        std::fs::write(
            obj.join("cobb.obj"),
            "mtllib cobb.mtl\nv 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nusemtl Tile\nf 1 2 3 4\n",
        )
        .unwrap();
        dir
    }

    #[test]
    fn renders_loaded_model() {
        let dir = asset_dir();
        let config = ViewerConfig {
            asset_dir: dir.path().to_path_buf(),
            ..ViewerConfig::default()
        };
        let transcript = run(config, 3).unwrap();
        assert!(transcript.starts_with("Model: Loaded("));
        assert!(transcript.contains("--- frame 3 ---"));
        assert!(!transcript.contains("--- frame 4 ---"));
        assert!(transcript.contains("model cobb meshes=1 triangles=2"));
        assert!(transcript.contains("Reticle: center=(640.0, 360.0)"));
    }

    #[test]
    fn missing_model_still_renders() {
        let dir = tempfile::tempdir().unwrap();
        let config = ViewerConfig {
            asset_dir: dir.path().to_path_buf(),
            ..ViewerConfig::default()
        };
        let transcript = run(config, 1).unwrap();
        assert!(transcript.starts_with("Model: Failed("));
        assert!(transcript.contains("--- frame 1 ---"));
        assert!(!transcript.contains("model cobb"));
    }
}
