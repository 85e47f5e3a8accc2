use anyhow::{Context, Result};
use app::{ViewerApp, ViewerEvent};
use clap::Parser;
use flyview_common::ViewerConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use winit::event_loop::{ControlFlow, EventLoop};

mod app;
mod headless;
mod overlay;

#[derive(Parser)]
#[command(name = "flyview-desktop", about = "First-person viewer for a single OBJ model")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Model base name, read from `<asset-dir>/obj/<model>.mtl` and `.obj`
    #[arg(long)]
    model: Option<String>,

    /// Directory holding the `obj/` folder
    #[arg(long)]
    asset_dir: Option<PathBuf>,

    /// Render this many frames as text and exit, without a window
    #[arg(long, value_name = "FRAMES")]
    headless: Option<u64>,
}

impl Cli {
    /// File values first, then command-line overrides.
    fn viewer_config(&self) -> Result<ViewerConfig> {
        let mut config = match &self.config {
            Some(path) => ViewerConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => ViewerConfig::default(),
        };
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(dir) = &self.asset_dir {
            config.asset_dir = dir.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("flyview-desktop starting");
    let config = cli.viewer_config()?;

    if let Some(frames) = cli.headless {
        let transcript = headless::run(config, frames)?;
        print!("{transcript}");
        return Ok(());
    }

    let event_loop = EventLoop::<ViewerEvent>::with_user_event().build()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    app::spawn_loader(&config, event_loop.create_proxy()).context("starting asset loader")?;

    let mut app = ViewerApp::new(config);
    event_loop.run_app(&mut app)?;

    app.into_result()
}
