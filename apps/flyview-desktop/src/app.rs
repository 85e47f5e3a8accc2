use crate::overlay::{Overlay, PreparedOverlay};
use anyhow::{Context, Result};
use flyview_assets::{AssetError, FsSource, LoadedModel, SceneLoader};
use flyview_common::{ViewerConfig, Viewport};
use flyview_input::MovementKey;
use flyview_render::{FlyCamera, FrameTarget, RenderLoop, Reticle, ViewerState};
use flyview_render_wgpu::{GpuContext, WgpuRenderer};
use flyview_scene::SceneGraph;
use std::sync::Arc;
use std::thread::JoinHandle;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoopProxy};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

/// Messages delivered to the UI thread from elsewhere.
#[derive(Debug)]
pub enum ViewerEvent {
    ModelLoaded(Result<LoadedModel, AssetError>),
}

/// Load the configured model on its own thread and post the result back to
/// the event loop.
pub fn spawn_loader(
    config: &ViewerConfig,
    proxy: EventLoopProxy<ViewerEvent>,
) -> std::io::Result<JoinHandle<()>> {
    let root = config.asset_dir.clone();
    let model = config.model.clone();
    std::thread::Builder::new()
        .name("asset-loader".into())
        .spawn(move || {
            let loader = SceneLoader::new(FsSource::new(root));
            let result = pollster::block_on(loader.load(&model));
            if proxy.send_event(ViewerEvent::ModelLoaded(result)).is_err() {
                tracing::debug!("event loop closed before the model finished loading");
            }
        })
}

/// WASD by physical position, so other keyboard layouts keep the same shape.
fn movement_key(code: KeyCode) -> Option<MovementKey> {
    match code {
        KeyCode::KeyW => Some(MovementKey::Forward),
        KeyCode::KeyA => Some(MovementKey::Left),
        KeyCode::KeyS => Some(MovementKey::Backward),
        KeyCode::KeyD => Some(MovementKey::Right),
        _ => None,
    }
}

const GPU_UNAVAILABLE: &str = "rendering context unavailable";

struct Gpu {
    context: GpuContext,
    renderer: WgpuRenderer,
    overlay: Overlay,
}

pub struct ViewerApp {
    state: ViewerState,
    render_loop: RenderLoop,
    window: Option<Arc<Window>>,
    gpu: Option<Gpu>,
    fatal: Option<anyhow::Error>,
}

impl ViewerApp {
    pub fn new(config: ViewerConfig) -> Self {
        let viewport = Viewport::new(config.window.width, config.window.height);
        Self {
            state: ViewerState::new(config, viewport),
            render_loop: RenderLoop::new(),
            window: None,
            gpu: None,
            fatal: None,
        }
    }

    /// The error that stopped the event loop, if any.
    pub fn into_result(self) -> Result<()> {
        match self.fatal {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        tracing::error!("{error:#}");
        self.fatal = Some(error);
        event_loop.exit();
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_config = &self.state.config().window;
        let attrs = Window::default_attributes()
            .with_title(window_config.title.clone())
            .with_inner_size(PhysicalSize::new(window_config.width, window_config.height));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let size = window.inner_size();
        let context = pollster::block_on(GpuContext::new(window.clone(), size.width, size.height))
            .context(GPU_UNAVAILABLE)?;
        let (width, height) = context.size();
        let renderer = WgpuRenderer::new(
            &context.device,
            &context.queue,
            context.surface_format(),
            width,
            height,
        );
        let overlay = Overlay::new(&window, &context.device, context.surface_format());

        self.state.resize(width, height);
        self.render_loop.start()?;
        window.request_redraw();

        self.window = Some(window);
        self.gpu = Some(Gpu {
            context,
            renderer,
            overlay,
        });
        Ok(())
    }

    fn lock_pointer(&mut self) {
        let Some(window) = &self.window else {
            return;
        };
        if self.state.input.pointer_locked() {
            return;
        }
        let grabbed = window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
        match grabbed {
            Ok(()) => {
                window.set_cursor_visible(false);
                self.state.set_pointer_locked(true);
                tracing::debug!("pointer locked");
            }
            Err(e) => tracing::warn!("pointer lock unavailable: {e}"),
        }
    }

    fn release_pointer(&mut self) {
        if let Some(window) = &self.window {
            let _ = window.set_cursor_grab(CursorGrabMode::None);
            window.set_cursor_visible(true);
        }
        if self.state.input.pointer_locked() {
            tracing::debug!("pointer released");
        }
        self.state.set_pointer_locked(false);
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if let Some(gpu) = &mut self.gpu {
            gpu.context.resize(size.width, size.height);
            let (width, height) = gpu.context.size();
            gpu.renderer.resize(&gpu.context.device, width, height);
        }
        self.state.resize(size.width, size.height);
    }

    fn redraw(&mut self) {
        let (Some(window), Some(gpu)) = (&self.window, &mut self.gpu) else {
            return;
        };

        let output = match gpu.context.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.context.reconfigure();
                window.request_redraw();
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                window.request_redraw();
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = gpu
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        let mut frame = GpuFrame {
            gpu,
            window,
            view,
            encoder: Some(encoder),
            output: Some(output),
            overlay: None,
        };
        if let Err(e) = self.render_loop.tick(&mut self.state, &mut frame) {
            tracing::error!("frame skipped: {e}");
        }
    }
}

impl ApplicationHandler<ViewerEvent> for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: ViewerEvent) {
        match event {
            ViewerEvent::ModelLoaded(result) => {
                self.state.on_model_loaded(result);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(window), Some(gpu)) = (&self.window, &mut self.gpu) {
            gpu.overlay.on_window_event(window, &event);
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.resize(size);
            }
            WindowEvent::Focused(false) => {
                self.release_pointer();
                self.state.focus_lost();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                let pressed = key_state == ElementState::Pressed;
                if code == KeyCode::Escape && pressed {
                    self.release_pointer();
                } else if let Some(key) = movement_key(code) {
                    self.state.key_changed(key, pressed);
                }
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: ElementState::Pressed,
                ..
            } => {
                self.lock_pointer();
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.state.pointer_moved(delta.0 as f32, delta.1 as f32);
        }
    }
}

/// One swapchain frame driven through the render loop.
struct GpuFrame<'a> {
    gpu: &'a mut Gpu,
    window: &'a Window,
    view: wgpu::TextureView,
    encoder: Option<wgpu::CommandEncoder>,
    output: Option<wgpu::SurfaceTexture>,
    overlay: Option<PreparedOverlay>,
}

impl FrameTarget for GpuFrame<'_> {
    fn draw_reticle(&mut self, reticle: &Reticle) {
        let size = self.gpu.context.size();
        self.overlay = Some(
            self.gpu
                .overlay
                .prepare(self.window, reticle, [size.0, size.1]),
        );
    }

    fn clear(&mut self) {
        if let Some(encoder) = &mut self.encoder {
            self.gpu.renderer.clear(encoder, &self.view);
        }
    }

    fn draw_scene(&mut self, scene: &SceneGraph, camera: &FlyCamera) {
        let Gpu {
            context, renderer, ..
        } = &mut *self.gpu;
        renderer.sync_scene(&context.device, &context.queue, scene);
        if let Some(encoder) = &mut self.encoder {
            renderer.draw(&context.queue, encoder, &self.view, scene, camera);
        }
    }

    fn schedule_next(&mut self) {
        let Some(mut encoder) = self.encoder.take() else {
            return;
        };
        let Gpu {
            context, overlay, ..
        } = &mut *self.gpu;
        if let Some(prepared) = self.overlay.take() {
            overlay.render(
                &context.device,
                &context.queue,
                &mut encoder,
                &self.view,
                prepared,
            );
        }
        context.queue.submit(std::iter::once(encoder.finish()));
        if let Some(output) = self.output.take() {
            output.present();
        }
        self.window.request_redraw();
    }
}
