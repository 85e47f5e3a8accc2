use flyview_render::{Reticle, Segment};
use winit::event::WindowEvent;
use winit::window::Window;

/// Tessellated overlay for one frame, ready to be recorded.
pub struct PreparedOverlay {
    paint_jobs: Vec<egui::ClippedPrimitive>,
    textures_delta: egui::TexturesDelta,
    screen: egui_wgpu::ScreenDescriptor,
}

/// 2D layer composited over the 3D surface. Only the reticle lives here.
pub struct Overlay {
    ctx: egui::Context,
    winit_state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

impl Overlay {
    pub fn new(window: &Window, device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let ctx = egui::Context::default();
        let winit_state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);
        Self {
            ctx,
            winit_state,
            renderer,
        }
    }

    /// Keep egui's view of the window (size, scale factor) current.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) {
        let _ = self.winit_state.on_window_event(window, event);
    }

    /// Discard last frame's shapes and lay out the crosshair again.
    pub fn prepare(&mut self, window: &Window, reticle: &Reticle, size_in_pixels: [u32; 2]) -> PreparedOverlay {
        let raw_input = self.winit_state.take_egui_input(window);
        let full_output = self.ctx.run(raw_input, |ctx| paint_reticle(ctx, reticle));
        self.winit_state
            .handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        PreparedOverlay {
            paint_jobs,
            textures_delta: full_output.textures_delta,
            screen: egui_wgpu::ScreenDescriptor {
                size_in_pixels,
                pixels_per_point: full_output.pixels_per_point,
            },
        }
    }

    /// Record the overlay on top of whatever `view` already holds.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        prepared: PreparedOverlay,
    ) {
        for (id, image_delta) in &prepared.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }
        self.renderer.update_buffers(
            device,
            queue,
            encoder,
            &prepared.paint_jobs,
            &prepared.screen,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("overlay_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.renderer
                .render(&mut pass, &prepared.paint_jobs, &prepared.screen);
        }
        for id in &prepared.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}

fn paint_reticle(ctx: &egui::Context, reticle: &Reticle) {
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Foreground,
        egui::Id::new("reticle"),
    ));
    let pixels_per_point = ctx.pixels_per_point();
    let [r, g, b, a] = reticle.color;
    let stroke = egui::Stroke::new(
        reticle.line_width / pixels_per_point,
        egui::Color32::from_rgba_unmultiplied(r, g, b, a),
    );
    for segment in reticle.segments() {
        painter.line_segment(segment_points(&segment, pixels_per_point), stroke);
    }
}

/// Reticle geometry is in physical pixels; egui paints in points.
fn segment_points(segment: &Segment, pixels_per_point: f32) -> [egui::Pos2; 2] {
    [
        egui::pos2(segment.from.x / pixels_per_point, segment.from.y / pixels_per_point),
        egui::pos2(segment.to.x / pixels_per_point, segment.to.y / pixels_per_point),
    ]
}
