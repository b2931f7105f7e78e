//! Traced viewport widget for egui

use egui::{Response, Sense, Ui, Vec2};

use crate::camera::{Camera, CameraUniform, MoveInput};
use crate::render::gpu::SphereTraceCompute;
use crate::scene::Scene;
use crate::trace::ShadeMode;

use super::camera::FlyCamera;

/// Viewport state
pub struct Viewport {
    pub camera: FlyCamera,
    pub shade_mode: ShadeMode,
    tracer: Option<SphereTraceCompute>,
    texture_id: Option<egui::TextureId>,
    render_texture: Option<RenderTexture>,
    /// Scene waiting for a GPU upload on the next frame
    pending_scene: Option<Scene>,
    /// Camera to return to on Home
    home: Camera,
    warned_degenerate: bool,
}

struct RenderTexture {
    #[allow(dead_code)]
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: (u32, u32),
}

impl Viewport {
    pub fn new() -> Self {
        Self {
            camera: FlyCamera::default(),
            shade_mode: ShadeMode::Scatter,
            tracer: None,
            texture_id: None,
            render_texture: None,
            pending_scene: None,
            home: Camera::demo(),
            warned_degenerate: false,
        }
    }

    /// Replace the traced scene and jump the camera to its framing.
    ///
    /// The GPU upload happens on the next `show` once a device exists.
    pub fn set_scene(&mut self, scene: Scene, camera: Camera) {
        self.home = camera;
        self.camera.set_camera(camera);
        self.pending_scene = Some(scene);
    }

    /// Return the camera to the scene's framing
    pub fn reset_camera(&mut self) {
        self.camera.set_camera(self.home);
    }

    /// Number of spheres in the uploaded scene
    pub fn sphere_count(&self) -> u32 {
        self.tracer.as_ref().map(|t| t.sphere_count()).unwrap_or(0)
    }

    /// Current traced resolution (width, height)
    pub fn render_size(&self) -> Option<(u32, u32)> {
        self.render_texture.as_ref().map(|rt| rt.size)
    }

    /// Show viewport UI and handle input
    pub fn show(&mut self, ui: &mut Ui, wgpu_render_state: Option<&egui_wgpu::RenderState>) -> Response {
        let _span = tracing::info_span!("viewport_show").entered();
        let available = ui.available_size();
        let size = Vec2::new(available.x.max(64.0), available.y.max(64.0));

        // Allocate space for the viewport
        let (rect, response) = ui.allocate_exact_size(size, Sense::click_and_drag());

        // Handle camera input
        self.handle_input(ui, &response);

        // Update camera
        self.camera.update(ui.input(|i| i.stable_dt));

        // Trace into a texture if we have a render state
        if let Some(render_state) = wgpu_render_state {
            let width = size.x as u32;
            let height = size.y as u32;

            if width > 0 && height > 0 {
                let device = &render_state.device;

                // Lazy-init the tracer on the first frame with a device
                if self.tracer.is_none() {
                    self.tracer = Some(SphereTraceCompute::new(
                        device,
                        width,
                        height,
                        render_state.target_format,
                    ));
                }

                if let Some(tracer) = &mut self.tracer {
                    if let Some(scene) = self.pending_scene.take() {
                        if let Err(e) = tracer.upload_scene(device, &scene) {
                            log::error!("Scene upload failed: {}", e);
                        }
                    }

                    // Follows the panel size; restarts the jitter sequence
                    tracer.resize(device, width, height);

                    // Re-derive the ray basis every frame. A degenerate
                    // camera keeps the previous uniform so the last good
                    // frame stays up instead of going black.
                    match self.camera.camera.basis(width, height) {
                        Ok(basis) => {
                            let uniform = CameraUniform::new(
                                &basis,
                                tracer.sphere_count(),
                                self.shade_mode.wire(),
                                tracer.frame_count,
                            );
                            tracer.update_camera(&render_state.queue, &uniform);
                            self.warned_degenerate = false;
                        }
                        Err(e) => {
                            if !self.warned_degenerate {
                                log::warn!("Camera basis unusable, holding last view: {}", e);
                                self.warned_degenerate = true;
                            }
                        }
                    }
                }

                // Ensure render texture exists and is correct size
                self.ensure_render_texture(render_state, width, height);

                if let (Some(tracer), Some(rt)) = (&mut self.tracer, &self.render_texture) {
                    let mut encoder =
                        device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                            label: Some("viewport_encoder"),
                        });
                    if tracer.dispatch(&mut encoder) {
                        tracer.blit(&mut encoder, &rt.view);
                    }
                    render_state.queue.submit(Some(encoder.finish()));
                }

                // Draw the traced texture
                if let Some(tex_id) = self.texture_id {
                    ui.painter().image(
                        tex_id,
                        rect,
                        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                        egui::Color32::WHITE,
                    );
                }
            }
        } else {
            // No render state - draw placeholder
            ui.painter().rect_filled(rect, 0.0, egui::Color32::from_rgb(30, 30, 35));
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "Initializing...",
                egui::FontId::default(),
                egui::Color32::GRAY,
            );
        }

        response
    }

    fn ensure_render_texture(&mut self, render_state: &egui_wgpu::RenderState, width: u32, height: u32) {
        let needs_recreate = match &self.render_texture {
            Some(rt) => rt.size != (width, height),
            None => true,
        };

        if !needs_recreate {
            return;
        }

        let device = &render_state.device;
        let format = render_state.target_format;

        // Create new render texture
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("viewport_render_texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Register with egui
        let tex_id = render_state.renderer.write().register_native_texture(
            device,
            &view,
            wgpu::FilterMode::Linear,
        );

        // Unregister old texture
        if let Some(old_id) = self.texture_id.take() {
            render_state.renderer.write().free_texture(&old_id);
        }

        self.texture_id = Some(tex_id);
        self.render_texture = Some(RenderTexture {
            texture,
            view,
            size: (width, height),
        });
    }

    fn handle_input(&mut self, ui: &Ui, response: &Response) {
        let input = ui.input(|i| i.clone());

        // Translation keys only apply while the pointer is over the
        // viewport, so typing in panels does not fly the camera
        if response.hovered() {
            self.camera.controller.input = MoveInput {
                forward: input.key_down(egui::Key::W),
                backward: input.key_down(egui::Key::S),
                left: input.key_down(egui::Key::A),
                right: input.key_down(egui::Key::D),
                up: input.key_down(egui::Key::E),
                down: input.key_down(egui::Key::Q),
            };
        } else {
            self.camera.controller.input = MoveInput::default();
        }

        // Look with left or right mouse drag
        if response.dragged_by(egui::PointerButton::Primary)
            || response.dragged_by(egui::PointerButton::Secondary)
        {
            let delta = response.drag_delta();
            self.camera.look(delta.x, delta.y);
        }

        // Scroll adjusts fly speed
        if response.hovered() {
            let scroll = input.raw_scroll_delta.y;
            if scroll.abs() > 0.0 {
                self.camera.scale_speed(1.0 + scroll * 0.001);
            }
        }

        // Reset camera with Home key
        if response.has_focus() && input.key_pressed(egui::Key::Home) {
            self.reset_camera();
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}
