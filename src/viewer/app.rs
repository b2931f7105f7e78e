//! Main application state and UI

use std::path::PathBuf;

use egui::{CentralPanel, RichText, SidePanel, TopBottomPanel};

use crate::scene::{builtin_scene, load_scene};
use crate::trace::ShadeMode;

use super::settings::Settings;
use super::viewport::Viewport;

/// Seed for the built-in cover scene; fixed so reopening it shows the
/// same layout.
const COVER_SEED: u64 = 0;

/// Main viewer application
pub struct ViewerApp {
    viewport: Viewport,
    settings: Settings,

    // Scene state
    current_scene: Option<PathBuf>,
    pending_scene: Option<PathBuf>,

    // UI state
    status_message: String,

    _trace_guard: Option<tracing_chrome::FlushGuard>,
}

impl ViewerApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        initial_file: Option<PathBuf>,
        trace_guard: Option<tracing_chrome::FlushGuard>,
    ) -> Self {
        let settings = Settings::load();

        // Use last scene if no initial file provided
        let pending = initial_file.or_else(|| settings.last_scene.clone());

        let mut viewport = Viewport::new();
        viewport.camera.controller.move_speed = settings.move_speed;
        viewport.camera.controller.mouse_sensitivity = settings.mouse_sensitivity;
        viewport.shade_mode = settings.shade_mode;

        let mut app = Self {
            viewport,
            settings,
            current_scene: None,
            pending_scene: pending,
            status_message: "Ready".into(),
            _trace_guard: trace_guard,
        };

        // Something on screen from the first frame
        if app.pending_scene.is_none() {
            app.load_builtin("demo");
        }
        app
    }

    fn menu_bar(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        // Collect recent scenes to avoid borrow issues
        let recent: Vec<PathBuf> = self.settings.recent_scenes().into_iter().cloned().collect();

        egui::MenuBar::new().ui(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Open...").clicked() {
                    self.open_scene_dialog();
                    ui.close();
                }

                // Recent scenes submenu
                if !recent.is_empty() {
                    ui.menu_button("Recent", |ui| {
                        for path in &recent {
                            let name = path.file_name()
                                .map(|n| n.to_string_lossy().to_string())
                                .unwrap_or_else(|| path.display().to_string());
                            if ui.button(&name).clicked() {
                                self.pending_scene = Some(path.clone());
                                ui.close();
                            }
                        }
                        ui.separator();
                        if ui.button("Clear Recent").clicked() {
                            self.settings.recent_scenes.clear();
                            self.settings.save();
                            ui.close();
                        }
                    });
                }

                ui.separator();
                if ui.button("Demo Scene").clicked() {
                    self.load_builtin("demo");
                    ui.close();
                }
                if ui.button("Cover Scene").clicked() {
                    self.load_builtin("cover");
                    ui.close();
                }

                ui.separator();
                if ui.button("Exit").clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("View", |ui| {
                let before = self.viewport.shade_mode;
                ui.radio_value(&mut self.viewport.shade_mode, ShadeMode::Normals, "Normals");
                ui.radio_value(&mut self.viewport.shade_mode, ShadeMode::Scatter, "Scatter");
                if self.viewport.shade_mode != before {
                    self.settings.shade_mode = self.viewport.shade_mode;
                    self.settings.save();
                }
                ui.separator();
                if ui.button("Reset Camera").clicked() {
                    self.viewport.reset_camera();
                    ui.close();
                }
            });

            ui.menu_button("Help", |ui| {
                if ui.button("About").clicked() {
                    self.status_message = "silica v0.1.0".into();
                    ui.close();
                }
            });
        });
    }

    fn side_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Scene");
        ui.separator();

        // Scene info
        if let Some(path) = &self.current_scene {
            ui.label(format!("File: {}", path.file_name().unwrap_or_default().to_string_lossy()));
        } else {
            ui.label("Built-in scene");
        }

        ui.separator();

        // Stats
        ui.label(RichText::new("Statistics").strong());
        ui.label(format!("Spheres: {}", self.viewport.sphere_count()));
        if let Some((w, h)) = self.viewport.render_size() {
            ui.label(format!("Resolution: {}x{}", w, h));
        }

        ui.separator();

        // Camera info
        ui.label(RichText::new("Camera").strong());
        let pos = self.viewport.camera.position();
        ui.label(format!("Position: ({:.2}, {:.2}, {:.2})", pos.x, pos.y, pos.z));
        let (yaw, pitch) = self.viewport.camera.angles();
        ui.label(format!("Yaw: {:.1}\u{00b0}  Pitch: {:.1}\u{00b0}", yaw, pitch));

        ui.separator();

        // Controls
        ui.label(RichText::new("Controls").strong());
        let mut changed = false;

        // Scroll wheel also edits the speed, keep the slider in sync
        self.settings.move_speed = self.viewport.camera.controller.move_speed;
        ui.horizontal(|ui| {
            ui.label("Speed:");
            if ui
                .add(egui::Slider::new(&mut self.settings.move_speed, 0.1..=20.0).logarithmic(true))
                .changed()
            {
                self.viewport.camera.controller.move_speed = self.settings.move_speed;
                changed = true;
            }
        });
        ui.horizontal(|ui| {
            ui.label("Look:");
            if ui
                .add(
                    egui::Slider::new(&mut self.settings.mouse_sensitivity, 0.001..=0.02)
                        .fixed_decimals(3),
                )
                .changed()
            {
                self.viewport.camera.controller.mouse_sensitivity = self.settings.mouse_sensitivity;
                changed = true;
            }
        });

        ui.separator();

        // Shading
        ui.label(RichText::new("Shading").strong());
        let before = self.viewport.shade_mode;
        ui.radio_value(&mut self.viewport.shade_mode, ShadeMode::Normals, "Normals");
        ui.radio_value(&mut self.viewport.shade_mode, ShadeMode::Scatter, "Scatter");
        if self.viewport.shade_mode != before {
            self.settings.shade_mode = self.viewport.shade_mode;
            changed = true;
        }

        if changed {
            self.settings.save();
        }

        ui.separator();

        ui.label(RichText::new("Keys").strong());
        ui.label("WASD move, E/Q up/down");
        ui.label("Drag to look, scroll for speed");
        ui.label("H resets the camera");
    }

    fn status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(&self.status_message);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("FPS: {:.0}", ui.ctx().input(|i| 1.0 / i.stable_dt)));
            });
        });
    }

    fn open_scene_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Scene", &["json"])
            .pick_file()
        {
            self.load_file(path);
        }
    }

    fn load_builtin(&mut self, name: &str) {
        if let Some((scene, camera)) = builtin_scene(name, COVER_SEED) {
            let count = scene.len();
            self.viewport.set_scene(scene, camera);
            self.current_scene = None;
            self.status_message = format!("Loaded {} scene: {} spheres", name, count);
        }
    }

    fn load_file(&mut self, path: PathBuf) {
        self.status_message = format!("Loading: {}", path.display());

        match load_scene(&path) {
            Ok((scene, camera)) => {
                let count = scene.len();
                self.viewport.set_scene(scene, camera);
                self.current_scene = Some(path.clone());

                // Add to recent scenes
                self.settings.add_recent(path);
                self.settings.save();

                self.status_message = format!("Loaded: {} spheres", count);
            }
            Err(e) => {
                self.status_message = format!("Error: {}", e);
            }
        }
    }
}

impl eframe::App for ViewerApp {
    fn on_exit(&mut self) {
        // Persist camera feel (scroll wheel edits it outside the sliders)
        self.settings.move_speed = self.viewport.camera.controller.move_speed;
        self.settings.save();
    }

    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        let _span = tracing::info_span!("viewer_update").entered();

        // Escape - close app
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        // H = Home camera (reset to scene framing)
        if ctx.input(|i| i.key_pressed(egui::Key::H)) {
            self.viewport.reset_camera();
            self.status_message = "Camera reset".into();
        }

        // Load pending scene (from CLI argument or recent)
        if let Some(path) = self.pending_scene.take() {
            self.load_file(path);
        }

        // Top menu bar
        TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            self.menu_bar(ctx, ui);
        });

        // Bottom status bar
        TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.status_bar(ui);
        });

        // Right side panel
        SidePanel::right("side_panel")
            .default_width(200.0)
            .min_width(150.0)
            .max_width(400.0)
            .resizable(true)
            .show(ctx, |ui| {
                self.side_panel(ui);
            });

        // Central viewport
        CentralPanel::default().show(ctx, |ui| {
            let render_state = frame.wgpu_render_state();
            self.viewport.show(ui, render_state);
        });

        // Track window size for saving on exit
        ctx.input(|i| {
            if let Some(rect) = i.viewport().inner_rect {
                self.settings.window_width = rect.width();
                self.settings.window_height = rect.height();
            }
        });

        // The kernel re-jitters every frame, so keep painting
        ctx.request_repaint();
    }
}
