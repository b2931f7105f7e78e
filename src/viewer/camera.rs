//! Free-fly camera for the viewport

use crate::camera::{Camera, CameraController};
use crate::util::Vec3;

/// First-person camera rig: WASD translation plus mouse look.
///
/// Wraps a [`Camera`] and the [`CameraController`] that drives it. The
/// viewport feeds pointer and key state into the controller each frame;
/// the camera itself stays a plain parameter block that can be handed to
/// ray generation at any time.
pub struct FlyCamera {
    pub camera: Camera,
    pub controller: CameraController,
}

impl FlyCamera {
    pub fn new(camera: Camera, move_speed: f32, mouse_sensitivity: f32) -> Self {
        let controller = CameraController::from_camera(&camera, move_speed, mouse_sensitivity);
        Self { camera, controller }
    }

    /// Apply a pointer drag delta in pixels (drag)
    pub fn look(&mut self, delta_x: f32, delta_y: f32) {
        self.controller.look(delta_x, delta_y);
    }

    /// Update camera (call each frame)
    pub fn update(&mut self, dt: f32) {
        self.controller.update(&mut self.camera, dt);
    }

    /// Jump to a new camera, re-aligning the controller's orientation
    pub fn set_camera(&mut self, camera: Camera) {
        self.controller = CameraController::from_camera(
            &camera,
            self.controller.move_speed,
            self.controller.mouse_sensitivity,
        );
        self.camera = camera;
    }

    /// Scale fly speed (scroll), clamped to a usable range
    pub fn scale_speed(&mut self, factor: f32) {
        self.controller.move_speed = (self.controller.move_speed * factor).clamp(0.1, 100.0);
    }

    /// Get camera position
    pub fn position(&self) -> Vec3 {
        self.camera.look_from
    }

    /// Get yaw and pitch angles in degrees
    pub fn angles(&self) -> (f32, f32) {
        (
            self.controller.yaw().to_degrees(),
            self.controller.pitch().to_degrees(),
        )
    }
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self::new(Camera::demo(), 2.5, 0.005)
    }
}
