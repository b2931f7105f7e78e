//! Fly-camera controller: WASD translation plus yaw/pitch mouse look.

use crate::util::Vec3;

use super::Camera;

/// Pitch stops just short of the poles so the look direction never becomes
/// parallel to the world up and the basis stays well-formed.
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 1e-3;

/// Which translation keys are currently held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl MoveInput {
    pub fn any(&self) -> bool {
        self.forward || self.backward || self.left || self.right || self.up || self.down
    }
}

/// Accumulates input into a camera's position and orientation.
///
/// Orientation is yaw/pitch only (no roll). Translation moves `look_from`
/// and `look_at` together, so movement alone never changes the view
/// direction.
#[derive(Debug, Clone)]
pub struct CameraController {
    pub input: MoveInput,
    /// Units per second.
    pub move_speed: f32,
    /// Radians per pixel of pointer drag.
    pub mouse_sensitivity: f32,
    yaw: f32,
    pitch: f32,
}

impl CameraController {
    /// Controller aligned with an existing camera's orientation.
    pub fn from_camera(camera: &Camera, move_speed: f32, mouse_sensitivity: f32) -> Self {
        let dir = (camera.look_at - camera.look_from).normalize_or_zero();
        Self {
            input: MoveInput::default(),
            move_speed,
            mouse_sensitivity,
            yaw: dir.z.atan2(dir.x),
            pitch: dir.y.clamp(-1.0, 1.0).asin().clamp(-PITCH_LIMIT, PITCH_LIMIT),
        }
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Apply a pointer drag delta in pixels. Dragging right turns right,
    /// dragging down pitches down; pitch is clamped at the poles.
    pub fn look(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.mouse_sensitivity;
        self.pitch = (self.pitch - dy * self.mouse_sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Unit view direction for the current yaw/pitch.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.pitch.cos() * self.yaw.cos(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.sin(),
        )
    }

    /// Advance `camera` by one frame: translate along the held directions
    /// and point it down the controller's current orientation.
    pub fn update(&self, camera: &mut Camera, dt: f32) {
        let forward = self.forward();
        let right = forward.cross(Vec3::Y).normalize_or_zero();

        let mut delta = Vec3::ZERO;
        if self.input.forward {
            delta += forward;
        }
        if self.input.backward {
            delta -= forward;
        }
        if self.input.right {
            delta += right;
        }
        if self.input.left {
            delta -= right;
        }
        if self.input.up {
            delta += Vec3::Y;
        }
        if self.input.down {
            delta -= Vec3::Y;
        }
        // Normalize so diagonal movement is not faster.
        if delta != Vec3::ZERO {
            camera.look_from += delta.normalize() * self.move_speed * dt;
        }
        camera.look_at = camera.look_from + forward;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level_camera() -> Camera {
        Camera {
            look_from: Vec3::ZERO,
            look_at: Vec3::new(1.0, 0.0, 0.0),
            ..Camera::default()
        }
    }

    #[test]
    fn test_from_camera_recovers_orientation() {
        let controller = CameraController::from_camera(&level_camera(), 1.0, 0.01);
        assert!(controller.yaw().abs() < 1e-6);
        assert!(controller.pitch().abs() < 1e-6);

        let down_z = Camera {
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            ..Camera::default()
        };
        let controller = CameraController::from_camera(&down_z, 1.0, 0.01);
        assert!((controller.forward() - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_pitch_clamps_at_poles() {
        let mut controller = CameraController::from_camera(&level_camera(), 1.0, 0.01);
        controller.look(0.0, -1e6); // drag up, way past the pole
        assert!(controller.pitch() <= PITCH_LIMIT);
        controller.look(0.0, 1e6);
        assert!(controller.pitch() >= -PITCH_LIMIT);
        // The forward vector stays usable against the world up even at the
        // clamp limit.
        let cross = controller.forward().cross(Vec3::Y);
        assert!(cross.length_squared() > 1e-8);
    }

    #[test]
    fn test_translation_keeps_view_direction() {
        let mut camera = level_camera();
        let w_before = camera.basis(64, 64).unwrap().w;

        let mut controller = CameraController::from_camera(&camera, 2.0, 0.01);
        controller.input.forward = true;
        controller.input.right = true;
        for _ in 0..10 {
            controller.update(&mut camera, 0.016);
        }

        let basis = camera.basis(64, 64).unwrap();
        assert!((basis.w - w_before).length() < 1e-5);
        assert!(camera.look_from.length() > 0.0);
    }

    #[test]
    fn test_look_then_update_repoints_camera() {
        let mut camera = level_camera();
        let mut controller = CameraController::from_camera(&camera, 1.0, 0.01);
        controller.look(50.0, 0.0); // 0.5 rad right
        controller.update(&mut camera, 0.0);
        let dir = (camera.look_at - camera.look_from).normalize();
        assert!((dir - controller.forward()).length() < 1e-6);
        assert!((controller.yaw() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_opposed_keys_cancel() {
        let mut camera = level_camera();
        let before = camera.look_from;
        let mut controller = CameraController::from_camera(&camera, 5.0, 0.01);
        controller.input.forward = true;
        controller.input.backward = true;
        controller.update(&mut camera, 0.016);
        assert_eq!(camera.look_from, before);
    }
}
