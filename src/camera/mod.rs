//! Camera model.
//!
//! [`Camera`] holds only the user-facing parameters. Everything ray
//! generation needs is derived on demand by [`Camera::basis`] into a
//! [`CameraBasis`], which must be re-derived whenever a parameter or the
//! viewport size changes. [`CameraUniform`] mirrors the basis for GPU
//! upload.

mod controller;

pub use controller::{CameraController, MoveInput};

use bytemuck::{Pod, Zeroable};
use rand::Rng;

use crate::util::{self, Error, Result, Vec3};

/// Smallest squared length accepted for the up x view cross product before
/// the basis is declared degenerate.
const DEGENERATE_EPS: f32 = 1e-8;

/// User-facing camera parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Eye position.
    pub look_from: Vec3,
    /// Point the camera looks at.
    pub look_at: Vec3,
    /// World-space up hint; must not be parallel to the view direction.
    pub vup: Vec3,
    /// Vertical field of view in degrees, in (0, 180).
    pub vfov: f32,
    /// Aperture cone angle in degrees; 0 disables depth-of-field blur.
    pub defocus_angle: f32,
    /// Distance from the eye to the plane of perfect focus.
    pub focus_distance: f32,
}

impl Default for Camera {
    /// Framing for the book-cover scene: high and off-axis, narrow field
    /// of view, mild depth of field focused on the landmark spheres.
    fn default() -> Self {
        Self {
            look_from: Vec3::new(13.0, 2.0, 3.0),
            look_at: Vec3::ZERO,
            vup: Vec3::Y,
            vfov: 20.0,
            defocus_angle: 0.6,
            focus_distance: 10.0,
        }
    }
}

impl Camera {
    /// Framing for the five-sphere demo scene.
    pub fn demo() -> Self {
        Self {
            look_from: Vec3::new(-2.0, 2.0, 1.0),
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 20.0,
            defocus_angle: 0.0,
            focus_distance: 3.4,
        }
    }

    /// Derive the ray-generation basis for a `width` x `height` viewport.
    ///
    /// Fails with [`Error::DegenerateCameraBasis`] when the inputs cannot
    /// produce a usable orthonormal frame: up parallel to the view
    /// direction, eye on top of the target, non-finite or out-of-range
    /// parameters, or an empty viewport.
    pub fn basis(&self, width: u32, height: u32) -> Result<CameraBasis> {
        if width == 0 || height == 0 {
            return Err(Error::DegenerateCameraBasis);
        }
        if !self.look_from.is_finite() || !self.look_at.is_finite() || !self.vup.is_finite() {
            return Err(Error::DegenerateCameraBasis);
        }
        if !self.vfov.is_finite() || self.vfov <= 0.0 || self.vfov >= 180.0 {
            return Err(Error::DegenerateCameraBasis);
        }
        if !self.focus_distance.is_finite() || self.focus_distance <= 0.0 {
            return Err(Error::DegenerateCameraBasis);
        }

        let view = self.look_from - self.look_at;
        if view.length_squared() < DEGENERATE_EPS {
            return Err(Error::DegenerateCameraBasis);
        }
        let w = view.normalize();
        let cross = self.vup.cross(w);
        if cross.length_squared() < DEGENERATE_EPS {
            return Err(Error::DegenerateCameraBasis);
        }
        let u = cross.normalize();
        let v = w.cross(u);

        let aspect = width as f32 / height as f32;
        let half_height = (self.vfov.to_radians() / 2.0).tan();
        let viewport_height = 2.0 * half_height * self.focus_distance;
        let viewport_width = viewport_height * aspect;

        // viewport_v points down so pixel rows run top to bottom.
        let viewport_u = viewport_width * u;
        let viewport_v = -viewport_height * v;
        let pixel_delta_u = viewport_u / width as f32;
        let pixel_delta_v = viewport_v / height as f32;

        let viewport_upper_left =
            self.look_from - self.focus_distance * w - viewport_u / 2.0 - viewport_v / 2.0;
        let pixel00 = viewport_upper_left + 0.5 * (pixel_delta_u + pixel_delta_v);

        let defocus_radius = self.focus_distance * (self.defocus_angle.to_radians() / 2.0).tan();

        Ok(CameraBasis {
            center: self.look_from,
            u,
            v,
            w,
            pixel00,
            pixel_delta_u,
            pixel_delta_v,
            defocus_disk_u: defocus_radius * u,
            defocus_disk_v: defocus_radius * v,
            defocus_angle: self.defocus_angle,
            width,
            height,
        })
    }
}

/// Ray-generation data derived from a [`Camera`] for one viewport size.
///
/// `u`, `v`, `w` form a right-handed orthonormal frame with `w` pointing
/// opposite the view direction. Pixel (0, 0) is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBasis {
    pub center: Vec3,
    pub u: Vec3,
    pub v: Vec3,
    pub w: Vec3,
    /// Center of the top-left pixel on the viewport plane.
    pub pixel00: Vec3,
    pub pixel_delta_u: Vec3,
    pub pixel_delta_v: Vec3,
    pub defocus_disk_u: Vec3,
    pub defocus_disk_v: Vec3,
    /// Aperture cone angle in degrees (kept for the zero test).
    pub defocus_angle: f32,
    pub width: u32,
    pub height: u32,
}

impl CameraBasis {
    /// World-space center of pixel (px, py).
    #[inline]
    pub fn pixel_center(&self, px: u32, py: u32) -> Vec3 {
        self.pixel00 + px as f32 * self.pixel_delta_u + py as f32 * self.pixel_delta_v
    }

    /// Whether ray origins should be jittered across the aperture.
    #[inline]
    pub fn has_defocus(&self) -> bool {
        self.defocus_angle > 0.0
    }

    /// Ray origin sampled on the defocus disk.
    pub fn defocus_origin<R: Rng>(&self, rng: &mut R) -> Vec3 {
        let p = util::random_in_unit_disk(rng);
        self.center + p.x * self.defocus_disk_u + p.y * self.defocus_disk_v
    }
}

/// Camera state for GPU upload (96 bytes, matches the WGSL `Camera` struct).
///
/// Each `vec3` is paired with a scalar lane so every row is 16 bytes; the
/// spare lanes carry the scene and dispatch scalars.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub center: [f32; 3],
    pub sphere_count: u32,
    pub pixel00: [f32; 3],
    pub mode: u32,
    pub pixel_delta_u: [f32; 3],
    pub frame_index: u32,
    pub pixel_delta_v: [f32; 3],
    pub _pad0: u32,
    pub defocus_disk_u: [f32; 3],
    pub defocus_angle: f32,
    pub defocus_disk_v: [f32; 3],
    pub _pad1: u32,
}

const _: () = assert!(std::mem::size_of::<CameraUniform>() == 96);

impl CameraUniform {
    /// Build the uniform from a derived basis. `mode` is the shading mode
    /// wire value consumed by the kernel.
    pub fn new(basis: &CameraBasis, sphere_count: u32, mode: u32, frame_index: u32) -> Self {
        Self {
            center: basis.center.to_array(),
            sphere_count,
            pixel00: basis.pixel00.to_array(),
            mode,
            pixel_delta_u: basis.pixel_delta_u.to_array(),
            frame_index,
            pixel_delta_v: basis.pixel_delta_v.to_array(),
            _pad0: 0,
            defocus_disk_u: basis.defocus_disk_u.to_array(),
            defocus_angle: basis.defocus_angle,
            defocus_disk_v: basis.defocus_disk_v.to_array(),
            _pad1: 0,
        }
    }
}
