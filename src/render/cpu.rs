//! CPU rendering: the kernel over every pixel, rows in parallel.

use std::path::Path;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::camera::CameraBasis;
use crate::scene::Scene;
use crate::trace::{self, ShadeMode};
use crate::util::{Error, Result, Vec3};

/// Finished frame: tightly packed RGBA8 rows, top-left origin.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Frame {
    /// RGBA bytes of pixel `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = 4 * (y as usize * self.width as usize + x as usize);
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Write the frame as a PNG file.
    pub fn save_png(&self, path: &Path) -> Result<()> {
        let image = image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .ok_or(Error::BufferSizeMismatch {
                expected: self.width as usize * self.height as usize * 4,
                actual: self.pixels.len(),
            })?;
        image.save(path)?;
        Ok(())
    }
}

/// Map a linear kernel color to RGBA8. Scatter output gets gamma 2 (the
/// sqrt) before quantization; normals are stored linearly so the exactness
/// tests see untouched values.
fn encode(color: Vec3, mode: ShadeMode) -> [u8; 4] {
    let c = match mode {
        ShadeMode::Normals => color,
        ShadeMode::Scatter => Vec3::new(
            color.x.max(0.0).sqrt(),
            color.y.max(0.0).sqrt(),
            color.z.max(0.0).sqrt(),
        ),
    };
    let c = c.clamp(Vec3::ZERO, Vec3::ONE);
    [
        (255.999 * c.x) as u8,
        (255.999 * c.y) as u8,
        (255.999 * c.z) as u8,
        255,
    ]
}

/// Render a full frame, one rayon task per pixel row.
pub fn render(scene: &Scene, basis: &CameraBasis, mode: ShadeMode) -> Frame {
    render_with(scene, basis, mode, |_| {})
}

/// Render with a per-row completion callback (drives progress reporting).
pub fn render_with<F>(scene: &Scene, basis: &CameraBasis, mode: ShadeMode, on_row: F) -> Frame
where
    F: Fn(u32) + Sync,
{
    let _span = tracing::info_span!(
        "cpu_render",
        width = basis.width,
        height = basis.height,
        spheres = scene.len(),
        mode = %mode,
    )
    .entered();

    let width = basis.width;
    let height = basis.height;
    let row_bytes = width as usize * 4;
    let mut pixels = vec![0u8; row_bytes * height as usize];

    pixels
        .par_chunks_mut(row_bytes)
        .enumerate()
        .for_each(|(py, row)| {
            let py = py as u32;
            // Seed per row so frames are reproducible regardless of how
            // rayon schedules the rows.
            let mut rng = SmallRng::seed_from_u64(0x5111_CA00 ^ u64::from(py));
            for px in 0..width {
                let color = trace::shade_pixel(px, py, basis, scene, mode, &mut rng);
                let i = px as usize * 4;
                row[i..i + 4].copy_from_slice(&encode(color, mode));
            }
            on_row(py);
        });

    Frame {
        width,
        height,
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::scene::{Material, Sphere};
    use crate::trace::sky_color;

    fn square_camera() -> Camera {
        Camera {
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            defocus_angle: 0.0,
            focus_distance: 1.0,
        }
    }

    #[test]
    fn test_frame_dimensions_and_alpha() {
        let scene = Scene::demo();
        let basis = square_camera().basis(16, 9).unwrap();
        let frame = render(&scene, &basis, ShadeMode::Normals);
        assert_eq!(frame.width, 16);
        assert_eq!(frame.height, 9);
        assert_eq!(frame.pixels.len(), 16 * 9 * 4);
        assert!(frame.pixels.iter().skip(3).step_by(4).all(|&a| a == 255));
    }

    #[test]
    fn test_corners_of_empty_view_are_sky() {
        // One sphere far behind the camera; every pixel shows sky.
        let scene = Scene::new(vec![Sphere::new(
            Vec3::new(0.0, 0.0, 50.0),
            0.5,
            Material::diffuse(Vec3::splat(0.5)),
        )])
        .unwrap();
        let basis = square_camera().basis(4, 4).unwrap();
        let frame = render(&scene, &basis, ShadeMode::Normals);

        for (px, py) in [(0, 0), (3, 0), (0, 3), (3, 3)] {
            let expected = encode(
                sky_color(basis.pixel_center(px, py) - basis.center),
                ShadeMode::Normals,
            );
            assert_eq!(frame.pixel(px, py), expected, "pixel ({px}, {py})");
        }
        // Top rows look upward, so they sit closer to the blue end than
        // the bottom rows.
        assert!(frame.pixel(0, 0)[0] < frame.pixel(0, 3)[0]);
    }

    #[test]
    fn test_render_is_deterministic() {
        let scene = Scene::demo();
        let basis = Camera::demo().basis(32, 18).unwrap();
        let a = render(&scene, &basis, ShadeMode::Scatter);
        let b = render(&scene, &basis, ShadeMode::Scatter);
        assert_eq!(a.pixels, b.pixels);
    }

    #[test]
    fn test_row_callback_sees_every_row() {
        use std::sync::atomic::{AtomicU32, Ordering};
        let scene = Scene::demo();
        let basis = square_camera().basis(8, 6).unwrap();
        let rows = AtomicU32::new(0);
        render_with(&scene, &basis, ShadeMode::Normals, |_| {
            rows.fetch_add(1, Ordering::Relaxed);
        });
        assert_eq!(rows.load(Ordering::Relaxed), 6);
    }

    #[test]
    fn test_save_png_round_trip() {
        let scene = Scene::demo();
        let basis = Camera::demo().basis(8, 8).unwrap();
        let frame = render(&scene, &basis, ShadeMode::Normals);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        frame.save_png(&path).unwrap();

        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded.dimensions(), (8, 8));
        assert_eq!(loaded.as_raw(), &frame.pixels);
    }
}
