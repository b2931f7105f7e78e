//! Ray intersection and shading kernel.
//!
//! Everything here is pure: one invocation reads an immutable [`Scene`]
//! and [`CameraBasis`] and produces one color. Backends exploit that by
//! running invocations in parallel (rayon rows on the CPU, one compute
//! thread per pixel on the GPU); `trace.wgsl` mirrors this module
//! operation for operation.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::camera::CameraBasis;
use crate::scene::{Material, MaterialKind, Scene, Sphere};
use crate::util::{self, Vec3};

/// Smallest accepted hit parameter. Keeps scattered rays from re-hitting
/// the surface they started on.
pub const T_MIN: f32 = 1e-3;

const SKY_WHITE: Vec3 = Vec3::ONE;
const SKY_BLUE: Vec3 = Vec3::new(0.5, 0.7, 1.0);

/// Ray with origin and (not necessarily unit) direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Point at parameter `t` along the ray.
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + t * self.direction
    }
}

/// A successful intersection.
///
/// `normal` is unit length and always opposes the incoming ray;
/// `front_face` records whether the outside of the sphere was hit.
#[derive(Debug, Clone, Copy)]
pub struct HitRecord {
    pub point: Vec3,
    pub normal: Vec3,
    pub t: f32,
    pub front_face: bool,
    pub material: Material,
}

/// Intersect one sphere over the open interval `(t_min, t_max)`.
///
/// Uses the half-b form of the quadratic and prefers the nearer root so
/// the returned hit is the first surface crossed.
pub fn hit_sphere(sphere: &Sphere, ray: &Ray, t_min: f32, t_max: f32) -> Option<HitRecord> {
    let oc = ray.origin - sphere.center;
    let a = ray.direction.length_squared();
    let half_b = oc.dot(ray.direction);
    let c = oc.length_squared() - sphere.radius * sphere.radius;

    let discriminant = half_b * half_b - a * c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrtd = discriminant.sqrt();

    let mut root = (-half_b - sqrtd) / a;
    if root <= t_min || root >= t_max {
        root = (-half_b + sqrtd) / a;
        if root <= t_min || root >= t_max {
            return None;
        }
    }

    let point = ray.at(root);
    let outward = (point - sphere.center) / sphere.radius;
    let front_face = ray.direction.dot(outward) < 0.0;
    Some(HitRecord {
        point,
        normal: if front_face { outward } else { -outward },
        t: root,
        front_face,
        material: sphere.material,
    })
}

/// Closest hit across the whole scene, scanning spheres in order.
pub fn hit_scene(scene: &Scene, ray: &Ray, t_min: f32, t_max: f32) -> Option<HitRecord> {
    let mut closest_so_far = t_max;
    let mut hit = None;
    for sphere in scene.spheres() {
        if let Some(record) = hit_sphere(sphere, ray, t_min, closest_so_far) {
            closest_so_far = record.t;
            hit = Some(record);
        }
    }
    hit
}

/// Background gradient for a ray that escapes the scene: white at the
/// horizon blending to sky blue straight up.
pub fn sky_color(direction: Vec3) -> Vec3 {
    let unit = direction.normalize();
    let t = 0.5 * (unit.y + 1.0);
    SKY_WHITE.lerp(SKY_BLUE, t)
}

/// How hits turn into colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadeMode {
    /// Surface-normal visualization. Fully deterministic; the baseline
    /// the exactness tests pin down.
    #[default]
    Normals,
    /// Single-bounce material response: the scattered ray's sky color
    /// tinted by the material.
    Scatter,
}

impl ShadeMode {
    /// Wire value consumed by the GPU kernel.
    pub fn wire(self) -> u32 {
        match self {
            Self::Normals => 0,
            Self::Scatter => 1,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "normals" => Some(Self::Normals),
            "scatter" => Some(Self::Scatter),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Normals => "normals",
            Self::Scatter => "scatter",
        }
    }
}

impl std::fmt::Display for ShadeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Color for one camera ray.
pub fn ray_color<R: Rng>(ray: &Ray, scene: &Scene, mode: ShadeMode, rng: &mut R) -> Vec3 {
    let Some(record) = hit_scene(scene, ray, T_MIN, f32::MAX) else {
        return sky_color(ray.direction);
    };
    match mode {
        ShadeMode::Normals => 0.5 * (record.normal + Vec3::ONE),
        ShadeMode::Scatter => scatter_color(ray, &record, rng),
    }
}

/// Material response for a single bounce: scatter the ray off the surface
/// and tint the sky it then sees.
fn scatter_color<R: Rng>(ray: &Ray, record: &HitRecord, rng: &mut R) -> Vec3 {
    let material = record.material;
    match material.kind {
        MaterialKind::Diffuse => {
            let mut direction = record.normal + util::random_unit_vector(rng);
            if util::near_zero(direction) {
                direction = record.normal;
            }
            material.attenuation * sky_color(direction)
        }
        MaterialKind::Metal => {
            let reflected = util::reflect(ray.direction.normalize(), record.normal);
            let direction = reflected + material.fuzz * util::random_unit_vector(rng);
            if direction.dot(record.normal) <= 0.0 {
                // Fuzz pushed the ray into the surface; treat it as absorbed.
                return Vec3::ZERO;
            }
            material.attenuation * sky_color(direction)
        }
        MaterialKind::Dielectric => {
            let ri = if record.front_face {
                1.0 / material.refraction_index
            } else {
                material.refraction_index
            };
            let unit = ray.direction.normalize();
            let cos_theta = (-unit).dot(record.normal).min(1.0);
            let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

            if ri * sin_theta > 1.0 {
                // Total internal reflection.
                let reflected = util::reflect(unit, record.normal);
                return material.attenuation * sky_color(reflected);
            }

            // Blend refraction and reflection by the Fresnel factor instead
            // of sampling it, keeping the dielectric response deterministic.
            let fresnel = util::reflectance(cos_theta, ri);
            let refracted = util::refract(unit, record.normal, ri);
            let reflected = util::reflect(unit, record.normal);
            material.attenuation
                * ((1.0 - fresnel) * sky_color(refracted) + fresnel * sky_color(reflected))
        }
    }
}

/// The per-pixel kernel: generate the camera ray for pixel `(px, py)` and
/// shade it. Pure with respect to `basis` and `scene`; `rng` is only
/// consumed in scatter mode.
pub fn shade_pixel<R: Rng>(
    px: u32,
    py: u32,
    basis: &CameraBasis,
    scene: &Scene,
    mode: ShadeMode,
    rng: &mut R,
) -> Vec3 {
    let origin = if mode == ShadeMode::Scatter && basis.has_defocus() {
        basis.defocus_origin(rng)
    } else {
        basis.center
    };
    let ray = Ray::new(origin, basis.pixel_center(px, py) - origin);
    ray_color(&ray, scene, mode, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn assert_vec3_near(a: Vec3, b: Vec3, eps: f32) {
        assert!((a - b).length() < eps, "expected {b:?}, got {a:?}");
    }

    fn unit_sphere_scene() -> Scene {
        Scene::new(vec![Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Material::diffuse(Vec3::splat(0.5)),
        )])
        .unwrap()
    }

    #[test]
    fn test_head_on_hit() {
        let sphere = Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Material::diffuse(Vec3::splat(0.5)),
        );
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let hit = hit_sphere(&sphere, &ray, T_MIN, f32::MAX).unwrap();
        assert!((hit.t - 0.5).abs() < 1e-6);
        assert_vec3_near(hit.point, Vec3::new(0.0, 0.0, -0.5), 1e-6);
        assert_vec3_near(hit.normal, Vec3::new(0.0, 0.0, 1.0), 1e-6);
        assert!(hit.front_face);
    }

    #[test]
    fn test_unit_normal_even_with_unnormalized_direction() {
        let sphere = Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Material::diffuse(Vec3::splat(0.5)),
        );
        // Same ray, direction scaled by 4: t halves per unit of direction
        // but the geometric hit is identical.
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -4.0));
        let hit = hit_sphere(&sphere, &ray, T_MIN, f32::MAX).unwrap();
        assert!((hit.t - 0.125).abs() < 1e-6);
        assert_vec3_near(hit.point, Vec3::new(0.0, 0.0, -0.5), 1e-6);
        assert!((hit.normal.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_miss_returns_none() {
        let sphere = Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Material::diffuse(Vec3::splat(0.5)),
        );
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        assert!(hit_sphere(&sphere, &ray, T_MIN, f32::MAX).is_none());
    }

    #[test]
    fn test_sphere_behind_ray_is_ignored() {
        let sphere = Sphere::new(
            Vec3::new(0.0, 0.0, 5.0),
            0.5,
            Material::diffuse(Vec3::splat(0.5)),
        );
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        assert!(hit_sphere(&sphere, &ray, T_MIN, f32::MAX).is_none());
    }

    #[test]
    fn test_inside_hit_flips_normal() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0, Material::dielectric(1.5));
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let hit = hit_sphere(&sphere, &ray, T_MIN, f32::MAX).unwrap();
        assert!(!hit.front_face);
        // Normal opposes the ray, pointing back toward the center.
        assert_vec3_near(hit.normal, Vec3::new(0.0, 0.0, 1.0), 1e-6);
        assert!((hit.t - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_open_interval_excludes_t_min() {
        // Ray starting exactly on the sphere surface, pointing away: one
        // root is behind the ray, the other is t = 0, at the boundary the
        // open interval excludes.
        let sphere = Sphere::new(
            Vec3::new(0.0, 0.0, 1.0),
            1.0,
            Material::diffuse(Vec3::splat(0.5)),
        );
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        assert!(hit_sphere(&sphere, &ray, T_MIN, f32::MAX).is_none());
    }

    #[test]
    fn test_closest_of_overlapping_spheres_wins() {
        let near = Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Material::diffuse(Vec3::new(1.0, 0.0, 0.0)),
        );
        let far = Sphere::new(
            Vec3::new(0.0, 0.0, -2.0),
            0.5,
            Material::diffuse(Vec3::new(0.0, 1.0, 0.0)),
        );
        // Scan order must not matter.
        for spheres in [vec![near, far], vec![far, near]] {
            let scene = Scene::new(spheres).unwrap();
            let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
            let hit = hit_scene(&scene, &ray, T_MIN, f32::MAX).unwrap();
            assert!((hit.t - 0.5).abs() < 1e-6);
            assert_eq!(hit.material.attenuation, Vec3::new(1.0, 0.0, 0.0));
        }
    }

    #[test]
    fn test_scene_hit_matches_per_sphere_minimum() {
        // Fire a grid of rays at the demo scene and check hit_scene against
        // a brute-force reduction over hit_sphere, plus the geometric
        // invariants every accepted hit must satisfy.
        let scene = Scene::demo();
        let basis = Camera::demo().basis(9, 9).unwrap();
        let mut checked = 0;
        for py in 0..9 {
            for px in 0..9 {
                let ray = Ray::new(basis.center, basis.pixel_center(px, py) - basis.center);

                let mut best: Option<f32> = None;
                for sphere in scene.spheres() {
                    let Some(hit) = hit_sphere(sphere, &ray, T_MIN, f32::MAX) else {
                        continue;
                    };
                    // Normal opposes the ray and the point lies on the shell.
                    assert!(ray.direction.dot(hit.normal) <= 0.0);
                    let offset = (hit.point - sphere.center).length();
                    assert!((offset - sphere.radius).abs() / sphere.radius < 1e-4);
                    best = Some(best.map_or(hit.t, |t| t.min(hit.t)));
                }

                match (hit_scene(&scene, &ray, T_MIN, f32::MAX), best) {
                    (Some(hit), Some(t)) => {
                        assert_eq!(hit.t, t, "pixel ({px}, {py})");
                        checked += 1;
                    }
                    (None, None) => {}
                    (scene_hit, sphere_hit) => panic!(
                        "pixel ({px}, {py}): scene {scene_hit:?} vs spheres {sphere_hit:?}"
                    ),
                }
            }
        }
        // The demo framing keeps spheres in view, so the sweep is not vacuous.
        assert!(checked > 20, "only {checked} rays hit anything");
    }

    #[test]
    fn test_sky_gradient_endpoints() {
        // Horizontal ray sits exactly halfway up the gradient.
        assert_vec3_near(
            sky_color(Vec3::new(0.0, 0.0, -1.0)),
            Vec3::new(0.75, 0.85, 1.0),
            1e-6,
        );
        assert_vec3_near(sky_color(Vec3::Y), Vec3::new(0.5, 0.7, 1.0), 1e-6);
        assert_vec3_near(sky_color(Vec3::NEG_Y), Vec3::ONE, 1e-6);
        // Direction length must not change the color.
        assert_vec3_near(
            sky_color(Vec3::new(0.0, 3.0, -4.0)),
            sky_color(Vec3::new(0.0, 0.3, -0.4)),
            1e-6,
        );
    }

    #[test]
    fn test_normals_shading_is_exact() {
        let scene = unit_sphere_scene();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rng = SmallRng::seed_from_u64(0);
        let color = ray_color(&ray, &scene, ShadeMode::Normals, &mut rng);
        assert_vec3_near(color, Vec3::new(0.5, 0.5, 1.0), 1e-6);
    }

    #[test]
    fn test_normals_shading_ignores_rng() {
        let scene = unit_sphere_scene();
        let basis = Camera {
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            defocus_angle: 0.0,
            focus_distance: 1.0,
        }
        .basis(8, 8)
        .unwrap();
        let mut rng_a = SmallRng::seed_from_u64(1);
        let mut rng_b = SmallRng::seed_from_u64(999);
        for py in 0..8 {
            for px in 0..8 {
                let a = shade_pixel(px, py, &basis, &scene, ShadeMode::Normals, &mut rng_a);
                let b = shade_pixel(px, py, &basis, &scene, ShadeMode::Normals, &mut rng_b);
                assert_eq!(a, b);
            }
        }
    }

    #[test]
    fn test_miss_shades_as_sky() {
        let scene = unit_sphere_scene();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        let mut rng = SmallRng::seed_from_u64(0);
        let color = ray_color(&ray, &scene, ShadeMode::Scatter, &mut rng);
        assert_vec3_near(color, sky_color(Vec3::Y), 1e-6);
    }

    #[test]
    fn test_diffuse_scatter_is_tinted_and_bounded() {
        let albedo = Vec3::new(0.8, 0.4, 0.2);
        let scene = Scene::new(vec![Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Material::diffuse(albedo),
        )])
        .unwrap();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..50 {
            let color = ray_color(&ray, &scene, ShadeMode::Scatter, &mut rng);
            // Sky is at most 1 per channel, so the tint bounds the result.
            assert!(color.x >= 0.0 && color.x <= albedo.x + 1e-6);
            assert!(color.y >= 0.0 && color.y <= albedo.y + 1e-6);
            assert!(color.z >= 0.0 && color.z <= albedo.z + 1e-6);
        }
    }

    #[test]
    fn test_polished_metal_reflects_deterministically() {
        let albedo = Vec3::new(0.8, 0.6, 0.2);
        let scene = Scene::new(vec![Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Material::metal(albedo, 0.0),
        )])
        .unwrap();
        // Head-on hit reflects straight back; the reflected ray is
        // horizontal so the sky term is the midpoint color.
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rng = SmallRng::seed_from_u64(0);
        let color = ray_color(&ray, &scene, ShadeMode::Scatter, &mut rng);
        assert_vec3_near(color, albedo * Vec3::new(0.75, 0.85, 1.0), 1e-5);
    }

    #[test]
    fn test_dielectric_head_on_blends_fresnel() {
        let scene = Scene::new(vec![Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Material::dielectric(1.5),
        )])
        .unwrap();
        // Head on, both the refracted and reflected rays are horizontal,
        // so the blend collapses to the horizon color regardless of the
        // Fresnel weight.
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rng = SmallRng::seed_from_u64(0);
        let color = ray_color(&ray, &scene, ShadeMode::Scatter, &mut rng);
        assert_vec3_near(color, Vec3::new(0.75, 0.85, 1.0), 1e-5);
    }

    #[test]
    fn test_dielectric_total_internal_reflection() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0, Material::dielectric(1.5));
        let scene = Scene::new(vec![sphere]).unwrap();
        // From inside the sphere at a shallow angle: sin(theta) = 0.9, and
        // 1.5 * 0.9 > 1 forces total internal reflection.
        let ray = Ray::new(Vec3::new(0.9, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        let hit = hit_scene(&scene, &ray, T_MIN, f32::MAX).unwrap();
        assert!(!hit.front_face);

        let mut rng = SmallRng::seed_from_u64(0);
        let color = ray_color(&ray, &scene, ShadeMode::Scatter, &mut rng);
        let reflected = util::reflect(ray.direction.normalize(), hit.normal);
        assert_vec3_near(color, sky_color(reflected), 1e-5);
    }

    #[test]
    fn test_shade_pixel_matches_sky_for_empty_view() {
        // Scene far off to the side; every pixel sees sky.
        let scene = Scene::new(vec![Sphere::new(
            Vec3::new(100.0, 0.0, 0.0),
            0.5,
            Material::diffuse(Vec3::splat(0.5)),
        )])
        .unwrap();
        let basis = Camera {
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            defocus_angle: 0.0,
            focus_distance: 1.0,
        }
        .basis(2, 2)
        .unwrap();
        let mut rng = SmallRng::seed_from_u64(0);
        let color = shade_pixel(0, 0, &basis, &scene, ShadeMode::Normals, &mut rng);
        assert_vec3_near(color, sky_color(Vec3::new(-0.5, 0.5, -1.0)), 1e-6);
    }

    #[test]
    fn test_mode_wire_values() {
        assert_eq!(ShadeMode::Normals.wire(), 0);
        assert_eq!(ShadeMode::Scatter.wire(), 1);
        assert_eq!(ShadeMode::parse("scatter"), Some(ShadeMode::Scatter));
        assert_eq!(ShadeMode::parse("sky"), None);
        assert_eq!(ShadeMode::Scatter.to_string(), "scatter");
    }
}
