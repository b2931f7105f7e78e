//! Scene data model: spheres, materials and their packed wire form.
//!
//! A [`Scene`] is built once (from a JSON file or a built-in generator),
//! validated eagerly, and immutable afterwards. [`Scene::pack`] flattens it
//! into the fixed 48-byte records both render backends index.

mod config;
mod material;
mod pack;
mod sphere;

pub use config::{
    builtin_scene, load_scene, CameraConfig, MaterialConfig, SceneConfig, SphereConfig,
};
pub use material::{Material, MaterialKind};
pub use pack::{
    pack_spheres, records_as_bytes, unpack_spheres, SphereRecord, SPHERE_RECORD_SIZE,
};
pub use sphere::Sphere;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::util::{Error, Result, Vec3};

/// Immutable ordered sphere collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    spheres: Vec<Sphere>,
}

impl Scene {
    /// Build a scene, validating every sphere up front so no backend ever
    /// sees a zero radius or non-finite value mid-frame.
    pub fn new(spheres: Vec<Sphere>) -> Result<Self> {
        if spheres.is_empty() {
            return Err(Error::invalid_scene("scene contains no spheres"));
        }
        for (index, sphere) in spheres.iter().enumerate() {
            sphere.validate(index)?;
        }
        tracing::debug!(sphere_count = spheres.len(), "scene validated");
        Ok(Self { spheres })
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    pub fn len(&self) -> usize {
        self.spheres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }

    /// Pack into GPU-ready records, preserving sphere order.
    pub fn pack(&self) -> Vec<SphereRecord> {
        pack_spheres(&self.spheres)
    }

    /// Byte size of the packed form.
    pub fn packed_size(&self) -> usize {
        self.spheres.len() * SPHERE_RECORD_SIZE
    }

    /// The five-sphere tutorial scene: matte ground and center sphere, a
    /// hollow glass sphere on the left, a polished metal one on the right.
    pub fn demo() -> Self {
        let spheres = vec![
            Sphere::new(
                Vec3::new(0.0, -100.5, -1.0),
                100.0,
                Material::diffuse(Vec3::new(0.8, 0.8, 0.0)),
            ),
            Sphere::new(
                Vec3::new(0.0, 0.0, -1.2),
                0.5,
                Material::diffuse(Vec3::new(0.1, 0.2, 0.5)),
            ),
            Sphere::new(Vec3::new(-1.0, 0.0, -1.0), 0.5, Material::dielectric(1.5)),
            // Air bubble inside the glass sphere; the inverted index makes
            // the shell hollow.
            Sphere::new(
                Vec3::new(-1.0, 0.0, -1.0),
                0.4,
                Material::dielectric(1.0 / 1.5),
            ),
            Sphere::new(
                Vec3::new(1.0, 0.0, -1.0),
                0.5,
                Material::metal(Vec3::new(0.8, 0.6, 0.2), 0.0),
            ),
        ];
        // Constants above satisfy every validation rule.
        Self { spheres }
    }

    /// The book-cover scene: a jittered grid of small random spheres, three
    /// large landmark spheres and a ground sphere. Deterministic for a
    /// given `seed`.
    pub fn cover(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut spheres = Vec::new();

        let keep_out = Vec3::new(4.0, 0.2, 0.0);
        for a in -3..3 {
            for b in -3..3 {
                let center = Vec3::new(
                    a as f32 + 0.9 * rng.gen::<f32>(),
                    0.2,
                    b as f32 + 0.9 * rng.gen::<f32>(),
                );
                // Draw every parameter even when the kind ignores it, so
                // the sequence of spheres depends only on the seed.
                let kind = rng.gen_range(0..3u32);
                let albedo = Vec3::new(rng.gen(), rng.gen(), rng.gen());
                let fuzz = rng.gen::<f32>() / 2.0;
                if center.distance(keep_out) <= 0.9 {
                    continue;
                }
                let material = match kind {
                    0 => Material::diffuse(albedo),
                    1 => Material::metal(albedo, fuzz),
                    _ => Material::dielectric(1.5),
                };
                spheres.push(Sphere::new(center, 0.2, material));
            }
        }

        spheres.push(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0, Material::dielectric(1.5)));
        spheres.push(Sphere::new(
            Vec3::new(-4.0, 1.0, 0.0),
            1.0,
            Material::diffuse(Vec3::new(0.4, 0.2, 0.1)),
        ));
        spheres.push(Sphere::new(
            Vec3::new(4.0, 1.0, 0.0),
            1.0,
            Material::metal(Vec3::new(0.7, 0.6, 0.5), 0.0),
        ));
        spheres.push(Sphere::new(
            Vec3::new(0.0, -100.0, 0.0),
            100.0,
            Material::diffuse(Vec3::splat(0.5)),
        ));

        Self { spheres }
    }
}
