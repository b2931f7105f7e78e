//! Math type re-exports and shading math helpers.
//!
//! Re-exports the `glam` types used throughout the crate and provides the
//! small vector helpers the shading code needs (reflection, refraction,
//! sphere/disk sampling).

// Re-export glam types
pub use glam::{UVec2, Vec2, Vec3, Vec4};

use rand::Rng;

/// Threshold below which a vector is treated as zero.
const NEAR_ZERO_EPS: f32 = 1e-8;

/// True if every component is close to zero.
///
/// Guards the Lambertian scatter direction against the degenerate case where
/// the random offset exactly cancels the normal.
#[inline]
pub fn near_zero(v: Vec3) -> bool {
    v.x.abs() < NEAR_ZERO_EPS && v.y.abs() < NEAR_ZERO_EPS && v.z.abs() < NEAR_ZERO_EPS
}

/// Mirror reflection of `v` about the unit normal `n`.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract the unit vector `uv` through a surface with unit normal `n`.
///
/// `etai_over_etat` is the ratio of refraction indices (incident / transmit).
/// Callers must have ruled out total internal reflection first.
#[inline]
pub fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}

/// Schlick approximation of the Fresnel reflectance.
#[inline]
pub fn reflectance(cosine: f32, refraction_index: f32) -> f32 {
    let r0 = (1.0 - refraction_index) / (1.0 + refraction_index);
    let r0 = r0 * r0;
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

/// Uniformly distributed unit vector (rejection sampling in the unit sphere).
pub fn random_unit_vector<R: Rng>(rng: &mut R) -> Vec3 {
    loop {
        let p = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        let len_sq = p.length_squared();
        if len_sq > NEAR_ZERO_EPS && len_sq <= 1.0 {
            return p / len_sq.sqrt();
        }
    }
}

/// Uniform point in the unit disk on the xy plane (z = 0).
pub fn random_in_unit_disk<R: Rng>(rng: &mut R) -> Vec3 {
    loop {
        let p = Vec3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), 0.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_near_zero() {
        assert!(near_zero(Vec3::ZERO));
        assert!(near_zero(Vec3::splat(1e-9)));
        assert!(!near_zero(Vec3::new(0.0, 1e-3, 0.0)));
    }

    #[test]
    fn test_reflect() {
        let v = Vec3::new(1.0, -1.0, 0.0);
        let n = Vec3::new(0.0, 1.0, 0.0);
        let r = reflect(v, n);
        assert!((r - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_refract_identity_medium() {
        // Equal indices: the ray passes straight through.
        let uv = Vec3::new(0.0, -1.0, 0.0);
        let n = Vec3::new(0.0, 1.0, 0.0);
        let r = refract(uv, n, 1.0);
        assert!((r - uv).length() < 1e-6);
    }

    #[test]
    fn test_reflectance_limits() {
        // Head-on incidence matches the base reflectance r0.
        let r0 = ((1.0_f32 - 1.5) / (1.0 + 1.5)).powi(2);
        assert!((reflectance(1.0, 1.5) - r0).abs() < 1e-6);
        // Grazing incidence approaches total reflection.
        assert!(reflectance(0.0, 1.5) > 0.99);
    }

    #[test]
    fn test_random_unit_vector_is_unit() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..100 {
            let v = random_unit_vector(&mut rng);
            assert!((v.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_random_in_unit_disk() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..100 {
            let p = random_in_unit_disk(&mut rng);
            assert!(p.length_squared() < 1.0);
            assert_eq!(p.z, 0.0);
        }
    }
}
