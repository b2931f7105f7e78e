//! Sphere primitive.

use crate::util::{Error, Result, Vec3};

use super::Material;

/// One sphere: center, radius and surface material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
    pub material: Material,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32, material: Material) -> Self {
        Self {
            center,
            radius,
            material,
        }
    }

    /// Check the invariants every kernel invocation relies on. `index` is
    /// the sphere's position in the scene, reported in errors.
    pub(crate) fn validate(&self, index: usize) -> Result<()> {
        if !self.center.is_finite() {
            return Err(Error::invalid_sphere(index, "center is not finite"));
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(Error::invalid_sphere(
                index,
                "radius must be positive and finite",
            ));
        }
        if !self.material.attenuation.is_finite() {
            return Err(Error::invalid_sphere(index, "attenuation is not finite"));
        }
        if !self.material.fuzz.is_finite() || self.material.fuzz < 0.0 {
            return Err(Error::invalid_sphere(
                index,
                "fuzz must be non-negative and finite",
            ));
        }
        if !self.material.refraction_index.is_finite() || self.material.refraction_index <= 0.0 {
            return Err(Error::invalid_sphere(
                index,
                "refraction index must be positive and finite",
            ));
        }
        Ok(())
    }
}
