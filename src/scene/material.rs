//! Surface materials for scene spheres.

use crate::util::Vec3;

/// Material category.
///
/// The discriminant doubles as the wire value stored in packed sphere
/// records, so both render backends agree on the encoding.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    /// Lambertian surface scattering around the normal.
    Diffuse = 0,
    /// Mirror reflection, optionally fuzzed.
    Metal = 1,
    /// Refractive glass-like surface.
    Dielectric = 2,
}

impl MaterialKind {
    /// Decode a wire value back into a kind.
    pub fn from_wire(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Diffuse),
            1 => Some(Self::Metal),
            2 => Some(Self::Dielectric),
            _ => None,
        }
    }

    /// Wire value stored in packed records.
    pub fn wire(self) -> u32 {
        self as u32
    }
}

/// Surface response parameters for one sphere.
///
/// Every field is stored for every kind so the type stays `Copy` and packs
/// into a fixed-size record. `fuzz` only matters for metals and
/// `refraction_index` only for dielectrics; the constructors fill neutral
/// values for the rest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub kind: MaterialKind,
    /// Per-channel tint applied to scattered light, components in [0, 1].
    pub attenuation: Vec3,
    /// Metal roughness in [0, 1]; 0 is a perfect mirror.
    pub fuzz: f32,
    /// Ratio of refractive indices (inside over outside), > 0.
    pub refraction_index: f32,
}

impl Material {
    /// Lambertian surface with the given albedo.
    pub fn diffuse(albedo: Vec3) -> Self {
        Self {
            kind: MaterialKind::Diffuse,
            attenuation: albedo,
            fuzz: 0.0,
            refraction_index: 1.0,
        }
    }

    /// Reflective surface; `fuzz` perturbs the mirror direction.
    pub fn metal(albedo: Vec3, fuzz: f32) -> Self {
        Self {
            kind: MaterialKind::Metal,
            attenuation: albedo,
            fuzz,
            refraction_index: 1.0,
        }
    }

    /// Clear refractive surface. Glass is roughly 1.5, water 1.33; an air
    /// bubble inside glass inverts the ratio (1.0 / 1.5).
    pub fn dielectric(refraction_index: f32) -> Self {
        Self {
            kind: MaterialKind::Dielectric,
            attenuation: Vec3::ONE,
            fuzz: 0.0,
            refraction_index,
        }
    }
}
