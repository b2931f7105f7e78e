//! Fixed-layout sphere records shared by both render backends.
//!
//! The kernel consumes the scene as a flat array of 48-byte records so any
//! parallel invocation can index sphere `i` directly. Layout (byte offsets):
//!
//! | offset | field            | type    |
//! |--------|------------------|---------|
//! | 0      | center           | f32 x 3 |
//! | 12     | radius           | f32     |
//! | 16     | material kind    | u32     |
//! | 20     | fuzz             | f32     |
//! | 24     | refraction index | f32     |
//! | 28     | padding          | u32     |
//! | 32     | attenuation      | f32 x 3 |
//! | 44     | padding          | f32     |
//!
//! The interleaved scalars give every `vec3` field 16-byte alignment, which
//! is exactly what the WGSL mirror of this struct requires.

use bytemuck::{Pod, Zeroable};

use crate::util::{Error, Result, Vec3};

use super::{Material, MaterialKind, Sphere};

/// Record stride in bytes. Buffer sizes are always a multiple of this.
pub const SPHERE_RECORD_SIZE: usize = std::mem::size_of::<SphereRecord>();

/// Packed sphere (48 bytes, matches the WGSL `Sphere` struct).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SphereRecord {
    pub center: [f32; 3],
    pub radius: f32,
    pub kind: u32,
    pub fuzz: f32,
    pub refraction_index: f32,
    pub _pad0: u32,
    pub attenuation: [f32; 3],
    pub _pad1: f32,
}

const _: () = assert!(std::mem::size_of::<SphereRecord>() == 48);
const _: () = assert!(std::mem::align_of::<SphereRecord>() == 4);

impl SphereRecord {
    pub fn from_sphere(sphere: &Sphere) -> Self {
        Self {
            center: sphere.center.to_array(),
            radius: sphere.radius,
            kind: sphere.material.kind.wire(),
            fuzz: sphere.material.fuzz,
            refraction_index: sphere.material.refraction_index,
            _pad0: 0,
            attenuation: sphere.material.attenuation.to_array(),
            _pad1: 0.0,
        }
    }

    /// Decode back into a sphere. Fails on an unknown material kind;
    /// `index` is the record's position, reported in the error.
    pub fn to_sphere(&self, index: usize) -> Result<Sphere> {
        let kind = MaterialKind::from_wire(self.kind)
            .ok_or_else(|| Error::invalid_sphere(index, "unknown material kind"))?;
        Ok(Sphere {
            center: Vec3::from_array(self.center),
            radius: self.radius,
            material: Material {
                kind,
                attenuation: Vec3::from_array(self.attenuation),
                fuzz: self.fuzz,
                refraction_index: self.refraction_index,
            },
        })
    }
}

/// Pack a sphere list into contiguous records, preserving order.
pub fn pack_spheres(spheres: &[Sphere]) -> Vec<SphereRecord> {
    spheres.iter().map(SphereRecord::from_sphere).collect()
}

/// Raw bytes of a packed record slice, ready for upload.
pub fn records_as_bytes(records: &[SphereRecord]) -> &[u8] {
    bytemuck::cast_slice(records)
}

/// Parse `count` spheres back out of a raw byte buffer.
///
/// The buffer length must be exactly `count` times the record stride.
pub fn unpack_spheres(bytes: &[u8], count: usize) -> Result<Vec<Sphere>> {
    let expected = count * SPHERE_RECORD_SIZE;
    if bytes.len() != expected {
        return Err(Error::BufferSizeMismatch {
            expected,
            actual: bytes.len(),
        });
    }
    bytes
        .chunks_exact(SPHERE_RECORD_SIZE)
        .map(bytemuck::pod_read_unaligned::<SphereRecord>)
        .enumerate()
        .map(|(i, r)| r.to_sphere(i))
        .collect()
}
