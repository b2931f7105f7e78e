//! On-disk scene description.
//!
//! Scenes are JSON files holding a camera and a sphere list:
//!
//! ```json
//! {
//!   "camera": { "look_from": [13.0, 2.0, 3.0], "vfov": 20.0 },
//!   "spheres": [
//!     {
//!       "center": [0.0, 0.0, -1.0],
//!       "radius": 0.5,
//!       "material": { "type": "diffuse", "albedo": [0.1, 0.2, 0.5] }
//!     }
//!   ]
//! }
//! ```
//!
//! Every camera field has a default so minimal files stay small.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::util::{Result, Vec3};

use super::{Material, Scene, Sphere};

/// Camera parameters as stored in a scene file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub look_from: [f32; 3],
    pub look_at: [f32; 3],
    pub vup: [f32; 3],
    pub vfov: f32,
    pub defocus_angle: f32,
    pub focus_distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Camera::default().into()
    }
}

impl From<Camera> for CameraConfig {
    fn from(camera: Camera) -> Self {
        Self {
            look_from: camera.look_from.to_array(),
            look_at: camera.look_at.to_array(),
            vup: camera.vup.to_array(),
            vfov: camera.vfov,
            defocus_angle: camera.defocus_angle,
            focus_distance: camera.focus_distance,
        }
    }
}

impl From<&CameraConfig> for Camera {
    fn from(config: &CameraConfig) -> Self {
        Self {
            look_from: Vec3::from_array(config.look_from),
            look_at: Vec3::from_array(config.look_at),
            vup: Vec3::from_array(config.vup),
            vfov: config.vfov,
            defocus_angle: config.defocus_angle,
            focus_distance: config.focus_distance,
        }
    }
}

/// Tagged material description.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MaterialConfig {
    Diffuse {
        albedo: [f32; 3],
    },
    Metal {
        albedo: [f32; 3],
        #[serde(default)]
        fuzz: f32,
    },
    Dielectric {
        refraction_index: f32,
    },
}

impl From<&MaterialConfig> for Material {
    fn from(config: &MaterialConfig) -> Self {
        match *config {
            MaterialConfig::Diffuse { albedo } => Material::diffuse(Vec3::from_array(albedo)),
            MaterialConfig::Metal { albedo, fuzz } => {
                Material::metal(Vec3::from_array(albedo), fuzz)
            }
            MaterialConfig::Dielectric { refraction_index } => {
                Material::dielectric(refraction_index)
            }
        }
    }
}

impl From<&Material> for MaterialConfig {
    fn from(material: &Material) -> Self {
        use super::MaterialKind;
        match material.kind {
            MaterialKind::Diffuse => Self::Diffuse {
                albedo: material.attenuation.to_array(),
            },
            MaterialKind::Metal => Self::Metal {
                albedo: material.attenuation.to_array(),
                fuzz: material.fuzz,
            },
            MaterialKind::Dielectric => Self::Dielectric {
                refraction_index: material.refraction_index,
            },
        }
    }
}

/// One sphere entry in a scene file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SphereConfig {
    pub center: [f32; 3],
    pub radius: f32,
    pub material: MaterialConfig,
}

/// Complete scene file: camera plus sphere list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub camera: CameraConfig,
    pub spheres: Vec<SphereConfig>,
}

impl SceneConfig {
    /// Parse a scene file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Write the scene as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Validate and convert into a live scene and camera.
    pub fn build(&self) -> Result<(Scene, Camera)> {
        let spheres = self
            .spheres
            .iter()
            .map(|s| {
                Sphere::new(
                    Vec3::from_array(s.center),
                    s.radius,
                    Material::from(&s.material),
                )
            })
            .collect();
        Ok((Scene::new(spheres)?, Camera::from(&self.camera)))
    }

    /// Snapshot a live scene and camera into file form.
    pub fn from_scene(scene: &Scene, camera: &Camera) -> Self {
        Self {
            camera: (*camera).into(),
            spheres: scene
                .spheres()
                .iter()
                .map(|s| SphereConfig {
                    center: s.center.to_array(),
                    radius: s.radius,
                    material: (&s.material).into(),
                })
                .collect(),
        }
    }
}

/// Load a scene file and build it in one step.
pub fn load_scene(path: &Path) -> Result<(Scene, Camera)> {
    SceneConfig::load(path)?.build()
}

/// Resolve a built-in scene name. `seed` only affects `cover`.
pub fn builtin_scene(name: &str, seed: u64) -> Option<(Scene, Camera)> {
    match name {
        "demo" => Some((Scene::demo(), Camera::demo())),
        "cover" => Some((Scene::cover(seed), Camera::default())),
        _ => None,
    }
}
