//! # silica
//!
//! Ray tracer for sphere scenes with diffuse, metal and dielectric
//! materials. The same per-pixel kernel runs on CPU threads or as a wgpu
//! compute shader, and an interactive viewer flies a camera through the
//! traced scene in real time.
//!
//! ## Modules
//!
//! - [`util`] - Errors, math re-exports and shading helpers
//! - [`scene`] - Spheres, materials, GPU packing and JSON configs
//! - [`camera`] - Look-at camera, ray basis and fly controller
//! - [`trace`] - The per-pixel tracing kernel
//! - [`render`] - CPU (rayon) and GPU (wgpu) backends
//!
//! ## Example
//!
//! ```ignore
//! use silica::prelude::*;
//!
//! let (scene, camera) = silica::scene::builtin_scene("demo", 0).unwrap();
//! let basis = camera.basis(640, 360)?;
//! let frame = silica::render::render(&scene, &basis, ShadeMode::Scatter);
//! frame.save_png("demo.png".as_ref())?;
//! ```

pub mod camera;
pub mod render;
pub mod scene;
pub mod trace;
pub mod util;

// Interactive viewer (optional, enabled with "viewer" feature)
#[cfg(feature = "viewer")]
pub mod viewer;

// Re-export commonly used types
pub use util::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::camera::{Camera, CameraBasis, CameraController};
    pub use crate::render::{render, render_with, Frame};
    pub use crate::scene::{Material, MaterialKind, Scene, SceneConfig, Sphere};
    pub use crate::trace::ShadeMode;
    pub use crate::util::{Error, Result, Vec3};
}
