//! Render backends.
//!
//! Both backends run the same kernel from [`crate::trace`]: `cpu` fans
//! pixel rows out over rayon, `gpu` dispatches the WGSL mirror of the
//! kernel as a wgpu compute pass.

pub mod cpu;
#[cfg(feature = "gpu")]
pub mod gpu;

pub use cpu::{render, render_with, Frame};
