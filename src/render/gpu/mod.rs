//! GPU compute backend built on wgpu.
//!
//! [`SphereTraceCompute`] owns the compute and blit pipelines for the
//! interactive viewer; [`headless`] drives the same pipelines without a
//! window and reads the frame back to the CPU.

mod compute;
pub mod headless;

pub use compute::SphereTraceCompute;
pub use headless::render_headless;
