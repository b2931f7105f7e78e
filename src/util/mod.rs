//! Utility types and functions for silica.
//!
//! This module contains fundamental types used throughout the library:
//! - [`Error`] / [`Result`] - Error handling
//! - Math type re-exports from glam plus shading helpers

mod error;
mod math;

pub use error::*;
pub use math::*;
