//! Error types for the silica library.

use thiserror::Error;

/// Main error type for silica operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Required compute capability is absent (no adapter / device at startup)
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// Sphere failed validation at scene-build time
    #[error("Invalid sphere at index {index}: {reason}")]
    InvalidSphere { index: usize, reason: String },

    /// Camera up vector is parallel to the view direction
    #[error("Degenerate camera basis: up vector parallel to view direction")]
    DegenerateCameraBasis,

    /// Packed buffer length does not match per-record stride x count
    #[error("Buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// Scene-level problem (empty scene, unknown material tag, ...)
    #[error("Invalid scene: {0}")]
    InvalidScene(String),

    /// JSON parse error in a scene or settings file
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Image encode/write error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid-sphere error.
    pub fn invalid_sphere(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidSphere {
            index,
            reason: reason.into(),
        }
    }

    /// Create an invalid-scene error.
    pub fn invalid_scene(msg: impl Into<String>) -> Self {
        Self::InvalidScene(msg.into())
    }

    /// Create an unsupported-platform error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedPlatform(msg.into())
    }
}

/// Result type alias for silica operations.
pub type Result<T> = std::result::Result<T, Error>;
