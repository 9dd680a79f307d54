//! Error taxonomy for landscape generation and asset handling.
//!
//! Nothing here ever reaches the end user: every variant is logged and pushed
//! to the debug overlay, and the offending feature is skipped.

use thiserror::Error;

/// Failures while turning procedural parameters into geometry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// A parameter was NaN or infinite.
    #[error("non-finite parameter `{name}`: {value}")]
    NonFiniteParameter {
        name: &'static str,
        value: f32,
    },

    /// The footprint radius or height was zero or negative.
    #[error("degenerate footprint: radius {radius}, height {height}")]
    DegenerateFootprint {
        radius: f32,
        height: f32,
    },

    /// Not enough rings or sectors to close a mesh.
    #[error("too few segments: {rings} rings x {sectors} sectors")]
    TooFewSegments {
        rings: u32,
        sectors: u32,
    },
}

/// Top-level error for everything the engine reports on its debug channel.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LandscapeError {
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("failed to load asset `{path}`: {reason}")]
    AssetLoad { path: String, reason: String },

    #[error("render capability unavailable: {0}")]
    MissingCapability(&'static str),
}

/// Rejects NaN and infinities with the parameter's name attached.
pub fn ensure_finite(name: &'static str, value: f32) -> Result<f32, GenerationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(GenerationError::NonFiniteParameter { name, value })
    }
}
