//! # Rendering System
//!
//! Backend-agnostic rendering layer for the lighting lessons.
//!
//! ## Architecture
//!
//! - **Transforms**: translation, rotation, projection, view and normal matrices
//! - **Primitives**: camera and mesh data
//! - **Lighting / Material**: typed light and material descriptions plus their
//!   flattened uniform layout
//! - **Shading**: CPU reference of the per-fragment lighting math
//! - **API**: the `RenderContext` seam and the named uniform boundary
//! - **Backends**: the headless recording context
//! - **Pipeline**: one parameterized lesson pipeline, selected by `LightingMode`
//!
//! Rasterization and per-pixel shading run on whatever sits behind
//! `RenderContext`; nothing in here talks to a graphics API directly.

use thiserror::Error;

pub mod transforms;
pub mod primitives;
pub mod lighting;
pub mod material;
pub mod shading;
pub mod api;

/// Render context implementations
pub mod backends;

pub mod pipeline;

#[cfg(test)]
mod pipeline_tests;

pub use api::{
    DrawCall, MeshHandle, ProgramHandle, RenderContext, FrameUniforms, UniformValue,
};
pub use backends::RecordingContext;
pub use lighting::{Light, LightType, LightingEnvironment, LightUniformArrays, MAX_LIGHTS};
pub use material::{Material, MaterialUniforms};
pub use pipeline::{FrameTransforms, LessonPipeline, RenderState, StaticTransforms};
pub use primitives::{Camera, MeshData, MeshError};
pub use shading::{LightingMode, SurfacePoint};

use crate::foundation::math::MathError;

/// Parameter outside the range a builder or constructor accepts
///
/// Rejected at construction time so that invalid values never reach a matrix
/// or a uniform upload.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// Projection planes must satisfy `0 < near < far`
    #[error("Invalid projection planes: near={near}, far={far} (need 0 < near < far)")]
    InvalidProjection {
        /// Near plane distance
        near: f32,
        /// Far plane distance
        far: f32,
    },

    /// Aspect ratio must be positive and finite
    #[error("Invalid aspect ratio: {0}")]
    InvalidAspectRatio(f32),

    /// Vertical field of view must lie strictly between 0 and pi
    #[error("Invalid field of view: {0} radians")]
    InvalidFieldOfView(f32),

    /// Attenuation coefficients must be non-negative
    #[error("Negative attenuation coefficient: linear={linear}, quadratic={quadratic}")]
    NegativeAttenuation {
        /// Linear coefficient
        linear: f32,
        /// Quadratic coefficient
        quadratic: f32,
    },

    /// Light intensity must be non-negative
    #[error("Negative light intensity: {0}")]
    NegativeIntensity(f32),

    /// Specular shininess exponent must be at least 1
    #[error("Specular shininess must be >= 1, got {0}")]
    InvalidShininess(f32),

    /// Specular amount must be non-negative
    #[error("Negative specular amount: {0}")]
    NegativeSpecularAmount(f32),

    /// Too many lights for the fixed uniform arrays
    #[error("Too many lights: {count} (maximum {max})")]
    TooManyLights {
        /// Lights requested
        count: usize,
        /// Lights supported
        max: usize,
    },

    /// Named parameter is unknown or its value is outside the declared range
    #[error("Parameter '{name}' rejected: {reason}")]
    OutOfRange {
        /// Parameter name
        name: String,
        /// Why the value was rejected
        reason: String,
    },
}

/// High-level rendering error types
///
/// Represents errors that can occur while building or drawing a frame,
/// abstracted from whatever graphics API sits behind `RenderContext`.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Program, mesh or context unavailable; the frame is skipped
    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// Uniform name not declared by the bound program
    #[error("Unknown uniform '{name}' for {mode:?} program")]
    UnknownUniform {
        /// Uniform name
        name: String,
        /// Lighting mode of the program
        mode: LightingMode,
    },

    /// Uniform value does not have the size the program expects
    #[error("Uniform '{name}' expects {expected} floats, got {actual}")]
    UniformSizeMismatch {
        /// Uniform name
        name: String,
        /// Floats expected
        expected: usize,
        /// Floats supplied
        actual: usize,
    },

    /// Degenerate math input
    #[error("Math error: {0}")]
    Math(#[from] MathError),

    /// Invalid construction parameter
    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),

    /// Malformed mesh input
    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
