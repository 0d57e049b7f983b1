//! Math utilities and types
//!
//! Fixed-size vector and matrix primitives used by the transform builders and
//! the shading evaluator. All matrices are stored column-major, which is the
//! flat layout the uniform boundary expects.

use thiserror::Error;

pub use nalgebra::{Matrix3, Matrix4, Vector3, Vector4};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Degenerate input to a math primitive
///
/// Raised instead of letting NaN or infinity leak into the rest of the frame.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    /// Zero-length (or non-finite) vector passed to `normalize`
    #[error("cannot normalize a zero-length vector")]
    DegenerateVector,

    /// Matrix without an inverse passed to `invert_matrix`
    #[error("matrix is singular and has no inverse")]
    SingularMatrix,
}

/// Euclidean length of a vector
pub fn length(v: &Vec3) -> f32 {
    v.norm()
}

/// Scale `v` to unit length
///
/// Fails with [`MathError::DegenerateVector`] when `v` has zero length.
pub fn normalize(v: &Vec3) -> Result<Vec3, MathError> {
    let len = v.norm();
    if len > 0.0 && len.is_finite() {
        Ok(v / len)
    } else {
        Err(MathError::DegenerateVector)
    }
}

/// Inner product of two vectors
pub fn dot(a: &Vec3, b: &Vec3) -> f32 {
    a.dot(b)
}

/// Standard 4x4 product `a * b`
///
/// Applied to a column vector this means "apply `b`, then `a`".
pub fn multiply_matrices(a: &Mat4, b: &Mat4) -> Mat4 {
    a * b
}

/// General 4x4 inverse
///
/// Fails with [`MathError::SingularMatrix`] for singular input, or when the
/// inverse would contain non-finite values.
pub fn invert_matrix(m: &Mat4) -> Result<Mat4, MathError> {
    match m.try_inverse() {
        Some(inv) if inv.iter().all(|c| c.is_finite()) => Ok(inv),
        _ => Err(MathError::SingularMatrix),
    }
}

/// General 3x3 inverse, same failure policy as [`invert_matrix`]
pub fn invert_matrix_3x3(m: &Mat3) -> Result<Mat3, MathError> {
    match m.try_inverse() {
        Some(inv) if inv.iter().all(|c| c.is_finite()) => Ok(inv),
        _ => Err(MathError::SingularMatrix),
    }
}

/// Transpose of a 3x3 matrix
pub fn transpose_3x3(m: &Mat3) -> Mat3 {
    m.transpose()
}

/// Upper-left 3x3 block of a 4x4 matrix (drops translation)
pub fn top_left_3x3(m: &Mat4) -> Mat3 {
    m.fixed_view::<3, 3>(0, 0).into_owned()
}

/// Flatten a 4x4 matrix into 16 column-major floats
pub fn mat4_to_array(m: &Mat4) -> [f32; 16] {
    let mut out = [0.0; 16];
    out.copy_from_slice(m.as_slice());
    out
}

/// Flatten a 3x3 matrix into 9 column-major floats
pub fn mat3_to_array(m: &Mat3) -> [f32; 9] {
    let mut out = [0.0; 9];
    out.copy_from_slice(m.as_slice());
    out
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }
}
