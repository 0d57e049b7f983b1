//! Transform builders
//!
//! Produce the named matrices of a frame from a handful of scalars. Every
//! builder returns a column-major matrix and composes with
//! [`multiply_matrices`](crate::foundation::math::multiply_matrices) in
//! "apply right operand first" order.
//!
//! Projection follows the WebGL clip convention: view space looks down -Z and
//! depth maps to [-1, 1].

use crate::foundation::math::{
    invert_matrix, invert_matrix_3x3, top_left_3x3, transpose_3x3, Mat3, Mat4, MathError, Vec3,
};
use crate::render::ParameterError;

/// Default spin rate, in radians per elapsed millisecond
pub const DEFAULT_ROTATION_SPEED: f32 = 0.0005;

/// Pure translation
pub fn translation_matrix(x: f32, y: f32, z: f32) -> Mat4 {
    Mat4::new(
        1.0, 0.0, 0.0, x,
        0.0, 1.0, 0.0, y,
        0.0, 0.0, 1.0, z,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Right-handed rotation about the +Y axis
pub fn rotation_y_matrix(angle_radians: f32) -> Mat4 {
    let (s, c) = angle_radians.sin_cos();
    Mat4::new(
        c, 0.0, s, 0.0,
        0.0, 1.0, 0.0, 0.0,
        -s, 0.0, c, 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Spin angle for a given elapsed time
///
/// Wrapped to one turn so long sessions keep full f32 precision.
pub fn spin_angle(elapsed_ms: f64, speed: f32) -> f32 {
    let angle = elapsed_ms * f64::from(speed);
    angle.rem_euclid(std::f64::consts::TAU) as f32
}

/// Symmetric perspective frustum
///
/// Requires `0 < fov_y < pi`, `aspect > 0` and `0 < near < far`.
pub fn perspective_projection_matrix(
    fov_y_radians: f32,
    aspect_ratio: f32,
    near: f32,
    far: f32,
) -> Result<Mat4, ParameterError> {
    if !(fov_y_radians > 0.0 && fov_y_radians < std::f32::consts::PI) {
        return Err(ParameterError::InvalidFieldOfView(fov_y_radians));
    }
    if !(aspect_ratio > 0.0 && aspect_ratio.is_finite()) {
        return Err(ParameterError::InvalidAspectRatio(aspect_ratio));
    }
    if !(near > 0.0 && near < far && far.is_finite()) {
        return Err(ParameterError::InvalidProjection { near, far });
    }

    let f = 1.0 / (fov_y_radians * 0.5).tan();
    let range_inv = 1.0 / (near - far);

    Ok(Mat4::new(
        f / aspect_ratio, 0.0, 0.0, 0.0,
        0.0, f, 0.0, 0.0,
        0.0, 0.0, (near + far) * range_inv, 2.0 * near * far * range_inv,
        0.0, 0.0, -1.0, 0.0,
    ))
}

/// View matrix for a camera with an arbitrary world transform
///
/// The view matrix is the inverse of the camera's placement in the world.
pub fn view_matrix_from_camera_transform(camera_world: &Mat4) -> Result<Mat4, MathError> {
    invert_matrix(camera_world)
}

/// View matrix for a camera placed at `position` with no rotation
///
/// This is the canonical path: build the camera world transform and invert it.
pub fn view_matrix_from_camera(position: &Vec3) -> Result<Mat4, MathError> {
    view_matrix_from_camera_transform(&translation_matrix(position.x, position.y, position.z))
}

/// Shortcut view matrix for an unrotated camera: the negated translation
///
/// Must agree with [`view_matrix_from_camera`] for pure-translation cameras.
pub fn view_matrix_from_translation(position: &Vec3) -> Mat4 {
    translation_matrix(-position.x, -position.y, -position.z)
}

/// Inverse-transpose of the upper 3x3 of `m`
///
/// Pass the model matrix for world-space shading (what the lesson pipeline
/// does) or model-view for eye-space shading.
pub fn normal_matrix(m: &Mat4) -> Result<Mat3, MathError> {
    let inverse = invert_matrix_3x3(&top_left_3x3(m))?;
    Ok(transpose_3x3(&inverse))
}
