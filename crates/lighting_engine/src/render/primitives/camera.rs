//! # 3D Camera
//!
//! Fixed-orientation perspective camera for the lessons. The camera looks down
//! -Z from its world position; it may be translated but never rotated, so its
//! view matrix is the inverse of a pure translation.

use crate::foundation::math::{utils, Mat4, MathError, Vec3};
use crate::render::transforms::{perspective_projection_matrix, view_matrix_from_camera};
use crate::render::ParameterError;

/// Perspective camera
///
/// Projection parameters are validated on construction and on every setter,
/// so `projection_matrix` only fails if the public fields are edited by hand
/// into an invalid state.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,

    /// Vertical field of view in radians
    pub fov: f32,

    /// Aspect ratio (width / height)
    pub aspect: f32,

    /// Distance to near clipping plane
    pub near: f32,

    /// Distance to far clipping plane
    pub far: f32,
}

impl Camera {
    /// Create a perspective camera
    ///
    /// # Arguments
    /// * `position` - Camera position in world space
    /// * `fov_degrees` - Vertical field of view in degrees
    /// * `aspect` - Aspect ratio (width / height) of the viewport
    /// * `near` - Distance to near clipping plane (must be > 0)
    /// * `far` - Distance to far clipping plane (must be > near)
    pub fn perspective(
        position: Vec3,
        fov_degrees: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Result<Self, ParameterError> {
        let camera = Self {
            position,
            fov: utils::deg_to_rad(fov_degrees),
            aspect,
            near,
            far,
        };
        camera.projection_matrix()?;
        Ok(camera)
    }

    /// Move the camera
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        log::trace!("Camera position updated to: {:?}", position);
    }

    /// Update the aspect ratio, e.g. after a viewport resize
    pub fn set_aspect_ratio(&mut self, aspect: f32) -> Result<(), ParameterError> {
        if !(aspect > 0.0 && aspect.is_finite()) {
            return Err(ParameterError::InvalidAspectRatio(aspect));
        }
        if approx::abs_diff_ne!(self.aspect, aspect, epsilon = 0.01) {
            log::info!("Camera aspect ratio changed: {:.3} -> {:.3}", self.aspect, aspect);
        }
        self.aspect = aspect;
        Ok(())
    }

    /// World-to-camera transform
    pub fn view_matrix(&self) -> Result<Mat4, MathError> {
        view_matrix_from_camera(&self.position)
    }

    /// Camera-to-clip transform
    pub fn projection_matrix(&self) -> Result<Mat4, ParameterError> {
        perspective_projection_matrix(self.fov, self.aspect, self.near, self.far)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            fov: utils::deg_to_rad(50.0),
            aspect: 1.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_camera_is_valid() {
        let camera = Camera::default();
        assert!(camera.projection_matrix().is_ok());
        assert!(camera.view_matrix().is_ok());
    }

    #[test]
    fn test_perspective_converts_degrees() {
        let camera = Camera::perspective(Vec3::zeros(), 90.0, 1.0, 0.1, 10.0).unwrap();
        assert_relative_eq!(camera.fov, std::f32::consts::FRAC_PI_2, epsilon = 1e-6);
    }

    #[test]
    fn test_perspective_rejects_inverted_planes() {
        let result = Camera::perspective(Vec3::zeros(), 60.0, 1.0, 10.0, 0.5);
        assert!(matches!(result, Err(ParameterError::InvalidProjection { .. })));
    }

    #[test]
    fn test_set_aspect_ratio_validates() {
        let mut camera = Camera::default();
        assert!(camera.set_aspect_ratio(16.0 / 9.0).is_ok());
        assert_relative_eq!(camera.aspect, 16.0 / 9.0);
        assert!(camera.set_aspect_ratio(-1.0).is_err());
        assert_relative_eq!(camera.aspect, 16.0 / 9.0);
    }

    #[test]
    fn test_view_matrix_follows_position() {
        let mut camera = Camera::default();
        camera.set_position(Vec3::new(0.0, 2.0, 8.0));
        let view = camera.view_matrix().unwrap();
        assert_relative_eq!(view[(1, 3)], -2.0);
        assert_relative_eq!(view[(2, 3)], -8.0);
    }
}
