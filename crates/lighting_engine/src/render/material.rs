//! Surface material
//!
//! Diffuse albedo plus optional Blinn-Phong specular parameters, and the
//! uniform block layout used by backends that upload materials as one buffer.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec4;
use crate::render::ParameterError;

/// Material description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Diffuse albedo RGB + opacity
    pub color: Vec4,
    /// Specular highlight RGB + unused alpha
    #[serde(default = "default_specular_color")]
    pub specular_color: Vec4,
    /// Scale of the specular contribution (>= 0)
    #[serde(default)]
    pub specular_amount: f32,
    /// Highlight falloff exponent (>= 1)
    #[serde(default = "default_shininess")]
    pub specular_shininess: f32,
}

fn default_specular_color() -> Vec4 {
    Vec4::new(1.0, 1.0, 1.0, 1.0)
}

const fn default_shininess() -> f32 {
    1.0
}

impl Material {
    /// Diffuse-only material
    pub fn new(color: Vec4) -> Self {
        Self {
            color,
            specular_color: default_specular_color(),
            specular_amount: 0.0,
            specular_shininess: default_shininess(),
        }
    }

    /// Add a specular highlight
    pub fn with_specular(
        mut self,
        specular_color: Vec4,
        amount: f32,
        shininess: f32,
    ) -> Result<Self, ParameterError> {
        self.specular_color = specular_color;
        self.specular_amount = amount;
        self.specular_shininess = shininess;
        self.validate()?;
        Ok(self)
    }

    /// Check specular ranges
    pub fn validate(&self) -> Result<(), ParameterError> {
        if !(self.specular_amount >= 0.0) {
            return Err(ParameterError::NegativeSpecularAmount(self.specular_amount));
        }
        if !(self.specular_shininess >= 1.0) {
            return Err(ParameterError::InvalidShininess(self.specular_shininess));
        }
        Ok(())
    }

    /// Color as array for uniform upload
    pub fn color_array(&self) -> [f32; 4] {
        [self.color.x, self.color.y, self.color.z, self.color.w]
    }

    /// Specular color as array for uniform upload
    pub fn specular_color_array(&self) -> [f32; 4] {
        [
            self.specular_color.x,
            self.specular_color.y,
            self.specular_color.z,
            self.specular_color.w,
        ]
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new(Vec4::new(0.8, 1.0, 1.0, 1.0))
    }
}

/// Material uniform block
///
/// std140-compatible: two vec4s followed by `[amount, shininess, 0, 0]`,
/// every member on a 16-byte offset.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialUniforms {
    /// Diffuse color RGBA
    pub color: [f32; 4],
    /// Specular color RGBA
    pub specular_color: [f32; 4],
    /// Specular amount, shininess, padding
    pub specular_params: [f32; 4],
}

impl MaterialUniforms {
    /// Create from a material
    pub fn from_material(material: &Material) -> Self {
        Self {
            color: material.color_array(),
            specular_color: material.specular_color_array(),
            specular_params: [material.specular_amount, material.specular_shininess, 0.0, 0.0],
        }
    }

    /// Byte view for buffer upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_uniform_layout() {
        assert_eq!(std::mem::size_of::<MaterialUniforms>(), 48); // 3 * 16 bytes
        assert_eq!(std::mem::offset_of!(MaterialUniforms, specular_color), 16);
        assert_eq!(std::mem::offset_of!(MaterialUniforms, specular_params), 32);
    }

    #[test]
    fn test_material_conversion() {
        let material = Material::new(Vec4::new(0.8, 0.6, 0.4, 0.9))
            .with_specular(Vec4::new(1.0, 1.0, 0.5, 1.0), 0.7, 32.0)
            .unwrap();
        let uniforms = MaterialUniforms::from_material(&material);

        assert_eq!(uniforms.color, [0.8, 0.6, 0.4, 0.9]);
        assert_eq!(uniforms.specular_color, [1.0, 1.0, 0.5, 1.0]);
        assert_eq!(uniforms.specular_params, [0.7, 32.0, 0.0, 0.0]);
        assert_eq!(uniforms.as_bytes().len(), 48);
    }

    #[test]
    fn test_specular_ranges() {
        let base = Material::default();
        assert_eq!(
            base.clone().with_specular(Vec4::zeros(), 1.0, 0.5),
            Err(ParameterError::InvalidShininess(0.5))
        );
        assert_eq!(
            base.with_specular(Vec4::zeros(), -1.0, 10.0),
            Err(ParameterError::NegativeSpecularAmount(-1.0))
        );
    }

    #[test]
    fn test_default_is_diffuse_only() {
        let material = Material::default();
        assert_eq!(material.specular_amount, 0.0);
        assert!(material.validate().is_ok());
    }
}
