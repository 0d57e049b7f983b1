//! Named uniform boundary
//!
//! The names, sizes and layout here must match the paired shading stage
//! exactly; this is the one place that maps typed lesson state to the flat
//! values a program receives.

use crate::foundation::math::{mat3_to_array, mat4_to_array, Vec3};
use crate::render::lighting::{LightingEnvironment, MAX_LIGHTS};
use crate::render::material::Material;
use crate::render::pipeline::FrameTransforms;
use crate::render::shading::LightingMode;
use crate::render::{RenderError, RenderResult};

/// Uniform names shared with the shading stage
pub mod names {
    /// Object-to-world matrix (16 floats)
    pub const MODEL: &str = "model";
    /// World-to-camera matrix (16 floats)
    pub const VIEW: &str = "view";
    /// Camera-to-clip matrix (16 floats)
    pub const PROJECTION: &str = "projection";
    /// Inverse-transpose of the model 3x3 (9 floats)
    pub const NORMAL_MATRIX: &str = "normalMatrix";
    /// Material diffuse color (4 floats)
    pub const COLOR: &str = "color";
    /// Material specular color (4 floats)
    pub const SPECULAR_COLOR: &str = "specularColor";
    /// Specular scale
    pub const SPECULAR_AMOUNT: &str = "specularAmount";
    /// Specular exponent
    pub const SPECULAR_SHININESS: &str = "specularShininess";
    /// World-space camera position (3 floats)
    pub const CAMERA_POSITION: &str = "cameraPosition";
    /// Unit direction toward the directional light (3 floats)
    pub const LIGHT_DIRECTION: &str = "lightDirection";
    /// Number of active point lights
    pub const LIGHT_COUNT: &str = "lightCount";
    /// Point-light positions (3 floats per light)
    pub const LIGHT_POSITION: &str = "lightPosition";
    /// Point-light colors (3 floats per light)
    pub const LIGHT_COLOR: &str = "lightColor";
    /// Point-light intensities
    pub const LIGHT_INTENSITY: &str = "lightIntensity";
    /// Point-light linear attenuation
    pub const LIGHT_LINEAR_ATTENUATION: &str = "lightLinearAttenuation";
    /// Point-light quadratic attenuation
    pub const LIGHT_QUADRATIC_ATTENUATION: &str = "lightQuadraticAttenuation";
}

/// Value uploaded to one uniform
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    /// Scalar
    Float(f32),
    /// Integer scalar
    Int(i32),
    /// vec3
    Vec3([f32; 3]),
    /// vec4
    Vec4([f32; 4]),
    /// Column-major mat3
    Mat3([f32; 9]),
    /// Column-major mat4
    Mat4([f32; 16]),
    /// Concatenated array elements
    FloatArray(Vec<f32>),
}

impl UniformValue {
    /// Number of scalar components
    pub fn len(&self) -> usize {
        match self {
            Self::Float(_) | Self::Int(_) => 1,
            Self::Vec3(_) => 3,
            Self::Vec4(_) => 4,
            Self::Mat3(_) => 9,
            Self::Mat4(_) => 16,
            Self::FloatArray(values) => values.len(),
        }
    }

    /// True for an empty array
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Components as floats, in upload order
    pub fn as_floats(&self) -> Vec<f32> {
        match self {
            Self::Float(v) => vec![*v],
            Self::Int(v) => vec![*v as f32],
            Self::Vec3(v) => v.to_vec(),
            Self::Vec4(v) => v.to_vec(),
            Self::Mat3(v) => v.to_vec(),
            Self::Mat4(v) => v.to_vec(),
            Self::FloatArray(v) => v.clone(),
        }
    }
}

/// Uniform a program declares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformDecl {
    /// Uniform name
    pub name: &'static str,
    /// Scalars per element
    pub components: usize,
    /// Array length (1 for non-arrays)
    pub max_elements: usize,
}

impl UniformDecl {
    const fn single(name: &'static str, components: usize) -> Self {
        Self {
            name,
            components,
            max_elements: 1,
        }
    }

    const fn array(name: &'static str, components: usize) -> Self {
        Self {
            name,
            components,
            max_elements: MAX_LIGHTS,
        }
    }

    /// Check a value's size against this declaration
    pub fn check(&self, value: &UniformValue) -> RenderResult<()> {
        let len = value.len();
        let fits = if self.max_elements == 1 {
            len == self.components
        } else {
            len % self.components == 0 && len <= self.components * self.max_elements
        };
        if fits {
            Ok(())
        } else {
            Err(RenderError::UniformSizeMismatch {
                name: self.name.to_string(),
                expected: self.components * self.max_elements,
                actual: len,
            })
        }
    }
}

/// Uniforms the program for `mode` declares
pub fn required_uniforms(mode: LightingMode) -> Vec<UniformDecl> {
    use names::*;

    let mut decls = vec![
        UniformDecl::single(MODEL, 16),
        UniformDecl::single(VIEW, 16),
        UniformDecl::single(PROJECTION, 16),
    ];
    if mode.uses_normal_matrix() {
        decls.push(UniformDecl::single(NORMAL_MATRIX, 9));
    }
    if !matches!(
        mode,
        LightingMode::NormalVisualization | LightingMode::TransformedNormals
    ) {
        decls.push(UniformDecl::single(COLOR, 4));
    }
    match mode {
        LightingMode::Lambert => {
            decls.push(UniformDecl::single(LIGHT_DIRECTION, 3));
        }
        LightingMode::BlinnPhong => {
            decls.extend([
                UniformDecl::single(LIGHT_DIRECTION, 3),
                UniformDecl::single(CAMERA_POSITION, 3),
                UniformDecl::single(SPECULAR_COLOR, 4),
                UniformDecl::single(SPECULAR_AMOUNT, 1),
                UniformDecl::single(SPECULAR_SHININESS, 1),
            ]);
        }
        LightingMode::MultiLight => {
            decls.extend([
                UniformDecl::single(LIGHT_COUNT, 1),
                UniformDecl::array(LIGHT_POSITION, 3),
                UniformDecl::array(LIGHT_COLOR, 3),
                UniformDecl::array(LIGHT_INTENSITY, 1),
                UniformDecl::array(LIGHT_LINEAR_ATTENUATION, 1),
                UniformDecl::array(LIGHT_QUADRATIC_ATTENUATION, 1),
            ]);
        }
        LightingMode::Unlit | LightingMode::NormalVisualization | LightingMode::TransformedNormals => {}
    }
    decls
}

/// Ordered set of uniform values for one draw
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameUniforms {
    values: Vec<(&'static str, UniformValue)>,
}

impl FrameUniforms {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing any earlier value for the same name
    pub fn set(&mut self, name: &'static str, value: UniformValue) {
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name, value)),
        }
    }

    /// Value for `name`
    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.values.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    /// Values in upload order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &UniformValue)> {
        self.values.iter().map(|(n, v)| (*n, v))
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no value is set
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Flatten a frame's typed state into the uniforms `mode` declares
    ///
    /// Fails when a light-dependent mode has no suitable light, so the frame
    /// is skipped rather than drawn with stale or missing lighting.
    pub fn for_mode(
        mode: LightingMode,
        transforms: &FrameTransforms,
        material: &Material,
        environment: &LightingEnvironment,
        camera_position: &Vec3,
    ) -> RenderResult<Self> {
        use names::*;

        let mut uniforms = Self::new();
        uniforms.set(MODEL, UniformValue::Mat4(mat4_to_array(&transforms.model)));
        uniforms.set(VIEW, UniformValue::Mat4(mat4_to_array(&transforms.view)));
        uniforms.set(PROJECTION, UniformValue::Mat4(mat4_to_array(&transforms.projection)));

        if mode.uses_normal_matrix() {
            uniforms.set(
                NORMAL_MATRIX,
                UniformValue::Mat3(mat3_to_array(&transforms.normal_matrix)),
            );
        }
        if !matches!(
            mode,
            LightingMode::NormalVisualization | LightingMode::TransformedNormals
        ) {
            uniforms.set(COLOR, UniformValue::Vec4(material.color_array()));
        }

        match mode {
            LightingMode::Lambert | LightingMode::BlinnPhong => {
                let light = environment.primary_directional().ok_or_else(|| {
                    RenderError::ResourceUnavailable(format!("{mode} lesson needs a directional light"))
                })?;
                uniforms.set(LIGHT_DIRECTION, UniformValue::Vec3(light.direction_array()));

                if mode == LightingMode::BlinnPhong {
                    uniforms.set(
                        CAMERA_POSITION,
                        UniformValue::Vec3([camera_position.x, camera_position.y, camera_position.z]),
                    );
                    uniforms.set(SPECULAR_COLOR, UniformValue::Vec4(material.specular_color_array()));
                    uniforms.set(SPECULAR_AMOUNT, UniformValue::Float(material.specular_amount));
                    uniforms.set(SPECULAR_SHININESS, UniformValue::Float(material.specular_shininess));
                }
            }
            LightingMode::MultiLight => {
                let arrays = environment.flatten();
                if arrays.count == 0 {
                    return Err(RenderError::ResourceUnavailable(
                        "multi-light lesson needs at least one point light".to_string(),
                    ));
                }
                let count = i32::try_from(arrays.count).unwrap_or(i32::MAX);
                uniforms.set(LIGHT_COUNT, UniformValue::Int(count));
                uniforms.set(LIGHT_POSITION, UniformValue::FloatArray(arrays.position));
                uniforms.set(LIGHT_COLOR, UniformValue::FloatArray(arrays.color));
                uniforms.set(LIGHT_INTENSITY, UniformValue::FloatArray(arrays.intensity));
                uniforms.set(
                    LIGHT_LINEAR_ATTENUATION,
                    UniformValue::FloatArray(arrays.linear_attenuation),
                );
                uniforms.set(
                    LIGHT_QUADRATIC_ATTENUATION,
                    UniformValue::FloatArray(arrays.quadratic_attenuation),
                );
            }
            LightingMode::Unlit | LightingMode::NormalVisualization | LightingMode::TransformedNormals => {}
        }

        Ok(uniforms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Mat3, Mat4, Vec4};
    use crate::render::lighting::Light;

    fn transforms() -> FrameTransforms {
        FrameTransforms {
            model: Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0)),
            view: Mat4::identity(),
            projection: Mat4::identity(),
            normal_matrix: Mat3::identity(),
        }
    }

    fn environment() -> LightingEnvironment {
        LightingEnvironment::new()
            .with_light(Light::directional("sun", Vec3::y(), Vec3::new(1.0, 1.0, 1.0), 1.0).unwrap())
            .unwrap()
            .with_light(
                Light::point("lamp", Vec3::new(0.0, 3.0, 0.0), Vec3::new(1.0, 0.5, 0.0), 2.0, 0.1, 0.001)
                    .unwrap(),
            )
            .unwrap()
    }

    #[test]
    fn test_every_mode_matches_its_declaration() {
        let material = Material::default()
            .with_specular(Vec4::new(1.0, 1.0, 1.0, 1.0), 0.5, 20.0)
            .unwrap();
        for mode in LightingMode::ALL {
            let uniforms =
                FrameUniforms::for_mode(mode, &transforms(), &material, &environment(), &Vec3::z())
                    .unwrap();
            let decls = required_uniforms(mode);
            assert_eq!(uniforms.len(), decls.len(), "{mode}");
            for decl in decls {
                let value = uniforms
                    .get(decl.name)
                    .unwrap_or_else(|| panic!("{mode} is missing {}", decl.name));
                decl.check(value).unwrap();
            }
        }
    }

    #[test]
    fn test_model_is_column_major() {
        let uniforms = FrameUniforms::for_mode(
            LightingMode::Unlit,
            &transforms(),
            &Material::default(),
            &LightingEnvironment::new(),
            &Vec3::z(),
        )
        .unwrap();
        let Some(UniformValue::Mat4(model)) = uniforms.get(names::MODEL) else {
            panic!("model missing");
        };
        assert_eq!(&model[12..16], &[1.0, 2.0, 3.0, 1.0]);
    }

    #[test]
    fn test_multi_light_arrays() {
        let uniforms = FrameUniforms::for_mode(
            LightingMode::MultiLight,
            &transforms(),
            &Material::default(),
            &environment(),
            &Vec3::z(),
        )
        .unwrap();
        assert_eq!(uniforms.get(names::LIGHT_COUNT), Some(&UniformValue::Int(1)));
        assert_eq!(
            uniforms.get(names::LIGHT_POSITION),
            Some(&UniformValue::FloatArray(vec![0.0, 3.0, 0.0]))
        );
        assert_eq!(
            uniforms.get(names::LIGHT_QUADRATIC_ATTENUATION),
            Some(&UniformValue::FloatArray(vec![0.001]))
        );
    }

    #[test]
    fn test_missing_light_is_reported() {
        let result = FrameUniforms::for_mode(
            LightingMode::Lambert,
            &transforms(),
            &Material::default(),
            &LightingEnvironment::new(),
            &Vec3::z(),
        );
        assert!(matches!(result, Err(RenderError::ResourceUnavailable(_))));
    }

    #[test]
    fn test_decl_size_checks() {
        let mat = UniformDecl::single(names::MODEL, 16);
        assert!(mat.check(&UniformValue::Mat4([0.0; 16])).is_ok());
        assert!(mat.check(&UniformValue::Mat3([0.0; 9])).is_err());

        let positions = UniformDecl::array(names::LIGHT_POSITION, 3);
        assert!(positions.check(&UniformValue::FloatArray(vec![0.0; 6])).is_ok());
        assert!(positions.check(&UniformValue::FloatArray(vec![0.0; 7])).is_err());
        assert!(positions
            .check(&UniformValue::FloatArray(vec![0.0; 3 * (MAX_LIGHTS + 1)]))
            .is_err());
    }

    #[test]
    fn test_set_replaces_existing() {
        let mut uniforms = FrameUniforms::new();
        uniforms.set(names::SPECULAR_AMOUNT, UniformValue::Float(1.0));
        uniforms.set(names::SPECULAR_AMOUNT, UniformValue::Float(2.0));
        assert_eq!(uniforms.len(), 1);
        assert_eq!(uniforms.get(names::SPECULAR_AMOUNT), Some(&UniformValue::Float(2.0)));
    }
}
