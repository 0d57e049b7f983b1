//! # Lesson Configuration
//!
//! Everything one lesson needs to build its pipeline: which lighting mode to
//! run, the camera, the procedural mesh, the material and the lights. Loaded
//! from TOML or RON, or taken from one of the built-in presets.
//!
//! ```toml
//! lesson = "lambert"
//! mode = "Lambert"
//! rotation_speed = 0.0005
//!
//! [camera]
//! position = [0.0, 0.0, 5.0]
//! fov_degrees = 50.0
//!
//! [[lights]]
//! name = "sun"
//! light_type = "Directional"
//! direction = [0.2, 1.0, 0.5]
//! color = [1.0, 1.0, 1.0]
//! intensity = 1.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};
use crate::foundation::math::{Vec3, Vec4};
use crate::render::lighting::{Light, LightType, LightingEnvironment};
use crate::render::material::Material;
use crate::render::primitives::{Camera, MeshData, MeshError};
use crate::render::shading::LightingMode;
use crate::render::transforms::DEFAULT_ROTATION_SPEED;
use crate::render::{ParameterError, RenderResult};

/// Camera parameters as written in a config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// World position
    pub position: Vec3,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Width / height
    pub aspect: f32,
    /// Near plane distance
    pub near: f32,
    /// Far plane distance
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            fov_degrees: 50.0,
            aspect: 1.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

/// Procedural stand-in for the rabbit mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Latitude bands
    pub rings: u32,
    /// Longitude bands
    pub segments: u32,
    /// Sphere radius
    pub radius: f32,
}

impl MeshConfig {
    /// Finest resolution accepted along either axis
    pub const MAX_BANDS: u32 = 1024;

    /// Reject resolutions and radii the sphere generator cannot build
    pub fn validate(&self) -> Result<(), ParameterError> {
        for (name, bands) in [("mesh.rings", self.rings), ("mesh.segments", self.segments)] {
            if bands > Self::MAX_BANDS {
                return Err(ParameterError::OutOfRange {
                    name: name.to_string(),
                    reason: format!("{bands} exceeds the maximum of {}", Self::MAX_BANDS),
                });
            }
        }
        if !(self.radius > 0.0 && self.radius.is_finite()) {
            return Err(ParameterError::OutOfRange {
                name: "mesh.radius".to_string(),
                reason: format!("{} is not a positive finite radius", self.radius),
            });
        }
        Ok(())
    }
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            rings: 24,
            segments: 32,
            radius: 1.0,
        }
    }
}

/// Configuration for one lesson
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LessonConfig {
    /// Display name
    pub lesson: String,
    /// Lighting technique
    pub mode: LightingMode,
    /// Default log filter, overridden by `RUST_LOG`
    pub log_level: String,
    /// Spin speed in radians per elapsed millisecond
    pub rotation_speed: f32,
    /// Object position in world space
    pub model_translation: Vec3,
    /// Stop after this many frames (runs until the host stops it when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_limit: Option<u64>,
    /// Camera parameters
    pub camera: CameraConfig,
    /// Mesh parameters
    pub mesh: MeshConfig,
    /// Surface material
    pub material: Material,
    /// Lights in upload order
    pub lights: Vec<Light>,
}

impl Default for LessonConfig {
    fn default() -> Self {
        Self::preset(LightingMode::Unlit)
    }
}

impl Config for LessonConfig {}

impl LessonConfig {
    /// Built-in configuration reproducing the lesson for `mode`
    pub fn preset(mode: LightingMode) -> Self {
        let mut config = Self {
            lesson: mode.name().to_string(),
            mode,
            log_level: "info".to_string(),
            rotation_speed: DEFAULT_ROTATION_SPEED,
            model_translation: Vec3::zeros(),
            frame_limit: None,
            camera: CameraConfig::default(),
            mesh: MeshConfig::default(),
            material: Material::new(Vec4::new(0.8, 1.0, 1.0, 1.0)),
            lights: Vec::new(),
        };

        match mode {
            LightingMode::Unlit | LightingMode::NormalVisualization | LightingMode::TransformedNormals => {}
            LightingMode::Lambert => {
                config.lights.push(sun());
            }
            LightingMode::BlinnPhong => {
                config.lights.push(sun());
                config.material.specular_color = Vec4::new(1.0, 1.0, 1.0, 1.0);
                config.material.specular_amount = 0.6;
                config.material.specular_shininess = 40.0;
            }
            LightingMode::MultiLight => {
                config.lights.extend([
                    lamp("red", Vec3::new(3.0, 2.0, 3.0), Vec3::new(1.0, 0.2, 0.2)),
                    lamp("green", Vec3::new(-3.0, 2.0, 3.0), Vec3::new(0.2, 1.0, 0.2)),
                    lamp("blue", Vec3::new(0.0, -3.0, 3.0), Vec3::new(0.2, 0.2, 1.0)),
                ]);
            }
        }
        config
    }

    /// Preset looked up by lesson name, e.g. `"blinn-phong"`
    pub fn for_lesson(name: &str) -> Result<Self, ParameterError> {
        Ok(Self::preset(name.parse()?))
    }

    /// Load from a `.toml` or `.ron` file and validate
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::load_from_file(path.as_ref())?;
        config.validate()?;
        log::info!("Loaded lesson '{}' from {}", config.lesson, path.as_ref().display());
        Ok(config)
    }

    /// Reject ranges that would produce a degenerate matrix or light
    pub fn validate(&self) -> RenderResult<()> {
        if !self.rotation_speed.is_finite() {
            return Err(ParameterError::OutOfRange {
                name: "rotation_speed".to_string(),
                reason: format!("{} is not finite", self.rotation_speed),
            }
            .into());
        }
        self.camera()?;
        self.mesh.validate()?;
        self.material.validate()?;
        let environment = self.lighting_environment()?;

        let has_required_light = match self.mode {
            LightingMode::Lambert | LightingMode::BlinnPhong => {
                environment.primary_directional().is_some()
            }
            LightingMode::MultiLight => environment.point_lights().next().is_some(),
            LightingMode::Unlit | LightingMode::NormalVisualization | LightingMode::TransformedNormals => true,
        };
        if !has_required_light {
            return Err(ParameterError::OutOfRange {
                name: "lights".to_string(),
                reason: format!("{} lesson has no suitable light", self.mode),
            }
            .into());
        }
        Ok(())
    }

    /// Camera built from the configured parameters
    pub fn camera(&self) -> Result<Camera, ParameterError> {
        let c = &self.camera;
        Camera::perspective(c.position, c.fov_degrees, c.aspect, c.near, c.far)
    }

    /// Lights validated and normalized, ready to flatten
    pub fn lighting_environment(&self) -> RenderResult<LightingEnvironment> {
        let mut environment = LightingEnvironment::new();
        for light in &self.lights {
            let mut light = light.clone();
            light.prepare()?;
            environment.add_light(light)?;
        }
        Ok(environment)
    }

    /// Mesh the lesson draws
    pub fn mesh(&self) -> Result<MeshData, MeshError> {
        MeshData::uv_sphere(self.mesh.rings, self.mesh.segments, self.mesh.radius)
    }

    /// Set the frame limit
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }
}

fn sun() -> Light {
    Light {
        name: "sun".to_string(),
        light_type: LightType::Directional,
        position: Vec3::zeros(),
        direction: Vec3::new(0.2, 1.0, 0.5),
        color: Vec3::new(1.0, 1.0, 1.0),
        intensity: 1.0,
        linear_attenuation: 0.0,
        quadratic_attenuation: 0.0,
    }
}

fn lamp(name: &str, position: Vec3, color: Vec3) -> Light {
    Light {
        name: name.to_string(),
        light_type: LightType::Point,
        position,
        direction: Vec3::zeros(),
        color,
        intensity: 1.0,
        linear_attenuation: 0.0,
        quadratic_attenuation: 1.0 / 1000.0,
    }
}
