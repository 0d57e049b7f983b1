//! Lighting system
//!
//! Typed light descriptions and the flattened uniform arrays the shading stage
//! reads. Lights are built once at scene setup and only change through the
//! debug panel, which must re-run [`Light::prepare`] and re-flatten before the
//! next draw.
//!
//! Directions are stored pointing *toward* the light, so a light shining down
//! from above has direction `+Y` and `dot(normal, direction)` is the
//! Lambertian cosine.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{normalize, MathError, Vec3};
use crate::render::{ParameterError, RenderResult};

/// Maximum number of point lights the uniform arrays hold
pub const MAX_LIGHTS: usize = 8;

/// Light types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightType {
    /// Parallel rays from a fixed direction (like sunlight)
    Directional,
    /// Omnidirectional light from a position, attenuated with distance
    Point,
}

/// Light source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Light {
    /// Name shown on the debug panel
    #[serde(default)]
    pub name: String,
    /// Light type
    pub light_type: LightType,
    /// Light position (point lights)
    #[serde(default)]
    pub position: Vec3,
    /// Unit direction toward the light (directional lights)
    #[serde(default)]
    pub direction: Vec3,
    /// Linear RGB color, 0..1 per channel
    pub color: Vec3,
    /// Intensity multiplier
    pub intensity: f32,
    /// Linear falloff coefficient
    #[serde(default)]
    pub linear_attenuation: f32,
    /// Quadratic falloff coefficient
    #[serde(default)]
    pub quadratic_attenuation: f32,
}

impl Light {
    /// Create a directional light
    ///
    /// `direction` is normalized; a zero direction is rejected.
    pub fn directional(
        name: impl Into<String>,
        direction: Vec3,
        color: Vec3,
        intensity: f32,
    ) -> RenderResult<Self> {
        let mut light = Self {
            name: name.into(),
            light_type: LightType::Directional,
            position: Vec3::zeros(),
            direction,
            color,
            intensity,
            linear_attenuation: 0.0,
            quadratic_attenuation: 0.0,
        };
        light.prepare()?;
        Ok(light)
    }

    /// Create a point light with distance attenuation
    pub fn point(
        name: impl Into<String>,
        position: Vec3,
        color: Vec3,
        intensity: f32,
        linear_attenuation: f32,
        quadratic_attenuation: f32,
    ) -> RenderResult<Self> {
        let mut light = Self {
            name: name.into(),
            light_type: LightType::Point,
            position,
            direction: Vec3::zeros(),
            color,
            intensity,
            linear_attenuation,
            quadratic_attenuation,
        };
        light.prepare()?;
        Ok(light)
    }

    /// Validate ranges and re-derive the unit direction
    ///
    /// Run after construction, deserialization or a debug-panel edit. On error
    /// the light is left unchanged.
    pub fn prepare(&mut self) -> RenderResult<()> {
        if !(self.intensity >= 0.0) {
            return Err(ParameterError::NegativeIntensity(self.intensity).into());
        }
        if !(self.linear_attenuation >= 0.0 && self.quadratic_attenuation >= 0.0) {
            return Err(ParameterError::NegativeAttenuation {
                linear: self.linear_attenuation,
                quadratic: self.quadratic_attenuation,
            }
            .into());
        }
        if self.light_type == LightType::Directional {
            self.direction = normalize(&self.direction)?;
        }
        Ok(())
    }

    /// Unit direction from `surface_position` toward this light
    ///
    /// Fixed for directional lights; for point lights it fails when the
    /// surface point coincides with the light.
    pub fn direction_to(&self, surface_position: &Vec3) -> Result<Vec3, MathError> {
        match self.light_type {
            LightType::Directional => Ok(self.direction),
            LightType::Point => normalize(&(self.position - surface_position)),
        }
    }

    /// Color scaled by intensity
    pub fn radiance(&self) -> Vec3 {
        self.color * self.intensity
    }

    /// Get direction as array for uniform upload
    pub fn direction_array(&self) -> [f32; 3] {
        [self.direction.x, self.direction.y, self.direction.z]
    }

    /// Get color as array for uniform upload
    pub fn color_array(&self) -> [f32; 3] {
        [self.color.x, self.color.y, self.color.z]
    }

    /// Get position as array for uniform upload
    pub fn position_array(&self) -> [f32; 3] {
        [self.position.x, self.position.y, self.position.z]
    }
}

/// Point-light parameters flattened into parallel arrays
///
/// Layout per light, in environment order: position (3 floats), color (3),
/// intensity (1), linear attenuation (1), quadratic attenuation (1).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightUniformArrays {
    /// Number of lights flattened
    pub count: usize,
    /// Concatenated positions
    pub position: Vec<f32>,
    /// Concatenated colors
    pub color: Vec<f32>,
    /// Intensities
    pub intensity: Vec<f32>,
    /// Linear attenuation coefficients
    pub linear_attenuation: Vec<f32>,
    /// Quadratic attenuation coefficients
    pub quadratic_attenuation: Vec<f32>,
}

/// Ordered set of lights for one lesson
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LightingEnvironment {
    /// Lights in upload order
    pub lights: Vec<Light>,
}

impl LightingEnvironment {
    /// Create a new empty lighting environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a light, rejecting it when the point-light arrays are full
    pub fn add_light(&mut self, light: Light) -> Result<(), ParameterError> {
        if light.light_type == LightType::Point && self.point_lights().count() >= MAX_LIGHTS {
            return Err(ParameterError::TooManyLights {
                count: self.point_lights().count() + 1,
                max: MAX_LIGHTS,
            });
        }
        self.lights.push(light);
        Ok(())
    }

    /// Builder form of [`add_light`](Self::add_light)
    pub fn with_light(mut self, light: Light) -> Result<Self, ParameterError> {
        self.add_light(light)?;
        Ok(self)
    }

    /// Validate every light and the point-light limit
    pub fn prepare(&mut self) -> RenderResult<()> {
        let point_count = self.point_lights().count();
        if point_count > MAX_LIGHTS {
            return Err(ParameterError::TooManyLights {
                count: point_count,
                max: MAX_LIGHTS,
            }
            .into());
        }
        for light in &mut self.lights {
            light.prepare()?;
        }
        Ok(())
    }

    /// First directional light, the one single-light lessons use
    pub fn primary_directional(&self) -> Option<&Light> {
        self.lights
            .iter()
            .find(|l| l.light_type == LightType::Directional)
    }

    /// Point lights in upload order
    pub fn point_lights(&self) -> impl Iterator<Item = &Light> {
        self.lights
            .iter()
            .filter(|l| l.light_type == LightType::Point)
    }

    /// Find a light by name
    pub fn light_mut(&mut self, name: &str) -> Option<&mut Light> {
        self.lights.iter_mut().find(|l| l.name == name)
    }

    /// Flatten the point lights into the uniform array layout
    pub fn flatten(&self) -> LightUniformArrays {
        let mut arrays = LightUniformArrays::default();
        for light in self.point_lights() {
            arrays.position.extend_from_slice(&light.position_array());
            arrays.color.extend_from_slice(&light.color_array());
            arrays.intensity.push(light.intensity);
            arrays.linear_attenuation.push(light.linear_attenuation);
            arrays.quadratic_attenuation.push(light.quadratic_attenuation);
            arrays.count += 1;
        }
        arrays
    }
}
