//! Parameter panel
//!
//! Backing model for a debug GUI: every parameter has a name and a declared
//! range, out-of-range input is clamped, and registered callbacks see each
//! accepted change. The panel never touches lights or materials on its own;
//! `apply_to_light` and `apply_to_material` re-derive dependent values and
//! write them back in one step. Only parameters that were actually set are
//! written back, so a field whose starting value lies outside its slider
//! range keeps that value until someone edits it.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::foundation::math::Vec3;
use crate::render::lighting::{Light, LightType};
use crate::render::material::Material;
use crate::render::{ParameterError, RenderResult};

/// Direction slider prefix (`direction.x`, `direction.y`, `direction.z`)
pub const DIRECTION: &str = "direction";
/// Position slider prefix (`position.x`, `position.y`, `position.z`)
pub const POSITION: &str = "position";
/// Light or diffuse color
pub const COLOR: &str = "color";
/// Light intensity
pub const INTENSITY: &str = "intensity";
/// Linear attenuation
pub const LINEAR_ATTENUATION: &str = "linear_attenuation";
/// Quadratic attenuation
pub const QUADRATIC_ATTENUATION: &str = "quadratic_attenuation";
/// Specular color
pub const SPECULAR_COLOR: &str = "specular_color";
/// Specular amount
pub const SPECULAR_AMOUNT: &str = "specular_amount";
/// Specular shininess
pub const SPECULAR_SHININESS: &str = "specular_shininess";

const AXES: [&str; 3] = ["x", "y", "z"];

/// Value reported to change callbacks
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterValue {
    /// Numeric slider value
    Number(f32),
    /// RGB color, each channel in 0..1
    Color(Vec3),
}

/// Numeric slider
#[derive(Debug, Clone, PartialEq)]
pub struct NumericParameter {
    /// Parameter name
    pub name: String,
    /// Smallest accepted value
    pub min: f32,
    /// Largest accepted value
    pub max: f32,
    /// Increment for `nudge`
    pub step: f32,
    /// Current value, always within `min..=max`
    pub value: f32,
}

impl NumericParameter {
    /// Declare a slider; the initial value is clamped into range
    pub fn new(
        name: impl Into<String>,
        min: f32,
        max: f32,
        step: f32,
        value: f32,
    ) -> Result<Self, ParameterError> {
        let name = name.into();
        if !(min <= max && step > 0.0 && min.is_finite() && max.is_finite()) {
            return Err(ParameterError::OutOfRange {
                name,
                reason: format!("invalid range {min}..={max} with step {step}"),
            });
        }
        let mut parameter = Self {
            name,
            min,
            max,
            step,
            value: min,
        };
        parameter.value = parameter.clamp(value)?;
        Ok(parameter)
    }

    /// Clamp into range, rejecting NaN
    pub fn clamp(&self, value: f32) -> Result<f32, ParameterError> {
        if value.is_nan() {
            return Err(ParameterError::OutOfRange {
                name: self.name.clone(),
                reason: "value is not a number".to_string(),
            });
        }
        Ok(value.clamp(self.min, self.max))
    }
}

/// RGB color picker
#[derive(Debug, Clone, PartialEq)]
pub struct ColorParameter {
    /// Parameter name
    pub name: String,
    /// Current color, each channel in 0..1
    pub value: Vec3,
}

impl ColorParameter {
    /// Declare a color picker; channels are clamped to 0..1
    pub fn new(name: impl Into<String>, value: Vec3) -> Result<Self, ParameterError> {
        let name = name.into();
        let value = clamp_color(&name, &value)?;
        Ok(Self { name, value })
    }
}

fn clamp_color(name: &str, value: &Vec3) -> Result<Vec3, ParameterError> {
    if value.iter().any(|c| c.is_nan()) {
        return Err(ParameterError::OutOfRange {
            name: name.to_string(),
            reason: "color channel is not a number".to_string(),
        });
    }
    Ok(value.map(|c| c.clamp(0.0, 1.0)))
}

#[derive(Debug, Clone, PartialEq)]
enum Entry {
    Number(NumericParameter),
    Color(ColorParameter),
}

impl Entry {
    fn name(&self) -> &str {
        match self {
            Self::Number(p) => &p.name,
            Self::Color(p) => &p.name,
        }
    }
}

type ChangeCallback = Box<dyn FnMut(&str, ParameterValue)>;

/// Named, range-checked parameters with change callbacks
pub struct ParameterPanel {
    title: String,
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
    edited: HashSet<String>,
    callbacks: Vec<ChangeCallback>,
}

impl fmt::Debug for ParameterPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterPanel")
            .field("title", &self.title)
            .field("entries", &self.entries)
            .field("edited", &self.edited)
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

impl ParameterPanel {
    /// Create an empty panel
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            entries: Vec::new(),
            index: HashMap::new(),
            edited: HashSet::new(),
            callbacks: Vec::new(),
        }
    }

    /// Panel title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Parameter names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(Entry::name)
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is declared
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, entry: Entry) -> Result<(), ParameterError> {
        let name = entry.name().to_string();
        if self.index.contains_key(&name) {
            return Err(ParameterError::OutOfRange {
                name,
                reason: "parameter already declared".to_string(),
            });
        }
        self.index.insert(name, self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    /// Declare a numeric slider
    pub fn add_number(&mut self, parameter: NumericParameter) -> Result<(), ParameterError> {
        self.insert(Entry::Number(parameter))
    }

    /// Declare a color picker
    pub fn add_color(&mut self, parameter: ColorParameter) -> Result<(), ParameterError> {
        self.insert(Entry::Color(parameter))
    }

    /// Builder form of [`add_number`](Self::add_number)
    pub fn with_number(
        mut self,
        name: impl Into<String>,
        min: f32,
        max: f32,
        step: f32,
        value: f32,
    ) -> Result<Self, ParameterError> {
        self.add_number(NumericParameter::new(name, min, max, step, value)?)?;
        Ok(self)
    }

    /// Builder form of [`add_color`](Self::add_color)
    pub fn with_color(mut self, name: impl Into<String>, value: Vec3) -> Result<Self, ParameterError> {
        self.add_color(ColorParameter::new(name, value)?)?;
        Ok(self)
    }

    /// Register a callback run after every accepted change
    pub fn on_change(&mut self, callback: impl FnMut(&str, ParameterValue) + 'static) {
        self.callbacks.push(Box::new(callback));
    }

    /// Numeric slider declaration
    pub fn parameter(&self, name: &str) -> Option<&NumericParameter> {
        match self.index.get(name).map(|&i| &self.entries[i]) {
            Some(Entry::Number(p)) => Some(p),
            _ => None,
        }
    }

    /// Current numeric value
    pub fn number(&self, name: &str) -> Option<f32> {
        self.parameter(name).map(|p| p.value)
    }

    /// Current color
    pub fn color(&self, name: &str) -> Option<Vec3> {
        match self.index.get(name).map(|&i| &self.entries[i]) {
            Some(Entry::Color(p)) => Some(p.value),
            _ => None,
        }
    }

    /// The three `prefix.x`, `prefix.y`, `prefix.z` sliders as one vector
    pub fn vector(&self, prefix: &str) -> Option<Vec3> {
        let [x, y, z] = AXES.map(|axis| self.number(&format!("{prefix}.{axis}")));
        Some(Vec3::new(x?, y?, z?))
    }

    /// Whether `name` has been set since the panel was built
    pub fn is_edited(&self, name: &str) -> bool {
        self.edited.contains(name)
    }

    fn edited_number(&self, name: &str) -> Option<f32> {
        self.number(name).filter(|_| self.is_edited(name))
    }

    fn edited_color(&self, name: &str) -> Option<Vec3> {
        self.color(name).filter(|_| self.is_edited(name))
    }

    /// Overwrite the components of `target` whose `prefix.axis` slider was set
    fn write_edited_axes(&self, prefix: &str, target: &mut Vec3) {
        for (axis, component) in AXES.iter().zip(target.iter_mut()) {
            if let Some(value) = self.edited_number(&format!("{prefix}.{axis}")) {
                *component = value;
            }
        }
    }

    fn unknown(name: &str) -> ParameterError {
        ParameterError::OutOfRange {
            name: name.to_string(),
            reason: "no such parameter".to_string(),
        }
    }

    fn notify(&mut self, name: &str, value: ParameterValue) {
        log::debug!("Panel '{}': {} = {:?}", self.title, name, value);
        for callback in &mut self.callbacks {
            callback(name, value);
        }
    }

    /// Set a numeric parameter, clamping into its range
    ///
    /// Returns the value actually stored.
    pub fn set(&mut self, name: &str, value: f32) -> Result<f32, ParameterError> {
        let Some(&i) = self.index.get(name) else {
            return Err(Self::unknown(name));
        };
        let Entry::Number(parameter) = &mut self.entries[i] else {
            return Err(ParameterError::OutOfRange {
                name: name.to_string(),
                reason: "parameter is a color".to_string(),
            });
        };
        let clamped = parameter.clamp(value)?;
        parameter.value = clamped;
        self.edited.insert(name.to_string());
        self.notify(name, ParameterValue::Number(clamped));
        Ok(clamped)
    }

    /// Move a numeric parameter by `steps` increments
    pub fn nudge(&mut self, name: &str, steps: i32) -> Result<f32, ParameterError> {
        let parameter = self.parameter(name).ok_or_else(|| Self::unknown(name))?;
        let target = parameter.value + parameter.step * steps as f32;
        self.set(name, target)
    }

    /// Set a color parameter, clamping each channel to 0..1
    pub fn set_color(&mut self, name: &str, value: Vec3) -> Result<Vec3, ParameterError> {
        let Some(&i) = self.index.get(name) else {
            return Err(Self::unknown(name));
        };
        let Entry::Color(parameter) = &mut self.entries[i] else {
            return Err(ParameterError::OutOfRange {
                name: name.to_string(),
                reason: "parameter is numeric".to_string(),
            });
        };
        let clamped = clamp_color(name, &value)?;
        parameter.value = clamped;
        self.edited.insert(name.to_string());
        self.notify(name, ParameterValue::Color(clamped));
        Ok(clamped)
    }

    /// Write the panel's light parameters into `light`
    ///
    /// Only parameters that were set are written. The result is validated
    /// and its direction renormalized before anything is stored, so a zero
    /// direction leaves `light` untouched.
    pub fn apply_to_light(&self, light: &mut Light) -> RenderResult<()> {
        let mut candidate = light.clone();
        self.write_edited_axes(DIRECTION, &mut candidate.direction);
        self.write_edited_axes(POSITION, &mut candidate.position);
        if let Some(color) = self.edited_color(COLOR) {
            candidate.color = color;
        }
        if let Some(intensity) = self.edited_number(INTENSITY) {
            candidate.intensity = intensity;
        }
        if let Some(linear) = self.edited_number(LINEAR_ATTENUATION) {
            candidate.linear_attenuation = linear;
        }
        if let Some(quadratic) = self.edited_number(QUADRATIC_ATTENUATION) {
            candidate.quadratic_attenuation = quadratic;
        }
        candidate.prepare()?;
        *light = candidate;
        Ok(())
    }

    /// Write the panel's material parameters into `material`
    ///
    /// Colors keep the material's existing alpha.
    pub fn apply_to_material(&self, material: &mut Material) -> Result<(), ParameterError> {
        let mut candidate = material.clone();
        if let Some(color) = self.edited_color(COLOR) {
            candidate.color = color.push(material.color.w);
        }
        if let Some(color) = self.edited_color(SPECULAR_COLOR) {
            candidate.specular_color = color.push(material.specular_color.w);
        }
        if let Some(amount) = self.edited_number(SPECULAR_AMOUNT) {
            candidate.specular_amount = amount;
        }
        if let Some(shininess) = self.edited_number(SPECULAR_SHININESS) {
            candidate.specular_shininess = shininess;
        }
        candidate.validate()?;
        *material = candidate;
        Ok(())
    }
}

fn add_vector(
    panel: &mut ParameterPanel,
    prefix: &str,
    value: &Vec3,
    min: f32,
    max: f32,
    step: f32,
) -> Result<(), ParameterError> {
    for (axis, component) in AXES.iter().zip(value.iter()) {
        panel.add_number(NumericParameter::new(
            format!("{prefix}.{axis}"),
            min,
            max,
            step,
            *component,
        )?)?;
    }
    Ok(())
}

/// Panel for a directional light: direction components in [-1, 1]
pub fn light_direction_panel(light: &Light) -> Result<ParameterPanel, ParameterError> {
    let mut panel = ParameterPanel::new(light.name.clone());
    add_vector(&mut panel, DIRECTION, &light.direction, -1.0, 1.0, 0.01)?;
    panel
        .with_color(COLOR, light.color)?
        .with_number(INTENSITY, 0.0, 10.0, 0.1, light.intensity)
}

/// Panel for a point light: position, color, intensity and falloff
pub fn point_light_panel(light: &Light) -> Result<ParameterPanel, ParameterError> {
    if light.light_type != LightType::Point {
        return Err(ParameterError::OutOfRange {
            name: light.name.clone(),
            reason: "not a point light".to_string(),
        });
    }
    let mut panel = ParameterPanel::new(light.name.clone());
    add_vector(&mut panel, POSITION, &light.position, -10.0, 10.0, 0.1)?;
    panel
        .with_color(COLOR, light.color)?
        .with_number(INTENSITY, 0.0, 10.0, 0.1, light.intensity)?
        .with_number(LINEAR_ATTENUATION, 0.0, 1.0, 0.001, light.linear_attenuation)?
        .with_number(QUADRATIC_ATTENUATION, 0.0, 0.1, 0.0001, light.quadratic_attenuation)
}

/// Panel for a material: shininess in [1, 100], amount in [0, 10]
pub fn material_panel(material: &Material) -> Result<ParameterPanel, ParameterError> {
    ParameterPanel::new("material")
        .with_color(COLOR, material.color.xyz())?
        .with_color(SPECULAR_COLOR, material.specular_color.xyz())?
        .with_number(SPECULAR_AMOUNT, 0.0, 10.0, 0.1, material.specular_amount)?
        .with_number(SPECULAR_SHININESS, 1.0, 100.0, 1.0, material.specular_shininess)
}
