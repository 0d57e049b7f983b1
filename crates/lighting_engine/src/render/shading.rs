//! Shading evaluator
//!
//! CPU reference for the per-fragment lighting math each lesson's shader runs.
//! Every function is pure: same inputs, same color, no state between calls.
//!
//! All vectors are in one shared frame (world space in the lesson pipeline).
//! Interpolated normals are renormalized before use; light and view
//! directions point away from the surface. Output is not clamped; the
//! rasterizer clamps at color write.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::foundation::math::{dot, normalize, MathError, Vec3, Vec4};
use crate::render::lighting::{Light, LightingEnvironment};
use crate::render::material::Material;
use crate::render::ParameterError;

/// Lighting technique, one per lesson
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightingMode {
    /// Flat material color
    Unlit,
    /// Object-space normals remapped to colors
    NormalVisualization,
    /// Normals transformed by the normal matrix, remapped to colors
    TransformedNormals,
    /// Single directional light, diffuse only
    Lambert,
    /// Directional light with a Blinn-Phong highlight
    BlinnPhong,
    /// Several attenuated point lights, diffuse only
    MultiLight,
}

impl LightingMode {
    /// Every mode, in lesson order
    pub const ALL: [Self; 6] = [
        Self::Unlit,
        Self::NormalVisualization,
        Self::TransformedNormals,
        Self::Lambert,
        Self::BlinnPhong,
        Self::MultiLight,
    ];

    /// Short name used on the command line and in config files
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unlit => "unlit",
            Self::NormalVisualization => "normals",
            Self::TransformedNormals => "transformed-normals",
            Self::Lambert => "lambert",
            Self::BlinnPhong => "blinn-phong",
            Self::MultiLight => "multi-light",
        }
    }

    /// Whether normals go through the normal matrix
    pub const fn uses_normal_matrix(self) -> bool {
        !matches!(self, Self::Unlit | Self::NormalVisualization)
    }

    /// Whether the mode reads any light
    pub const fn uses_lights(self) -> bool {
        matches!(self, Self::Lambert | Self::BlinnPhong | Self::MultiLight)
    }
}

impl fmt::Display for LightingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LightingMode {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParameterError::OutOfRange {
                name: "lighting mode".to_string(),
                reason: format!("unknown mode '{s}'"),
            })
    }
}

/// Surface sample to shade
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePoint {
    /// Position in the shading frame
    pub position: Vec3,
    /// Interpolated normal, not necessarily unit length
    pub normal: Vec3,
}

impl SurfacePoint {
    /// Create a surface sample
    pub const fn new(position: Vec3, normal: Vec3) -> Self {
        Self { position, normal }
    }
}

/// Material color, unmodified
pub fn shade_unlit(material: &Material) -> Vec4 {
    material.color
}

/// Remap a normal from [-1, 1] to displayable [0, 1]
pub fn visualize_normal(normal: &Vec3) -> Result<Vec4, MathError> {
    let n = normalize(normal)?;
    let rgb = n * 0.5 + Vec3::repeat(0.5);
    Ok(rgb.push(1.0))
}

/// Lambertian cosine, never negative
pub fn lambert_brightness(normal: &Vec3, light_direction: &Vec3) -> Result<f32, MathError> {
    let n = normalize(normal)?;
    Ok(dot(&n, light_direction).max(0.0))
}

fn modulate(material: &Material, light: &Vec3) -> Vec4 {
    let rgb = material.color.xyz().component_mul(light);
    rgb.push(material.color.w)
}

/// Diffuse shading from one directional light
pub fn shade_lambert(
    normal: &Vec3,
    light_direction: &Vec3,
    material: &Material,
) -> Result<Vec4, MathError> {
    let brightness = lambert_brightness(normal, light_direction)?;
    Ok(modulate(material, &Vec3::repeat(brightness)))
}

/// Unit vector halfway between view and light directions
///
/// Fails when the two directions cancel out.
pub fn halfway_vector(view_direction: &Vec3, light_direction: &Vec3) -> Result<Vec3, MathError> {
    normalize(&(view_direction + light_direction))
}

/// Blinn-Phong highlight strength
pub fn specular_term(normal: &Vec3, halfway: &Vec3, shininess: f32, amount: f32) -> f32 {
    dot(normal, halfway).max(0.0).powf(shininess) * amount
}

/// Diffuse plus Blinn-Phong specular from one directional light
pub fn shade_blinn_phong(
    point: &SurfacePoint,
    light_direction: &Vec3,
    camera_position: &Vec3,
    material: &Material,
) -> Result<Vec4, MathError> {
    let normal = normalize(&point.normal)?;
    let view_direction = normalize(&(camera_position - point.position))?;
    let halfway = halfway_vector(&view_direction, light_direction)?;

    let diffuse = dot(&normal, light_direction).max(0.0);
    let specular = specular_term(
        &normal,
        &halfway,
        material.specular_shininess,
        material.specular_amount,
    );

    let rgb = material.color.xyz() * diffuse + material.specular_color.xyz() * specular;
    Ok(rgb.push(material.color.w))
}

/// Distance falloff: `1 / (1 + linear * d + quadratic * d^2)`
pub fn attenuation_factor(distance: f32, linear: f32, quadratic: f32) -> f32 {
    1.0 / (1.0 + linear * distance + quadratic * distance * distance)
}

/// Summed diffuse light arriving at `point` from positional lights
///
/// Each light contributes `color * intensity * attenuation * max(0, n.l)`.
/// Lights are simply added; the sum is not clamped.
pub fn accumulate_point_lights<'a>(
    point: &SurfacePoint,
    lights: impl IntoIterator<Item = &'a Light>,
) -> Result<Vec3, MathError> {
    let normal = normalize(&point.normal)?;
    let mut total = Vec3::zeros();
    for light in lights {
        let distance = (light.position - point.position).norm();
        let direction = light.direction_to(&point.position)?;
        let attenuation =
            attenuation_factor(distance, light.linear_attenuation, light.quadratic_attenuation);
        total += light.radiance() * attenuation * dot(&normal, &direction).max(0.0);
    }
    Ok(total)
}

/// Material color lit by every point light in the environment
pub fn shade_multi_light(
    point: &SurfacePoint,
    environment: &LightingEnvironment,
    material: &Material,
) -> Result<Vec4, MathError> {
    let total = accumulate_point_lights(point, environment.point_lights())?;
    Ok(modulate(material, &total))
}

/// Evaluate `mode` at one surface point
///
/// Directional modes use the environment's first directional light; with no
/// such light the surface receives no diffuse or specular light.
pub fn shade(
    mode: LightingMode,
    point: &SurfacePoint,
    material: &Material,
    environment: &LightingEnvironment,
    camera_position: &Vec3,
) -> Result<Vec4, MathError> {
    match mode {
        LightingMode::Unlit => Ok(shade_unlit(material)),
        LightingMode::NormalVisualization | LightingMode::TransformedNormals => {
            visualize_normal(&point.normal)
        }
        LightingMode::Lambert => match environment.primary_directional() {
            Some(light) => shade_lambert(&point.normal, &light.direction, material),
            None => Ok(modulate(material, &Vec3::zeros())),
        },
        LightingMode::BlinnPhong => match environment.primary_directional() {
            Some(light) => shade_blinn_phong(point, &light.direction, camera_position, material),
            None => Ok(modulate(material, &Vec3::zeros())),
        },
        LightingMode::MultiLight => shade_multi_light(point, environment, material),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    const EPSILON: f32 = 1e-6;

    fn up() -> Vec3 {
        Vec3::new(0.0, 1.0, 0.0)
    }

    fn rabbit_material() -> Material {
        Material::new(Vec4::new(0.8, 1.0, 1.0, 1.0))
    }

    #[test]
    fn test_unlit_returns_material_color() {
        let material = rabbit_material();
        assert_eq!(shade_unlit(&material), material.color);
    }

    #[test]
    fn test_normal_visualization_remaps_range() {
        assert_relative_eq!(
            visualize_normal(&Vec3::new(0.0, 0.0, 1.0)).unwrap(),
            Vec4::new(0.5, 0.5, 1.0, 1.0)
        );
        assert_relative_eq!(
            visualize_normal(&Vec3::new(-2.0, 0.0, 0.0)).unwrap(),
            Vec4::new(0.0, 0.5, 0.5, 1.0)
        );
        assert_eq!(visualize_normal(&Vec3::zeros()), Err(MathError::DegenerateVector));
    }

    #[test]
    fn test_lambert_light_from_above() {
        let color = shade_lambert(&up(), &up(), &rabbit_material()).unwrap();
        assert_relative_eq!(color, Vec4::new(0.8, 1.0, 1.0, 1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_lambert_light_from_below_is_black() {
        let color = shade_lambert(&up(), &-up(), &rabbit_material()).unwrap();
        assert_eq!(color, Vec4::new(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_lambert_renormalizes_interpolated_normal() {
        let short_normal = Vec3::new(0.0, 0.25, 0.0);
        assert_relative_eq!(lambert_brightness(&short_normal, &up()).unwrap(), 1.0);
    }

    #[test]
    fn test_lambert_brightness_stays_in_unit_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..500 {
            let n = Vec3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
            let l = Vec3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
            let (Ok(n), Ok(l)) = (normalize(&n), normalize(&l)) else {
                continue;
            };
            let b = lambert_brightness(&n, &l).unwrap();
            assert!((0.0..=1.0 + 1e-6).contains(&b), "brightness {b} out of range");
            if dot(&n, &l) < 0.0 {
                assert_eq!(b, 0.0);
            }
        }
    }

    #[test]
    fn test_blinn_phong_head_on() {
        let forward = Vec3::new(0.0, 0.0, 1.0);
        assert_relative_eq!(halfway_vector(&forward, &forward).unwrap(), forward);

        let material = rabbit_material()
            .with_specular(Vec4::new(1.0, 1.0, 1.0, 1.0), 0.6, 40.0)
            .unwrap();
        assert_relative_eq!(specular_term(&forward, &forward, 40.0, 0.6), 0.6);

        let point = SurfacePoint::new(Vec3::zeros(), forward);
        let color = shade_blinn_phong(&point, &forward, &Vec3::new(0.0, 0.0, 5.0), &material).unwrap();
        // Full diffuse plus the whole specular amount
        assert_relative_eq!(color, Vec4::new(1.4, 1.6, 1.6, 1.0), epsilon = 1e-5);
    }

    #[test]
    fn test_blinn_phong_grazing_highlight_is_weaker() {
        let normal = Vec3::new(0.0, 0.0, 1.0);
        let light = normalize(&Vec3::new(0.0, 1.0, 1.0)).unwrap();
        let view = normalize(&Vec3::new(0.0, -1.0, 1.0)).unwrap();
        let aligned = specular_term(&normal, &halfway_vector(&view, &light).unwrap(), 10.0, 1.0);
        let off = specular_term(&normal, &halfway_vector(&Vec3::x(), &light).unwrap(), 10.0, 1.0);
        assert_relative_eq!(aligned, 1.0, epsilon = 1e-5);
        assert!(off < aligned);
    }

    #[test]
    fn test_specular_behind_surface_is_zero() {
        let normal = Vec3::new(0.0, 0.0, 1.0);
        assert_eq!(specular_term(&normal, &Vec3::new(0.0, 0.0, -1.0), 8.0, 1.0), 0.0);
    }

    #[test]
    fn test_opposite_view_and_light_are_degenerate() {
        assert_eq!(
            halfway_vector(&up(), &-up()),
            Err(MathError::DegenerateVector)
        );
    }

    #[test]
    fn test_attenuation_curve() {
        assert_eq!(attenuation_factor(0.0, 0.0, 1.0 / 1000.0), 1.0);
        let near = attenuation_factor(10.0, 0.0, 1.0 / 1000.0);
        let far = attenuation_factor(1.0e4, 0.0, 1.0 / 1000.0);
        assert!(near < 1.0 && far < near);
        assert_abs_diff_eq!(attenuation_factor(1.0e8, 0.0, 1.0 / 1000.0), 0.0, epsilon = 1e-6);
        assert_relative_eq!(attenuation_factor(2.0, 0.5, 0.25), 1.0 / 3.0);
    }

    #[test]
    fn test_point_lights_accumulate() {
        let red = Light::point("red", Vec3::new(0.0, 2.0, 0.0), Vec3::new(1.0, 0.0, 0.0), 1.0, 0.0, 0.0)
            .unwrap();
        let blue = Light::point("blue", Vec3::new(0.0, 4.0, 0.0), Vec3::new(0.0, 0.0, 1.0), 2.0, 0.5, 0.0)
            .unwrap();
        let below = Light::point("below", Vec3::new(0.0, -3.0, 0.0), Vec3::new(0.0, 1.0, 0.0), 5.0, 0.0, 0.0)
            .unwrap();
        let point = SurfacePoint::new(Vec3::zeros(), up());

        let total = accumulate_point_lights(&point, [&red, &blue, &below]).unwrap();
        // blue: distance 4, attenuation 1 / (1 + 2) = 1/3, times intensity 2
        assert_relative_eq!(total, Vec3::new(1.0, 0.0, 2.0 / 3.0), epsilon = 1e-6);
    }

    #[test]
    fn test_accumulation_is_not_clamped() {
        let light = Light::point("hot", Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, 1.0, 1.0), 5.0, 0.0, 0.0)
            .unwrap();
        let point = SurfacePoint::new(Vec3::zeros(), up());
        let total = accumulate_point_lights(&point, [&light]).unwrap();
        assert_relative_eq!(total.x, 5.0);
    }

    #[test]
    fn test_multi_light_modulates_material() {
        let env = LightingEnvironment::new()
            .with_light(
                Light::point("a", Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, 1.0, 1.0), 0.5, 0.0, 0.0)
                    .unwrap(),
            )
            .unwrap();
        let point = SurfacePoint::new(Vec3::zeros(), up());
        let color = shade_multi_light(&point, &env, &rabbit_material()).unwrap();
        assert_relative_eq!(color, Vec4::new(0.4, 0.5, 0.5, 1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_shade_dispatch_without_directional_light() {
        let point = SurfacePoint::new(Vec3::zeros(), up());
        let color = shade(
            LightingMode::Lambert,
            &point,
            &rabbit_material(),
            &LightingEnvironment::new(),
            &Vec3::new(0.0, 0.0, 5.0),
        )
        .unwrap();
        assert_eq!(color, Vec4::new(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_mode_names_round_trip() {
        for mode in LightingMode::ALL {
            assert_eq!(mode.name().parse::<LightingMode>().unwrap(), mode);
        }
        assert!("phong".parse::<LightingMode>().is_err());
        assert!(LightingMode::TransformedNormals.uses_normal_matrix());
        assert!(!LightingMode::NormalVisualization.uses_normal_matrix());
    }
}
