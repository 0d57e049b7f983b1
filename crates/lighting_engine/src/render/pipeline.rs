//! # Lesson Pipeline
//!
//! One parameterized pipeline drives every lesson; the `LightingMode` selects
//! which uniforms are flattened and which program the context compiles.
//!
//! Per frame the data only flows one way:
//! elapsed time -> model matrix -> normal matrix -> uniforms -> one indexed draw.
//!
//! Shading happens in world space: the normal matrix is the inverse-transpose
//! of the model matrix alone, and light and camera positions are world-space.

use crate::core::LessonConfig;
use crate::foundation::math::{multiply_matrices, Mat3, Mat4, Vec3, Vec4};
use crate::render::api::{FrameUniforms, MeshHandle, ProgramHandle, RenderContext};
use crate::render::lighting::LightingEnvironment;
use crate::render::material::Material;
use crate::render::primitives::Camera;
use crate::render::shading::{shade, LightingMode, SurfacePoint};
use crate::render::transforms::{
    normal_matrix, rotation_y_matrix, spin_angle, translation_matrix,
};
use crate::render::RenderResult;

/// Transforms computed once at startup
///
/// Only rebuilt when the camera itself moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticTransforms {
    /// World-to-camera
    pub view: Mat4,
    /// Camera-to-clip
    pub projection: Mat4,
    /// Camera position in world space
    pub camera_position: Vec3,
}

impl StaticTransforms {
    /// Derive view and projection from a camera
    pub fn from_camera(camera: &Camera) -> RenderResult<Self> {
        Ok(Self {
            view: camera.view_matrix()?,
            projection: camera.projection_matrix()?,
            camera_position: camera.position,
        })
    }
}

/// Transforms for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTransforms {
    /// Object-to-world
    pub model: Mat4,
    /// World-to-camera
    pub view: Mat4,
    /// Camera-to-clip
    pub projection: Mat4,
    /// Inverse-transpose of the model's upper 3x3
    pub normal_matrix: Mat3,
}

impl FrameTransforms {
    /// Object-space point to world space
    pub fn transform_point(&self, point: &Vec3) -> Vec3 {
        (self.model * point.push(1.0)).xyz()
    }

    /// Object-space normal to world space (not renormalized)
    pub fn transform_normal(&self, normal: &Vec3) -> Vec3 {
        self.normal_matrix * normal
    }
}

/// Explicit per-lesson render state
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    /// Startup transforms
    pub statics: StaticTransforms,
    /// Object position in world space
    pub model_translation: Vec3,
    /// Spin speed in radians per elapsed millisecond
    pub rotation_speed: f32,
}

impl RenderState {
    /// Build the startup state
    pub fn new(camera: &Camera, model_translation: Vec3, rotation_speed: f32) -> RenderResult<Self> {
        Ok(Self {
            statics: StaticTransforms::from_camera(camera)?,
            model_translation,
            rotation_speed,
        })
    }

    /// Object-to-world at `elapsed_ms`: spin about Y, then translate
    pub fn model_matrix(&self, elapsed_ms: f64) -> Mat4 {
        let t = &self.model_translation;
        multiply_matrices(
            &translation_matrix(t.x, t.y, t.z),
            &rotation_y_matrix(spin_angle(elapsed_ms, self.rotation_speed)),
        )
    }

    /// Every transform for the frame at `elapsed_ms`
    pub fn frame(&self, elapsed_ms: f64) -> RenderResult<FrameTransforms> {
        let model = self.model_matrix(elapsed_ms);
        Ok(FrameTransforms {
            model,
            view: self.statics.view,
            projection: self.statics.projection,
            normal_matrix: normal_matrix(&model)?,
        })
    }

    /// Rebuild the startup transforms after the camera moved
    pub fn set_camera(&mut self, camera: &Camera) -> RenderResult<()> {
        self.statics = StaticTransforms::from_camera(camera)?;
        Ok(())
    }
}

/// Lesson pipeline
///
/// Owns the typed lesson state and the context handles; the host owns the
/// context and the scheduling.
#[derive(Debug)]
pub struct LessonPipeline {
    mode: LightingMode,
    state: RenderState,
    material: Material,
    environment: LightingEnvironment,
    program: ProgramHandle,
    mesh: MeshHandle,
    index_count: usize,
    last_frame: Option<FrameTransforms>,
    frames_rendered: u64,
}

impl LessonPipeline {
    /// Validate the configuration, upload the mesh and create the program
    pub fn new<C: RenderContext + ?Sized>(config: &LessonConfig, ctx: &mut C) -> RenderResult<Self> {
        config.validate()?;
        let camera = config.camera()?;
        let state = RenderState::new(&camera, config.model_translation, config.rotation_speed)?;
        let environment = config.lighting_environment()?;

        let mesh_data = config.mesh()?;
        let mesh = ctx.upload_mesh(&mesh_data)?;
        let program = ctx.create_program(config.mode)?;

        log::info!(
            "Lesson '{}' ready: {} mode, {} triangles, {} lights",
            config.lesson,
            config.mode,
            mesh_data.triangle_count(),
            environment.lights.len()
        );

        Ok(Self {
            mode: config.mode,
            state,
            material: config.material.clone(),
            environment,
            program,
            mesh,
            index_count: mesh_data.index_count(),
            last_frame: None,
            frames_rendered: 0,
        })
    }

    /// Render one frame at `elapsed_ms`
    ///
    /// Re-validates the lights (the debug panel may have edited them), flattens
    /// the uniforms, uploads them and issues one indexed draw. On error nothing
    /// is drawn and the pipeline is ready for the next tick.
    pub fn render_frame<C: RenderContext + ?Sized>(
        &mut self,
        elapsed_ms: f64,
        ctx: &mut C,
    ) -> RenderResult<()> {
        let transforms = self.state.frame(elapsed_ms)?;
        self.environment.prepare()?;

        let uniforms = FrameUniforms::for_mode(
            self.mode,
            &transforms,
            &self.material,
            &self.environment,
            &self.state.statics.camera_position,
        )?;
        ctx.set_uniforms(self.program, &uniforms)?;
        ctx.draw_indexed(self.program, self.mesh, self.index_count)?;

        self.last_frame = Some(transforms);
        self.frames_rendered += 1;
        log::trace!("Frame {} drawn at {:.1} ms", self.frames_rendered, elapsed_ms);
        Ok(())
    }

    /// CPU reference color of an object-space surface sample at `elapsed_ms`
    ///
    /// Mirrors what the program computes for the fragment: the point and
    /// normal go to world space first, except in normal visualization where
    /// the raw object-space normal is shown.
    pub fn shade_point(&self, elapsed_ms: f64, object_point: &SurfacePoint) -> RenderResult<Vec4> {
        let transforms = self.state.frame(elapsed_ms)?;
        let normal = if self.mode.uses_normal_matrix() {
            transforms.transform_normal(&object_point.normal)
        } else {
            object_point.normal
        };
        let world = SurfacePoint::new(transforms.transform_point(&object_point.position), normal);
        Ok(shade(
            self.mode,
            &world,
            &self.material,
            &self.environment,
            &self.state.statics.camera_position,
        )?)
    }

    /// Move the camera and rebuild the startup transforms
    pub fn set_camera(&mut self, camera: &Camera) -> RenderResult<()> {
        self.state.set_camera(camera)
    }

    /// Lighting technique
    pub const fn mode(&self) -> LightingMode {
        self.mode
    }

    /// Render state
    pub const fn state(&self) -> &RenderState {
        &self.state
    }

    /// Surface material
    pub const fn material(&self) -> &Material {
        &self.material
    }

    /// Mutable material, e.g. for the debug panel
    pub fn material_mut(&mut self) -> &mut Material {
        &mut self.material
    }

    /// Lights
    pub const fn environment(&self) -> &LightingEnvironment {
        &self.environment
    }

    /// Mutable lights; edits are validated on the next frame
    pub fn environment_mut(&mut self) -> &mut LightingEnvironment {
        &mut self.environment
    }

    /// Transforms of the last frame drawn
    pub const fn last_frame(&self) -> Option<&FrameTransforms> {
        self.last_frame.as_ref()
    }

    /// Frames drawn successfully
    pub const fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Program handle in the context
    pub const fn program(&self) -> ProgramHandle {
        self.program
    }

    /// Mesh handle in the context
    pub const fn mesh(&self) -> MeshHandle {
        self.mesh
    }
}
