//! Render context abstraction
//!
//! This module defines the trait that rendering contexts implement so the
//! lesson pipeline can compile programs, upload meshes, set uniforms and draw
//! without knowing which graphics API sits underneath.

use slotmap::new_key_type;

use crate::render::api::uniforms::{FrameUniforms, UniformValue};
use crate::render::primitives::MeshData;
use crate::render::shading::LightingMode;
use crate::render::RenderResult;

new_key_type! {
    /// Handle to a compiled program owned by a render context
    pub struct ProgramHandle;

    /// Handle to an uploaded mesh owned by a render context
    pub struct MeshHandle;
}

/// One issued indexed draw, with the uniforms bound at the time
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    /// Program drawn with
    pub program: ProgramHandle,
    /// Mesh drawn
    pub mesh: MeshHandle,
    /// Lighting mode of the program
    pub mode: LightingMode,
    /// Indices consumed
    pub index_count: usize,
    /// Uniform values bound to the program
    pub uniforms: FrameUniforms,
}

/// Rendering context trait
///
/// Every call on an unknown or released handle fails with
/// `RenderError::ResourceUnavailable`; the caller skips the frame.
pub trait RenderContext {
    /// Compile and link the program for a lighting mode
    fn create_program(&mut self, mode: LightingMode) -> RenderResult<ProgramHandle>;

    /// Upload vertex positions, normals and indices
    fn upload_mesh(&mut self, mesh: &MeshData) -> RenderResult<MeshHandle>;

    /// Set one named uniform on a program
    fn set_uniform(
        &mut self,
        program: ProgramHandle,
        name: &str,
        value: &UniformValue,
    ) -> RenderResult<()>;

    /// Draw `index_count` indices of `mesh` with `program`
    fn draw_indexed(
        &mut self,
        program: ProgramHandle,
        mesh: MeshHandle,
        index_count: usize,
    ) -> RenderResult<()>;

    /// Set every uniform of a frame, in order
    fn set_uniforms(&mut self, program: ProgramHandle, uniforms: &FrameUniforms) -> RenderResult<()> {
        for (name, value) in uniforms.iter() {
            self.set_uniform(program, name, value)?;
        }
        Ok(())
    }
}
