//! Headless recording context
//!
//! Stores programs and meshes in slot maps, validates every uniform against the
//! program's declarations and records what a GPU context would have executed.
//! Used by tests and by the lesson binary when no window is available.
//!
//! Only the most recent draws are kept (`DEFAULT_DRAW_HISTORY` unless set with
//! `with_draw_history`), so an unbounded frame loop runs in constant memory.

use std::collections::VecDeque;

use slotmap::SlotMap;

use crate::render::api::{
    required_uniforms, DrawCall, FrameUniforms, MeshHandle, ProgramHandle, RenderContext,
    UniformDecl, UniformValue,
};
use crate::render::primitives::MeshData;
use crate::render::shading::LightingMode;
use crate::render::{RenderError, RenderResult};

#[derive(Debug)]
struct ProgramRecord {
    mode: LightingMode,
    declarations: Vec<UniformDecl>,
    bound: FrameUniforms,
}

#[derive(Debug)]
struct MeshRecord {
    vertex_count: usize,
    index_count: usize,
}

/// Draws retained by a new `RecordingContext`
pub const DEFAULT_DRAW_HISTORY: usize = 1024;

/// Headless `RenderContext` that records instead of rasterizing
#[derive(Debug)]
pub struct RecordingContext {
    programs: SlotMap<ProgramHandle, ProgramRecord>,
    meshes: SlotMap<MeshHandle, MeshRecord>,
    draws: VecDeque<DrawCall>,
    draw_history: usize,
    total_draws: u64,
    uniform_uploads: usize,
    fail_next_draw: bool,
}

impl Default for RecordingContext {
    fn default() -> Self {
        Self {
            programs: SlotMap::with_key(),
            meshes: SlotMap::with_key(),
            draws: VecDeque::new(),
            draw_history: DEFAULT_DRAW_HISTORY,
            total_draws: 0,
            uniform_uploads: 0,
            fail_next_draw: false,
        }
    }
}

impl RecordingContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `draws` recorded draws (at least one)
    pub fn with_draw_history(mut self, draws: usize) -> Self {
        self.draw_history = draws.max(1);
        self
    }

    /// Most recent draws, oldest first
    pub const fn draw_calls(&self) -> &VecDeque<DrawCall> {
        &self.draws
    }

    /// Draws issued since creation, including ones dropped from the history
    pub const fn draw_count(&self) -> u64 {
        self.total_draws
    }

    /// Most recent value uploaded under `name` on any program
    ///
    /// Checks values bound on live programs, then the last recorded draw.
    pub fn last_uniform(&self, name: &str) -> Option<&UniformValue> {
        self.programs
            .values()
            .find_map(|program| program.bound.get(name))
            .or_else(|| self.draws.back().and_then(|draw| draw.uniforms.get(name)))
    }

    /// Value currently bound on `program`
    pub fn bound_uniform(&self, program: ProgramHandle, name: &str) -> Option<&UniformValue> {
        self.programs.get(program).and_then(|p| p.bound.get(name))
    }

    /// Total number of `set_uniform` calls accepted
    pub const fn uniform_upload_count(&self) -> usize {
        self.uniform_uploads
    }

    /// Number of live programs
    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    /// Number of live meshes
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Make the next draw fail as if the context were lost
    pub fn fail_next_draw(&mut self) {
        self.fail_next_draw = true;
    }

    /// Release a program; later use of its handle fails
    pub fn destroy_program(&mut self, program: ProgramHandle) -> bool {
        self.programs.remove(program).is_some()
    }

    /// Release a mesh; later use of its handle fails
    pub fn destroy_mesh(&mut self, mesh: MeshHandle) -> bool {
        self.meshes.remove(mesh).is_some()
    }
}

impl RenderContext for RecordingContext {
    fn create_program(&mut self, mode: LightingMode) -> RenderResult<ProgramHandle> {
        let declarations = required_uniforms(mode);
        log::debug!("Creating {} program with {} uniforms", mode, declarations.len());
        Ok(self.programs.insert(ProgramRecord {
            mode,
            declarations,
            bound: FrameUniforms::new(),
        }))
    }

    fn upload_mesh(&mut self, mesh: &MeshData) -> RenderResult<MeshHandle> {
        mesh.validate()?;
        log::debug!(
            "Uploading mesh: {} vertices, {} indices ({} bytes)",
            mesh.vertex_count(),
            mesh.index_count(),
            mesh.position_bytes().len() + mesh.normal_bytes().len() + mesh.index_bytes().len()
        );
        Ok(self.meshes.insert(MeshRecord {
            vertex_count: mesh.vertex_count(),
            index_count: mesh.index_count(),
        }))
    }

    fn set_uniform(
        &mut self,
        program: ProgramHandle,
        name: &str,
        value: &UniformValue,
    ) -> RenderResult<()> {
        let record = self
            .programs
            .get_mut(program)
            .ok_or_else(|| RenderError::ResourceUnavailable("program handle is not live".to_string()))?;
        let decl = record
            .declarations
            .iter()
            .find(|decl| decl.name == name)
            .copied()
            .ok_or_else(|| RenderError::UnknownUniform {
                name: name.to_string(),
                mode: record.mode,
            })?;
        decl.check(value)?;

        log::trace!("{}: set {} ({} floats)", record.mode, name, value.len());
        record.bound.set(decl.name, value.clone());
        self.uniform_uploads += 1;
        Ok(())
    }

    fn draw_indexed(
        &mut self,
        program: ProgramHandle,
        mesh: MeshHandle,
        index_count: usize,
    ) -> RenderResult<()> {
        if std::mem::take(&mut self.fail_next_draw) {
            return Err(RenderError::ResourceUnavailable("render context lost".to_string()));
        }
        let record = self
            .programs
            .get(program)
            .ok_or_else(|| RenderError::ResourceUnavailable("program handle is not live".to_string()))?;
        let mesh_record = self
            .meshes
            .get(mesh)
            .ok_or_else(|| RenderError::ResourceUnavailable("mesh handle is not live".to_string()))?;
        if index_count > mesh_record.index_count {
            return Err(RenderError::ResourceUnavailable(format!(
                "draw of {index_count} indices exceeds mesh with {} indices",
                mesh_record.index_count
            )));
        }
        if let Some(missing) = record
            .declarations
            .iter()
            .find(|decl| record.bound.get(decl.name).is_none())
        {
            return Err(RenderError::ResourceUnavailable(format!(
                "uniform '{}' was never set",
                missing.name
            )));
        }

        log::trace!(
            "Draw {} indices over {} vertices with {} program",
            index_count,
            mesh_record.vertex_count,
            record.mode
        );
        let draw = DrawCall {
            program,
            mesh,
            mode: record.mode,
            index_count,
            uniforms: record.bound.clone(),
        };
        if self.draws.len() == self.draw_history {
            self.draws.pop_front();
        }
        self.draws.push_back(draw);
        self.total_draws += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::api::names;

    fn triangle() -> MeshData {
        MeshData::new(
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            vec![0, 1, 2],
        )
        .unwrap()
    }

    fn bind_unlit(ctx: &mut RecordingContext, program: ProgramHandle) {
        for name in [names::MODEL, names::VIEW, names::PROJECTION] {
            ctx.set_uniform(program, name, &UniformValue::Mat4([0.0; 16])).unwrap();
        }
        ctx.set_uniform(program, names::COLOR, &UniformValue::Vec4([1.0; 4])).unwrap();
    }

    #[test]
    fn test_records_draw_with_bound_uniforms() {
        let mut ctx = RecordingContext::new();
        let program = ctx.create_program(LightingMode::Unlit).unwrap();
        let mesh = ctx.upload_mesh(&triangle()).unwrap();
        bind_unlit(&mut ctx, program);
        ctx.draw_indexed(program, mesh, 3).unwrap();

        assert_eq!(ctx.draw_calls().len(), 1);
        let draw = &ctx.draw_calls()[0];
        assert_eq!(draw.mode, LightingMode::Unlit);
        assert_eq!(draw.index_count, 3);
        assert_eq!(draw.uniforms.get(names::COLOR), Some(&UniformValue::Vec4([1.0; 4])));
        assert_eq!(ctx.uniform_upload_count(), 4);
        assert_eq!(ctx.last_uniform(names::COLOR), Some(&UniformValue::Vec4([1.0; 4])));
    }

    #[test]
    fn test_unknown_uniform_is_rejected() {
        let mut ctx = RecordingContext::new();
        let program = ctx.create_program(LightingMode::Unlit).unwrap();
        let result = ctx.set_uniform(program, names::LIGHT_DIRECTION, &UniformValue::Vec3([0.0; 3]));
        assert!(matches!(
            result,
            Err(RenderError::UnknownUniform { mode: LightingMode::Unlit, .. })
        ));
    }

    #[test]
    fn test_wrong_size_is_rejected() {
        let mut ctx = RecordingContext::new();
        let program = ctx.create_program(LightingMode::Unlit).unwrap();
        let result = ctx.set_uniform(program, names::MODEL, &UniformValue::Mat3([0.0; 9]));
        assert!(matches!(
            result,
            Err(RenderError::UniformSizeMismatch { expected: 16, actual: 9, .. })
        ));
    }

    #[test]
    fn test_stale_handles_are_unavailable() {
        let mut ctx = RecordingContext::new();
        let program = ctx.create_program(LightingMode::Unlit).unwrap();
        let mesh = ctx.upload_mesh(&triangle()).unwrap();
        bind_unlit(&mut ctx, program);

        assert!(ctx.destroy_mesh(mesh));
        assert!(matches!(
            ctx.draw_indexed(program, mesh, 3),
            Err(RenderError::ResourceUnavailable(_))
        ));

        assert!(ctx.destroy_program(program));
        assert!(matches!(
            ctx.set_uniform(program, names::COLOR, &UniformValue::Vec4([0.0; 4])),
            Err(RenderError::ResourceUnavailable(_))
        ));
        assert_eq!(ctx.program_count(), 0);
        assert_eq!(ctx.mesh_count(), 0);
    }

    #[test]
    fn test_draw_requires_every_uniform() {
        let mut ctx = RecordingContext::new();
        let program = ctx.create_program(LightingMode::Unlit).unwrap();
        let mesh = ctx.upload_mesh(&triangle()).unwrap();
        ctx.set_uniform(program, names::MODEL, &UniformValue::Mat4([0.0; 16])).unwrap();
        assert!(ctx.draw_indexed(program, mesh, 3).is_err());
        assert!(ctx.draw_calls().is_empty());
    }

    #[test]
    fn test_injected_failure_affects_one_draw() {
        let mut ctx = RecordingContext::new();
        let program = ctx.create_program(LightingMode::Unlit).unwrap();
        let mesh = ctx.upload_mesh(&triangle()).unwrap();
        bind_unlit(&mut ctx, program);

        ctx.fail_next_draw();
        assert!(ctx.draw_indexed(program, mesh, 3).is_err());
        assert!(ctx.draw_indexed(program, mesh, 3).is_ok());
        assert_eq!(ctx.draw_calls().len(), 1);
    }

    #[test]
    fn test_draw_history_is_bounded() {
        let mut ctx = RecordingContext::new().with_draw_history(2);
        let program = ctx.create_program(LightingMode::Unlit).unwrap();
        let mesh = ctx.upload_mesh(&triangle()).unwrap();
        bind_unlit(&mut ctx, program);
        for _ in 0..5 {
            ctx.draw_indexed(program, mesh, 3).unwrap();
        }
        assert_eq!(ctx.draw_calls().len(), 2);
        assert_eq!(ctx.draw_count(), 5);
        assert_eq!(RecordingContext::new().draw_history, DEFAULT_DRAW_HISTORY);
    }

    #[test]
    fn test_draw_past_index_count_fails() {
        let mut ctx = RecordingContext::new();
        let program = ctx.create_program(LightingMode::Unlit).unwrap();
        let mesh = ctx.upload_mesh(&triangle()).unwrap();
        bind_unlit(&mut ctx, program);
        assert!(ctx.draw_indexed(program, mesh, 6).is_err());
    }
}
