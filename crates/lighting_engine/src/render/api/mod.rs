//! Backend-facing API
//!
//! The `RenderContext` seam between lesson logic and whatever rasterizes the
//! mesh, plus the named uniform values that cross it.

pub mod render_backend;
pub mod uniforms;

pub use render_backend::{DrawCall, MeshHandle, ProgramHandle, RenderContext};
pub use uniforms::{names, required_uniforms, FrameUniforms, UniformDecl, UniformValue};
