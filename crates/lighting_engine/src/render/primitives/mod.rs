//! Rendering primitives
//!
//! Camera and mesh data shared by the lesson pipeline.

pub mod camera;
pub mod mesh;

pub use camera::Camera;
pub use mesh::{MeshData, MeshError};
