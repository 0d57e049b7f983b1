//! Static mesh data
//!
//! A mesh is three flat arrays: positions (3 floats per vertex), per-vertex
//! normals (same count and order), and triangle indices (3 per triangle).
//! Loading meshes from files is not supported; lessons use the procedural
//! sphere below or arrays supplied by the host.

use thiserror::Error;

use crate::foundation::math::Vec3;

/// Malformed mesh input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// No vertices or no triangles
    #[error("Mesh is empty")]
    Empty,

    /// Position array length is not a multiple of three
    #[error("Position array length {0} is not a multiple of 3")]
    RaggedPositions(usize),

    /// Normals do not line up with positions
    #[error("Normal count {normals} does not match position count {positions}")]
    NormalCountMismatch {
        /// Floats in the position array
        positions: usize,
        /// Floats in the normal array
        normals: usize,
    },

    /// Index array length is not a multiple of three
    #[error("Index count {0} is not a multiple of 3")]
    PartialTriangle(usize),

    /// Index references a vertex that does not exist
    #[error("Index {index} at slot {slot} is out of bounds for {vertex_count} vertices")]
    IndexOutOfBounds {
        /// Position in the index array
        slot: usize,
        /// Offending index
        index: u32,
        /// Vertices in the mesh
        vertex_count: usize,
    },

    /// Procedural resolution whose vertex or index count does not fit in `u32`
    #[error("Sphere with {rings} rings and {segments} segments exceeds u32 indexing")]
    TooLarge {
        /// Requested latitude bands
        rings: u32,
        /// Requested longitude bands
        segments: u32,
    },
}

/// Indexed triangle mesh with per-vertex normals
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Vertex positions, xyz per vertex
    pub positions: Vec<f32>,
    /// Vertex normals, xyz per vertex
    pub normals: Vec<f32>,
    /// Triangle indices into the vertex arrays
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Build a mesh from flat arrays, validating them
    pub fn new(positions: Vec<f32>, normals: Vec<f32>, indices: Vec<u32>) -> Result<Self, MeshError> {
        let mesh = Self {
            positions,
            normals,
            indices,
        };
        mesh.validate()?;
        Ok(mesh)
    }

    /// Check the flat-array invariants
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.positions.is_empty() || self.indices.is_empty() {
            return Err(MeshError::Empty);
        }
        if self.positions.len() % 3 != 0 {
            return Err(MeshError::RaggedPositions(self.positions.len()));
        }
        if self.normals.len() != self.positions.len() {
            return Err(MeshError::NormalCountMismatch {
                positions: self.positions.len(),
                normals: self.normals.len(),
            });
        }
        if self.indices.len() % 3 != 0 {
            return Err(MeshError::PartialTriangle(self.indices.len()));
        }

        let vertex_count = self.vertex_count();
        if let Some((slot, &index)) = self
            .indices
            .iter()
            .enumerate()
            .find(|&(_, &i)| i as usize >= vertex_count)
        {
            return Err(MeshError::IndexOutOfBounds {
                slot,
                index,
                vertex_count,
            });
        }
        Ok(())
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Number of indices (three per triangle)
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Position of vertex `i`
    pub fn vertex_position(&self, i: usize) -> Option<Vec3> {
        self.positions
            .get(i * 3..i * 3 + 3)
            .map(|p| Vec3::new(p[0], p[1], p[2]))
    }

    /// Normal of vertex `i`
    pub fn vertex_normal(&self, i: usize) -> Option<Vec3> {
        self.normals
            .get(i * 3..i * 3 + 3)
            .map(|n| Vec3::new(n[0], n[1], n[2]))
    }

    /// Raw position bytes for buffer upload
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Raw normal bytes for buffer upload
    pub fn normal_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.normals)
    }

    /// Raw index bytes for buffer upload
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Latitude/longitude sphere centred on the origin
    ///
    /// Normals point outward and are exactly unit length. `rings` and
    /// `segments` are clamped to at least 2 and 3; a resolution whose vertex
    /// or index count overflows `u32` is rejected.
    pub fn uv_sphere(rings: u32, segments: u32, radius: f32) -> Result<Self, MeshError> {
        let too_large = MeshError::TooLarge { rings, segments };
        let rings = rings.max(2);
        let segments = segments.max(3);

        let stride = segments.checked_add(1).ok_or_else(|| too_large.clone())?;
        let vertex_total = rings
            .checked_add(1)
            .and_then(|r| r.checked_mul(stride))
            .ok_or_else(|| too_large.clone())? as usize;
        let index_total = rings
            .checked_mul(segments)
            .and_then(|quads| quads.checked_mul(6))
            .ok_or(too_large)? as usize;

        let mut positions = Vec::with_capacity(vertex_total * 3);
        let mut normals = Vec::with_capacity(vertex_total * 3);

        for ring in 0..=rings {
            let theta = std::f32::consts::PI * ring as f32 / rings as f32;
            let (sin_theta, cos_theta) = theta.sin_cos();
            for segment in 0..=segments {
                let phi = std::f32::consts::TAU * segment as f32 / segments as f32;
                let (sin_phi, cos_phi) = phi.sin_cos();
                let normal = [sin_theta * cos_phi, cos_theta, sin_theta * sin_phi];
                normals.extend_from_slice(&normal);
                positions.extend(normal.iter().map(|c| c * radius));
            }
        }

        let mut indices = Vec::with_capacity(index_total);
        for ring in 0..rings {
            for segment in 0..segments {
                let a = ring * stride + segment;
                let b = a + stride;
                indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
            }
        }

        Ok(Self {
            positions,
            normals,
            indices,
        })
    }
}
