//! Base mesh geometry and its instanced extension.
//!
//! A [`BaseGeometry`] is the per-vertex data read from the source model. It
//! is shared, never copied, by every [`InstancedGeometry`] built on top of
//! it; the instanced geometry only adds per-instance attribute buffers.

mod instanced;

use glam::Vec3;
pub use instanced::{
    build_instanced_geometry, AttributeSpec, InstanceAttribute,
    InstancedGeometry, POSITIONS_ATTRIBUTE,
};

/// Per-vertex data of a source mesh.
///
/// Every stream is optional: a model may omit normals or UVs, and the
/// builder passes that absence through unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaseGeometry {
    /// Vertex positions.
    pub positions: Option<Vec<[f32; 3]>>,
    /// Vertex normals.
    pub normals: Option<Vec<[f32; 3]>>,
    /// First UV set.
    pub uvs: Option<Vec<[f32; 2]>>,
    /// Triangle-list indices.
    pub indices: Option<Vec<u32>>,
}

impl BaseGeometry {
    /// Number of vertices, taken from the position stream.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.as_ref().map_or(0, Vec::len)
    }

    /// Number of indices, or zero for a non-indexed mesh.
    #[must_use]
    pub fn index_count(&self) -> usize {
        self.indices.as_ref().map_or(0, Vec::len)
    }

    /// Axis-aligned bounds of the position stream.
    #[must_use]
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let positions = self.positions.as_ref()?;
        let first = Vec3::from_array(*positions.first()?);
        Some(positions.iter().fold((first, first), |(lo, hi), p| {
            let p = Vec3::from_array(*p);
            (lo.min(p), hi.max(p))
        }))
    }
}
