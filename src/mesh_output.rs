//! Merged geometry and fragment assembly.
//!
//! [`MergedGeometry`] is the renderer-agnostic output of every build: flat
//! structure-of-arrays vertex attributes plus triangle indices, with zero-copy
//! byte accessors for GPU upload. [`assemble`] concatenates independently
//! produced [`Mesh`] fragments into one.

use crate::error::{MesherError, Result};
use crate::mesher::geometry::Mesh;
use crate::types::BoundingBox;
use std::mem;

/// One indexed triangle buffer.
///
/// Invariant: every index is `< vertex_count()`, and the three attribute
/// arrays have equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedGeometry {
    /// Vertex positions.
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals (unit length, flat per face).
    pub normals: Vec<[f32; 3]>,
    /// Texture coordinates into the source texture, V up.
    pub uvs: Vec<[f32; 2]>,
    /// Triangle indices (three per triangle).
    pub indices: Vec<u32>,
}

impl MergedGeometry {
    /// Create a new empty geometry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if this geometry contains no vertices.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Raw bytes of the positions array. Zero-allocation view.
    pub fn positions_bytes(&self) -> &[u8] {
        cast_slice(&self.positions)
    }

    /// Raw bytes of the normals array. Zero-allocation view.
    pub fn normals_bytes(&self) -> &[u8] {
        cast_slice(&self.normals)
    }

    /// Raw bytes of the UVs array. Zero-allocation view.
    pub fn uvs_bytes(&self) -> &[u8] {
        cast_slice(&self.uvs)
    }

    /// Raw bytes of the indices array. Zero-allocation view.
    pub fn indices_bytes(&self) -> &[u8] {
        cast_slice(&self.indices)
    }

    /// Positions as a flat `f32` array.
    pub fn positions_flat(&self) -> Vec<f32> {
        self.positions.iter().flatten().copied().collect()
    }

    /// Normals as a flat `f32` array.
    pub fn normals_flat(&self) -> Vec<f32> {
        self.normals.iter().flatten().copied().collect()
    }

    /// UVs as a flat `f32` array.
    pub fn uvs_flat(&self) -> Vec<f32> {
        self.uvs.iter().flatten().copied().collect()
    }

    /// Append a mesh fragment, offsetting its indices by the current vertex count.
    pub fn append_fragment(&mut self, fragment: &Mesh) {
        let offset = self.positions.len() as u32;
        self.positions
            .extend(fragment.vertices.iter().map(|v| v.position));
        self.normals.extend(fragment.vertices.iter().map(|v| v.normal));
        self.uvs.extend(fragment.vertices.iter().map(|v| v.uv));
        self.indices
            .extend(fragment.indices.iter().map(|&i| i + offset));
    }

    /// Merge another geometry into this one, offsetting indices appropriately.
    pub fn merge(&mut self, other: &MergedGeometry) {
        let offset = self.positions.len() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.uvs.extend_from_slice(&other.uvs);
        self.indices.extend(other.indices.iter().map(|&i| i + offset));
    }

    /// Axis-aligned bounds of all positions, `None` when empty.
    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.positions.iter().copied())
    }

    /// Translate all positions.
    pub fn translate(&mut self, offset: [f32; 3]) {
        for p in &mut self.positions {
            p[0] += offset[0];
            p[1] += offset[1];
            p[2] += offset[2];
        }
    }

    /// Uniformly scale all positions about the origin. Normals are unaffected.
    pub fn scale(&mut self, factor: f32) {
        for p in &mut self.positions {
            p[0] *= factor;
            p[1] *= factor;
            p[2] *= factor;
        }
    }

    /// Move the bounding-box centre to the origin. Returns the applied offset.
    pub fn recenter(&mut self) -> [f32; 3] {
        let Some(bounds) = self.bounds() else {
            return [0.0; 3];
        };
        let c = bounds.center();
        let offset = [-c[0], -c[1], -c[2]];
        self.translate(offset);
        offset
    }

    /// Check the structural invariants.
    pub fn validate(&self) -> Result<()> {
        let count = self.positions.len();
        if self.normals.len() != count || self.uvs.len() != count {
            return Err(MesherError::InvalidGeometry(format!(
                "attribute length mismatch: {} positions, {} normals, {} uvs",
                count,
                self.normals.len(),
                self.uvs.len()
            )));
        }
        if self.indices.len() % 3 != 0 {
            return Err(MesherError::InvalidGeometry(format!(
                "{} indices is not a whole number of triangles",
                self.indices.len()
            )));
        }
        if let Some(&bad) = self.indices.iter().find(|&&i| i as usize >= count) {
            return Err(MesherError::InvalidGeometry(format!(
                "index {} out of range for {} vertices",
                bad, count
            )));
        }
        Ok(())
    }
}

/// Concatenate fragments into one buffer.
///
/// Each fragment's indices are rewritten by the cumulative vertex count seen so
/// far; vertices are not deduplicated. No fragments yields an empty geometry.
pub fn assemble<'a, I>(fragments: I) -> MergedGeometry
where
    I: IntoIterator<Item = &'a Mesh>,
{
    let mut merged = MergedGeometry::new();
    for fragment in fragments {
        merged.append_fragment(fragment);
    }
    merged
}

/// Cast a slice of `T` to a byte slice without allocation.
pub(crate) fn cast_slice<T: Copy>(slice: &[T]) -> &[u8] {
    let ptr = slice.as_ptr() as *const u8;
    let len = std::mem::size_of_val(slice);
    debug_assert_eq!(len, slice.len() * mem::size_of::<T>());
    // SAFETY: only used with [f32; N] and u32, which have no padding.
    unsafe { std::slice::from_raw_parts(ptr, len) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesher::geometry::Vertex;

    fn triangle(x: f32) -> Mesh {
        let mut mesh = Mesh::new();
        let a = mesh.add_vertex(Vertex::new([x, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]));
        let b = mesh.add_vertex(Vertex::new([x + 1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]));
        let c = mesh.add_vertex(Vertex::new([x, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]));
        mesh.add_triangle(a, b, c);
        mesh
    }

    #[test]
    fn test_assemble_offsets_indices() {
        let fragments = [triangle(0.0), triangle(2.0), triangle(4.0)];
        let merged = assemble(&fragments);

        assert_eq!(merged.vertex_count(), 9);
        assert_eq!(merged.triangle_count(), 3);
        assert_eq!(merged.indices, vec![0, 1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(merged.positions[3], [2.0, 0.0, 0.0]);
        merged.validate().unwrap();
    }

    #[test]
    fn test_assemble_nothing_is_empty_not_error() {
        let merged = assemble(std::iter::empty::<&Mesh>());
        assert!(merged.is_empty());
        merged.validate().unwrap();
    }

    #[test]
    fn test_merge_geometry() {
        let mut a = assemble([&triangle(0.0)]);
        let b = assemble([&triangle(2.0)]);
        a.merge(&b);

        assert_eq!(a.vertex_count(), 6);
        assert_eq!(a.indices, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_bytes_zero_alloc() {
        let geometry = assemble([&triangle(0.0)]);

        assert_eq!(geometry.positions_bytes().len(), 3 * 12);
        assert_eq!(geometry.normals_bytes().len(), 3 * 12);
        assert_eq!(geometry.uvs_bytes().len(), 3 * 8);
        assert_eq!(geometry.indices_bytes().len(), 3 * 4);
        assert_eq!(geometry.positions_flat().len(), 9);
    }

    #[test]
    fn test_recenter_and_scale() {
        let mut geometry = assemble([&triangle(4.0)]);
        let offset = geometry.recenter();
        assert_eq!(offset, [-4.5, -0.5, 0.0]);
        geometry.scale(2.0);

        let bounds = geometry.bounds().unwrap();
        assert_eq!(bounds.min, [-1.0, -1.0, 0.0]);
        assert_eq!(bounds.max, [1.0, 1.0, 0.0]);
        assert_eq!(geometry.normals[0], [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_validate_catches_out_of_range_index() {
        let mut geometry = assemble([&triangle(0.0)]);
        geometry.indices[2] = 3;
        assert!(matches!(
            geometry.validate(),
            Err(MesherError::InvalidGeometry(_))
        ));
    }
}
