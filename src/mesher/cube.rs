//! Axis-aligned cube primitive.
//!
//! Every cube is 6 faces x 4 unique vertices (24) and 6 x 6 indices (36).
//! Vertices are never shared between faces so normals stay flat.

use super::geometry::{Mesh, Vertex};
use super::uv::FaceUv;
use crate::types::Face;
use glam::Vec3;

/// Vertices emitted per cube.
pub const CUBE_VERTICES: usize = 24;
/// Indices emitted per cube.
pub const CUBE_INDICES: usize = 36;

/// Corner signs `(right, up)` in counter-clockwise order seen from outside.
const CORNERS: [(f32, f32); 4] = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

/// How texture coordinates are assigned to a cube's faces.
#[derive(Debug, Clone, Copy)]
pub enum CubeUv<'a> {
    /// Every vertex samples the same texel (one-texel billboard per voxel).
    Uniform([f32; 2]),
    /// One rectangle per face, in cube order.
    PerFace(&'a [FaceUv; 6]),
}

/// Append an axis-aligned cube centred at `center` with edge lengths `size`.
pub fn emit_cube(mesh: &mut Mesh, center: Vec3, size: Vec3, uv: CubeUv<'_>) {
    let half = size * 0.5;

    for (face_index, face) in Face::ALL.iter().enumerate() {
        let normal = face.normal();
        let (right, up) = face.tangents();

        let mut corner_indices = [0u32; 4];
        for (slot, &(sr, su)) in CORNERS.iter().enumerate() {
            let position = center + (normal + right * sr + up * su) * half;
            let tex = match uv {
                CubeUv::Uniform(uv) => uv,
                CubeUv::PerFace(faces) => {
                    faces[face_index].lerp((sr + 1.0) * 0.5, (su + 1.0) * 0.5)
                }
            };
            corner_indices[slot] =
                mesh.add_vertex(Vertex::new(position.to_array(), normal.to_array(), tex));
        }

        let [i0, i1, i2, i3] = corner_indices;
        mesh.add_quad(i0, i1, i2, i3);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesher::uv::box_face_uvs;
    use crate::types::BoxSize;

    #[test]
    fn test_unit_cube_counts() {
        let mut mesh = Mesh::new();
        emit_cube(&mut mesh, Vec3::ZERO, Vec3::ONE, CubeUv::Uniform([0.5, 0.5]));

        assert_eq!(mesh.vertex_count(), CUBE_VERTICES);
        assert_eq!(mesh.indices.len(), CUBE_INDICES);
        assert_eq!(mesh.triangle_count(), 12);
        assert!(mesh.vertices.iter().all(|v| v.uv == [0.5, 0.5]));
    }

    #[test]
    fn test_cube_extent_and_offset() {
        let mut mesh = Mesh::new();
        emit_cube(
            &mut mesh,
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(1.0, 1.0, 0.5),
            CubeUv::Uniform([0.0, 0.0]),
        );
        let bounds = mesh.bounds().unwrap();
        assert_eq!(bounds.min, [0.5, 1.5, 2.75]);
        assert_eq!(bounds.max, [1.5, 2.5, 3.25]);
    }

    #[test]
    fn test_triangles_wind_outward() {
        let mut mesh = Mesh::new();
        emit_cube(&mut mesh, Vec3::ZERO, Vec3::ONE, CubeUv::Uniform([0.0, 0.0]));

        for tri in mesh.indices.chunks(3) {
            let a = Vec3::from(mesh.vertices[tri[0] as usize].position);
            let b = Vec3::from(mesh.vertices[tri[1] as usize].position);
            let c = Vec3::from(mesh.vertices[tri[2] as usize].position);
            let n = Vec3::from(mesh.vertices[tri[0] as usize].normal);
            assert!((b - a).cross(c - a).dot(n) > 0.0);
        }
    }

    #[test]
    fn test_normals_are_per_face() {
        let mut mesh = Mesh::new();
        emit_cube(&mut mesh, Vec3::ZERO, Vec3::ONE, CubeUv::Uniform([0.0, 0.0]));

        for (face_index, face) in Face::ALL.iter().enumerate() {
            for v in &mesh.vertices[face_index * 4..face_index * 4 + 4] {
                assert_eq!(v.normal, face.normal().to_array());
                let along = Vec3::from(v.position).dot(face.normal());
                assert!((along - 0.5).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_per_face_uvs_follow_rects() {
        let uvs = box_face_uvs([0, 0], BoxSize::new(8, 8, 8), [64, 64]).unwrap();
        let mut mesh = Mesh::new();
        emit_cube(&mut mesh, Vec3::ZERO, Vec3::splat(8.0), CubeUv::PerFace(&uvs));

        // Front face (index 4) bottom-left corner gets (u0, v0).
        let front_bl = mesh.vertices[4 * 4];
        assert_eq!(front_bl.uv, [uvs[4].u0, uvs[4].v0]);
        assert_eq!(front_bl.position, [-4.0, -4.0, 4.0]);
    }
}
