//! Full-cube voxelization of item sprites.
//!
//! Every occupied texel becomes one unit cube. There is no face culling between
//! neighbouring cubes; sprites are small and the cost is accepted.

use super::cube::{emit_cube, CubeUv, CUBE_INDICES, CUBE_VERTICES};
use super::geometry::Mesh;
use super::uv::texel_center_uv;
use crate::error::{MesherError, Result};
use crate::mesh_output::{assemble, MergedGeometry};
use crate::texture::{AlphaMask, OccupancyThreshold};
use glam::Vec3;

/// World size of the longest sprite edge, shared with body-part voxel units.
pub const ITEM_VOXEL_UNIT: f32 = 16.0;

/// Voxelize a sprite into merged, centred, unit-scaled geometry.
///
/// Texel `(x, y)` produces a cube centred at `(x - W/2, (H-1-y) - H/2, 0)`,
/// so row 0 ends up at the highest Y. All six faces of that cube sample the
/// texel's centre. The merged result is re-centred on its bounding box and
/// scaled by `voxel_unit / max(W, H)`.
///
/// Returns [`MesherError::EmptyOccupancy`] when no texel passes `threshold`.
pub fn voxelize_item(
    mask: &AlphaMask<'_>,
    threshold: OccupancyThreshold,
    voxel_unit: f32,
) -> Result<MergedGeometry> {
    let width = mask.width();
    let height = mask.height();
    let half_w = width as f32 / 2.0;
    let half_h = height as f32 / 2.0;

    let mut cubes = Vec::new();
    for y in 0..height {
        for x in 0..width {
            if !mask.is_occupied(x, y, threshold) {
                continue;
            }
            let center = Vec3::new(
                x as f32 - half_w,
                (height - 1 - y) as f32 - half_h,
                0.0,
            );
            let mut cube = Mesh::with_face_capacity(6);
            emit_cube(
                &mut cube,
                center,
                Vec3::ONE,
                CubeUv::Uniform(texel_center_uv(x, y, [width, height])),
            );
            cubes.push(cube);
        }
    }

    if cubes.is_empty() {
        return Err(MesherError::EmptyOccupancy { width, height });
    }

    let mut geometry = assemble(&cubes);
    debug_assert_eq!(geometry.vertex_count(), cubes.len() * CUBE_VERTICES);
    debug_assert_eq!(geometry.indices.len(), cubes.len() * CUBE_INDICES);

    geometry.recenter();
    geometry.scale(voxel_unit / width.max(height) as f32);

    log::debug!(
        "voxelized {}x{} sprite: {} cubes, {} vertices",
        width,
        height,
        cubes.len(),
        geometry.vertex_count()
    );

    Ok(geometry)
}
