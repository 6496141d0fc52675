//! Shell voxelization of skin overlay layers.
//!
//! An overlay (hat, jacket, sleeves, pants) is a thin shell around the inner
//! body box, so only the six exterior face grids are extruded. Each face is an
//! independent 2D occupancy pass over its atlas rectangle; no interior voxel
//! grid is ever built.

use super::cube::{emit_cube, CubeUv, CUBE_VERTICES};
use super::geometry::Mesh;
use super::uv::{box_face_rects, face_flips_v, texel_center_uv};
use crate::error::Result;
use crate::mesh_output::{assemble, MergedGeometry};
use crate::texture::{AlphaMask, OccupancyThreshold};
use crate::types::{AtlasRect, BoxSize, Face};
use glam::Vec3;

/// Distance from the inner box surface to the centre of an overlay slab.
pub const SHELL_STANDOFF: f32 = 0.25;

/// Thickness of an overlay slab along its face normal.
pub const SHELL_SLAB_THICKNESS: f32 = 0.5;

/// Extrude the overlay shell of a box whose net is anchored at `anchor`.
///
/// Geometry is box-local (box centred on the origin). Returns `Ok(None)` when
/// none of the six face rectangles has an occupied texel; an empty overlay is a
/// normal outcome, not an error.
pub fn voxelize_layer_shell(
    mask: &AlphaMask<'_>,
    anchor: [u32; 2],
    size: BoxSize,
    threshold: OccupancyThreshold,
) -> Result<Option<MergedGeometry>> {
    let atlas = [mask.width(), mask.height()];
    let rects = box_face_rects(anchor, size, atlas)?;

    let fragments: Vec<Mesh> = Face::ALL
        .iter()
        .zip(rects)
        .map(|(&face, rect)| extrude_face(mask, rect, size, face, threshold))
        .collect();

    let voxels: usize = fragments.iter().map(|f| f.vertex_count() / CUBE_VERTICES).sum();
    if voxels == 0 {
        log::debug!("overlay at ({}, {}) is empty", anchor[0], anchor[1]);
        return Ok(None);
    }

    let geometry = assemble(&fragments);
    log::debug!(
        "overlay at ({}, {}) {}x{}x{}: {} voxels",
        anchor[0],
        anchor[1],
        size.width,
        size.height,
        size.depth,
        voxels
    );
    Ok(Some(geometry))
}

/// One face pass: a flattened slab per occupied texel of the face rectangle.
fn extrude_face(
    mask: &AlphaMask<'_>,
    rect: AtlasRect,
    size: BoxSize,
    face: Face,
    threshold: OccupancyThreshold,
) -> Mesh {
    let atlas = [mask.width(), mask.height()];
    let (columns, rows) = size.face_grid(face);

    let normal = face.normal();
    let (right, up) = face.tangents();
    let half_depth = size.extent()[face.axis().index()] * 0.5;
    let slab = Vec3::ONE - face.axis().unit_vector() * (1.0 - SHELL_SLAB_THICKNESS);

    let mut fragment = Mesh::new();
    for (i, j) in mask.occupied_in(rect, threshold) {
        // Atlas rows run top-down while the face's up tangent runs bottom-up.
        // The bottom face's rect is already stored V-mirrored, so its rows map
        // straight onto the tangent.
        let local_j = if face_flips_v(face) { j } else { rows - 1 - j };

        let s = i as f32 + 0.5 - columns as f32 * 0.5;
        let t = local_j as f32 + 0.5 - rows as f32 * 0.5;
        let center = normal * (half_depth + SHELL_STANDOFF) + right * s + up * t;

        emit_cube(
            &mut fragment,
            center,
            slab,
            CubeUv::Uniform(texel_center_uv(rect.x + i, rect.y + j, atlas)),
        );
    }
    fragment
}
