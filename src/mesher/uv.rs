//! Box-unwrap UV mapping.
//!
//! For a box of size (W, H, D) anchored at atlas pixel (x, y), the six faces are
//! laid out as the standard unfolded net:
//! ```text
//!          x      x+D    x+D+W  x+2D+W  x+2D+2W
//! y        |      | TOP  | BOT  |       |
//! y+D      | LEFT | FRONT| RIGHT| BACK  |
//! y+D+H    |      |      |      |       |
//! ```
//! LEFT is the -X side, RIGHT the +X side of a model facing +Z.

use crate::error::{MesherError, Result};
use crate::types::{AtlasRect, BoxSize, Face};

/// Atlas size assumed when the caller does not supply one.
pub const DEFAULT_ATLAS_SIZE: [u32; 2] = [64, 64];

/// UV rectangle for one face, V up.
///
/// `(u0, v0)` is the face-local bottom-left corner and `(u1, v1)` the top-right,
/// in the face's outward tangent frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceUv {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

impl FaceUv {
    /// Map an atlas rectangle to texel-centred UV endpoints.
    ///
    /// Flips swap the interpolation endpoints; the geometry is left alone.
    pub fn from_rect(rect: AtlasRect, atlas: [u32; 2], flip_u: bool, flip_v: bool) -> Self {
        let aw = atlas[0] as f32;
        let ah = atlas[1] as f32;

        let left = (rect.x as f32 + 0.5) / aw;
        let right = ((rect.x + rect.width) as f32 - 0.5) / aw;
        let top = 1.0 - (rect.y as f32 + 0.5) / ah;
        let bottom = 1.0 - ((rect.y + rect.height) as f32 - 0.5) / ah;

        let (u0, u1) = if flip_u { (right, left) } else { (left, right) };
        let (v0, v1) = if flip_v { (top, bottom) } else { (bottom, top) };

        Self { u0, v0, u1, v1 }
    }

    /// Interpolate at face-local coordinates `(s, t)` in `[0, 1]`.
    pub fn lerp(&self, s: f32, t: f32) -> [f32; 2] {
        [
            self.u0 + (self.u1 - self.u0) * s,
            self.v0 + (self.v1 - self.v0) * t,
        ]
    }
}

/// UV of the centre of atlas texel `(x, y)`.
pub fn texel_center_uv(x: u32, y: u32, atlas: [u32; 2]) -> [f32; 2] {
    [
        (x as f32 + 0.5) / atlas[0] as f32,
        1.0 - (y as f32 + 0.5) / atlas[1] as f32,
    ]
}

/// Atlas rectangle of one face of a box anchored at `anchor`.
///
/// `None` when a coordinate does not fit in `u32`.
pub fn face_rect(anchor: [u32; 2], size: BoxSize, face: Face) -> Option<AtlasRect> {
    let [x, y] = anchor;
    let BoxSize {
        width: w,
        height: h,
        depth: d,
    } = size;

    let x_front = x.checked_add(d)?;
    let x_right = x_front.checked_add(w)?;
    let y_side = y.checked_add(d)?;

    let rect = match face {
        Face::Right => AtlasRect::new(x_right, y_side, d, h),
        Face::Left => AtlasRect::new(x, y_side, d, h),
        Face::Top => AtlasRect::new(x_front, y, w, d),
        Face::Bottom => AtlasRect::new(x_right, y, w, d),
        Face::Front => AtlasRect::new(x_front, y_side, w, h),
        Face::Back => AtlasRect::new(x_right.checked_add(d)?, y_side, w, h),
    };
    Some(rect)
}

/// Whether a face's atlas rectangle is stored V-mirrored relative to its tangent frame.
pub fn face_flips_v(face: Face) -> bool {
    matches!(face, Face::Bottom)
}

/// Atlas rectangles of all six faces in cube order, checked against the atlas.
pub fn box_face_rects(anchor: [u32; 2], size: BoxSize, atlas: [u32; 2]) -> Result<[AtlasRect; 6]> {
    let invalid = || MesherError::InvalidAtlasRegion {
        anchor,
        size: [size.width, size.height, size.depth],
        atlas,
    };

    let (net_w, net_h) = size.net_footprint().ok_or_else(invalid)?;
    let footprint = AtlasRect::new(anchor[0], anchor[1], net_w, net_h);
    if !footprint.fits_in(atlas[0], atlas[1]) {
        return Err(invalid());
    }

    let mut rects = [footprint; 6];
    for (slot, &face) in rects.iter_mut().zip(Face::ALL.iter()) {
        *slot = face_rect(anchor, size, face)
            .filter(|rect| rect.fits_in(atlas[0], atlas[1]))
            .ok_or_else(invalid)?;
    }
    Ok(rects)
}

/// Check that every face rectangle of the box lies inside the atlas.
pub fn validate_box_region(anchor: [u32; 2], size: BoxSize, atlas: [u32; 2]) -> Result<()> {
    box_face_rects(anchor, size, atlas).map(|_| ())
}

/// UV rectangles for all six faces, in cube order (right, left, top, bottom, front, back).
pub fn box_face_uvs(anchor: [u32; 2], size: BoxSize, atlas: [u32; 2]) -> Result<[FaceUv; 6]> {
    let rects = box_face_rects(anchor, size, atlas)?;
    let mut uvs = [FaceUv::from_rect(rects[0], atlas, false, false); 6];
    for ((uv, rect), &face) in uvs.iter_mut().zip(rects).zip(Face::ALL.iter()) {
        *uv = FaceUv::from_rect(rect, atlas, false, face_flips_v(face));
    }
    Ok(uvs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_rects() {
        let size = BoxSize::new(8, 8, 8);
        assert_eq!(face_rect([0, 0], size, Face::Top), Some(AtlasRect::new(8, 0, 8, 8)));
        assert_eq!(face_rect([0, 0], size, Face::Bottom), Some(AtlasRect::new(16, 0, 8, 8)));
        assert_eq!(face_rect([0, 0], size, Face::Left), Some(AtlasRect::new(0, 8, 8, 8)));
        assert_eq!(face_rect([0, 0], size, Face::Front), Some(AtlasRect::new(8, 8, 8, 8)));
        assert_eq!(face_rect([0, 0], size, Face::Right), Some(AtlasRect::new(16, 8, 8, 8)));
        assert_eq!(face_rect([0, 0], size, Face::Back), Some(AtlasRect::new(24, 8, 8, 8)));
    }

    #[test]
    fn test_uvs_are_texel_centred() {
        let uv = FaceUv::from_rect(AtlasRect::new(8, 8, 8, 8), [64, 64], false, false);
        assert!((uv.u0 - 8.5 / 64.0).abs() < 1e-6);
        assert!((uv.u1 - 15.5 / 64.0).abs() < 1e-6);
        assert!((uv.v1 - (1.0 - 8.5 / 64.0)).abs() < 1e-6);
        assert!((uv.v0 - (1.0 - 15.5 / 64.0)).abs() < 1e-6);
    }

    #[test]
    fn test_flip_swaps_endpoints() {
        let rect = AtlasRect::new(4, 4, 4, 4);
        let plain = FaceUv::from_rect(rect, [64, 64], false, false);
        let flipped = FaceUv::from_rect(rect, [64, 64], true, true);
        assert_eq!(plain.u0, flipped.u1);
        assert_eq!(plain.u1, flipped.u0);
        assert_eq!(plain.v0, flipped.v1);
        assert_eq!(plain.v1, flipped.v0);
    }

    #[test]
    fn test_bottom_face_is_v_mirrored() {
        let uvs = box_face_uvs([0, 0], BoxSize::new(8, 8, 8), DEFAULT_ATLAS_SIZE).unwrap();
        let top = uvs[2];
        let bottom = uvs[3];
        assert!(top.v1 > top.v0);
        assert!(bottom.v1 < bottom.v0);
    }

    #[test]
    fn test_cell_centres_hit_their_texel() {
        // Nearest lookup at every cell centre lands on the matching texel.
        let rect = AtlasRect::new(16, 20, 8, 12);
        let uv = FaceUv::from_rect(rect, [64, 64], false, false);
        for k in 0..rect.width {
            for j in 0..rect.height {
                let s = (k as f32 + 0.5) / rect.width as f32;
                let t = 1.0 - (j as f32 + 0.5) / rect.height as f32;
                let [u, v] = uv.lerp(s, t);
                assert_eq!((u * 64.0).floor() as u32, rect.x + k);
                assert_eq!(((1.0 - v) * 64.0).floor() as u32, rect.y + j);
            }
        }
    }

    #[test]
    fn test_region_outside_atlas_is_rejected() {
        let err = box_face_uvs([40, 60], BoxSize::new(4, 12, 4), DEFAULT_ATLAS_SIZE).unwrap_err();
        assert!(matches!(err, MesherError::InvalidAtlasRegion { .. }));
        // Right at the edge is fine: 48 + 2*(4+4) = 64.
        assert!(validate_box_region([48, 48], BoxSize::new(4, 12, 4), DEFAULT_ATLAS_SIZE).is_ok());
    }

    #[test]
    fn test_oversized_box_is_rejected_without_overflow() {
        let size = BoxSize::new(u32::MAX / 2 + 1, 1, 1);
        assert_eq!(size.net_footprint(), None);
        let err = validate_box_region([0, 0], size, DEFAULT_ATLAS_SIZE).unwrap_err();
        assert!(matches!(err, MesherError::InvalidAtlasRegion { .. }));

        // Anchor near the top of the range overflows the face offsets.
        assert_eq!(face_rect([u32::MAX - 1, 0], BoxSize::new(1, 1, 1), Face::Back), None);
        let err = box_face_uvs([u32::MAX - 1, 0], BoxSize::new(1, 1, 1), DEFAULT_ATLAS_SIZE)
            .unwrap_err();
        assert!(matches!(err, MesherError::InvalidAtlasRegion { .. }));
    }
}
