//! Player body parts for the 64x64 skin layout.
//!
//! Six boxes, each with its own inner net and overlay net. The left limbs have
//! their own texture regions on modern skins and are never mirrored from the
//! right ones. Supports wide (Steve) and slim (Alex) arms.

use crate::error::Result;
use crate::material::RenderState;
use crate::mesh_output::{assemble, MergedGeometry};
use crate::mesher::cube::{emit_cube, CubeUv};
use crate::mesher::geometry::Mesh;
use crate::mesher::layer_shell::voxelize_layer_shell;
use crate::mesher::uv::box_face_uvs;
use crate::texture::{AlphaMask, OccupancyThreshold};
use crate::types::BoxSize;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartId {
    Head,
    Body,
    RightArm,
    LeftArm,
    RightLeg,
    LeftLeg,
}

impl PartId {
    pub const ALL: [PartId; 6] = [
        PartId::Head,
        PartId::Body,
        PartId::RightArm,
        PartId::LeftArm,
        PartId::RightLeg,
        PartId::LeftLeg,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PartId::Head => "head",
            PartId::Body => "body",
            PartId::RightArm => "right_arm",
            PartId::LeftArm => "left_arm",
            PartId::RightLeg => "right_leg",
            PartId::LeftLeg => "left_leg",
        }
    }
}

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a part reads the skin and where it sits in the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartSpec {
    pub id: PartId,
    pub size: BoxSize,
    /// Top-left of the inner box net.
    pub inner_anchor: [u32; 2],
    /// Top-left of the overlay net.
    pub outer_anchor: [u32; 2],
    /// Box centre in model space (feet at y = 0, facing +Z).
    pub placement: Vec3,
}

/// Layout entry for one part.
pub fn part_spec(id: PartId, slim: bool) -> PartSpec {
    let arm_width = if slim { 3 } else { 4 };
    // Arms hang off the body's 4-wide half width.
    let arm_x = 4.0 + arm_width as f32 * 0.5;

    let (size, inner_anchor, outer_anchor, placement) = match id {
        PartId::Head => (BoxSize::new(8, 8, 8), [0, 0], [32, 0], Vec3::new(0.0, 28.0, 0.0)),
        PartId::Body => (BoxSize::new(8, 12, 4), [16, 16], [16, 32], Vec3::new(0.0, 18.0, 0.0)),
        PartId::RightArm => (
            BoxSize::new(arm_width, 12, 4),
            [40, 16],
            [40, 32],
            Vec3::new(-arm_x, 18.0, 0.0),
        ),
        PartId::LeftArm => (
            BoxSize::new(arm_width, 12, 4),
            [32, 48],
            [48, 48],
            Vec3::new(arm_x, 18.0, 0.0),
        ),
        PartId::RightLeg => (BoxSize::new(4, 12, 4), [0, 16], [0, 32], Vec3::new(-2.0, 6.0, 0.0)),
        PartId::LeftLeg => (BoxSize::new(4, 12, 4), [16, 48], [0, 48], Vec3::new(2.0, 6.0, 0.0)),
    };

    PartSpec {
        id,
        size,
        inner_anchor,
        outer_anchor,
        placement,
    }
}

/// The full six-part layout.
pub fn player_parts(slim: bool) -> [PartSpec; 6] {
    PartId::ALL.map(|id| part_spec(id, slim))
}

/// One built part: inner box followed by its overlay shell in a single buffer.
#[derive(Debug, Clone)]
pub struct BodyPart {
    pub id: PartId,
    pub size: BoxSize,
    pub placement: Vec3,
    geometry: Arc<MergedGeometry>,
    inner_index_count: usize,
}

impl BodyPart {
    /// Build a part from a sampled skin.
    pub fn build(
        mask: &AlphaMask<'_>,
        spec: &PartSpec,
        threshold: OccupancyThreshold,
    ) -> Result<Self> {
        let atlas = [mask.width(), mask.height()];
        let uvs = box_face_uvs(spec.inner_anchor, spec.size, atlas)?;

        let mut inner = Mesh::with_face_capacity(6);
        emit_cube(
            &mut inner,
            Vec3::ZERO,
            Vec3::from(spec.size.extent()),
            CubeUv::PerFace(&uvs),
        );

        let mut geometry = assemble([&inner]);
        let inner_index_count = geometry.indices.len();

        if let Some(outer) = voxelize_layer_shell(mask, spec.outer_anchor, spec.size, threshold)? {
            geometry.merge(&outer);
        }

        Ok(Self {
            id: spec.id,
            size: spec.size,
            placement: spec.placement,
            geometry: Arc::new(geometry),
            inner_index_count,
        })
    }

    /// Part-local geometry, box centred on the origin.
    pub fn geometry(&self) -> &Arc<MergedGeometry> {
        &self.geometry
    }

    /// Index range of the opaque inner box.
    pub fn inner_range(&self) -> Range<usize> {
        0..self.inner_index_count
    }

    /// Index range of the overlay shell (empty when the overlay is blank).
    pub fn outer_range(&self) -> Range<usize> {
        self.inner_index_count..self.geometry.indices.len()
    }

    /// Index ranges with the state each is drawn with: the opaque inner box,
    /// then the overlay when there is one.
    pub fn draw_ranges(&self) -> Vec<(Range<usize>, RenderState)> {
        let mut ranges = vec![(self.inner_range(), RenderState::OPAQUE)];
        if self.has_overlay() {
            ranges.push((self.outer_range(), RenderState::OUTER_LAYER));
        }
        ranges
    }

    pub fn has_overlay(&self) -> bool {
        !self.outer_range().is_empty()
    }

    /// Height used to normalize the glow gradient.
    pub fn height(&self) -> f32 {
        self.size.height as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesher::cube::CUBE_INDICES;
    use crate::mesher::uv::validate_box_region;
    use crate::texture::TextureData;

    #[test]
    fn test_every_net_fits_the_atlas() {
        for slim in [false, true] {
            for spec in player_parts(slim) {
                validate_box_region(spec.inner_anchor, spec.size, [64, 64]).unwrap();
                validate_box_region(spec.outer_anchor, spec.size, [64, 64]).unwrap();
            }
        }
    }

    #[test]
    fn test_slim_arms() {
        let wide = part_spec(PartId::LeftArm, false);
        let slim = part_spec(PartId::LeftArm, true);
        assert_eq!(wide.size, BoxSize::new(4, 12, 4));
        assert_eq!(slim.size, BoxSize::new(3, 12, 4));
        assert_eq!(wide.placement.x, 6.0);
        assert_eq!(slim.placement.x, 5.5);
        // Legs do not change.
        assert_eq!(part_spec(PartId::LeftLeg, true), part_spec(PartId::LeftLeg, false));
    }

    #[test]
    fn test_parts_stack_without_gaps() {
        let parts = player_parts(false);
        let top = |id: PartId| {
            let s = parts.iter().find(|s| s.id == id).unwrap();
            let half = s.size.height as f32 * 0.5;
            (s.placement.y - half, s.placement.y + half)
        };
        assert_eq!(top(PartId::RightLeg), (0.0, 12.0));
        assert_eq!(top(PartId::Body), (12.0, 24.0));
        assert_eq!(top(PartId::Head), (24.0, 32.0));
    }

    #[test]
    fn test_part_without_overlay() {
        let mut skin = TextureData::transparent(64, 64);
        for y in 0..16 {
            for x in 0..32 {
                skin.set_pixel(x, y, [200, 150, 100, 255]);
            }
        }
        let mask = AlphaMask::from_texture(&skin).unwrap();
        let spec = part_spec(PartId::Head, false);
        let part = BodyPart::build(&mask, &spec, OccupancyThreshold::SKIN_LAYER).unwrap();

        assert_eq!(part.inner_range(), 0..CUBE_INDICES);
        assert!(!part.has_overlay());
        let bounds = part.geometry().bounds().unwrap();
        assert_eq!(bounds.max, [4.0, 4.0, 4.0]);
    }

    #[test]
    fn test_part_with_overlay() {
        let mut skin = TextureData::transparent(64, 64);
        // One hat texel on the front face.
        skin.set_pixel(40, 8, [1, 2, 3, 255]);
        let mask = AlphaMask::from_texture(&skin).unwrap();
        let spec = part_spec(PartId::Head, false);
        let part = BodyPart::build(&mask, &spec, OccupancyThreshold::SKIN_LAYER).unwrap();

        assert!(part.has_overlay());
        assert_eq!(part.outer_range(), CUBE_INDICES..2 * CUBE_INDICES);
        part.geometry().validate().unwrap();
    }

    #[test]
    fn test_inner_box_front_samples_face_texels() {
        let mut skin = TextureData::transparent(64, 64);
        // Head front rect is (8, 8, 8, 8); mark its top-left texel.
        skin.set_pixel(8, 8, [255, 0, 0, 255]);
        let mask = AlphaMask::from_texture(&skin).unwrap();
        let spec = part_spec(PartId::Head, false);
        let part = BodyPart::build(&mask, &spec, OccupancyThreshold::SKIN_LAYER).unwrap();

        // Front is face index 4; corner 3 is (-right, +up), the top-left seen from the front.
        let geometry = part.geometry();
        let top_left = geometry.uvs[4 * 4 + 3];
        assert_eq!(geometry.positions[4 * 4 + 3], [-4.0, 4.0, 4.0]);
        assert_eq!(skin.sample_nearest(top_left), [255, 0, 0, 255]);
    }
}
