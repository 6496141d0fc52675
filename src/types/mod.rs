//! Shared types used throughout the library.

mod face;

pub use face::{Axis, Face};

/// Box dimensions in voxel units (one voxel per atlas texel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoxSize {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl BoxSize {
    pub const fn new(width: u32, height: u32, depth: u32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Dimensions as floats, `[w, h, d]`.
    pub fn extent(&self) -> [f32; 3] {
        [self.width as f32, self.height as f32, self.depth as f32]
    }

    /// Size of the face grid `(columns, rows)` for a face of this box.
    pub fn face_grid(&self, face: Face) -> (u32, u32) {
        match face {
            Face::Front | Face::Back => (self.width, self.height),
            Face::Left | Face::Right => (self.depth, self.height),
            Face::Top | Face::Bottom => (self.width, self.depth),
        }
    }

    /// Footprint `(width, height)` of the full unfolded net in the atlas.
    ///
    /// `None` if either side overflows `u32`.
    pub fn net_footprint(&self) -> Option<(u32, u32)> {
        let width = self.depth.checked_add(self.width)?.checked_mul(2)?;
        let height = self.depth.checked_add(self.height)?;
        Some((width, height))
    }
}

/// A rectangle in atlas pixel space (origin top-left, y down).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AtlasRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl AtlasRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check whether the rectangle lies entirely inside an atlas of the given size.
    pub fn fits_in(&self, atlas_width: u32, atlas_height: u32) -> bool {
        self.x
            .checked_add(self.width)
            .is_some_and(|right| right <= atlas_width)
            && self
                .y
                .checked_add(self.height)
                .is_some_and(|bottom| bottom <= atlas_height)
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl BoundingBox {
    pub fn from_points(points: impl Iterator<Item = [f32; 3]>) -> Option<Self> {
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        let mut has_points = false;

        for p in points {
            has_points = true;
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }

        if has_points {
            Some(Self { min, max })
        } else {
            None
        }
    }

    pub fn dimensions(&self) -> [f32; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    pub fn center(&self) -> [f32; 3] {
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
            (self.min[2] + self.max[2]) * 0.5,
        ]
    }
}
