//! Alpha-mask sampling into a caller-owned scratch buffer.

use super::TextureData;
use crate::error::{MesherError, Result};
use crate::types::AtlasRect;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// Strict lower bound on alpha for a texel to count as occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OccupancyThreshold(pub u8);

impl OccupancyThreshold {
    /// Item sprites: ignores near-transparent antialiasing fringes.
    pub const ITEM: Self = Self(10);
    /// Skin overlay layers: overlay alpha is binary, any coverage counts.
    pub const SKIN_LAYER: Self = Self(0);

    /// `alpha > threshold`.
    pub fn admits(self, alpha: u8) -> bool {
        alpha > self.0
    }
}

/// Reusable RGBA buffer that sampled textures are written into.
///
/// One scratch per generation pipeline; nothing is shared between callers.
#[derive(Debug, Default)]
pub struct SampleScratch {
    pixels: Vec<u8>,
}

impl SampleScratch {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Read-only per-texel view over an RGBA8 buffer.
#[derive(Debug, Clone, Copy)]
pub struct AlphaMask<'a> {
    width: u32,
    height: u32,
    pixels: &'a [u8],
}

impl<'a> AlphaMask<'a> {
    /// View a texture at its native size without copying.
    ///
    /// Fails with `InvalidTexture` when the buffer does not match the dimensions.
    pub fn from_texture(texture: &'a TextureData) -> Result<Self> {
        texture.validate()?;
        Ok(Self {
            width: texture.width,
            height: texture.height,
            pixels: &texture.pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, stride 4.
    pub fn pixels(&self) -> &'a [u8] {
        self.pixels
    }

    /// Alpha at (x, y). Texels outside the raster read as fully transparent.
    pub fn alpha(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4 + 3;
        self.pixels.get(idx).copied().unwrap_or(0)
    }

    pub fn is_occupied(&self, x: u32, y: u32, threshold: OccupancyThreshold) -> bool {
        threshold.admits(self.alpha(x, y))
    }

    /// Occupied texels inside `rect`, in row-major order (top row first).
    pub fn occupied_in(
        &self,
        rect: AtlasRect,
        threshold: OccupancyThreshold,
    ) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..rect.height).flat_map(move |j| {
            (0..rect.width).filter_map(move |i| {
                self.is_occupied(rect.x + i, rect.y + j, threshold)
                    .then_some((i, j))
            })
        })
    }

    /// Copy the sampled raster out as an owned texture.
    pub fn to_texture(&self) -> TextureData {
        TextureData {
            width: self.width,
            height: self.height,
            pixels: self.pixels.to_vec(),
        }
    }

    /// Count occupied texels over the whole raster.
    pub fn occupied_count(&self, threshold: OccupancyThreshold) -> usize {
        self.pixels
            .chunks_exact(4)
            .filter(|px| threshold.admits(px[3]))
            .count()
    }
}

/// Sample `texture` at `target` dimensions into `scratch`.
///
/// - same size: copied verbatim;
/// - same aspect ratio: nearest-neighbour resample (HD skins);
/// - otherwise: drawn at the origin of a transparent canvas and clipped
///   (legacy 64x32 skins leave the lower half empty).
pub fn sample<'s>(
    texture: &TextureData,
    target: (u32, u32),
    scratch: &'s mut SampleScratch,
) -> Result<AlphaMask<'s>> {
    let (tw, th) = target;
    if tw == 0 || th == 0 {
        return Err(MesherError::InvalidTexture(format!(
            "zero-sized sample target {}x{}",
            tw, th
        )));
    }

    texture.validate()?;
    scratch.pixels.clear();

    if texture.width == tw && texture.height == th {
        scratch.pixels.extend_from_slice(&texture.pixels);
    } else {
        let source = RgbaImage::from_raw(texture.width, texture.height, texture.pixels.clone())
            .ok_or_else(|| {
                MesherError::InvalidTexture(format!(
                    "pixel buffer does not match {}x{}",
                    texture.width, texture.height
                ))
            })?;

        let same_aspect =
            texture.width as u64 * th as u64 == texture.height as u64 * tw as u64;
        let canvas = if same_aspect {
            log::debug!(
                "resampling {}x{} texture to {}x{} (nearest)",
                texture.width,
                texture.height,
                tw,
                th
            );
            imageops::resize(&source, tw, th, FilterType::Nearest)
        } else {
            log::warn!(
                "texture {}x{} does not match target {}x{}; drawing at origin",
                texture.width,
                texture.height,
                tw,
                th
            );
            let mut canvas = RgbaImage::new(tw, th);
            imageops::replace(&mut canvas, &source, 0, 0);
            canvas
        };
        scratch.pixels.extend_from_slice(canvas.as_raw());
    }

    Ok(AlphaMask {
        width: tw,
        height: th,
        pixels: &scratch.pixels,
    })
}
