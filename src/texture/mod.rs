//! Texture loading and alpha sampling.

mod sampler;

pub use sampler::{sample, AlphaMask, OccupancyThreshold, SampleScratch};

use crate::error::{MesherError, Result};
use image::ImageEncoder;
use std::path::Path;

/// Side length of a modern skin atlas.
pub const SKIN_ATLAS_SIZE: u32 = 64;

/// Raw texture data decoded from PNG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureData {
    /// Texture width in pixels.
    pub width: u32,
    /// Texture height in pixels.
    pub height: u32,
    /// RGBA8 pixel data (4 bytes per pixel).
    pub pixels: Vec<u8>,
}

impl TextureData {
    /// Create a texture from RGBA data, checking that the buffer matches the dimensions.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let texture = Self {
            width,
            height,
            pixels,
        };
        texture.validate()?;
        Ok(texture)
    }

    /// Check that the dimensions are non-zero and the buffer holds exactly
    /// `width * height` RGBA texels.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(MesherError::InvalidTexture(format!(
                "zero-sized texture {}x{}",
                self.width, self.height
            )));
        }
        let expected = (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|texels| texels.checked_mul(4));
        if expected != Some(self.pixels.len()) {
            return Err(MesherError::InvalidTexture(format!(
                "pixel buffer of {} bytes does not match {}x{} RGBA",
                self.pixels.len(),
                self.width,
                self.height
            )));
        }
        Ok(())
    }

    /// Create a fully transparent texture.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; width as usize * height as usize * 4],
        }
    }

    /// Check if this texture has transparency.
    pub fn has_transparency(&self) -> bool {
        self.pixels.chunks(4).any(|pixel| pixel[3] < 255)
    }

    /// Get a pixel at (x, y).
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    /// Set a pixel at (x, y).
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let idx = ((y * self.width + x) * 4) as usize;
        self.pixels[idx..idx + 4].copy_from_slice(&rgba);
    }

    /// Nearest-filtered lookup at a UV coordinate (V up, as emitted by the voxelizers).
    pub fn sample_nearest(&self, uv: [f32; 2]) -> [u8; 4] {
        let x = (uv[0] * self.width as f32).floor() as i64;
        let y = ((1.0 - uv[1]) * self.height as f32).floor() as i64;
        let x = x.clamp(0, self.width as i64 - 1) as u32;
        let y = y.clamp(0, self.height as i64 - 1) as u32;
        self.get_pixel(x, y)
    }

    /// Encode as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        let cursor = std::io::Cursor::new(&mut bytes);
        let encoder = image::codecs::png::PngEncoder::new(cursor);

        encoder.write_image(
            &self.pixels,
            self.width,
            self.height,
            image::ExtendedColorType::Rgba8,
        )?;

        Ok(bytes)
    }
}

/// Load a texture from PNG bytes.
pub fn load_texture_from_bytes(data: &[u8]) -> Result<TextureData> {
    let img = image::load_from_memory(data)?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    TextureData::from_rgba(width, height, rgba.into_raw())
}

/// Load a texture from a PNG file on disk.
pub fn load_texture_from_path<P: AsRef<Path>>(path: P) -> Result<TextureData> {
    let data = std::fs::read(path)?;
    load_texture_from_bytes(&data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_rgba_rejects_bad_length() {
        assert!(TextureData::from_rgba(2, 2, vec![0; 15]).is_err());
        assert!(TextureData::from_rgba(0, 2, Vec::new()).is_err());
        assert!(TextureData::from_rgba(1, 1, vec![1, 2, 3, 4]).is_ok());
    }

    #[test]
    fn test_get_pixel() {
        let tex = TextureData::from_rgba(
            2,
            2,
            vec![255, 0, 0, 255, 0, 255, 0, 255, 0, 0, 255, 255, 255, 255, 255, 255],
        )
        .unwrap();

        assert_eq!(tex.get_pixel(0, 0), [255, 0, 0, 255]); // Red
        assert_eq!(tex.get_pixel(1, 0), [0, 255, 0, 255]); // Green
        assert_eq!(tex.get_pixel(0, 1), [0, 0, 255, 255]); // Blue
        assert_eq!(tex.get_pixel(1, 1), [255, 255, 255, 255]); // White
    }

    #[test]
    fn test_sample_nearest_uses_bottom_up_v() {
        let mut tex = TextureData::transparent(2, 2);
        tex.set_pixel(0, 0, [9, 9, 9, 255]);
        // Texel (0,0) is the top-left, i.e. high V.
        assert_eq!(tex.sample_nearest([0.25, 0.75]), [9, 9, 9, 255]);
        assert_eq!(tex.sample_nearest([0.25, 0.25]), [0, 0, 0, 0]);
    }

    #[test]
    fn test_png_roundtrip_through_file() {
        let mut tex = TextureData::transparent(4, 3);
        tex.set_pixel(3, 2, [10, 20, 30, 40]);
        let png = tex.to_png().unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&png).unwrap();

        let loaded = load_texture_from_path(file.path()).unwrap();
        assert_eq!(loaded, tex);
    }

    #[test]
    fn test_decode_failure_is_image_error() {
        let err = load_texture_from_bytes(b"not a png").unwrap_err();
        assert!(matches!(err, MesherError::ImageDecode(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_texture_from_path(dir.path().join("missing.png")).unwrap_err();
        assert!(matches!(err, MesherError::Io(_)));
    }
}
