//! Error types for the skin voxel mesher.

use thiserror::Error;

/// Result type alias using MesherError.
pub type Result<T> = std::result::Result<T, MesherError>;

/// Main error type for voxelization and export.
#[derive(Error, Debug)]
pub enum MesherError {
    /// The source texture could not be decoded.
    #[error("Image decode error: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// Failed to parse JSON data (configuration files).
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A sprite had no texel above the occupancy threshold, so there is nothing to render.
    #[error("Texture {width}x{height} has no opaque texels")]
    EmptyOccupancy { width: u32, height: u32 },

    /// A box's unfolded faces do not fit inside the atlas.
    #[error(
        "Atlas region at ({}, {}) for box {}x{}x{} exceeds atlas {}x{}",
        anchor[0], anchor[1], size[0], size[1], size[2], atlas[0], atlas[1]
    )]
    InvalidAtlasRegion {
        anchor: [u32; 2],
        size: [u32; 3],
        atlas: [u32; 2],
    },

    /// Raw pixel data does not describe a valid RGBA8 raster.
    #[error("Invalid texture: {0}")]
    InvalidTexture(String),

    /// Assembled geometry violates an index or attribute invariant.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Failed to export mesh.
    #[error("Export error: {0}")]
    Export(String),
}
