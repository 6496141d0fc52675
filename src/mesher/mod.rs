//! Voxel mesh generation from textures.
//!
//! Two voxelization strategies share the same primitives:
//! - [`item`]: every occupied sprite texel becomes a full cube;
//! - [`layer_shell`]: every occupied texel of a box's six face rectangles
//!   becomes a thin slab standing off the box surface.

pub mod cube;
pub mod geometry;
pub mod item;
pub mod layer_shell;
pub mod uv;

pub use geometry::{Mesh, Vertex};

use crate::error::Result;
use crate::glow::{GlowConfig, ShellGlowGenerator};
use crate::mesh_output::MergedGeometry;
use crate::texture::{sample, AlphaMask, OccupancyThreshold, SampleScratch, TextureData};
use crate::types::BoxSize;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main mesher configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MesherConfig {
    /// Minimum alpha (exclusive) for an item texel to become a cube.
    pub item_threshold: OccupancyThreshold,
    /// Minimum alpha (exclusive) for an overlay texel to become a slab.
    pub layer_threshold: OccupancyThreshold,
    /// Size skins are sampled at before voxelization.
    pub atlas_size: [u32; 2],
    /// World size of an item's longest edge.
    pub voxel_unit: f32,
    /// Use 3-wide arms.
    pub slim: bool,
    /// Glow shell settings.
    pub glow: GlowConfig,
}

impl Default for MesherConfig {
    fn default() -> Self {
        Self {
            item_threshold: OccupancyThreshold::ITEM,
            layer_threshold: OccupancyThreshold::SKIN_LAYER,
            atlas_size: uv::DEFAULT_ATLAS_SIZE,
            voxel_unit: item::ITEM_VOXEL_UNIT,
            slim: false,
            glow: GlowConfig::default(),
        }
    }
}

impl MesherConfig {
    /// Parse a configuration from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON configuration file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn with_item_threshold(mut self, alpha: u8) -> Self {
        self.item_threshold = OccupancyThreshold(alpha);
        self
    }

    pub fn with_layer_threshold(mut self, alpha: u8) -> Self {
        self.layer_threshold = OccupancyThreshold(alpha);
        self
    }

    pub fn with_atlas_size(mut self, width: u32, height: u32) -> Self {
        self.atlas_size = [width, height];
        self
    }

    pub fn with_voxel_unit(mut self, voxel_unit: f32) -> Self {
        self.voxel_unit = voxel_unit;
        self
    }

    pub fn with_slim(mut self, slim: bool) -> Self {
        self.slim = slim;
        self
    }

    pub fn with_glow(mut self, glow: GlowConfig) -> Self {
        self.glow = glow;
        self
    }
}

/// The main mesher struct.
///
/// Owns the sampling scratch buffer, so one mesher serves one pipeline.
#[derive(Debug, Default)]
pub struct Mesher {
    config: MesherConfig,
    scratch: SampleScratch,
    glow: ShellGlowGenerator,
}

impl Mesher {
    /// Create a new mesher with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new mesher with custom configuration.
    pub fn with_config(config: MesherConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &MesherConfig {
        &self.config
    }

    /// Replace the glow settings used by models built afterwards. Existing
    /// models keep theirs until passed the new config via `apply_glow_config`.
    pub fn set_glow_config(&mut self, glow: GlowConfig) {
        self.config.glow = glow;
    }

    pub fn glow_generator(&self) -> &ShellGlowGenerator {
        &self.glow
    }

    /// Voxelize an item sprite at its native resolution.
    pub fn build_item(&self, texture: &TextureData) -> Result<MergedGeometry> {
        item::voxelize_item(
            &AlphaMask::from_texture(texture)?,
            self.config.item_threshold,
            self.config.voxel_unit,
        )
    }

    /// Sample a skin at the configured atlas size into the scratch buffer.
    pub fn sample_skin(&mut self, skin: &TextureData) -> Result<AlphaMask<'_>> {
        let [width, height] = self.config.atlas_size;
        sample(skin, (width, height), &mut self.scratch)
    }

    /// Extrude one overlay shell from a skin.
    pub fn build_layer_shell(
        &mut self,
        skin: &TextureData,
        anchor: [u32; 2],
        size: BoxSize,
    ) -> Result<Option<MergedGeometry>> {
        let threshold = self.config.layer_threshold;
        let mask = self.sample_skin(skin)?;
        layer_shell::voxelize_layer_shell(&mask, anchor, size, threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MesherError;

    #[test]
    fn test_default_config() {
        let config = MesherConfig::default();
        assert_eq!(config.item_threshold, OccupancyThreshold(10));
        assert_eq!(config.layer_threshold, OccupancyThreshold(0));
        assert_eq!(config.atlas_size, [64, 64]);
        assert_eq!(config.voxel_unit, 16.0);
        assert!(!config.glow.enabled);
    }

    #[test]
    fn test_config_from_partial_json() {
        let config = MesherConfig::from_json(
            r#"{ "slim": true, "item_threshold": 0, "glow": { "enabled": true } }"#,
        )
        .unwrap();

        assert!(config.slim);
        assert_eq!(config.item_threshold, OccupancyThreshold(0));
        assert_eq!(config.layer_threshold, OccupancyThreshold::SKIN_LAYER);
        assert!(config.glow.enabled);
        assert_eq!(config.glow.thickness, GlowConfig::default().thickness);
    }

    #[test]
    fn test_config_bad_json() {
        let err = MesherConfig::from_json("{ slim: yes }").unwrap_err();
        assert!(matches!(err, MesherError::Json(_)));
    }

    #[test]
    fn test_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mesher.json");
        std::fs::write(&path, r#"{ "voxel_unit": 8.0 }"#).unwrap();

        let config = MesherConfig::from_path(&path).unwrap();
        assert_eq!(config.voxel_unit, 8.0);
    }

    #[test]
    fn test_build_item_uses_configured_threshold() {
        let mut tex = TextureData::transparent(2, 1);
        tex.set_pixel(0, 0, [1, 1, 1, 255]);
        tex.set_pixel(1, 0, [1, 1, 1, 5]);

        let strict = Mesher::new().build_item(&tex).unwrap();
        let loose = Mesher::with_config(MesherConfig::default().with_item_threshold(0))
            .build_item(&tex)
            .unwrap();
        assert_eq!(strict.vertex_count(), 24);
        assert_eq!(loose.vertex_count(), 48);
    }

    #[test]
    fn test_build_layer_shell_samples_legacy_skin() {
        // 64x32 legacy skin: the hat rect (32, 0) survives, pants at (0, 32) do not.
        let mut skin = TextureData::transparent(64, 32);
        skin.set_pixel(40, 8, [5, 5, 5, 255]);
        let mut mesher = Mesher::new();

        let hat = mesher
            .build_layer_shell(&skin, [32, 0], BoxSize::new(8, 8, 8))
            .unwrap();
        assert!(hat.is_some());
        let pants = mesher
            .build_layer_shell(&skin, [0, 32], BoxSize::new(4, 12, 4))
            .unwrap();
        assert!(pants.is_none());
    }

    #[test]
    fn test_build_item_rejects_short_pixel_buffer() {
        let tex = TextureData {
            width: 4,
            height: 4,
            pixels: vec![255; 8],
        };
        let mut mesher = Mesher::new();
        let err = mesher.build_item(&tex).unwrap_err();
        assert!(matches!(err, MesherError::InvalidTexture(_)));

        let err = mesher.sample_skin(&tex).unwrap_err();
        assert!(matches!(err, MesherError::InvalidTexture(_)));
    }
}
