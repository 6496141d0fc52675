//! Layered shell glow.
//!
//! A glow is `N` offset copies of one assembled surface, each pushed outward
//! along its face normals by a slightly larger distance and drawn additively.
//! The copies share a single geometry buffer; a [`ShellLayer`] carries only the
//! uniforms that differ between copies.
//!
//! With `N = 20` linearly spaced offsets the stack reads as a soft solid volume;
//! a single shell alone reads as a thin outline.

mod shader;

pub use shader::{
    displace_vertex, fragment_alpha, normalized_height, smoothstep, DOWNWARD_DISCARD_Y,
    SHELL_SHADER_WGSL,
};

use crate::mesh_output::MergedGeometry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Number of shells per glow. Internal tuning constant.
pub const SHELL_LAYER_COUNT: usize = 20;

/// World offset of the outermost shell per unit of configured thickness.
pub const THICKNESS_SCALE: f32 = 0.05;

/// Summed opacity of all enabled shells.
pub const DEFAULT_OPACITY_BUDGET: f32 = 1.0;

/// Effect configuration consumed from outside the core.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlowConfig {
    /// Whether shells contribute any light.
    pub enabled: bool,
    /// Outward extent control, roughly 0..20.
    pub thickness: f32,
    /// Normalized part height at which the glow has faded out.
    pub height: f32,
}

impl Default for GlowConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            thickness: 4.0,
            height: 0.6,
        }
    }
}

impl GlowConfig {
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_thickness(mut self, thickness: f32) -> Self {
        self.thickness = thickness;
        self
    }

    pub fn with_height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }
}

/// Presentation state of one shell. Owns no geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShellLayer {
    /// Position in the stack, `0..N`; 0 is the innermost shell.
    pub index: usize,
    /// Outward displacement along face normals.
    pub thickness: f32,
    /// Per-shell opacity; shells blend additively.
    pub opacity: f32,
    /// Normalized height where the vertical gradient reaches zero.
    pub gradient_limit: f32,
}

/// Derives shell uniforms from a [`GlowConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShellGlowGenerator {
    layer_count: usize,
    opacity_budget: f32,
}

impl Default for ShellGlowGenerator {
    fn default() -> Self {
        Self {
            layer_count: SHELL_LAYER_COUNT,
            opacity_budget: DEFAULT_OPACITY_BUDGET,
        }
    }
}

impl ShellGlowGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the layer count (at least one) and opacity budget.
    pub fn with_layers(layer_count: usize, opacity_budget: f32) -> Self {
        Self {
            layer_count: layer_count.max(1),
            opacity_budget,
        }
    }

    pub fn layer_count(&self) -> usize {
        self.layer_count
    }

    pub fn opacity_budget(&self) -> f32 {
        self.opacity_budget
    }

    /// Uniforms for shell `index`.
    ///
    /// `thickness = config.thickness * 0.05 * (index + 1) / N`;
    /// `opacity = budget / N` when enabled, otherwise 0.
    pub fn layer(&self, index: usize, config: &GlowConfig) -> ShellLayer {
        let n = self.layer_count as f32;
        ShellLayer {
            index,
            thickness: config.thickness * THICKNESS_SCALE * (index + 1) as f32 / n,
            opacity: if config.enabled {
                self.opacity_budget / n
            } else {
                0.0
            },
            gradient_limit: config.height,
        }
    }

    /// Uniforms for every shell, innermost first.
    pub fn layers(&self, config: &GlowConfig) -> Vec<ShellLayer> {
        (0..self.layer_count)
            .map(|index| self.layer(index, config))
            .collect()
    }

    /// Build the shell set for one assembled surface.
    pub fn generate(
        &self,
        geometry: Arc<MergedGeometry>,
        part_height: f32,
        config: &GlowConfig,
    ) -> GlowShells {
        GlowShells {
            geometry,
            part_height,
            layers: self.layers(config),
        }
    }
}

/// The shells of one glowing surface.
#[derive(Debug, Clone)]
pub struct GlowShells {
    geometry: Arc<MergedGeometry>,
    part_height: f32,
    layers: Vec<ShellLayer>,
}

impl GlowShells {
    /// The shared base geometry every shell draws.
    pub fn geometry(&self) -> &Arc<MergedGeometry> {
        &self.geometry
    }

    /// Height used to normalize the vertical gradient.
    pub fn part_height(&self) -> f32 {
        self.part_height
    }

    pub fn layers(&self) -> &[ShellLayer] {
        &self.layers
    }

    /// Re-derive uniforms in place; the geometry is untouched.
    pub fn apply_config(&mut self, generator: &ShellGlowGenerator, config: &GlowConfig) {
        self.layers = generator.layers(config);
    }

    /// Sum of all shell opacities.
    pub fn total_opacity(&self) -> f32 {
        self.layers.iter().map(|l| l.opacity).sum()
    }

    /// CPU copy of shell `index` with the vertex-stage displacement applied.
    pub fn displaced(&self, index: usize) -> Option<MergedGeometry> {
        let layer = self.layers.get(index)?;
        let mut geometry = (*self.geometry).clone();
        for (position, normal) in geometry.positions.iter_mut().zip(&geometry.normals) {
            *position = displace_vertex(
                glam::Vec3::from(*position),
                glam::Vec3::from(*normal),
                layer.thickness,
            )
            .to_array();
        }
        Some(geometry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesher::cube::{emit_cube, CubeUv};
    use crate::mesher::geometry::Mesh;
    use crate::mesh_output::assemble;
    use glam::Vec3;

    fn cube_geometry() -> Arc<MergedGeometry> {
        let mut mesh = Mesh::new();
        emit_cube(&mut mesh, Vec3::ZERO, Vec3::splat(2.0), CubeUv::Uniform([0.5, 0.5]));
        Arc::new(assemble([&mesh]))
    }

    #[test]
    fn test_thickness_ramp() {
        let generator = ShellGlowGenerator::new();
        let config = GlowConfig::default().enabled(true).with_thickness(4.0);
        let layers = generator.layers(&config);

        assert_eq!(layers.len(), 20);
        assert!((layers[0].thickness - 4.0 * 0.05 / 20.0).abs() < 1e-7);
        assert!((layers[19].thickness - 4.0 * 0.05).abs() < 1e-7);
        for pair in layers.windows(2) {
            assert!(pair[1].thickness > pair[0].thickness);
        }
    }

    #[test]
    fn test_opacity_budget_is_independent_of_layer_count() {
        let config = GlowConfig::default().enabled(true);
        for n in [1, 5, 20, 64] {
            let generator = ShellGlowGenerator::with_layers(n, 0.8);
            let total: f32 = generator.layers(&config).iter().map(|l| l.opacity).sum();
            assert!((total - 0.8).abs() < 1e-5, "n = {n}");
        }
    }

    #[test]
    fn test_disabled_glow_is_dark() {
        let generator = ShellGlowGenerator::new();
        let shells = generator.generate(cube_geometry(), 2.0, &GlowConfig::default());
        assert_eq!(shells.total_opacity(), 0.0);
        assert!(shells.layers().iter().all(|l| l.thickness > 0.0));
    }

    #[test]
    fn test_gradient_limit_follows_height() {
        let generator = ShellGlowGenerator::new();
        let config = GlowConfig::default().with_height(0.35);
        assert!(generator.layers(&config).iter().all(|l| l.gradient_limit == 0.35));
    }

    #[test]
    fn test_shells_share_geometry() {
        let generator = ShellGlowGenerator::new();
        let geometry = cube_geometry();
        let shells = generator.generate(geometry.clone(), 2.0, &GlowConfig::default());
        assert!(Arc::ptr_eq(shells.geometry(), &geometry));
        // Held by the test and by the shell set, never copied per layer.
        assert_eq!(Arc::strong_count(&geometry), 2);
    }

    #[test]
    fn test_apply_config_keeps_geometry() {
        let generator = ShellGlowGenerator::new();
        let geometry = cube_geometry();
        let mut shells = generator.generate(geometry.clone(), 2.0, &GlowConfig::default());
        shells.apply_config(&generator, &GlowConfig::default().enabled(true));

        assert!(Arc::ptr_eq(shells.geometry(), &geometry));
        assert!((shells.total_opacity() - DEFAULT_OPACITY_BUDGET).abs() < 1e-5);
    }

    #[test]
    fn test_displaced_shell_grows_along_normals() {
        let generator = ShellGlowGenerator::new();
        let config = GlowConfig::default().with_thickness(20.0);
        let shells = generator.generate(cube_geometry(), 2.0, &config);

        let outer = shells.displaced(19).unwrap();
        let bounds = outer.bounds().unwrap();
        // Cube half extent 1.0 plus 20 * 0.05 = 1.0.
        assert!((bounds.max[0] - 2.0).abs() < 1e-5);
        assert!((bounds.min[1] + 2.0).abs() < 1e-5);
        assert!(shells.displaced(20).is_none());
    }
}
