//! Surface materials and fixed-function render state.
//!
//! Geometry never carries presentation data. A renderer pairs each buffer with
//! one of the states here: opaque inner boxes first, alpha-cutout overlays
//! second, additive glow shells last.

use serde::{Deserialize, Serialize};

/// Depth bias applied to overlay shells so they win ties against the inner box.
pub const OUTER_LAYER_DEPTH_BIAS: i32 = -2;

/// Alpha cutoff for cutout materials. Matches the skin occupancy threshold.
pub const ALPHA_CUTOFF: f32 = 0.5 / 255.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CullMode {
    None,
    Back,
    /// Draw only the inside of a closed surface.
    Front,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    Opaque,
    /// Discard below [`ALPHA_CUTOFF`], otherwise opaque.
    Cutout,
    /// `src * alpha + dst`.
    Additive,
}

/// How one buffer is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderState {
    pub cull: CullMode,
    pub blend: BlendMode,
    pub depth_write: bool,
    pub depth_bias: i32,
}

impl RenderState {
    /// Inner body boxes and item voxels.
    pub const OPAQUE: Self = Self {
        cull: CullMode::Back,
        blend: BlendMode::Opaque,
        depth_write: true,
        depth_bias: 0,
    };

    /// Overlay shells (hat, jacket, sleeves, pants).
    pub const OUTER_LAYER: Self = Self {
        cull: CullMode::Back,
        blend: BlendMode::Cutout,
        depth_write: true,
        depth_bias: OUTER_LAYER_DEPTH_BIAS,
    };

    /// Glow shells.
    pub const GLOW_SHELL: Self = Self {
        cull: CullMode::Front,
        blend: BlendMode::Additive,
        depth_write: false,
        depth_bias: 0,
    };

    pub fn is_transparent(&self) -> bool {
        self.blend != BlendMode::Opaque
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glow_state() {
        let state = RenderState::GLOW_SHELL;
        assert_eq!(state.cull, CullMode::Front);
        assert_eq!(state.blend, BlendMode::Additive);
        assert!(!state.depth_write);
    }

    #[test]
    fn test_outer_layer_is_biased_cutout() {
        let state = RenderState::OUTER_LAYER;
        assert_eq!(state.blend, BlendMode::Cutout);
        assert!(state.depth_bias < 0);
        assert!(state.is_transparent());
        assert!(!RenderState::OPAQUE.is_transparent());
    }

    #[test]
    fn test_render_state_serializes() {
        let json = serde_json::to_string(&RenderState::GLOW_SHELL).unwrap();
        assert!(json.contains("\"cull\":\"front\""));
        assert!(json.contains("\"blend\":\"additive\""));
    }
}
