//! Shell shader stages.
//!
//! [`SHELL_SHADER_WGSL`] is the GPU program; the functions here evaluate the
//! same vertex and fragment math on the CPU so the effect can be tested and
//! baked without a device.

use super::ShellLayer;
use glam::Vec3;

/// WGSL source of the shell vertex and fragment stages.
pub const SHELL_SHADER_WGSL: &str = include_str!("shell.wgsl");

/// Fragments whose normal points further down than this are discarded.
pub const DOWNWARD_DISCARD_Y: f32 = -0.9;

/// Normalized height over which the glow fades in from the part's base.
pub const BASE_FADE: f32 = 0.1;

/// Hermite step, as in WGSL `smoothstep`. Degenerate edges act as a hard step.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Vertex stage: push a position outward along its normal.
pub fn displace_vertex(position: Vec3, normal: Vec3, thickness: f32) -> Vec3 {
    position + normal * thickness
}

/// Map a part-local Y onto `[0, 1]` over a part centred on the origin.
pub fn normalized_height(local_y: f32, part_height: f32) -> f32 {
    if part_height <= 0.0 {
        return 0.0;
    }
    (local_y + part_height * 0.5) / part_height
}

/// Fragment stage. `None` means the fragment is discarded.
///
/// `alpha = smoothstep(0, 0.1, t) * (1 - smoothstep(0, limit, t)) * opacity`
/// where `t` is the normalized height. A non-positive gradient limit yields 0.
pub fn fragment_alpha(
    normal: Vec3,
    local_y: f32,
    part_height: f32,
    layer: &ShellLayer,
) -> Option<f32> {
    if normal.y < DOWNWARD_DISCARD_Y {
        return None;
    }
    if layer.gradient_limit <= 0.0 {
        return Some(0.0);
    }
    let t = normalized_height(local_y, part_height);
    let fade_in = smoothstep(0.0, BASE_FADE, t);
    let fade_out = 1.0 - smoothstep(0.0, layer.gradient_limit, t);
    Some(fade_in * fade_out * layer.opacity)
}
