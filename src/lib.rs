//! # Skin Voxel Mesher
//!
//! Turns flat Minecraft textures into 3D voxel geometry.
//!
//! ## Overview
//!
//! - **Items**: every opaque sprite texel becomes a unit cube, the result is
//!   centred and scaled to a fixed voxel unit.
//! - **Skins**: each body part is an inner box textured from its unfolded net
//!   plus a thin shell of slabs extruded from the overlay net (hat, jacket,
//!   sleeves, pants).
//! - **Glow**: a stack of normal-displaced copies of a surface, drawn
//!   additively, with a CPU reference of the shader math.
//!
//! ## Quick Start
//!
//! ```ignore
//! use skin_voxel_mesher::{load_texture_from_path, export_glb, Mesher, SkinModel};
//!
//! let skin = load_texture_from_path("steve.png")?;
//! let mut mesher = Mesher::new();
//! let model = SkinModel::build(&mut mesher, &skin)?;
//!
//! let glb_bytes = export_glb(&model.flatten(), model.atlas())?;
//! ```
//!
//! Glow shells share their part's geometry; only the per-layer uniforms differ:
//!
//! ```ignore
//! for shell in model.shells().meshes() {
//!     upload(shell.geometry, shell.layer.thickness, shell.layer.opacity);
//! }
//! ```

pub mod error;
pub mod export;
pub mod glow;
pub mod material;
pub mod mesh_output;
pub mod mesher;
pub mod model;
pub mod texture;
pub mod types;

// Re-export main types for convenience
pub use error::{MesherError, Result};
pub use export::{export_glb, export_obj, ObjExport};
pub use glow::{GlowConfig, GlowShells, ShellGlowGenerator, ShellLayer, SHELL_SHADER_WGSL};
pub use material::{BlendMode, CullMode, RenderState};
pub use mesh_output::{assemble, MergedGeometry};
pub use mesher::{Mesh, Mesher, MesherConfig, Vertex};
pub use model::{BodyPart, ItemModel, PartId, ShellMeshId, ShellOwner, SkinModel};
pub use texture::{
    load_texture_from_bytes, load_texture_from_path, AlphaMask, OccupancyThreshold, SampleScratch,
    TextureData,
};
pub use types::{AtlasRect, BoundingBox, BoxSize, Face};

#[cfg(feature = "wasm")]
pub mod wasm;
