//! Renderable models assembled from voxel geometry.
//!
//! A model owns its part geometry and the glow shells attached to it.
//! Presentation state for each shell lives in a side table keyed by
//! [`ShellMeshId`]; geometry buffers never point back at their owner.

mod parts;

pub use parts::{part_spec, player_parts, BodyPart, PartId, PartSpec};

use crate::error::Result;
use crate::glow::{GlowConfig, GlowShells, ShellLayer};
use crate::material::RenderState;
use crate::mesh_output::MergedGeometry;
use crate::mesher::Mesher;
use crate::texture::TextureData;
use std::collections::BTreeMap;
use std::sync::Arc;

/// What a set of glow shells surrounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShellOwner {
    Part(PartId),
    Item,
}

/// Key of one shell mesh: its owner plus its position in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShellMeshId {
    pub owner: ShellOwner,
    pub layer: usize,
}

/// One drawable shell: shared geometry plus its uniforms.
#[derive(Debug, Clone, Copy)]
pub struct ShellMesh<'a> {
    pub id: ShellMeshId,
    pub geometry: &'a Arc<MergedGeometry>,
    pub part_height: f32,
    pub layer: &'a ShellLayer,
    pub state: RenderState,
}

/// Owner-keyed glow shells.
#[derive(Debug, Clone, Default)]
pub struct ShellTable {
    shells: BTreeMap<ShellOwner, GlowShells>,
}

impl ShellTable {
    pub fn insert(&mut self, owner: ShellOwner, shells: GlowShells) {
        self.shells.insert(owner, shells);
    }

    pub fn get(&self, owner: ShellOwner) -> Option<&GlowShells> {
        self.shells.get(&owner)
    }

    /// Uniforms of one shell mesh.
    pub fn layer(&self, id: ShellMeshId) -> Option<&ShellLayer> {
        self.shells.get(&id.owner)?.layers().get(id.layer)
    }

    /// Every shell mesh, ordered by owner then layer.
    pub fn meshes(&self) -> impl Iterator<Item = ShellMesh<'_>> + '_ {
        self.shells.iter().flat_map(|(&owner, shells)| {
            shells.layers().iter().enumerate().map(move |(layer, uniforms)| ShellMesh {
                id: ShellMeshId { owner, layer },
                geometry: shells.geometry(),
                part_height: shells.part_height(),
                layer: uniforms,
                state: RenderState::GLOW_SHELL,
            })
        })
    }

    pub fn len(&self) -> usize {
        self.shells.values().map(|s| s.layers().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Re-derive every shell's uniforms from `config`.
    pub fn apply_config(&mut self, mesher: &Mesher, config: &GlowConfig) {
        for shells in self.shells.values_mut() {
            shells.apply_config(mesher.glow_generator(), config);
        }
    }

    pub fn clear(&mut self) {
        self.shells.clear();
    }
}

/// A voxelized player model.
#[derive(Debug, Clone)]
pub struct SkinModel {
    parts: Vec<BodyPart>,
    shells: ShellTable,
    atlas: TextureData,
    slim: bool,
}

impl SkinModel {
    /// Sample `skin` once and build all six parts with their glow shells.
    pub fn build(mesher: &mut Mesher, skin: &TextureData) -> Result<Self> {
        let slim = mesher.config().slim;
        let threshold = mesher.config().layer_threshold;
        let glow = mesher.config().glow;

        let (parts, atlas) = {
            let mask = mesher.sample_skin(skin)?;
            let parts = player_parts(slim)
                .iter()
                .map(|spec| BodyPart::build(&mask, spec, threshold))
                .collect::<Result<Vec<_>>>()?;
            (parts, mask.to_texture())
        };

        let mut shells = ShellTable::default();
        for part in &parts {
            shells.insert(
                ShellOwner::Part(part.id),
                mesher
                    .glow_generator()
                    .generate(part.geometry().clone(), part.height(), &glow),
            );
        }

        log::debug!(
            "built {} skin model: {} vertices, {} overlays, {} glow shells",
            if slim { "slim" } else { "wide" },
            parts.iter().map(|p| p.geometry().vertex_count()).sum::<usize>(),
            parts.iter().filter(|p| p.has_overlay()).count(),
            shells.len()
        );

        Ok(Self {
            parts,
            shells,
            atlas,
            slim,
        })
    }

    /// Rebuild from a new skin.
    ///
    /// The replacement is built first; on success the previous parts and shells
    /// are released before the new ones are installed. On failure `self` is
    /// left as it was.
    pub fn rebuild(&mut self, mesher: &mut Mesher, skin: &TextureData) -> Result<()> {
        let next = Self::build(mesher, skin)?;
        self.release();
        *self = next;
        Ok(())
    }

    /// Drop every part and shell this model owns.
    pub fn release(&mut self) {
        self.shells.clear();
        self.parts.clear();
    }

    pub fn parts(&self) -> &[BodyPart] {
        &self.parts
    }

    pub fn part(&self, id: PartId) -> Option<&BodyPart> {
        self.parts.iter().find(|p| p.id == id)
    }

    pub fn shells(&self) -> &ShellTable {
        &self.shells
    }

    /// The skin as sampled for voxelization; UVs index into this raster.
    pub fn atlas(&self) -> &TextureData {
        &self.atlas
    }

    pub fn is_slim(&self) -> bool {
        self.slim
    }

    pub fn apply_glow_config(&mut self, mesher: &Mesher, config: &GlowConfig) {
        self.shells.apply_config(mesher, config);
    }

    /// All parts merged into one buffer with their placements applied.
    pub fn flatten(&self) -> MergedGeometry {
        let mut merged = MergedGeometry::new();
        for part in &self.parts {
            let mut placed = (**part.geometry()).clone();
            placed.translate(part.placement.to_array());
            merged.merge(&placed);
        }
        merged
    }
}

/// A voxelized item sprite.
#[derive(Debug, Clone)]
pub struct ItemModel {
    geometry: Arc<MergedGeometry>,
    shells: ShellTable,
}

impl ItemModel {
    /// Voxelize `texture` and attach glow shells one voxel unit tall.
    pub fn build(mesher: &Mesher, texture: &TextureData) -> Result<Self> {
        let geometry = Arc::new(mesher.build_item(texture)?);
        let mut shells = ShellTable::default();
        shells.insert(
            ShellOwner::Item,
            mesher.glow_generator().generate(
                geometry.clone(),
                mesher.config().voxel_unit,
                &mesher.config().glow,
            ),
        );
        Ok(Self { geometry, shells })
    }

    /// Rebuild from a new sprite. Same ordering as [`SkinModel::rebuild`]:
    /// nothing changes unless the new item builds.
    pub fn rebuild(&mut self, mesher: &Mesher, texture: &TextureData) -> Result<()> {
        let next = Self::build(mesher, texture)?;
        self.release();
        *self = next;
        Ok(())
    }

    /// Drop the voxel geometry and its shells.
    pub fn release(&mut self) {
        self.shells.clear();
        self.geometry = Arc::new(MergedGeometry::new());
    }

    pub fn geometry(&self) -> &Arc<MergedGeometry> {
        &self.geometry
    }

    /// Item voxels are fully opaque.
    pub fn render_state(&self) -> RenderState {
        RenderState::OPAQUE
    }

    pub fn shells(&self) -> &ShellTable {
        &self.shells
    }

    pub fn apply_glow_config(&mut self, mesher: &Mesher, config: &GlowConfig) {
        self.shells.apply_config(mesher, config);
    }
}
