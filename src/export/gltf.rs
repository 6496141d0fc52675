//! glTF/GLB export.

use crate::error::{MesherError, Result};
use crate::mesh_output::MergedGeometry;
use crate::texture::TextureData;
use gltf_json as json;
use json::validation::Checked::Valid;
use json::validation::USize64;
use std::collections::BTreeMap;

const GLB_MAGIC: &[u8; 4] = b"glTF";
const GLB_VERSION: u32 = 2;
const CHUNK_JSON: u32 = 0x4E4F534A;
const CHUNK_BIN: u32 = 0x004E4942;

/// Alpha cutoff written into the exported material.
const EXPORT_ALPHA_CUTOFF: f32 = 0.5;

/// Export geometry to GLB (binary glTF 2.0) with `texture` embedded as PNG.
///
/// One mesh, one primitive, one material. The sampler is nearest-filtered and
/// clamps to edge so voxel texels stay crisp.
pub fn export_glb(geometry: &MergedGeometry, texture: &TextureData) -> Result<Vec<u8>> {
    if geometry.is_empty() {
        return Err(MesherError::Export("Cannot export empty mesh".to_string()));
    }
    geometry.validate()?;

    let texture_png = texture.to_png()?;
    let bounds = geometry
        .bounds()
        .ok_or_else(|| MesherError::Export("geometry has no bounds".to_string()))?;

    // Binary layout: positions, normals, uvs, indices, png. Every section is
    // a multiple of 4 bytes except the png, which is padded after.
    let mut buffer_data: Vec<u8> = Vec::new();
    let mut sections = Vec::with_capacity(5);
    for bytes in [
        geometry.positions_bytes(),
        geometry.normals_bytes(),
        geometry.uvs_bytes(),
        geometry.indices_bytes(),
        texture_png.as_slice(),
    ] {
        pad_to_four(&mut buffer_data, 0);
        sections.push((buffer_data.len(), bytes.len()));
        buffer_data.extend_from_slice(bytes);
    }
    pad_to_four(&mut buffer_data, 0);

    let targets = [
        Some(json::buffer::Target::ArrayBuffer),
        Some(json::buffer::Target::ArrayBuffer),
        Some(json::buffer::Target::ArrayBuffer),
        Some(json::buffer::Target::ElementArrayBuffer),
        None,
    ];
    let buffer_views: Vec<_> = sections
        .iter()
        .zip(targets)
        .map(|(&(offset, size), target)| create_buffer_view(offset, size, target))
        .collect();

    let vertex_count = geometry.vertex_count();
    let accessors = vec![
        create_accessor(
            0,
            vertex_count,
            json::accessor::Type::Vec3,
            json::accessor::ComponentType::F32,
            Some(bounds.min),
            Some(bounds.max),
        ),
        create_accessor(
            1,
            vertex_count,
            json::accessor::Type::Vec3,
            json::accessor::ComponentType::F32,
            None,
            None,
        ),
        create_accessor(
            2,
            vertex_count,
            json::accessor::Type::Vec2,
            json::accessor::ComponentType::F32,
            None,
            None,
        ),
        create_accessor(
            3,
            geometry.indices.len(),
            json::accessor::Type::Scalar,
            json::accessor::ComponentType::U32,
            None,
            None,
        ),
    ];

    let root = json::Root {
        accessors,
        buffers: vec![json::Buffer {
            byte_length: USize64(buffer_data.len() as u64),
            extensions: Default::default(),
            extras: Default::default(),
            uri: None,
        }],
        buffer_views,
        images: vec![json::Image {
            buffer_view: Some(json::Index::new(4)),
            mime_type: Some(json::image::MimeType("image/png".to_string())),
            uri: None,
            extensions: Default::default(),
            extras: Default::default(),
        }],
        samplers: vec![json::texture::Sampler {
            mag_filter: Some(Valid(json::texture::MagFilter::Nearest)),
            min_filter: Some(Valid(json::texture::MinFilter::Nearest)),
            wrap_s: Valid(json::texture::WrappingMode::ClampToEdge),
            wrap_t: Valid(json::texture::WrappingMode::ClampToEdge),
            extensions: Default::default(),
            extras: Default::default(),
        }],
        textures: vec![json::Texture {
            sampler: Some(json::Index::new(0)),
            source: json::Index::new(0),
            extensions: Default::default(),
            extras: Default::default(),
        }],
        materials: vec![create_material(0)],
        meshes: vec![json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            primitives: vec![create_primitive(0, 3, 0)],
            weights: None,
        }],
        nodes: vec![json::Node {
            camera: None,
            children: None,
            extensions: Default::default(),
            extras: Default::default(),
            matrix: None,
            mesh: Some(json::Index::new(0)),
            rotation: None,
            scale: None,
            translation: None,
            skin: None,
            weights: None,
        }],
        scenes: vec![json::Scene {
            extensions: Default::default(),
            extras: Default::default(),
            nodes: vec![json::Index::new(0)],
        }],
        scene: Some(json::Index::new(0)),
        ..Default::default()
    };

    let json_string = json::serialize::to_string(&root)
        .map_err(|e| MesherError::Export(format!("Failed to serialize glTF JSON: {}", e)))?;
    let mut json_bytes = json_string.into_bytes();
    pad_to_four(&mut json_bytes, 0x20);

    let total_size = 12 + 8 + json_bytes.len() + 8 + buffer_data.len();
    let mut glb = Vec::with_capacity(total_size);

    glb.extend_from_slice(GLB_MAGIC);
    glb.extend_from_slice(&GLB_VERSION.to_le_bytes());
    glb.extend_from_slice(&(total_size as u32).to_le_bytes());

    glb.extend_from_slice(&(json_bytes.len() as u32).to_le_bytes());
    glb.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    glb.extend_from_slice(&json_bytes);

    glb.extend_from_slice(&(buffer_data.len() as u32).to_le_bytes());
    glb.extend_from_slice(&CHUNK_BIN.to_le_bytes());
    glb.extend_from_slice(&buffer_data);

    log::debug!(
        "exported GLB: {} vertices, {} triangles, {} bytes",
        vertex_count,
        geometry.triangle_count(),
        glb.len()
    );

    Ok(glb)
}

fn pad_to_four(bytes: &mut Vec<u8>, fill: u8) {
    let padding = (4 - bytes.len() % 4) % 4;
    bytes.extend(std::iter::repeat(fill).take(padding));
}

/// Create a buffer view.
fn create_buffer_view(
    offset: usize,
    size: usize,
    target: Option<json::buffer::Target>,
) -> json::buffer::View {
    json::buffer::View {
        buffer: json::Index::new(0),
        byte_length: USize64(size as u64),
        byte_offset: Some(USize64(offset as u64)),
        byte_stride: None,
        extensions: Default::default(),
        extras: Default::default(),
        target: target.map(Valid),
    }
}

/// Create an accessor.
fn create_accessor(
    buffer_view: u32,
    count: usize,
    type_: json::accessor::Type,
    component_type: json::accessor::ComponentType,
    min: Option<[f32; 3]>,
    max: Option<[f32; 3]>,
) -> json::Accessor {
    json::Accessor {
        buffer_view: Some(json::Index::new(buffer_view)),
        byte_offset: Some(USize64(0)),
        count: USize64(count as u64),
        component_type: Valid(json::accessor::GenericComponentType(component_type)),
        extensions: Default::default(),
        extras: Default::default(),
        type_: Valid(type_),
        min: min.map(|m| json::Value::from(m.to_vec())),
        max: max.map(|m| json::Value::from(m.to_vec())),
        normalized: false,
        sparse: None,
    }
}

/// Primitive whose attribute accessors are `positions..positions + 3`.
fn create_primitive(
    positions_accessor: u32,
    indices_accessor: u32,
    material: u32,
) -> json::mesh::Primitive {
    let mut attributes = BTreeMap::new();
    attributes.insert(
        Valid(json::mesh::Semantic::Positions),
        json::Index::new(positions_accessor),
    );
    attributes.insert(
        Valid(json::mesh::Semantic::Normals),
        json::Index::new(positions_accessor + 1),
    );
    attributes.insert(
        Valid(json::mesh::Semantic::TexCoords(0)),
        json::Index::new(positions_accessor + 2),
    );

    json::mesh::Primitive {
        attributes,
        extensions: Default::default(),
        extras: Default::default(),
        indices: Some(json::Index::new(indices_accessor)),
        material: Some(json::Index::new(material)),
        mode: Valid(json::mesh::Mode::Triangles),
        targets: None,
    }
}

/// Unlit-looking textured material with alpha cutout.
fn create_material(texture_idx: u32) -> json::Material {
    json::Material {
        pbr_metallic_roughness: json::material::PbrMetallicRoughness {
            base_color_texture: Some(json::texture::Info {
                index: json::Index::new(texture_idx),
                tex_coord: 0,
                extensions: Default::default(),
                extras: Default::default(),
            }),
            base_color_factor: json::material::PbrBaseColorFactor([1.0, 1.0, 1.0, 1.0]),
            metallic_factor: json::material::StrengthFactor(0.0),
            roughness_factor: json::material::StrengthFactor(1.0),
            metallic_roughness_texture: None,
            extensions: Default::default(),
            extras: Default::default(),
        },
        alpha_mode: Valid(json::material::AlphaMode::Mask),
        alpha_cutoff: Some(json::material::AlphaCutoff(EXPORT_ALPHA_CUTOFF)),
        double_sided: false,
        normal_texture: None,
        occlusion_texture: None,
        emissive_texture: None,
        emissive_factor: json::material::EmissiveFactor([0.0, 0.0, 0.0]),
        extensions: Default::default(),
        extras: Default::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesher::geometry::{Mesh, Vertex};
    use crate::mesh_output::assemble;

    fn triangle() -> MergedGeometry {
        let mut mesh = Mesh::new();
        let v0 = mesh.add_vertex(Vertex::new([0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0]));
        let v1 = mesh.add_vertex(Vertex::new([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0]));
        let v2 = mesh.add_vertex(Vertex::new([0.0, 0.0, 1.0], [0.0, 1.0, 0.0], [0.0, 1.0]));
        mesh.add_triangle(v0, v1, v2);
        assemble([&mesh])
    }

    fn read_u32(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
    }

    #[test]
    fn test_export_simple_mesh() {
        let glb = export_glb(&triangle(), &TextureData::transparent(4, 4)).unwrap();

        assert_eq!(&glb[0..4], b"glTF");
        assert_eq!(read_u32(&glb, 4), 2);
        assert_eq!(read_u32(&glb, 8) as usize, glb.len());
        assert_eq!(glb.len() % 4, 0);
        assert_eq!(read_u32(&glb, 16), CHUNK_JSON);
    }

    #[test]
    fn test_export_json_describes_texture_and_sampler() {
        let glb = export_glb(&triangle(), &TextureData::transparent(4, 4)).unwrap();
        let json_len = read_u32(&glb, 12) as usize;
        let json: serde_json::Value = serde_json::from_slice(&glb[20..20 + json_len]).unwrap();

        assert_eq!(json["samplers"][0]["magFilter"], 9728);
        assert_eq!(json["samplers"][0]["wrapS"], 33071);
        assert_eq!(json["materials"][0]["alphaMode"], "MASK");
        assert_eq!(json["accessors"][0]["count"], 3);
        assert_eq!(json["accessors"][0]["max"][0], 1.0);
        assert_eq!(json["images"][0]["mimeType"], "image/png");
    }

    #[test]
    fn test_export_empty_mesh_fails() {
        let result = export_glb(&MergedGeometry::new(), &TextureData::transparent(1, 1));
        assert!(matches!(result, Err(MesherError::Export(_))));
    }

    #[test]
    fn test_export_rejects_broken_indices() {
        let mut geometry = triangle();
        geometry.indices.push(7);
        geometry.indices.extend([0, 0]);
        let result = export_glb(&geometry, &TextureData::transparent(1, 1));
        assert!(matches!(result, Err(MesherError::InvalidGeometry(_))));
    }
}
