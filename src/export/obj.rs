//! Wavefront OBJ export.
//!
//! OBJ is a simple, widely-supported text-based 3D format. The texture is
//! written separately as `<name>_texture.png`, referenced from the MTL.

use crate::error::{MesherError, Result};
use crate::mesh_output::MergedGeometry;
use crate::texture::TextureData;
use std::fmt::Write;
use std::path::Path;

/// Export geometry to OBJ. Returns `(obj_content, mtl_content)`.
pub fn export_obj(geometry: &MergedGeometry, name: &str) -> Result<(String, String)> {
    if geometry.is_empty() {
        return Err(MesherError::Export("Cannot export empty mesh".to_string()));
    }
    geometry.validate()?;

    let obj = write_obj(geometry, name).map_err(fmt_error)?;
    let mtl = write_mtl(name).map_err(fmt_error)?;
    Ok((obj, mtl))
}

fn fmt_error(e: std::fmt::Error) -> MesherError {
    MesherError::Export(format!("Failed to format OBJ: {}", e))
}

fn write_obj(
    geometry: &MergedGeometry,
    name: &str,
) -> std::result::Result<String, std::fmt::Error> {
    // ~60 bytes per attribute line, three lines per vertex, ~40 per face.
    let capacity = 256 + geometry.vertex_count() * 180 + geometry.triangle_count() * 40;
    let mut obj = String::with_capacity(capacity);

    writeln!(obj, "# Skin Voxel Mesher OBJ Export")?;
    writeln!(obj, "# Vertices: {}", geometry.vertex_count())?;
    writeln!(obj, "# Triangles: {}", geometry.triangle_count())?;
    writeln!(obj)?;
    writeln!(obj, "mtllib {}.mtl", name)?;
    writeln!(obj, "o {}", name)?;
    writeln!(obj)?;

    for p in &geometry.positions {
        writeln!(obj, "v {} {} {}", p[0], p[1], p[2])?;
    }
    writeln!(obj)?;
    for uv in &geometry.uvs {
        writeln!(obj, "vt {} {}", uv[0], uv[1])?;
    }
    writeln!(obj)?;
    for n in &geometry.normals {
        writeln!(obj, "vn {} {} {}", n[0], n[1], n[2])?;
    }
    writeln!(obj)?;

    writeln!(obj, "usemtl {}_material", name)?;
    for tri in geometry.indices.chunks_exact(3) {
        // OBJ indices are 1-based.
        let [a, b, c] = [tri[0] + 1, tri[1] + 1, tri[2] + 1];
        writeln!(obj, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?;
    }
    Ok(obj)
}

fn write_mtl(name: &str) -> std::result::Result<String, std::fmt::Error> {
    let mut mtl = String::with_capacity(256);
    writeln!(mtl, "# Skin Voxel Mesher Material")?;
    writeln!(mtl)?;
    writeln!(mtl, "newmtl {}_material", name)?;
    writeln!(mtl, "Ka 1.0 1.0 1.0")?;
    writeln!(mtl, "Kd 1.0 1.0 1.0")?;
    writeln!(mtl, "Ks 0.0 0.0 0.0")?;
    writeln!(mtl, "Ns 10.0")?;
    writeln!(mtl, "d 1.0")?;
    writeln!(mtl, "illum 1")?;
    writeln!(mtl, "map_Kd {}_texture.png", name)?;
    Ok(mtl)
}

/// OBJ, MTL and texture ready to be written side by side.
#[derive(Debug, Clone)]
pub struct ObjExport {
    pub name: String,
    pub obj: String,
    pub mtl: String,
    pub texture_png: Vec<u8>,
}

impl ObjExport {
    pub fn new(geometry: &MergedGeometry, texture: &TextureData, name: &str) -> Result<Self> {
        let (obj, mtl) = export_obj(geometry, name)?;
        Ok(Self {
            name: name.to_string(),
            obj,
            mtl,
            texture_png: texture.to_png()?,
        })
    }

    /// Write `<name>.obj`, `<name>.mtl` and `<name>_texture.png` into `dir`.
    pub fn write_to_dir<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::write(dir.join(format!("{}.obj", self.name)), &self.obj)?;
        std::fs::write(dir.join(format!("{}.mtl", self.name)), &self.mtl)?;
        std::fs::write(dir.join(format!("{}_texture.png", self.name)), &self.texture_png)?;
        Ok(())
    }
}
