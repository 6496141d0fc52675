//! WASM bindings for skin-voxel-mesher.
//!
//! This module provides JavaScript-friendly APIs for use in the browser.

use crate::{
    export_glb, load_texture_from_bytes, GlowConfig, ItemModel, MergedGeometry, Mesher,
    MesherConfig, SkinModel, TextureData,
};
use js_sys::{Float32Array, Uint32Array};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in the browser console
    console_error_panic_hook::set_once();
}

/// Mesher configuration options.
#[wasm_bindgen]
#[derive(Default)]
pub struct MesherOptions {
    config: MesherConfig,
}

#[wasm_bindgen]
impl MesherOptions {
    #[wasm_bindgen(constructor)]
    pub fn new() -> MesherOptions {
        MesherOptions::default()
    }

    /// Parse options from a JSON configuration string.
    pub fn from_json(json: &str) -> Result<MesherOptions, JsError> {
        let config = MesherConfig::from_json(json).map_err(to_js)?;
        Ok(MesherOptions { config })
    }

    #[wasm_bindgen(setter)]
    pub fn set_slim(&mut self, value: bool) {
        self.config.slim = value;
    }

    #[wasm_bindgen(setter)]
    pub fn set_item_threshold(&mut self, value: u8) {
        self.config = self.config.clone().with_item_threshold(value);
    }

    #[wasm_bindgen(setter)]
    pub fn set_glow_enabled(&mut self, value: bool) {
        self.config.glow.enabled = value;
    }

    #[wasm_bindgen(setter)]
    pub fn set_glow_thickness(&mut self, value: f32) {
        self.config.glow.thickness = value;
    }

    #[wasm_bindgen(setter)]
    pub fn set_glow_height(&mut self, value: f32) {
        self.config.glow.height = value;
    }
}

/// Mesh result containing GLB data and raw buffers.
#[wasm_bindgen]
pub struct MeshResult {
    glb_data: Vec<u8>,
    geometry: MergedGeometry,
}

impl MeshResult {
    fn new(geometry: MergedGeometry, texture: &TextureData) -> Result<MeshResult, JsError> {
        let glb_data = export_glb(&geometry, texture).map_err(to_js)?;
        Ok(MeshResult { glb_data, geometry })
    }
}

#[wasm_bindgen]
impl MeshResult {
    /// Get the GLB binary data.
    #[wasm_bindgen(getter)]
    pub fn glb_data(&self) -> Vec<u8> {
        self.glb_data.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn positions(&self) -> Float32Array {
        Float32Array::from(self.geometry.positions_flat().as_slice())
    }

    #[wasm_bindgen(getter)]
    pub fn normals(&self) -> Float32Array {
        Float32Array::from(self.geometry.normals_flat().as_slice())
    }

    #[wasm_bindgen(getter)]
    pub fn uvs(&self) -> Float32Array {
        Float32Array::from(self.geometry.uvs_flat().as_slice())
    }

    #[wasm_bindgen(getter)]
    pub fn indices(&self) -> Uint32Array {
        Uint32Array::from(self.geometry.indices.as_slice())
    }

    /// Get the total vertex count.
    #[wasm_bindgen(getter)]
    pub fn vertex_count(&self) -> usize {
        self.geometry.vertex_count()
    }

    /// Get the total triangle count.
    #[wasm_bindgen(getter)]
    pub fn triangle_count(&self) -> usize {
        self.geometry.triangle_count()
    }
}

/// Voxelize an item sprite from PNG bytes.
#[wasm_bindgen]
pub fn mesh_item(png: &[u8], options: Option<MesherOptions>) -> Result<MeshResult, JsError> {
    let texture = load_texture_from_bytes(png).map_err(to_js)?;
    let mesher = Mesher::with_config(options.unwrap_or_default().config);
    let item = ItemModel::build(&mesher, &texture).map_err(to_js)?;
    MeshResult::new((**item.geometry()).clone(), &texture)
}

/// Build a player model from skin PNG bytes.
#[wasm_bindgen]
pub fn mesh_skin(png: &[u8], options: Option<MesherOptions>) -> Result<MeshResult, JsError> {
    let skin = load_texture_from_bytes(png).map_err(to_js)?;
    let mut mesher = Mesher::with_config(options.unwrap_or_default().config);
    let model = SkinModel::build(&mut mesher, &skin).map_err(to_js)?;
    MeshResult::new(model.flatten(), model.atlas())
}

/// Glow shell uniforms as a JSON array.
#[wasm_bindgen]
pub fn glow_layers(enabled: bool, thickness: f32, height: f32) -> Result<String, JsError> {
    let config = GlowConfig {
        enabled,
        thickness,
        height,
    };
    let layers = Mesher::new().glow_generator().layers(&config);
    serde_json::to_string(&layers).map_err(|e| JsError::new(&e.to_string()))
}

/// WGSL source of the glow shell shader.
#[wasm_bindgen]
pub fn shell_shader() -> String {
    crate::SHELL_SHADER_WGSL.to_string()
}

fn to_js(e: crate::MesherError) -> JsError {
    JsError::new(&e.to_string())
}
