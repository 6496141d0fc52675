//! Skin Voxel Mesher CLI
//!
//! Extrude Minecraft skins and item sprites into voxel meshes.

use clap::{Parser, Subcommand, ValueEnum};
use skin_voxel_mesher::{
    export_glb, load_texture_from_path, ItemModel, MergedGeometry, Mesher, MesherConfig,
    ObjExport, OccupancyThreshold, SkinModel, TextureData, SHELL_SHADER_WGSL,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "skin-voxel-mesher")]
#[command(author, version, long_about = None)]
#[command(about = "Extrude Minecraft skins and items into voxel meshes")]
struct Cli {
    /// JSON mesher configuration; missing fields use defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Voxelize an item sprite (one cube per opaque texel)
    Item {
        /// Input PNG
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "glb")]
        format: OutputFormat,

        /// Override the item alpha threshold
        #[arg(long)]
        threshold: Option<u8>,
    },

    /// Build a player model from a skin, overlays extruded as voxel shells
    Skin {
        /// Input skin PNG (64x64, 64x32 legacy or HD)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "glb")]
        format: OutputFormat,

        /// Use slim (3-wide) arms
        #[arg(long)]
        slim: bool,
    },

    /// Print glow shell uniforms as JSON
    Glow {
        /// Enable the glow
        #[arg(long)]
        enabled: bool,

        /// Outward extent control
        #[arg(long)]
        thickness: Option<f32>,

        /// Normalized fade-out height
        #[arg(long)]
        height: Option<f32>,

        /// Also write the shell shader (WGSL) here
        #[arg(long)]
        shader: Option<PathBuf>,
    },

    /// Show texture size and occupancy
    Info {
        /// Input PNG
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Binary glTF format
    Glb,
    /// Wavefront OBJ format
    Obj,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => {
            log::info!("Loading config from {:?}", path);
            MesherConfig::from_path(path)?
        }
        None => MesherConfig::default(),
    };

    match cli.command {
        Commands::Item {
            input,
            output,
            format,
            threshold,
        } => {
            let config = match threshold {
                Some(alpha) => config.with_item_threshold(alpha),
                None => config,
            };
            mesh_item(config, &input, &output, format)?;
        }
        Commands::Skin {
            input,
            output,
            format,
            slim,
        } => {
            let config = if slim { config.with_slim(true) } else { config };
            mesh_skin(config, &input, &output, format)?;
        }
        Commands::Glow {
            enabled,
            thickness,
            height,
            shader,
        } => {
            let mut glow = config.glow;
            glow.enabled |= enabled;
            if let Some(t) = thickness {
                glow.thickness = t;
            }
            if let Some(h) = height {
                glow.height = h;
            }
            let layers = Mesher::new().glow_generator().layers(&glow);
            println!("{}", serde_json::to_string_pretty(&layers)?);

            if let Some(path) = shader {
                fs::write(&path, SHELL_SHADER_WGSL)?;
                log::info!("Wrote shell shader to {:?}", path);
            }
        }
        Commands::Info { input } => {
            show_texture_info(&input)?;
        }
    }

    Ok(())
}

fn mesh_item(
    config: MesherConfig,
    input: &Path,
    output: &Path,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("Loading item texture from {:?}...", input);
    let texture = load_texture_from_path(input)?;

    let mesher = Mesher::with_config(config);
    let item = ItemModel::build(&mesher, &texture)?;
    log::info!(
        "  Generated {} vertices, {} triangles",
        item.geometry().vertex_count(),
        item.geometry().triangle_count()
    );

    export_output(item.geometry(), &texture, output, format, "item")
}

fn mesh_skin(
    config: MesherConfig,
    input: &Path,
    output: &Path,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("Loading skin from {:?}...", input);
    let skin = load_texture_from_path(input)?;

    let mut mesher = Mesher::with_config(config);
    let model = SkinModel::build(&mut mesher, &skin)?;
    for part in model.parts() {
        log::info!(
            "  {}: {} vertices{}",
            part.id,
            part.geometry().vertex_count(),
            if part.has_overlay() { " (with overlay)" } else { "" }
        );
    }

    let geometry = model.flatten();
    export_output(&geometry, model.atlas(), output, format, "skin")
}

fn show_texture_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let texture = load_texture_from_path(input)?;
    let mask = skin_voxel_mesher::AlphaMask::from_texture(&texture)?;

    println!("Texture: {}x{}", texture.width, texture.height);
    println!("  Has transparency: {}", texture.has_transparency());
    println!(
        "  Item texels (alpha > {}): {}",
        OccupancyThreshold::ITEM.0,
        mask.occupied_count(OccupancyThreshold::ITEM)
    );
    println!(
        "  Layer texels (alpha > {}): {}",
        OccupancyThreshold::SKIN_LAYER.0,
        mask.occupied_count(OccupancyThreshold::SKIN_LAYER)
    );

    Ok(())
}

fn export_output(
    geometry: &MergedGeometry,
    texture: &TextureData,
    path: &Path,
    format: OutputFormat,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Glb => {
            let glb_path = if path.extension().is_some() {
                path.to_path_buf()
            } else {
                path.with_extension("glb")
            };
            let glb_data = export_glb(geometry, texture)?;
            fs::write(&glb_path, &glb_data)?;
            log::info!("Exported GLB ({} bytes) to {:?}", glb_data.len(), glb_path);
        }
        OutputFormat::Obj => {
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(name);
            let dir = match path.parent() {
                Some(dir) if !dir.as_os_str().is_empty() => dir,
                _ => Path::new("."),
            };
            let obj_export = ObjExport::new(geometry, texture, name)?;
            obj_export.write_to_dir(dir)?;
            log::info!("Exported OBJ {}.obj (+ .mtl, _texture.png) to {:?}", name, dir);
        }
    }

    Ok(())
}
