use std::{path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};
use mediabind_core::{
    hints::{self, Hints},
    prelude::*,
    software::{SoftwareBackend, SoftwareStore},
    AppConfig, Area, ConfigStore, PixelFormat, Surface, Texture, TextureAccess,
};
use tracing_subscriber::EnvFilter;

fn main() -> mediabind_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Hints => list_hints(),
        Commands::Apply { config } => apply_config(&config),
        Commands::Inspect { image, streaming } => inspect_image(&image, streaming),
    }
}

fn list_hints() -> mediabind_core::Result<()> {
    for info in hints::CATALOG {
        if info.choices.is_empty() {
            println!("{:<48} {}", info.name, info.kind);
        } else {
            println!("{:<48} {} [{}]", info.name, info.kind, info.choices.join(", "));
        }
    }
    Ok(())
}

fn apply_config(path: &PathBuf) -> mediabind_core::Result<()> {
    let config = AppConfig::load(path)?;
    tracing::info!(?path, settings = config.hints.len(), "applying hint preset");

    let hints = Hints::new(Arc::new(SoftwareStore::new()));
    let accepted = hints.apply_preset(&config.hints)?;
    tracing::info!(accepted, "preset applied");

    for setting in &config.hints {
        let value = hints.store().get_raw(&setting.name).unwrap_or_default();
        println!("{}={}", setting.name, value);
    }
    Ok(())
}

fn inspect_image(path: &PathBuf, streaming: bool) -> mediabind_core::Result<()> {
    tracing::info!(?path, streaming, "inspecting image");
    let backend = Arc::new(SoftwareBackend::new());

    let texture = if streaming {
        // Streaming textures are created blank and sized after the decoded surface.
        let surface = Surface::load(backend.clone(), path)?;
        Texture::blank(backend.clone(), surface.size(), PixelFormat::Rgba32, TextureAccess::Streaming)?
    } else {
        Texture::load(backend.clone(), path)?
    };

    let Area { width, height } = texture.size();
    println!("width:  {width}");
    println!("height: {height}");
    println!("format: {}", texture.format());
    println!("access: {:?}", texture.access());
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Typed handles and hints over a multimedia backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every declared hint with its value type.
    Hints,
    /// Apply the hint preset of a configuration file and print the result.
    Apply {
        /// Path to a JSON configuration file.
        config: PathBuf,
    },
    /// Load an image as a texture and print its properties.
    Inspect {
        /// Path to the image file.
        image: PathBuf,
        /// Create a streaming texture instead of a static one.
        #[arg(long)]
        streaming: bool,
    },
}
