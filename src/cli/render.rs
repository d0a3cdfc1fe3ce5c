//! Render command implementation

use std::path::PathBuf;
use std::process::ExitCode;

use crate::catalog::{CatalogError, ContentManager};
use crate::character::{Character, Government, Rank};
use crate::config::{merge_cli_overrides, PortraitConfig};
use crate::output::{portrait_output_path, save_png, scale_image};

use super::{load_sources, ContentArgs, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Arguments of `portrait render`
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub dna: String,
    pub properties: String,
    pub portrait_type: String,
    pub overlay: Option<String>,
    pub rank: Option<Rank>,
    pub government: Option<Government>,
    pub content: ContentArgs,
    pub output: Option<PathBuf>,
    pub scale: Option<u32>,
}

/// Execute the render command
pub fn run_render(mut config: PortraitConfig, request: RenderRequest) -> ExitCode {
    let mut overrides = request.content.overrides();
    overrides.scale = request.scale;
    overrides.rank = request.rank.map(|r| r.to_string());
    overrides.government = request.government.map(|g| g.to_string());
    if let Err(e) = merge_cli_overrides(&mut config, &overrides) {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let sources = match load_sources(&config) {
        Ok(sources) => sources,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };
    let manager = ContentManager::new(sources);
    let generation = manager.current();

    let portrait_type = match generation.portrait_type(&request.portrait_type, request.overlay.as_deref()) {
        Ok(portrait_type) => portrait_type,
        Err(e @ CatalogError::Empty) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
        Err(e @ CatalogError::PortraitTypeNotFound(_)) => {
            eprintln!("Error: {}", e);
            eprintln!("Run 'portrait types' to list the available portrait types.");
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };
    let type_name = portrait_type.name.clone();

    let character = match Character::new(
        request.dna,
        request.properties,
        portrait_type,
        config.rank(),
        config.government(),
    ) {
        Ok(character) => character,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let portrait = match generation.render(&character) {
        Ok(portrait) => portrait,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    for issue in &portrait.issues {
        eprintln!("Warning: {}", issue);
    }

    let scale = u8::try_from(config.render.scale).unwrap_or(1);
    let image = scale_image(portrait.image, scale);
    let path = portrait_output_path(&type_name, character.dna(), request.output.as_deref());
    if let Err(e) = save_png(&image, &path) {
        eprintln!("Error: Failed to save '{}': {}", path.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }

    println!("Saved: {}", path.display());
    ExitCode::from(EXIT_SUCCESS)
}
