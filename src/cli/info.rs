//! Catalog listing and genome letter commands

use std::process::ExitCode;

use crate::catalog::merge;
use crate::config::{merge_cli_overrides, PortraitConfig};
use crate::genome::{index_to_letter, letter_to_index};
use crate::models::PortraitData;

use super::{load_sources, ContentArgs, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

fn load_catalog(mut config: PortraitConfig, content: &ContentArgs) -> Result<PortraitData, ExitCode> {
    if let Err(e) = merge_cli_overrides(&mut config, &content.overrides()) {
        eprintln!("Error: {}", e);
        return Err(ExitCode::from(EXIT_INVALID_ARGS));
    }
    match load_sources(&config) {
        Ok(sources) => Ok(merge(&sources)),
        Err(e) => {
            eprintln!("Error: {}", e);
            Err(ExitCode::from(EXIT_INVALID_ARGS))
        }
    }
}

/// Execute the types command
pub fn run_types(config: PortraitConfig, content: &ContentArgs, all: bool) -> ExitCode {
    let catalog = match load_catalog(config, content) {
        Ok(catalog) => catalog,
        Err(code) => return code,
    };
    if catalog.portrait_types.is_empty() {
        eprintln!("Error: No portrait types in the active content");
        return ExitCode::from(EXIT_ERROR);
    }

    for portrait_type in catalog.portrait_types.values().filter(|t| all || t.is_base()) {
        println!(
            "{}  layers={} hair_colours={} eye_colours={}",
            portrait_type.name,
            portrait_type.layers.len(),
            portrait_type.hair_colours.len(),
            portrait_type.eye_colours.len()
        );
    }
    ExitCode::from(EXIT_SUCCESS)
}

/// Execute the sprites command
pub fn run_sprites(config: PortraitConfig, content: &ContentArgs, filter: Option<&str>) -> ExitCode {
    let catalog = match load_catalog(config, content) {
        Ok(catalog) => catalog,
        Err(code) => return code,
    };

    for sprite in catalog.sprites.values().filter(|s| filter.map_or(true, |f| s.name.contains(f))) {
        println!("{}  frames={}  {}", sprite.name, sprite.frame_count, sprite.texture_file);
    }
    ExitCode::from(EXIT_SUCCESS)
}

/// Execute the letter command
pub fn run_letter(letter: char, total: usize, table: bool) -> ExitCode {
    match letter_to_index(letter, total) {
        Some(index) => println!("'{}' -> {} of {}", letter, index, total),
        None => println!("'{}' -> none (no entries)", letter),
    }

    if table {
        println!();
        for index in 0..total {
            match index_to_letter(index) {
                Some(l) => println!("{:>3}  {}", index, l),
                None => println!("{:>3}  -", index),
            }
        }
    }
    ExitCode::from(EXIT_SUCCESS)
}
