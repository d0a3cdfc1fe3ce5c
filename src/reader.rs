//! Extraction of sprite and portrait type declarations from asset scripts
//!
//! Failures are recovered at the smallest enclosing scope: a bad layer is
//! dropped from its portrait type, a bad declaration from its file, a bad file
//! from its content source. Every recovered failure is logged and reported as
//! a [`Warning`].

use glob::MatchOptions;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::{Colour, Hair, Layer, PortraitData, PortraitType, SpriteDef};
use crate::offsets::parse_offsets;
use crate::parser::{decode_western, parse_document, Node, ParseError, Value};

/// Vanilla files with known syntax problems; never parsed.
pub const DENY_LIST: [&str; 5] =
    ["DefaultDialog.gfx", "EU3_mapitems.gfx", "chatfonts.gfx", "fonts.gfx", "mapitems.gfx"];

/// A recovered problem while reading content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Warning {
    pub file: String,
    pub line: usize,
    pub message: String,
}

/// Catalog read from one file or content root plus the problems skipped over.
#[derive(Debug, Clone, Default)]
pub struct ReadResult {
    pub data: PortraitData,
    pub warnings: Vec<Warning>,
}

/// Error that makes a whole file unusable.
#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Lexical error in {}, {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

impl ReaderError {
    fn line(&self) -> usize {
        match self {
            ReaderError::Io { .. } => 0,
            ReaderError::Parse { source, .. } => source.line,
        }
    }
}

/// Whether a file name is on the deny-list (case-insensitive).
pub fn is_denied(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| DENY_LIST.iter().any(|bad| bad.eq_ignore_ascii_case(name)))
}

/// Whether a script has nothing but blank lines and comments.
pub fn is_effectively_empty(source: &str) -> bool {
    source.lines().map(str::trim).all(|l| l.is_empty() || l.starts_with('#'))
}

/// Read the declarations of one script source.
///
/// `file` only labels logs and warnings.
///
/// # Examples
///
/// ```
/// use portrait_builder::reader::read_source;
///
/// let source = r#"spriteTypes = {
///     spriteType = { name = "GFX_neck" texturefile = "gfx\\neck.dds" noOfFrames = 4 }
/// }"#;
/// let result = read_source(source, "neck.gfx").unwrap();
/// assert_eq!(result.data.sprites["GFX_neck"].texture_file, "gfx/neck.dds");
/// ```
pub fn read_source(source: &str, file: &str) -> Result<ReadResult, ParseError> {
    let nodes = parse_document(source)?;
    let mut result = ReadResult::default();
    for root in &nodes {
        for declaration in root.children() {
            read_declaration(declaration, file, &mut result);
        }
    }
    Ok(result)
}

/// Read one script file in the legacy Western encoding.
///
/// Deny-listed and empty files produce an empty result.
pub fn read_file(path: &Path) -> Result<ReadResult, ReaderError> {
    if is_denied(path) {
        tracing::info!(file = %path.display(), "Skipping parsing of deny-listed file");
        return Ok(ReadResult::default());
    }

    let bytes = fs::read(path).map_err(|source| ReaderError::Io { path: path.to_path_buf(), source })?;
    let source = decode_western(&bytes);
    let label = path.display().to_string();

    if is_effectively_empty(&source) {
        tracing::warn!(file = %label, "File is empty");
        let mut result = ReadResult::default();
        result.warnings.push(Warning { file: label, line: 0, message: "File is empty".to_string() });
        return Ok(result);
    }

    read_source(&source, &label).map_err(|source| ReaderError::Parse { path: path.to_path_buf(), source })
}

/// Build the catalog of a content root.
///
/// Reads `interface/*.gfx`, then `interface/portraits/*.gfx` (which override
/// the former), then the offset files of `interface/portrait_offsets/`.
/// Files are parsed in parallel and folded in path order.
pub fn read_content_root(root: &Path) -> ReadResult {
    let interface = root.join("interface");
    let mut files = list_files(&interface, "gfx");
    files.extend(list_files(&interface.join("portraits"), "gfx"));

    tracing::debug!(root = %root.display(), files = files.len(), "Scanning for portrait data files");

    let parsed: Vec<_> = files.par_iter().map(|path| (path, read_file(path))).collect();

    let mut result = ReadResult::default();
    for (path, outcome) in parsed {
        match outcome {
            Ok(file_result) => {
                for sprite in file_result.data.sprites.into_values() {
                    result.data.insert_sprite(sprite);
                }
                for portrait_type in file_result.data.portrait_types.into_values() {
                    result.data.insert_portrait_type(portrait_type);
                }
                result.warnings.extend(file_result.warnings);
            }
            Err(e) => {
                tracing::error!(file = %path.display(), error = %e, "Skipping unreadable file");
                result.warnings.push(Warning {
                    file: path.display().to_string(),
                    line: e.line(),
                    message: e.to_string(),
                });
            }
        }
    }

    for path in list_files(&interface.join("portrait_offsets"), "txt") {
        read_offsets_file(&path, &mut result);
    }

    result
}

fn read_offsets_file(path: &Path, result: &mut ReadResult) {
    let label = path.display().to_string();
    let entries = fs::read(path)
        .map_err(|e| Warning { file: label.clone(), line: 0, message: e.to_string() })
        .and_then(|bytes| {
            parse_offsets(&decode_western(&bytes))
                .map_err(|e| Warning { file: label.clone(), line: e.line, message: e.message })
        });

    match entries {
        Ok(entries) => {
            for (sprite, offset) in entries {
                result.data.insert_offset(sprite, offset);
            }
        }
        Err(warning) => {
            tracing::error!(file = %label, error = %warning.message, "Skipping offsets file");
            result.warnings.push(warning);
        }
    }
}

/// Files with the given extension directly in `dir`, sorted.
fn list_files(dir: &Path, extension: &str) -> Vec<PathBuf> {
    if !dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "Folder not found");
        return Vec::new();
    }

    let pattern = format!("{}/*.{}", glob::Pattern::escape(&dir.to_string_lossy()), extension);
    let options = MatchOptions { case_sensitive: false, ..MatchOptions::new() };
    let mut files: Vec<PathBuf> = match glob::glob_with(&pattern, options) {
        Ok(paths) => paths.filter_map(Result::ok).filter(|p| p.is_file()).collect(),
        Err(e) => {
            tracing::error!(pattern = %pattern, error = %e, "Invalid glob pattern");
            Vec::new()
        }
    };
    files.sort();
    files
}

fn read_declaration(node: &Node, file: &str, result: &mut ReadResult) {
    let outcome = if node.is("spriteType") {
        read_sprite_type(node).map(|sprite| result.data.insert_sprite(sprite))
    } else if node.is("portraitType") {
        read_portrait_type(node, file, &mut result.warnings)
            .map(|portrait_type| result.data.insert_portrait_type(portrait_type))
    } else {
        return;
    };

    if let Err(message) = outcome {
        let key = node.key.as_deref().unwrap_or_default();
        tracing::error!(file = %file, line = node.line, "Could not parse {}: {}", key, message);
        result.warnings.push(Warning {
            file: file.to_string(),
            line: node.line,
            message: format!("Could not parse {}: {}", key, message),
        });
    }
}

fn read_sprite_type(node: &Node) -> Result<SpriteDef, String> {
    let mut sprite = SpriteDef::default();

    for option in node.children() {
        if option.is_ignore_case("name") {
            if let Some(text) = option.value.as_text() {
                sprite.name = text.to_string();
            }
        } else if option.is_ignore_case("textureFile") {
            if let Some(text) = option.value.as_text() {
                sprite.texture_file = crate::models::normalize_texture_path(text);
            }
        } else if option.is_ignore_case("norefcount") {
            if let Some(flag) = option.value.as_bool() {
                sprite.no_ref_count = flag;
            }
        } else if option.is_ignore_case("noOfFrames") {
            sprite.frame_count = int_value(option)?;
        }
    }

    if sprite.name.is_empty() {
        return Err("spriteType has no name".to_string());
    }
    tracing::debug!(sprite = %sprite, "SpriteDef parsed");
    Ok(sprite)
}

fn read_portrait_type(node: &Node, file: &str, warnings: &mut Vec<Warning>) -> Result<PortraitType, String> {
    let mut portrait_type = PortraitType::default();
    let mut layer_group = None;

    for option in node.children() {
        match (option.key.as_deref(), &option.value) {
            (Some("name"), Value::Str(s)) => portrait_type.name = s.clone(),
            (Some("effectFile"), Value::Str(s)) => portrait_type.effect_file = s.replace("\\\\", "\\"),
            (Some("hair_color_index"), Value::Number(_)) => portrait_type.hair_colour_index = index_value(option)?,
            (Some("eye_color_index"), Value::Number(_)) => portrait_type.eye_colour_index = index_value(option)?,
            (Some("layer"), Value::Group(items)) => layer_group = Some(items),
            (Some("headgear_that_hides_hair"), Value::Group(items)) => {
                for item in items {
                    let n = item.value.as_int().ok_or_else(|| format!("invalid headgear index at line {}", item.line))?;
                    portrait_type.headgear_that_hides_hair.push(to_i32(n, item.line)?);
                }
            }
            (Some("hair_color"), Value::Group(items)) => {
                let colours = colours(items)?;
                if colours.len() % 3 != 0 {
                    tracing::warn!(file = %file, line = option.line, "Dropping incomplete hair colour set");
                    warnings.push(Warning {
                        file: file.to_string(),
                        line: option.line,
                        message: format!("{} hair colours is not a multiple of 3", colours.len()),
                    });
                }
                portrait_type.hair_colours.extend(
                    colours.chunks_exact(3).map(|c| Hair { dark: c[0], base: c[1], highlight: c[2] }),
                );
            }
            (Some("eye_color"), Value::Group(items)) => portrait_type.eye_colours.extend(colours(items)?),
            _ => {}
        }
    }

    if portrait_type.name.is_empty() {
        return Err("portraitType has no name".to_string());
    }
    let items = layer_group.ok_or("portraitType has no layer group")?;
    portrait_type.layers = read_layers(items, file, warnings);

    tracing::debug!(
        portrait_type = %portrait_type.name,
        hair_colour_index = portrait_type.hair_colour_index,
        eye_colour_index = portrait_type.eye_colour_index,
        layers = portrait_type.layers.len(),
        "Portrait type parsed"
    );
    Ok(portrait_type)
}

fn read_layers(items: &[Node], file: &str, warnings: &mut Vec<Warning>) -> Vec<Layer> {
    let mut warn = |line: usize, message: String| {
        warnings.push(Warning { file: file.to_string(), line, message });
    };

    let mut layers = Vec::new();
    for item in items {
        let Some(text) = item.value.as_text() else {
            tracing::error!(file = %file, line = item.line, "Layer is not a string");
            warn(item.line, "Layer is not a string".to_string());
            continue;
        };

        let layer: Layer = match text.parse() {
            Ok(layer) => layer,
            Err(e) => {
                tracing::error!(file = %file, line = item.line, layer = %text, error = %e, "Could not parse layer");
                warn(item.line, format!("Could not parse layer {}: {}", text, e));
                continue;
            }
        };

        for token in &layer.unrecognized {
            tracing::warn!(file = %file, layer = %layer.name, "Unknown syntax \"{}\"", token);
            warn(item.line, format!("Unknown syntax \"{}\" for layer {}", token, layer.name));
        }
        if layer.is_unbound() {
            tracing::error!(file = %file, layer = %layer.name, "Missing characteristic for layer");
            warn(item.line, format!("Missing characteristic for layer {}", layer.name));
        }

        tracing::debug!(layer = %layer, "Layer parsed");
        layers.push(layer);
    }
    layers
}

fn colours(items: &[Node]) -> Result<Vec<Colour>, String> {
    items
        .iter()
        .filter_map(|item| item.value.as_group().map(|group| (item.line, group)))
        .map(|(line, group)| colour(group).ok_or_else(|| format!("failed to parse colour at line {}", line)))
        .collect()
}

fn colour(group: &[Node]) -> Option<Colour> {
    let channel = |i: usize| group.get(i).and_then(|n| n.value.as_int()).and_then(|n| u8::try_from(n).ok());
    Some(Colour::new(channel(0)?, channel(1)?, channel(2)?))
}

fn int_value(option: &Node) -> Result<i32, String> {
    let n = option
        .value
        .as_int()
        .ok_or_else(|| format!("expected an integer at line {}", option.line))?;
    to_i32(n, option.line)
}

fn index_value(option: &Node) -> Result<usize, String> {
    option
        .value
        .as_int()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| format!("expected a DNA index at line {}", option.line))
}

fn to_i32(n: i64, line: usize) -> Result<i32, String> {
    i32::try_from(n).map_err(|_| format!("integer out of range at line {}", line))
}
