//! Portrait Builder - library for resolving and rendering layered character portraits
//!
//! This library provides functionality to:
//! - Parse `.gfx` asset scripts into sprite and portrait type catalogs
//! - Merge the catalogs of several content sources with override precedence
//! - Decode and cache sprite sheet tiles
//! - Composite a character's layers, recoloured for hair and eyes, into a PNG

pub mod catalog;
pub mod character;
pub mod characteristic;
pub mod cli;
pub mod config;
pub mod content;
pub mod genome;
pub mod logging;
pub mod models;
pub mod offsets;
pub mod output;
pub mod parser;
pub mod reader;
pub mod render;
pub mod shader;
pub mod sprite_cache;
pub mod texture;
pub mod tokenizer;
