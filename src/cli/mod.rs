//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod info;
mod render;

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::character::{Government, Rank};
use crate::config::{load_config, CliOverrides, PortraitConfig};
use crate::content::ContentSource;
use crate::logging;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Portrait Builder - render layered character portraits from DNA/properties strings
#[derive(Parser)]
#[command(name = "portrait")]
#[command(about = "Portrait Builder - render layered character portraits from DNA/properties strings")]
#[command(version)]
pub struct Cli {
    /// Config file (default: portrait.toml discovered from the working directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Content selection shared by every command that reads a catalog
#[derive(Args, Debug, Default, Clone)]
pub struct ContentArgs {
    /// Game directory (base content)
    #[arg(long)]
    pub game: Option<PathBuf>,

    /// Additional content root, in activation order (repeatable)
    #[arg(long = "content")]
    pub content: Vec<PathBuf>,

    /// Pack manifest (repeatable)
    #[arg(long = "pack")]
    pub pack: Vec<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a character portrait to PNG
    Render {
        /// DNA string (at least 10 characters)
        #[arg(long)]
        dna: String,

        /// Properties string (at least 11 characters)
        #[arg(long)]
        properties: String,

        /// Base portrait type, e.g. PORTRAIT_westerngfx_male
        #[arg(long = "type")]
        portrait_type: String,

        /// Clothing overlay portrait type
        #[arg(long)]
        overlay: Option<String>,

        /// Title rank (none, baron, count, duke, king, emperor)
        #[arg(long, value_parser = parse_rank)]
        rank: Option<Rank>,

        /// Government form, e.g. feudal, theocracy, merchant_republic
        #[arg(long, value_parser = parse_government)]
        government: Option<Government>,

        #[command(flatten)]
        content: ContentArgs,

        /// Output file or directory.
        /// If omitted: {type}_{dna}.png
        /// If directory (ends with /): dir/{type}_{dna}.png
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Scale output by integer factor (1-16)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=16))]
        scale: Option<u32>,
    },

    /// List portrait types of the active content
    Types {
        #[command(flatten)]
        content: ContentArgs,

        /// Include clothing overlay types
        #[arg(long)]
        all: bool,
    },

    /// List sprite sheets of the active content
    Sprites {
        #[command(flatten)]
        content: ContentArgs,

        /// Only list sprites whose name contains this text
        #[arg(long)]
        filter: Option<String>,
    },

    /// Show which tile a genome letter selects
    Letter {
        /// Genome letter ('0' or a-z)
        letter: char,

        /// Number of tiles or palette entries
        total: usize,

        /// Also print the letter of every index
        #[arg(long)]
        table: bool,
    },
}

fn parse_rank(s: &str) -> Result<Rank, String> {
    s.parse()
}

fn parse_government(s: &str) -> Result<Government, String> {
    s.parse()
}

/// Run a parsed command line and return the exit code
pub fn run(cli: Cli) -> ExitCode {
    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };
    logging::init(&config.log.level, cli.verbose);

    match cli.command {
        Commands::Render {
            dna,
            properties,
            portrait_type,
            overlay,
            rank,
            government,
            content,
            output,
            scale,
        } => render::run_render(
            config,
            render::RenderRequest {
                dna,
                properties,
                portrait_type,
                overlay,
                rank,
                government,
                content,
                output,
                scale,
            },
        ),
        Commands::Types { content, all } => info::run_types(config, &content, all),
        Commands::Sprites { content, filter } => info::run_sprites(config, &content, filter.as_deref()),
        Commands::Letter { letter, total, table } => info::run_letter(letter, total, table),
    }
}

impl ContentArgs {
    pub(crate) fn overrides(&self) -> CliOverrides {
        CliOverrides {
            game: self.game.clone(),
            sources: self.content.clone(),
            packs: self.pack.clone(),
            ..Default::default()
        }
    }
}

/// Load every configured content source: the game first, then roots, then packs.
pub(crate) fn load_sources(config: &PortraitConfig) -> Result<Vec<ContentSource>, String> {
    let mut sources = Vec::new();

    if let Some(game) = &config.game.dir {
        sources.push(load_root("game", game)?);
    }
    for root in &config.content.sources {
        sources.push(load_root(&source_name(root), root)?);
    }
    for manifest in &config.content.packs {
        sources.push(ContentSource::load_pack(manifest).map_err(|e| e.to_string())?);
    }

    if sources.is_empty() {
        return Err("No content configured; pass --game, --content or --pack".to_string());
    }
    for source in &sources {
        for warning in &source.warnings {
            tracing::debug!(source = %source.name, file = %warning.file, line = warning.line, "{}", warning.message);
        }
        if let Some(reason) = &source.disabled_reason {
            eprintln!("Warning: content '{}' disabled: {}", source.name, reason);
        }
    }
    Ok(sources)
}

fn load_root(name: &str, path: &Path) -> Result<ContentSource, String> {
    if !path.is_dir() {
        return Err(format!("Content directory not found: {}", path.display()));
    }
    Ok(ContentSource::load(name, path))
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
