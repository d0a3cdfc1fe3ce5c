//! Criterion benchmarks for Portrait Builder critical paths
//!
//! Benchmarks the core performance-critical operations:
//! - Parser: asset script parsing and extraction
//! - Shader: hair and eye recolouring
//! - Renderer: full portrait compositing with a warm tile cache

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use image::{Rgba, RgbaImage};
use portrait_builder::character::{Character, Government, Rank};
use portrait_builder::models::{Colour, Hair, PortraitData, SpriteDef};
use portrait_builder::parser::parse_document;
use portrait_builder::reader::read_source;
use portrait_builder::render::render_portrait;
use portrait_builder::shader::{shade_eye, shade_hair};
use portrait_builder::sprite_cache::{SpriteCache, SpriteError, SpriteLoader, SpriteTiles};

// =============================================================================
// Test Data Generators
// =============================================================================

/// Generate an asset script with `count` sprite declarations and one portrait type using them
fn make_script(count: usize) -> String {
    let mut script = String::from("spriteTypes = {\n");
    for i in 0..count {
        script.push_str(&format!(
            "    spriteType = {{\n        name = \"GFX_bench_{i}\"\n        texturefile = \"gfx\\\\characters\\\\bench_{i}.dds\"\n        noOfFrames = {}\n    }}\n",
            (i % 12) + 1
        ));
    }
    script.push_str("    portraitType = {\n        name = \"PORTRAIT_bench_male\"\n        layer = {\n");
    for i in 0..count {
        script.push_str(&format!("            \"GFX_bench_{}:d{}\"\n", i, i % 11));
    }
    script.push_str("        }\n        hair_color = { { 10 10 10 } { 90 70 50 } { 200 180 160 } }\n");
    script.push_str("        eye_color = { { 20 40 80 } }\n    }\n}\n");
    script
}

/// Tile with a horizontal gradient in every channel
fn make_tile(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let v = ((x * 255) / width.max(1)) as u8;
        Rgba([v, v, v, if y % 7 == 0 { 0 } else { 255 }])
    })
}

/// Serves generated sheets without touching the disk
struct GeneratedLoader;

impl SpriteLoader for GeneratedLoader {
    fn load(&self, sprite: &SpriteDef) -> Result<SpriteTiles, SpriteError> {
        let frames = sprite.frame_count.max(0) as u32;
        let size = if sprite.name.starts_with("GFX_charframe") { 176 } else { 152 };
        Ok(SpriteTiles::from_sheet(&make_tile(size * frames, size), sprite.frame_count).unwrap_or_default())
    }
}

fn make_catalog(layers: usize) -> PortraitData {
    let mut data = read_source(&make_script(layers), "bench.gfx").expect("bench script parses").data;
    data.insert_sprite(SpriteDef::new("GFX_charframe_150", "gfx/interface/charframe_150.dds", 6));
    data
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for count in [10, 100, 1000] {
        let script = make_script(count);
        group.throughput(Throughput::Bytes(script.len() as u64));
        group.bench_with_input(BenchmarkId::new("parse_document", count), &script, |b, s| {
            b.iter(|| parse_document(black_box(s)))
        });
        group.bench_with_input(BenchmarkId::new("read_source", count), &script, |b, s| {
            b.iter(|| read_source(black_box(s), "bench.gfx"))
        });
    }
    group.finish();
}

fn bench_shaders(c: &mut Criterion) {
    let tile = make_tile(152, 152);
    let hair = Hair { dark: Colour::new(10, 10, 10), base: Colour::new(90, 70, 50), highlight: Colour::new(200, 180, 160) };

    let mut group = c.benchmark_group("shader");
    group.throughput(Throughput::Elements(152 * 152));
    group.bench_function("hair_152", |b| b.iter(|| shade_hair(black_box(&tile), hair)));
    group.bench_function("eye_152", |b| b.iter(|| shade_eye(black_box(&tile), Colour::new(20, 40, 80))));
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    for layers in [5, 20] {
        let catalog = make_catalog(layers);
        let portrait_type = catalog.portrait_type("PORTRAIT_bench_male", None).expect("bench type exists");
        let character = Character::new("abcdefghijk", "abcdefghijk", portrait_type, Rank::Duke, Government::Feudal)
            .expect("valid character");
        let cache = SpriteCache::new(GeneratedLoader);
        // Warm the cache so only compositing is measured
        let _ = render_portrait(&character, &catalog, &cache);

        group.bench_with_input(BenchmarkId::new("warm_cache", layers), &layers, |b, _| {
            b.iter(|| render_portrait(black_box(&character), &catalog, &cache))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_shaders, bench_render);
criterion_main!(benches);
