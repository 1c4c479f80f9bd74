use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use dungeon_tools::{load_config, render_ascii};
use game_core::mapgen::derive_level_seed;
use game_core::snapshot_file::format_hash;
use game_core::{Engine, EngineConfig, TileKind};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML file with `width`, `height`, `run_seed`, `max_levels`
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long)]
    seed: Option<u64>,
    #[arg(long)]
    width: Option<usize>,
    #[arg(long)]
    height: Option<usize>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.run_seed = seed;
    }
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }

    let engine = Engine::new(config);
    let map = engine.map();
    print!("{}", render_ascii(&engine));
    println!(
        "seed {} (level seed {:#018x}), {}x{}, {} room cells, {} corridor cells, {} doors",
        config.run_seed,
        derive_level_seed(config.run_seed, 1),
        map.width(),
        map.height(),
        map.count_tiles(TileKind::Room),
        map.count_tiles(TileKind::Floor),
        map.count_tiles(TileKind::Door)
    );
    println!(
        "{} enemies, snapshot hash {}",
        engine.enemies().count(),
        format_hash(engine.snapshot_hash())
    );
    Ok(())
}
