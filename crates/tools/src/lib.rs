//! Shared helpers for the command line tools: config loading and ASCII rendering.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use game_core::render::tile_glyph;
use game_core::{Engine, EngineConfig, Pos};

/// Reads an `EngineConfig` from a TOML file. Missing keys take their defaults.
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: EngineConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}

/// Draws the current level: tiles, then drops and living enemies, then the player as `@`.
pub fn render_ascii(engine: &Engine) -> String {
    let map = engine.map();
    let mut rows: Vec<Vec<char>> = (0..map.height() as i32)
        .map(|y| (0..map.width() as i32).map(|x| tile_glyph(map.tile_at(Pos { y, x }))).collect())
        .collect();

    let mut put = |pos: Pos, glyph: char| {
        if map.in_bounds(pos) {
            rows[pos.y as usize][pos.x as usize] = glyph;
        }
    };
    if let Some(key) = map.key_position() {
        put(key, 'k');
    }
    // Enemies are listed before drops; draw in reverse so an enemy hides the loot beneath it.
    for placed in engine.renderables().iter().rev() {
        put(placed.pos, placed.renderable.sprite().glyph);
    }
    put(engine.player_pos(), '@');

    let mut out = String::with_capacity(rows.len() * (map.width() + 1));
    for row in rows {
        out.extend(row);
        out.push('\n');
    }
    out
}
