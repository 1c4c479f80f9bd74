//! Procedural dungeon generation split into carving, room, door, and seed submodules.

pub mod model;

mod carve;
mod doors;
mod generator;
mod grid;
mod layout;
mod seed;

pub use doors::is_well_placed_door;
pub use generator::{DEFAULT_HEIGHT, DEFAULT_WIDTH, DungeonGenerator};
pub use model::GeneratedDungeon;
pub use seed::derive_level_seed;

use crate::rng::GameRng;

pub fn generate_level(width: usize, height: usize, seed: u64) -> GeneratedDungeon {
    let mut rng = GameRng::seeded(seed);
    DungeonGenerator::new(width, height).generate(&mut rng)
}
