pub mod combat;
pub mod config;
pub mod engine;
pub mod entities;
pub mod journal;
pub mod map;
pub mod mapgen;
pub mod progression;
pub mod render;
pub mod replay;
pub mod rng;
pub mod run_log;
pub mod snapshot;
pub mod snapshot_file;
pub mod story;
pub mod types;

pub use config::EngineConfig;
pub use engine::Engine;
pub use journal::{InputJournal, InputPayload, InputRecord};
pub use map::TileMap;
pub use replay::*;
pub use snapshot::{Snapshot, SnapshotError};
pub use types::*;
