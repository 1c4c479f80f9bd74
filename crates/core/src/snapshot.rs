//! Complete, round-trippable engine state.
//! This module exists to define what a saved run contains and how a malformed one is rejected.
//! It does not own the on-disk encoding; see `snapshot_file` for the JSON file wrapper.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::entities::{Enemy, TransientDrop};
use crate::map::ActionTally;
use crate::progression::{MAX_LEVELS, ProgressionState};
use crate::types::{ActionKind, Direction, Millis, Pos, RunOutcome, TileKind};

pub const SNAPSHOT_FORMAT_VERSION: u16 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSnapshot {
    pub width: usize,
    pub height: usize,
    pub tiles: Vec<TileKind>,
    pub explored: Vec<bool>,
    pub visit_times: Vec<Option<Millis>>,
    pub actions: BTreeMap<ActionKind, ActionTally>,
    pub key_position: Option<Pos>,
    pub exit_door_position: Option<Pos>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub format_version: u16,
    pub config: EngineConfig,
    pub level_seed: u64,
    pub rng_draws: u64,
    pub now: Millis,
    pub player_pos: Pos,
    pub facing: Direction,
    pub health: i32,
    pub gold: u32,
    pub potions: u32,
    pub outcome: Option<RunOutcome>,
    pub progression: ProgressionState,
    pub map: MapSnapshot,
    pub enemies: Vec<Enemy>,
    pub drops: Vec<TransientDrop>,
}

impl Snapshot {
    pub fn level(&self) -> u8 {
        self.progression.level()
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum SnapshotError {
    UnsupportedVersion { found: u16 },
    /// Zero-sized, or too large for `width * height` to be counted.
    InvalidDimensions { width: usize, height: usize },
    LevelOutOfRange { level: u8 },
    /// The player is off the map or inside a wall.
    PlayerOutsideMap { pos: Pos },
    /// A per-cell layer does not hold exactly `width * height` entries.
    GridLengthMismatch { layer: &'static str, expected: usize, found: usize },
    /// The restored engine does not hash to the value stored beside the snapshot.
    HashMismatch { expected: u64, found: u64 },
    MalformedHash { text: String },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported snapshot format version {found}")
            }
            Self::InvalidDimensions { width, height } => {
                write!(f, "snapshot map has invalid dimensions {width}x{height}")
            }
            Self::LevelOutOfRange { level } => {
                write!(f, "snapshot level {level} is outside 1..={MAX_LEVELS}")
            }
            Self::PlayerOutsideMap { pos } => {
                write!(f, "snapshot player at ({}, {}) is not on an open cell", pos.x, pos.y)
            }
            Self::GridLengthMismatch { layer, expected, found } => {
                write!(f, "snapshot {layer} layer has {found} cells, expected {expected}")
            }
            Self::HashMismatch { expected, found } => {
                write!(f, "snapshot hash mismatch: stored {expected:#018x}, restored {found:#018x}")
            }
            Self::MalformedHash { text } => write!(f, "snapshot hash {text:?} is not hexadecimal"),
        }
    }
}

impl Error for SnapshotError {}
