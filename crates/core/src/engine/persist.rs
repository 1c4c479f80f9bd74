//! Snapshot capture and restore.
//! This module exists to map engine fields onto `Snapshot` and back with validation.
//! It does not own file encoding or hash verification of stored files.

use super::*;
use crate::progression::MAX_LEVELS;
use crate::snapshot::{MapSnapshot, SNAPSHOT_FORMAT_VERSION, Snapshot, SnapshotError};

impl Engine {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            config: self.config,
            level_seed: self.rng.seed(),
            rng_draws: self.rng.draws(),
            now: self.now,
            player_pos: self.player_pos,
            facing: self.facing,
            health: self.health,
            gold: self.gold,
            potions: self.potions,
            outcome: self.outcome,
            progression: self.progression.clone(),
            map: MapSnapshot {
                width: self.map.width(),
                height: self.map.height(),
                tiles: self.map.tiles.clone(),
                explored: self.map.explored.clone(),
                visit_times: self.map.visit_times.clone(),
                actions: self.map.actions.clone(),
                key_position: self.map.key_position(),
                exit_door_position: self.map.exit_door_position(),
            },
            enemies: self.sim.enemies().map(|(_, enemy)| *enemy).collect(),
            drops: self.sim.drops().map(|(_, drop)| *drop).collect(),
        }
    }

    /// Rebuilds an engine from a snapshot.
    ///
    /// Structural damage is an error: bad dimensions, short layers, a level outside the
    /// campaign, or a player standing off the map or inside a wall. A key or exit position that
    /// cannot be valid is dropped with a warning; a dropped key sends the level back to
    /// `Locked` so the next step places a fresh one.
    pub fn restore(snapshot: Snapshot) -> Result<Self, SnapshotError> {
        if snapshot.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(SnapshotError::UnsupportedVersion { found: snapshot.format_version });
        }
        let level = snapshot.progression.level();
        if !(1..=MAX_LEVELS).contains(&level) {
            return Err(SnapshotError::LevelOutOfRange { level });
        }
        let (map, progression) = restore_map(snapshot.map, snapshot.progression)?;
        if !map.tile_at(snapshot.player_pos).is_passable() {
            return Err(SnapshotError::PlayerOutsideMap { pos: snapshot.player_pos });
        }

        Ok(Self {
            config: snapshot.config,
            rng: GameRng::resume(snapshot.level_seed, snapshot.rng_draws),
            map,
            sim: EntitySim::from_parts(snapshot.enemies, snapshot.drops),
            progression,
            player_pos: snapshot.player_pos,
            facing: snapshot.facing,
            health: snapshot.health,
            gold: snapshot.gold,
            potions: snapshot.potions,
            now: snapshot.now,
            outcome: snapshot.outcome,
            log: Vec::new(),
            step_start: 0,
            trail: None,
        })
    }
}

fn restore_map(
    snapshot: MapSnapshot,
    progression: ProgressionState,
) -> Result<(TileMap, ProgressionState), SnapshotError> {
    let MapSnapshot {
        width,
        height,
        tiles,
        explored,
        visit_times,
        actions,
        key_position,
        exit_door_position,
    } = snapshot;
    let expected = match width.checked_mul(height) {
        Some(cells) if cells > 0 => cells,
        _ => return Err(SnapshotError::InvalidDimensions { width, height }),
    };
    for (layer, found) in
        [("tile", tiles.len()), ("explored", explored.len()), ("visit", visit_times.len())]
    {
        if found != expected {
            return Err(SnapshotError::GridLengthMismatch { layer, expected, found });
        }
    }

    let mut map = TileMap::from_tiles(width, height, tiles);
    map.explored = explored;
    map.visit_times = visit_times;
    map.actions = actions;

    let progression = restore_key(&mut map, key_position, progression);
    if let Some(exit) = exit_door_position {
        if progression.key_collected() && map.in_bounds(exit) {
            map.set_exit_door_position(Some(exit));
        } else {
            warn!("discarding invalid exit position {exit:?} at stage {:?}", progression.stage());
        }
    }
    Ok((map, progression))
}

/// Keeps the key only while it is waiting on a reachable cell.
fn restore_key(
    map: &mut TileMap,
    key_position: Option<Pos>,
    progression: ProgressionState,
) -> ProgressionState {
    let stage = progression.stage();
    match key_position {
        Some(key) if stage == UnlockStage::KeyAvailable && map.tile_at(key).is_passable() => {
            map.set_key_position(key);
            return progression;
        }
        Some(key) => warn!("discarding invalid key position {key:?} at stage {stage:?}"),
        None => {}
    }
    if stage != UnlockStage::KeyAvailable {
        return progression;
    }
    warn!("level {}: available key has no usable cell, relocking", progression.level());
    ProgressionState::from_parts(
        progression.level(),
        progression.regular_kills(),
        progression.boss_kills(),
        UnlockStage::Locked,
    )
}
