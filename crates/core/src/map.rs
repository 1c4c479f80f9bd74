//! Tile grid plus the exploration, visit, and action telemetry recorded while a level is played.
//! This module exists to keep every per-level cell fact behind one closed-world accessor set.
//! It does not own enemies, drops, or the unlock sequence that decides where the key goes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{ActionKind, Millis, Pos, TileKind};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionTally {
    pub count: u32,
    pub last_at: Millis,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileMap {
    width: usize,
    height: usize,
    pub(crate) tiles: Vec<TileKind>,
    pub(crate) explored: Vec<bool>,
    pub(crate) visit_times: Vec<Option<Millis>>,
    pub(crate) actions: BTreeMap<ActionKind, ActionTally>,
    key_position: Option<Pos>,
    exit_door_position: Option<Pos>,
}

impl TileMap {
    /// Builds an all-`Wall` map. Both dimensions must be non-zero.
    pub fn new(width: usize, height: usize) -> Self {
        Self::from_tiles(width, height, vec![TileKind::Wall; width * height])
    }

    pub fn from_tiles(width: usize, height: usize, tiles: Vec<TileKind>) -> Self {
        debug_assert_eq!(tiles.len(), width * height);
        Self {
            width,
            height,
            tiles,
            explored: vec![false; width * height],
            visit_times: vec![None; width * height],
            actions: BTreeMap::new(),
            key_position: None,
            exit_door_position: None,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    pub fn tile_at(&self, pos: Pos) -> TileKind {
        self.index(pos).map_or(TileKind::Wall, |idx| self.tiles[idx])
    }

    pub fn set_tile(&mut self, pos: Pos, tile: TileKind) {
        if let Some(idx) = self.index(pos) {
            self.tiles[idx] = tile;
        }
    }

    pub fn is_explored(&self, pos: Pos) -> bool {
        self.index(pos).is_some_and(|idx| self.explored[idx])
    }

    pub fn record_visit(&mut self, pos: Pos, now: Millis) {
        if let Some(idx) = self.index(pos) {
            self.explored[idx] = true;
            self.visit_times[idx] = Some(now);
        }
    }

    pub fn visit_time(&self, pos: Pos) -> Option<Millis> {
        self.index(pos).and_then(|idx| self.visit_times[idx])
    }

    pub fn record_action(&mut self, kind: ActionKind, now: Millis) {
        let tally = self.actions.entry(kind).or_default();
        tally.count = tally.count.saturating_add(1);
        tally.last_at = now;
    }

    pub fn action_count(&self, kind: ActionKind) -> u32 {
        self.actions.get(&kind).map_or(0, |tally| tally.count)
    }

    pub fn last_action_time(&self) -> Option<Millis> {
        self.actions.values().map(|tally| tally.last_at).max()
    }

    pub fn key_position(&self) -> Option<Pos> {
        self.key_position
    }

    /// Out-of-range positions leave the key unset.
    pub fn set_key_position(&mut self, pos: Pos) {
        self.key_position = self.in_bounds(pos).then_some(pos);
    }

    pub fn clear_key_position(&mut self) {
        self.key_position = None;
    }

    pub fn exit_door_position(&self) -> Option<Pos> {
        self.exit_door_position
    }

    pub(crate) fn set_exit_door_position(&mut self, pos: Option<Pos>) {
        self.exit_door_position = pos.filter(|pos| self.in_bounds(*pos));
    }

    /// Marks the level exit next to the `Room` cell farthest (Euclidean) from `from`.
    ///
    /// Wall neighbours are tried west, east, north, south; when none is a wall the room cell
    /// itself becomes the exit. Returns `None` when no room cell lies at a positive distance.
    pub fn place_exit_door_farthest_from(&mut self, from: Pos) -> Option<Pos> {
        let room = self.farthest_room_cell(from)?;
        let door = [room.offset(-1, 0), room.offset(1, 0), room.offset(0, -1), room.offset(0, 1)]
            .into_iter()
            .find(|&candidate| self.in_bounds(candidate) && self.tile_at(candidate) == TileKind::Wall)
            .unwrap_or(room);
        self.set_tile(door, TileKind::LevelExitDoor);
        self.exit_door_position = Some(door);
        Some(door)
    }

    /// Room cells in column-major scan order (x outer, y inner).
    pub fn room_cells(&self) -> Vec<Pos> {
        self.cells_column_major().filter(|&pos| self.tile_at(pos) == TileKind::Room).collect()
    }

    pub fn first_room_cell(&self) -> Option<Pos> {
        self.cells_column_major().find(|&pos| self.tile_at(pos) == TileKind::Room)
    }

    pub fn count_tiles(&self, kind: TileKind) -> usize {
        self.tiles.iter().filter(|&&tile| tile == kind).count()
    }

    pub fn neighbors(pos: Pos) -> [Pos; 4] {
        [
            Pos { y: pos.y - 1, x: pos.x },
            Pos { y: pos.y, x: pos.x + 1 },
            Pos { y: pos.y + 1, x: pos.x },
            Pos { y: pos.y, x: pos.x - 1 },
        ]
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(8 + self.tiles.len());
        bytes.extend((self.width as u32).to_le_bytes());
        bytes.extend((self.height as u32).to_le_bytes());
        for tile in &self.tiles {
            bytes.push(tile_code(*tile));
        }
        bytes
    }

    pub(crate) fn cells_column_major(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.width)
            .flat_map(move |x| (0..self.height).map(move |y| Pos { y: y as i32, x: x as i32 }))
    }

    fn farthest_room_cell(&self, from: Pos) -> Option<Pos> {
        let mut best: Option<(Pos, i64)> = None;
        for pos in self.cells_column_major() {
            if self.tile_at(pos) != TileKind::Room {
                continue;
            }
            let distance = squared_distance(pos, from);
            if distance > best.map_or(0, |(_, best_distance)| best_distance) {
                best = Some((pos, distance));
            }
        }
        best.map(|(pos, _)| pos)
    }

    fn index(&self, pos: Pos) -> Option<usize> {
        self.in_bounds(pos).then(|| (pos.y as usize) * self.width + (pos.x as usize))
    }
}

pub(crate) fn squared_distance(a: Pos, b: Pos) -> i64 {
    let dx = i64::from(a.x - b.x);
    let dy = i64::from(a.y - b.y);
    dx * dx + dy * dy
}

pub(crate) fn tile_code(tile: TileKind) -> u8 {
    match tile {
        TileKind::Wall => 0,
        TileKind::Floor => 1,
        TileKind::Room => 2,
        TileKind::Door => 3,
        TileKind::LevelExitDoor => 4,
    }
}
