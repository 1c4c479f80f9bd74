//! Grid queries shared by the carving, room, and door passes.

use crate::map::{TileMap, squared_distance};
use crate::types::{Pos, TileKind};

pub(super) fn is_interior(map: &TileMap, pos: Pos) -> bool {
    pos.x > 0
        && pos.y > 0
        && (pos.x as usize) < map.width() - 1
        && (pos.y as usize) < map.height() - 1
}

pub(super) fn count_neighbors(map: &TileMap, pos: Pos, kind: TileKind) -> usize {
    TileMap::neighbors(pos).into_iter().filter(|&n| map.tile_at(n) == kind).count()
}

/// Nearest `Floor` cell by Euclidean distance; ties keep the first cell in x-major order.
pub(super) fn nearest_floor(map: &TileMap, target: Pos) -> Option<Pos> {
    let mut best: Option<(Pos, i64)> = None;
    for pos in map.cells_column_major() {
        if map.tile_at(pos) != TileKind::Floor {
            continue;
        }
        let distance = squared_distance(pos, target);
        if best.is_none_or(|(_, best_distance)| distance < best_distance) {
            best = Some((pos, distance));
        }
    }
    best.map(|(pos, _)| pos)
}
