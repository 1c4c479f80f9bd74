//! Door classification: corridor cells on a room/corridor boundary become `Door`.

use crate::map::TileMap;
use crate::types::{Pos, TileKind};

use super::grid::count_neighbors;

/// Scans column-major and rewrites the grid in place, so a cell reached after a new `Door`
/// no longer counts that neighbour as `Floor`. Returns the number of doors placed.
pub(super) fn classify_doors(map: &mut TileMap) -> usize {
    let mut placed = 0;

    for x in 1..map.width().saturating_sub(1) {
        for y in 1..map.height().saturating_sub(1) {
            let pos = Pos { y: y as i32, x: x as i32 };
            if map.tile_at(pos) != TileKind::Floor {
                continue;
            }
            if count_neighbors(map, pos, TileKind::Room) > 0
                && count_neighbors(map, pos, TileKind::Floor) > 0
            {
                map.set_tile(pos, TileKind::Door);
                placed += 1;
            }
        }
    }

    placed
}

/// What the in-place scan guarantees for a `Door` at `pos`: it touches a `Room`, and it touches
/// either a `Floor` or a `Door` that the scan reached after it. The second case is a `Floor`
/// neighbour that turned into a door further along the same pass.
pub fn is_well_placed_door(map: &TileMap, pos: Pos) -> bool {
    let scanned_later = |n: Pos| (n.x, n.y) > (pos.x, pos.y);
    let neighbours = TileMap::neighbors(pos);
    neighbours.iter().any(|&n| map.tile_at(n) == TileKind::Room)
        && neighbours.iter().any(|&n| match map.tile_at(n) {
            TileKind::Floor => true,
            TileKind::Door => scanned_later(n),
            _ => false,
        })
}
