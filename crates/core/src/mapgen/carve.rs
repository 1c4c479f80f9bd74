//! Recursive-backtracking corridor carver.
//!
//! A cell becomes `Floor` only while it is an interior `Wall` touching at most one `Floor`
//! cell, which keeps every corridor one tile wide. The walk is driven by an explicit frame
//! stack but draws its shuffles in the same order a recursive descent would.

use crate::map::TileMap;
use crate::rng::GameRng;
use crate::types::{Direction, Pos, TileKind};

use super::grid::{count_neighbors, is_interior};

struct Frame {
    pos: Pos,
    order: [Direction; 4],
    next: usize,
}

/// Carves from `start` and returns the cells in carve order.
pub(super) fn carve_corridors(map: &mut TileMap, start: Pos, rng: &mut GameRng) -> Vec<Pos> {
    let mut carved = Vec::new();
    let mut stack = Vec::new();

    if let Some(frame) = try_carve(map, start, rng, &mut carved) {
        stack.push(frame);
    }

    while let Some(frame) = stack.last_mut() {
        let Some(&direction) = frame.order.get(frame.next) else {
            stack.pop();
            continue;
        };
        frame.next += 1;
        let target = frame.pos.step(direction, 1);
        if let Some(child) = try_carve(map, target, rng, &mut carved) {
            stack.push(child);
        }
    }

    carved
}

fn try_carve(
    map: &mut TileMap,
    pos: Pos,
    rng: &mut GameRng,
    carved: &mut Vec<Pos>,
) -> Option<Frame> {
    if !is_interior(map, pos) || map.tile_at(pos) != TileKind::Wall {
        return None;
    }
    if count_neighbors(map, pos, TileKind::Floor) > 1 {
        return None;
    }

    map.set_tile(pos, TileKind::Floor);
    carved.push(pos);

    let mut order = [Direction::East, Direction::West, Direction::South, Direction::North];
    rng.shuffle(&mut order);
    Some(Frame { pos, order, next: 0 })
}
