//! Room placement and room-to-corridor connection.

use log::warn;

use crate::map::TileMap;
use crate::rng::GameRng;
use crate::types::{Pos, TileKind};

use super::grid::nearest_floor;

const BASE_ROOM_COUNT: usize = 5;
const EXTRA_ROOM_ROLL: usize = 5;
const MIN_ROOM_SIDE: usize = 5;
const ROOM_SIDE_ROLL: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct RoomRect {
    pub(super) x: usize,
    pub(super) y: usize,
    pub(super) width: usize,
    pub(super) height: usize,
}

impl RoomRect {
    pub(super) fn center(self) -> Pos {
        Pos { y: (self.y + self.height / 2) as i32, x: (self.x + self.width / 2) as i32 }
    }
}

/// Stamps `5 + rand[0,5)` rooms and links each one to the corridor network as it lands.
/// Rooms may overlap corridors and each other.
pub(super) fn place_rooms(map: &mut TileMap, rng: &mut GameRng) -> Vec<RoomRect> {
    let room_count = BASE_ROOM_COUNT + rng.below(EXTRA_ROOM_ROLL);
    let mut rooms = Vec::with_capacity(room_count);

    for _ in 0..room_count {
        let width = MIN_ROOM_SIDE + rng.below(ROOM_SIDE_ROLL);
        let height = MIN_ROOM_SIDE + rng.below(ROOM_SIDE_ROLL);
        let Some(x_span) = map.width().checked_sub(width + 2).filter(|&span| span > 0) else {
            warn!("skipping {width}x{height} room: map is {} wide", map.width());
            continue;
        };
        let Some(y_span) = map.height().checked_sub(height + 2).filter(|&span| span > 0) else {
            warn!("skipping {width}x{height} room: map is {} tall", map.height());
            continue;
        };
        let x = 1 + rng.below(x_span);
        let y = 1 + rng.below(y_span);
        let room = RoomRect { x, y, width, height };

        stamp_room(map, room);
        connect_room(map, room.center());
        rooms.push(room);
    }

    rooms
}

pub(super) fn stamp_room(map: &mut TileMap, room: RoomRect) {
    for y in room.y..room.y + room.height {
        for x in room.x..room.x + room.width {
            map.set_tile(Pos { y: y as i32, x: x as i32 }, TileKind::Room);
        }
    }
}

/// Walks from `center` to the nearest `Floor` cell one axis at a time (x first), opening any
/// `Wall` on the way. Room cells crossed by the walk are left as they are.
pub(super) fn connect_room(map: &mut TileMap, center: Pos) {
    let Some(target) = nearest_floor(map, center) else {
        return;
    };

    let mut cursor = center;
    while cursor != target {
        if cursor.x != target.x {
            cursor.x += (target.x - cursor.x).signum();
        } else {
            cursor.y += (target.y - cursor.y).signum();
        }
        if map.tile_at(cursor) == TileKind::Wall {
            map.set_tile(cursor, TileKind::Floor);
        }
    }
}
