//! Generation orchestration: carve, place rooms, classify doors, and fall back when needed.

use log::warn;

use crate::map::TileMap;
use crate::rng::GameRng;
use crate::types::{Pos, TileKind};

use super::carve::carve_corridors;
use super::doors::classify_doors;
use super::layout::{RoomRect, place_rooms, stamp_room};
use super::model::GeneratedDungeon;

pub const DEFAULT_WIDTH: usize = 40;
pub const DEFAULT_HEIGHT: usize = 30;

const FALLBACK_ROOM_SIDE: usize = 5;

pub struct DungeonGenerator {
    width: usize,
    height: usize,
}

impl DungeonGenerator {
    /// Zero dimensions are replaced by the 40x30 default.
    pub fn new(width: usize, height: usize) -> Self {
        if width == 0 || height == 0 {
            warn!(
                "invalid map dimensions {width}x{height}, using {DEFAULT_WIDTH}x{DEFAULT_HEIGHT}"
            );
            return Self { width: DEFAULT_WIDTH, height: DEFAULT_HEIGHT };
        }
        Self { width, height }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn generate(&self, rng: &mut GameRng) -> GeneratedDungeon {
        let mut map = TileMap::new(self.width, self.height);
        let start = Pos { y: (self.height / 2) as i32, x: (self.width / 2) as i32 };

        let carve_log = carve_corridors(&mut map, start, rng);
        place_rooms(&mut map, rng);
        classify_doors(&mut map);

        if map.first_room_cell().is_none() {
            warn!(
                "generation produced no room on a {}x{} map, using the minimal layout",
                self.width, self.height
            );
            return GeneratedDungeon {
                map: self.minimal_layout(),
                carve_log: Vec::new(),
                used_fallback: true,
            };
        }

        GeneratedDungeon { map, carve_log, used_fallback: false }
    }

    /// One centred room, clipped to the interior; solid rock when there is no interior.
    fn minimal_layout(&self) -> TileMap {
        let mut map = TileMap::new(self.width, self.height);
        let interior_width = self.width.saturating_sub(2);
        let interior_height = self.height.saturating_sub(2);
        if interior_width == 0 || interior_height == 0 {
            return map;
        }

        let width = FALLBACK_ROOM_SIDE.min(interior_width);
        let height = FALLBACK_ROOM_SIDE.min(interior_height);
        let room = RoomRect {
            x: 1 + (interior_width - width) / 2,
            y: 1 + (interior_height - height) / 2,
            width,
            height,
        };
        stamp_room(&mut map, room);
        map.set_tile(room.center(), TileKind::Room);
        map
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, VecDeque};

    use proptest::prelude::*;
    use xxhash_rust::xxh3::xxh3_64;

    use super::*;
    use crate::mapgen::{generate_level, is_well_placed_door};

    #[test]
    fn same_seed_produces_byte_identical_maps() {
        let a = generate_level(40, 30, 123_456);
        let b = generate_level(40, 30, 123_456);
        assert_eq!(a.map.canonical_bytes(), b.map.canonical_bytes());
        assert_eq!(a.carve_log, b.carve_log);
    }

    #[test]
    fn different_seeds_produce_different_maps() {
        let fingerprints: BTreeSet<u64> =
            (0..8).map(|seed| xxh3_64(&generate_level(40, 30, seed).map.canonical_bytes())).collect();
        assert!(fingerprints.len() > 1, "eight seeds collapsed to one layout");
    }

    #[test]
    fn zero_dimensions_fall_back_to_default_size() {
        let generator = DungeonGenerator::new(0, 12);
        assert_eq!((generator.width(), generator.height()), (DEFAULT_WIDTH, DEFAULT_HEIGHT));

        let generated = generate_level(0, 0, 7);
        assert_eq!(generated.map.width(), DEFAULT_WIDTH);
        assert_eq!(generated.map.height(), DEFAULT_HEIGHT);
    }

    #[test]
    fn generated_map_has_rooms_and_corridors() {
        let generated = generate_level(40, 30, 12_345);
        assert!(!generated.used_fallback);
        assert!(generated.map.count_tiles(TileKind::Room) >= 25);
        assert!(generated.map.count_tiles(TileKind::Floor) > 0);
        assert_eq!(generated.map.count_tiles(TileKind::LevelExitDoor), 0);
    }

    #[test]
    fn tiny_maps_fall_back_to_a_minimal_room() {
        let generated = generate_level(6, 6, 3);
        assert!(generated.used_fallback);
        assert!(generated.map.first_room_cell().is_some());
        assert_eq!(generated.map.tile_at(Pos { y: 0, x: 0 }), TileKind::Wall);
    }

    #[test]
    fn maps_without_interior_fall_back_to_solid_rock() {
        let generated = generate_level(2, 1, 3);
        assert!(generated.used_fallback);
        assert_eq!(generated.map.count_tiles(TileKind::Wall), 2);
    }

    #[test]
    fn rooms_are_reachable_from_each_other() {
        for seed in [1_u64, 2, 3, 40, 99, 321, 1_024] {
            let generated = generate_level(40, 30, seed);
            assert!(
                all_passable_connected(&generated.map),
                "seed={seed} produced disconnected passable regions"
            );
        }
    }

    fn all_passable_connected(map: &TileMap) -> bool {
        let passable: Vec<Pos> =
            map.cells_column_major().filter(|&pos| map.tile_at(pos).is_passable()).collect();
        let Some(start) = passable.first().copied() else {
            return true;
        };

        let mut open = VecDeque::from([start]);
        let mut seen = BTreeSet::from([start]);
        while let Some(pos) = open.pop_front() {
            for next in TileMap::neighbors(pos) {
                if map.tile_at(next).is_passable() && seen.insert(next) {
                    open.push_back(next);
                }
            }
        }
        seen.len() == passable.len()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]
        #[test]
        fn doors_sit_between_rooms_and_corridors(seed in any::<u64>()) {
            let generated = generate_level(40, 30, seed);
            let map = &generated.map;
            for pos in map.cells_column_major() {
                if map.tile_at(pos) == TileKind::Door {
                    prop_assert!(is_well_placed_door(map, pos), "door {:?} is not anchored", pos);
                }
            }
        }

        #[test]
        fn carve_log_never_widens_a_corridor(seed in any::<u64>()) {
            let generated = generate_level(40, 30, seed);
            let mut replay = TileMap::new(40, 30);
            for pos in generated.carve_log {
                let floor_neighbours = TileMap::neighbors(pos)
                    .into_iter()
                    .filter(|&n| replay.tile_at(n) == TileKind::Floor)
                    .count();
                prop_assert!(floor_neighbours <= 1);
                replay.set_tile(pos, TileKind::Floor);
            }
        }

        #[test]
        fn doors_only_replace_carved_corridor(seed in any::<u64>()) {
            let generated = generate_level(30, 24, seed);
            let mut before_doors = TileMap::new(30, 24);
            let mut rng = GameRng::seeded(seed);
            let start = Pos { y: 12, x: 15 };
            carve_corridors(&mut before_doors, start, &mut rng);
            place_rooms(&mut before_doors, &mut rng);

            for pos in generated.map.cells_column_major() {
                if generated.map.tile_at(pos) == TileKind::Door {
                    prop_assert_eq!(before_doors.tile_at(pos), TileKind::Floor);
                } else {
                    prop_assert_eq!(generated.map.tile_at(pos), before_doors.tile_at(pos));
                }
            }
        }
    }
}
