//! Per-level unlock sequence: kill quota, key, exit door, level completion.
//! This module exists to keep the forward-only stage machine and its side effects on the map
//! in one place. It does not own level regeneration; the engine reacts to `LevelComplete`.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::map::TileMap;
use crate::rng::GameRng;
use crate::types::{LogEvent, Pos, TileKind};

pub const MAX_LEVELS: u8 = 30;

pub fn required_kills(level: u8) -> u32 {
    5 + u32::from(level / 5)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnlockStage {
    Locked,
    KeyAvailable,
    KeyCollected,
    LevelComplete,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionState {
    level: u8,
    regular_kills: u32,
    boss_kills: u32,
    stage: UnlockStage,
}

impl ProgressionState {
    /// Levels are clamped into `1..=MAX_LEVELS`.
    pub fn new(level: u8) -> Self {
        Self {
            level: level.clamp(1, MAX_LEVELS),
            regular_kills: 0,
            boss_kills: 0,
            stage: UnlockStage::Locked,
        }
    }

    pub(crate) fn from_parts(
        level: u8,
        regular_kills: u32,
        boss_kills: u32,
        stage: UnlockStage,
    ) -> Self {
        Self { stage, regular_kills, boss_kills, ..Self::new(level) }
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn regular_kills(&self) -> u32 {
        self.regular_kills
    }

    pub fn boss_kills(&self) -> u32 {
        self.boss_kills
    }

    pub fn boss_killed(&self) -> bool {
        self.boss_kills > 0
    }

    pub fn total_kills(&self) -> u32 {
        self.regular_kills + self.boss_kills
    }

    pub fn stage(&self) -> UnlockStage {
        self.stage
    }

    pub fn has_key(&self) -> bool {
        self.stage >= UnlockStage::KeyAvailable
    }

    pub fn key_collected(&self) -> bool {
        self.stage >= UnlockStage::KeyCollected
    }

    pub fn quota_met(&self) -> bool {
        self.regular_kills >= required_kills(self.level) && self.boss_killed()
    }

    pub fn record_kill(&mut self, boss: bool) {
        if boss {
            self.boss_kills += 1;
        } else {
            self.regular_kills += 1;
        }
    }

    /// Runs one pass of the stage machine: unlock, then pickup, then exit.
    ///
    /// Each transition is level-triggered, so a pass can advance more than one stage when the
    /// player already stands where the next condition holds.
    ///
    /// The key never lands under the player unless no other room cell exists. On a level with
    /// a single room cell the exit has nowhere distant to go and opens underfoot, so the key
    /// pickup and the level completion happen in the same pass.
    pub fn evaluate(&mut self, map: &mut TileMap, player: Pos, rng: &mut GameRng) -> Vec<LogEvent> {
        let mut events = Vec::new();

        if self.stage == UnlockStage::Locked && self.quota_met() {
            let mut rooms = map.room_cells();
            rooms.retain(|&cell| cell != player);
            let key = if rooms.is_empty() {
                warn!("level {}: no room for the key, dropping it at the player", self.level);
                player
            } else {
                rooms[rng.below(rooms.len())]
            };
            map.set_key_position(key);
            self.stage = UnlockStage::KeyAvailable;
            events.push(LogEvent::KeyMaterialized { pos: key });
        }

        if self.stage == UnlockStage::KeyAvailable && map.key_position() == Some(player) {
            map.clear_key_position();
            self.stage = UnlockStage::KeyCollected;
            events.push(LogEvent::KeyCollected);

            let exit = map.place_exit_door_farthest_from(player).unwrap_or_else(|| {
                warn!("level {}: no distant room for the exit, opening it underfoot", self.level);
                map.set_tile(player, TileKind::LevelExitDoor);
                map.set_exit_door_position(Some(player));
                player
            });
            events.push(LogEvent::ExitDoorPlaced { pos: exit });
        }

        if self.stage == UnlockStage::KeyCollected && map.tile_at(player) == TileKind::LevelExitDoor
        {
            self.stage = UnlockStage::LevelComplete;
            events.push(LogEvent::LevelCompleted { level: self.level });
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_room_map() -> TileMap {
        let mut map = TileMap::new(20, 8);
        for y in 2..=4 {
            for x in 2..=4 {
                map.set_tile(Pos { y, x }, TileKind::Room);
            }
            for x in 14..=16 {
                map.set_tile(Pos { y, x }, TileKind::Room);
            }
        }
        for x in 5..=13 {
            map.set_tile(Pos { y: 3, x }, TileKind::Floor);
        }
        map
    }

    #[test]
    fn required_kills_grow_every_five_levels() {
        assert_eq!(required_kills(1), 5);
        assert_eq!(required_kills(4), 5);
        assert_eq!(required_kills(5), 6);
        assert_eq!(required_kills(30), 11);
    }

    #[test]
    fn regular_quota_alone_keeps_the_key_locked_until_the_boss_falls() {
        let mut map = two_room_map();
        let mut rng = GameRng::seeded(8);
        let mut state = ProgressionState::new(1);
        let player = Pos { y: 3, x: 8 };

        for _ in 0..4 {
            state.record_kill(false);
        }
        assert!(state.evaluate(&mut map, player, &mut rng).is_empty());
        state.record_kill(false);
        assert!(state.evaluate(&mut map, player, &mut rng).is_empty());
        assert!(!state.has_key());
        assert_eq!(map.key_position(), None);

        state.record_kill(true);
        let events = state.evaluate(&mut map, player, &mut rng);

        assert!(state.has_key());
        let key = map.key_position().expect("key placed");
        assert_eq!(map.tile_at(key), TileKind::Room);
        assert_eq!(events, vec![LogEvent::KeyMaterialized { pos: key }]);
    }

    #[test]
    fn boss_alone_does_not_unlock() {
        let mut map = two_room_map();
        let mut state = ProgressionState::new(1);
        state.record_kill(true);
        state.evaluate(&mut map, Pos { y: 3, x: 8 }, &mut GameRng::seeded(1));
        assert_eq!(state.stage(), UnlockStage::Locked);
    }

    #[test]
    fn picking_up_the_key_opens_the_exit_in_the_far_room() {
        let mut map = two_room_map();
        let mut rng = GameRng::seeded(3);
        let mut state = ProgressionState::from_parts(1, 5, 1, UnlockStage::KeyAvailable);
        let player = Pos { y: 3, x: 2 };
        map.set_key_position(player);
        assert_eq!(map.exit_door_position(), None);

        let events = state.evaluate(&mut map, player, &mut rng);

        assert!(state.key_collected());
        assert_eq!(map.key_position(), None);
        // Farthest room cell from (y3,x2) is (y2,x16); its west side is room, east is wall.
        let exit = Pos { y: 2, x: 17 };
        assert_eq!(map.exit_door_position(), Some(exit));
        assert_eq!(map.tile_at(exit), TileKind::LevelExitDoor);
        assert_eq!(events, vec![LogEvent::KeyCollected, LogEvent::ExitDoorPlaced { pos: exit }]);
    }

    #[test]
    fn standing_on_the_exit_completes_the_level() {
        let mut map = two_room_map();
        let exit = Pos { y: 2, x: 17 };
        map.set_tile(exit, TileKind::LevelExitDoor);
        let mut state = ProgressionState::from_parts(7, 6, 1, UnlockStage::KeyCollected);

        let events = state.evaluate(&mut map, exit, &mut GameRng::seeded(0));

        assert_eq!(state.stage(), UnlockStage::LevelComplete);
        assert_eq!(events, vec![LogEvent::LevelCompleted { level: 7 }]);
    }

    #[test]
    fn exit_tile_is_ignored_before_the_key_is_collected() {
        let mut map = two_room_map();
        let exit = Pos { y: 2, x: 17 };
        map.set_tile(exit, TileKind::LevelExitDoor);
        let mut state = ProgressionState::from_parts(1, 0, 0, UnlockStage::Locked);

        assert!(state.evaluate(&mut map, exit, &mut GameRng::seeded(0)).is_empty());
        assert_eq!(state.stage(), UnlockStage::Locked);
    }

    #[test]
    fn key_falls_back_to_the_player_cell_without_rooms() {
        let mut map = TileMap::new(6, 6);
        let player = Pos { y: 2, x: 2 };
        map.set_tile(player, TileKind::Floor);
        let mut state = ProgressionState::from_parts(1, 5, 1, UnlockStage::Locked);

        let events = state.evaluate(&mut map, player, &mut GameRng::seeded(0));

        assert_eq!(events.first(), Some(&LogEvent::KeyMaterialized { pos: player }));
        assert!(events.contains(&LogEvent::KeyCollected));
        assert_eq!(map.exit_door_position(), Some(player));
        assert_eq!(state.stage(), UnlockStage::LevelComplete);
    }

    #[test]
    fn key_avoids_the_cell_under_the_player() {
        let player = Pos { y: 2, x: 2 };
        let other = Pos { y: 2, x: 3 };
        for seed in 0..32 {
            let mut map = TileMap::new(6, 6);
            map.set_tile(player, TileKind::Room);
            map.set_tile(other, TileKind::Room);
            let mut state = ProgressionState::from_parts(1, 5, 1, UnlockStage::Locked);

            let events = state.evaluate(&mut map, player, &mut GameRng::seeded(seed));

            assert_eq!(events, vec![LogEvent::KeyMaterialized { pos: other }]);
            assert_eq!(state.stage(), UnlockStage::KeyAvailable);
        }
    }

    #[test]
    fn lone_room_cell_under_the_player_completes_in_one_pass() {
        let mut map = TileMap::new(6, 6);
        let player = Pos { y: 2, x: 2 };
        map.set_tile(player, TileKind::Room);
        let mut state = ProgressionState::from_parts(1, 5, 1, UnlockStage::Locked);

        let events = state.evaluate(&mut map, player, &mut GameRng::seeded(4));

        assert_eq!(events, vec![
            LogEvent::KeyMaterialized { pos: player },
            LogEvent::KeyCollected,
            LogEvent::ExitDoorPlaced { pos: player },
            LogEvent::LevelCompleted { level: 1 },
        ]);
        assert_eq!(map.tile_at(player), TileKind::LevelExitDoor);
    }

    #[test]
    fn levels_are_clamped_into_range() {
        assert_eq!(ProgressionState::new(0).level(), 1);
        assert_eq!(ProgressionState::new(200).level(), MAX_LEVELS);
    }
}
