//! Narrative lines derived from map telemetry and the events of the last step.

use crate::map::TileMap;
use crate::types::{ActionKind, LogEvent, Millis, Pos, TileKind};

const ROOM_DWELL_MS: u64 = 5_000;
const IDLE_MS: u64 = 10_000;
const KILL_THRESHOLD: u32 = 10;
const DAMAGE_THRESHOLD: u32 = 5;
const FIREBALL_THRESHOLD: u32 = 10;

/// Recomputed from scratch on every call; nothing is remembered between calls.
pub fn fragments(
    map: &TileMap,
    player: Pos,
    now: Millis,
    recent_events: &[LogEvent],
) -> Vec<String> {
    let mut lines = Vec::new();
    let tile = map.tile_at(player);

    if tile == TileKind::Room
        && map.visit_time(player).is_some_and(|visited| now.since(visited) > ROOM_DWELL_MS)
    {
        lines.push("The walls of this room have grown used to you.".to_string());
    }
    if tile == TileKind::Door {
        lines.push("Old hinges groan somewhere in the doorway.".to_string());
    }

    if map.action_count(ActionKind::Kill) > KILL_THRESHOLD {
        lines.push("The corridors fall quiet wherever you walk.".to_string());
    }
    if map.action_count(ActionKind::Damage) > DAMAGE_THRESHOLD {
        lines.push("Every wound reminds you the dungeon bites back.".to_string());
    }
    if map.action_count(ActionKind::Fireball) > FIREBALL_THRESHOLD {
        lines.push("Soot streaks the stone where your fire has passed.".to_string());
    }

    if map.last_action_time().is_some_and(|last| now.since(last) > IDLE_MS) {
        lines.push("Something in the dark is waiting for you to move.".to_string());
    }

    for event in recent_events {
        match event {
            LogEvent::EnemyKilled { boss: true, .. } => {
                lines.push("The champion of this level crumbles into embers.".to_string());
            }
            LogEvent::EnemyKilled { boss: false, .. } => {
                lines.push("Your fire leaves only ash behind.".to_string());
            }
            LogEvent::KeyMaterialized { .. } => {
                lines.push("A key glints into being somewhere nearby.".to_string());
            }
            _ => {}
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EnemyId;

    fn room_map() -> (TileMap, Pos) {
        let mut map = TileMap::new(8, 8);
        let pos = Pos { y: 3, x: 3 };
        map.set_tile(pos, TileKind::Room);
        map.set_tile(Pos { y: 3, x: 4 }, TileKind::Door);
        (map, pos)
    }

    #[test]
    fn fresh_map_tells_nothing() {
        let (map, pos) = room_map();
        assert!(fragments(&map, pos, Millis(50_000), &[]).is_empty());
    }

    #[test]
    fn dwelling_in_a_room_needs_more_than_five_seconds() {
        let (mut map, pos) = room_map();
        map.record_visit(pos, Millis(1_000));

        assert!(fragments(&map, pos, Millis(6_000), &[]).is_empty());
        assert_eq!(fragments(&map, pos, Millis(6_001), &[]).len(), 1);
    }

    #[test]
    fn standing_in_a_doorway_is_noticed() {
        let (map, _) = room_map();
        assert_eq!(fragments(&map, Pos { y: 3, x: 4 }, Millis(0), &[]).len(), 1);
    }

    #[test]
    fn action_counters_unlock_lines_past_their_thresholds() {
        let (mut map, _) = room_map();
        let corridor = Pos { y: 1, x: 1 };
        for _ in 0..10 {
            map.record_action(ActionKind::Kill, Millis(0));
            map.record_action(ActionKind::Fireball, Millis(0));
        }
        assert!(fragments(&map, corridor, Millis(0), &[]).is_empty());

        map.record_action(ActionKind::Kill, Millis(0));
        for _ in 0..6 {
            map.record_action(ActionKind::Damage, Millis(0));
        }
        assert_eq!(fragments(&map, corridor, Millis(0), &[]).len(), 2);
    }

    #[test]
    fn idle_line_appears_after_ten_seconds_without_action() {
        let (mut map, _) = room_map();
        let corridor = Pos { y: 1, x: 1 };
        map.record_action(ActionKind::Move, Millis(2_000));

        assert!(fragments(&map, corridor, Millis(12_000), &[]).is_empty());
        assert_eq!(fragments(&map, corridor, Millis(12_001), &[]).len(), 1);
    }

    #[test]
    fn recent_kills_and_keys_add_lines() {
        let (map, _) = room_map();
        let enemy = EnemyId::default();
        let events = [
            LogEvent::EnemyKilled { enemy, boss: true, pos: Pos { y: 2, x: 2 } },
            LogEvent::EnemyKilled { enemy, boss: false, pos: Pos { y: 2, x: 2 } },
            LogEvent::KeyMaterialized { pos: Pos { y: 3, x: 3 } },
            LogEvent::KeyCollected,
        ];

        assert_eq!(fragments(&map, Pos { y: 1, x: 1 }, Millis(0), &events).len(), 3);
    }
}
