use std::collections::BTreeMap;

use dungeon_core::entities::Enemy;
use dungeon_core::progression::{ProgressionState, UnlockStage};
use dungeon_core::snapshot::MapSnapshot;
use dungeon_core::{
    Direction, DropKind, Engine, EngineConfig, LogEvent, Pos, RunOutcome, Snapshot, TileKind,
};

const WIDTH: usize = 12;
const HEIGHT: usize = 6;

/// A walled arena whose whole interior is one room.
fn arena_map() -> MapSnapshot {
    let mut tiles = vec![TileKind::Wall; WIDTH * HEIGHT];
    for y in 1..HEIGHT - 1 {
        for x in 1..WIDTH - 1 {
            tiles[y * WIDTH + x] = TileKind::Room;
        }
    }
    MapSnapshot {
        width: WIDTH,
        height: HEIGHT,
        tiles,
        explored: vec![false; WIDTH * HEIGHT],
        visit_times: vec![None; WIDTH * HEIGHT],
        actions: BTreeMap::new(),
        key_position: None,
        exit_door_position: None,
    }
}

/// Level-one arena with the regular quota already met and one weakened boss east of the player.
fn boss_fight(config: EngineConfig) -> Engine {
    let mut snapshot: Snapshot = Engine::new(config).snapshot();
    let mut progression = ProgressionState::new(1);
    for _ in 0..5 {
        progression.record_kill(false);
    }
    snapshot.map = arena_map();
    snapshot.player_pos = Pos { y: 2, x: 2 };
    snapshot.progression = progression;
    snapshot.enemies = vec![Enemy { health: 1, ..Enemy::boss(Pos { y: 2, x: 3 }, 1) }];
    snapshot.drops.clear();
    Engine::restore(snapshot).unwrap()
}

fn step_toward(engine: &mut Engine, target: Pos) {
    let from = engine.player_pos();
    let (dx, dy) = if from.x != target.x {
        ((target.x - from.x).signum(), 0)
    } else {
        (0, (target.y - from.y).signum())
    };
    assert!(engine.apply_move(dx, dy), "blocked moving from {from:?} toward {target:?}");
}

/// Walks through the arena interior, stepping into a border cell only on the final move.
fn walk_to(engine: &mut Engine, target: Pos) {
    let inner = Pos {
        y: target.y.clamp(1, HEIGHT as i32 - 2),
        x: target.x.clamp(1, WIDTH as i32 - 2),
    };
    while engine.player_pos() != inner {
        step_toward(engine, inner);
    }
    if inner != target {
        step_toward(engine, target);
    }
}

fn key_from_log(engine: &Engine) -> Pos {
    engine
        .last_step_events()
        .iter()
        .find_map(|event| match event {
            LogEvent::KeyMaterialized { pos } => Some(*pos),
            _ => None,
        })
        .expect("boss kill materializes the key")
}

fn exit_from_log(engine: &Engine) -> Pos {
    engine
        .last_step_events()
        .iter()
        .find_map(|event| match event {
            LogEvent::ExitDoorPlaced { pos } => Some(*pos),
            _ => None,
        })
        .expect("key pickup places the exit")
}

#[test]
fn boss_kill_key_and_exit_lead_to_the_next_level() {
    let mut engine = boss_fight(EngineConfig::with_seed(90));

    let report = engine.apply_attack(Direction::East).unwrap();
    let hit = report.hit.expect("adjacent boss is hit");
    assert!(hit.killed && hit.boss);
    assert!(report.drops.contains(&(Pos { y: 2, x: 3 }, DropKind::Gold { amount: 50 })));
    assert!(report.drops.contains(&(Pos { y: 2, x: 3 }, DropKind::HealthPotion)));

    let key = key_from_log(&engine);
    assert_eq!(engine.map().tile_at(key), TileKind::Room);
    if engine.progression().stage() == UnlockStage::KeyAvailable {
        assert_eq!(engine.map().key_position(), Some(key));
        walk_to(&mut engine, key);
    }
    assert_eq!(engine.progression().stage(), UnlockStage::KeyCollected);
    assert_eq!(engine.map().key_position(), None);

    let exit = exit_from_log(&engine);
    assert_eq!(engine.map().tile_at(exit), TileKind::LevelExitDoor);
    assert_eq!(engine.map().exit_door_position(), Some(exit));

    let gold = engine.gold();
    let health = engine.health();
    walk_to(&mut engine, exit);

    assert_eq!(engine.level(), 2);
    assert_eq!(engine.outcome(), None);
    assert_eq!(engine.gold(), gold);
    assert_eq!(engine.health(), health);
    assert_eq!(engine.progression().stage(), UnlockStage::Locked);
    assert_eq!(engine.progression().total_kills(), 0);
    assert_eq!(engine.map().exit_door_position(), None);
    assert!(engine.log().contains(&LogEvent::LevelCompleted { level: 1 }));
    assert!(
        engine
            .log()
            .contains(&LogEvent::LevelStarted { level: 2, start: engine.player_pos() })
    );
}

#[test]
fn exit_on_the_last_allowed_level_wins_the_run() {
    let config = EngineConfig { max_levels: 1, ..EngineConfig::with_seed(91) };
    let mut engine = boss_fight(config);

    engine.apply_attack(Direction::East).unwrap();
    let key = key_from_log(&engine);
    if engine.progression().stage() == UnlockStage::KeyAvailable {
        walk_to(&mut engine, key);
    }
    let exit = exit_from_log(&engine);
    walk_to(&mut engine, exit);

    assert_eq!(engine.outcome(), Some(RunOutcome::Victory));
    assert_eq!(engine.level(), 1);
    assert!(engine.log().contains(&LogEvent::RunFinished { outcome: RunOutcome::Victory }));
    assert!(!engine.apply_move(-1, 0));
    assert!(engine.apply_attack(Direction::West).is_none());
}

#[test]
fn regular_kills_without_the_boss_never_unlock() {
    let mut engine = boss_fight(EngineConfig::with_seed(92));
    let mut snapshot = engine.snapshot();
    snapshot.enemies = vec![Enemy { health: 1, ..Enemy::regular(Pos { y: 2, x: 4 }, 1) }];
    engine = Engine::restore(snapshot).unwrap();

    let report = engine.apply_attack(Direction::East).unwrap();

    assert!(report.hit.is_some_and(|hit| hit.killed && !hit.boss));
    assert_eq!(engine.progression().regular_kills(), 6);
    assert!(!engine.progression().has_key());
    assert_eq!(engine.map().key_position(), None);
}

#[test]
fn contact_damage_can_end_the_run() {
    let mut engine = boss_fight(EngineConfig::with_seed(93));
    let mut snapshot = engine.snapshot();
    snapshot.health = 5;
    snapshot.enemies = vec![Enemy::regular(Pos { y: 2, x: 3 }, 1)];
    engine = Engine::restore(snapshot).unwrap();

    // Stepping away leaves the enemy one cell short; it closes in and lands a contact hit.
    assert!(engine.apply_move(0, -1));

    assert_eq!(engine.health(), 0);
    assert_eq!(engine.outcome(), Some(RunOutcome::Defeat));
    assert!(
        engine.last_step_events().contains(&LogEvent::PlayerDamaged { amount: 5, remaining: 0 })
    );
    assert!(!engine.apply_move(0, 1));
}

#[test]
fn key_lost_in_a_restore_is_placed_again_and_can_be_collected() {
    let mut engine = boss_fight(EngineConfig::with_seed(94));
    engine.apply_attack(Direction::East).unwrap();
    assert_eq!(engine.progression().stage(), UnlockStage::KeyAvailable);

    let mut snapshot = engine.snapshot();
    snapshot.map.key_position = Some(Pos { y: -3, x: 9_999 });
    engine = Engine::restore(snapshot).unwrap();
    assert_eq!(engine.progression().stage(), UnlockStage::Locked);
    assert_eq!(engine.map().key_position(), None);

    assert!(engine.apply_move(1, 0));
    let key = key_from_log(&engine);
    assert_eq!(engine.map().key_position(), Some(key));
    walk_to(&mut engine, key);

    assert_eq!(engine.progression().stage(), UnlockStage::KeyCollected);
    assert!(engine.log().contains(&LogEvent::KeyCollected));
}
