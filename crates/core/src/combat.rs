//! Fireball resolution along a cardinal ray.
//! This module exists to keep targeting, damage, kill accounting, and reward drops together.
//! It does not own telemetry or the event log; the engine records those from the report.

use crate::entities::{Enemy, EntitySim};
use crate::map::TileMap;
use crate::progression::ProgressionState;
use crate::types::{Direction, DropKind, EnemyId, Millis, Pos};

pub const FIREBALL_RANGE: i32 = 3;
pub const FIREBALL_DAMAGE: i32 = 25;
const POTION_KILL_INTERVAL: u32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FireballHit {
    pub enemy: EnemyId,
    pub pos: Pos,
    pub distance: i32,
    pub damage: i32,
    pub critical: bool,
    pub killed: bool,
    pub boss: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FireballReport {
    /// Cells the ray entered, ending at the struck enemy if any.
    pub path: Vec<Pos>,
    pub hit: Option<FireballHit>,
    pub drops: Vec<(Pos, DropKind)>,
}

/// Damage at `distance` steps from the caster; the last step of the range is a critical hit.
pub fn fireball_damage(distance: i32) -> (i32, bool) {
    if distance == FIREBALL_RANGE {
        (FIREBALL_DAMAGE * 2, true)
    } else {
        (FIREBALL_DAMAGE, false)
    }
}

/// Drops left by a kill. Gold always; a potion for bosses and for every third kill on the level.
pub fn kill_rewards(enemy: &Enemy, kills_this_level: u32) -> Vec<DropKind> {
    let mut rewards = vec![DropKind::Gold { amount: enemy.gold_value() }];
    if enemy.boss || kills_this_level.is_multiple_of(POTION_KILL_INTERVAL) {
        rewards.push(DropKind::HealthPotion);
    }
    rewards
}

/// Walks up to `FIREBALL_RANGE` cells from `from`, stopping at the first wall, the map edge,
/// or the first living enemy, which takes the hit.
pub fn resolve_fireball(
    map: &TileMap,
    sim: &mut EntitySim,
    progression: &mut ProgressionState,
    from: Pos,
    direction: Direction,
    now: Millis,
) -> FireballReport {
    let mut report = FireballReport::default();

    for distance in 1..=FIREBALL_RANGE {
        let target = from.step(direction, distance);
        if !map.tile_at(target).is_passable() {
            break;
        }
        report.path.push(target);

        let Some(enemy_id) = sim.occupant_at(target) else {
            continue;
        };
        let (damage, critical) = fireball_damage(distance);
        let Some(enemy) = sim.enemy_mut(enemy_id) else {
            break;
        };
        let killed = enemy.take_damage(damage);
        let struck = *enemy;

        if killed {
            progression.record_kill(struck.boss);
            for kind in kill_rewards(&struck, progression.total_kills()) {
                sim.spawn_drop(target, kind, now);
                report.drops.push((target, kind));
            }
        }
        report.hit = Some(FireballHit {
            enemy: enemy_id,
            pos: target,
            distance,
            damage,
            critical,
            killed,
            boss: struck.boss,
        });
        break;
    }

    report
}
