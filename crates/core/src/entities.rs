//! Enemies and transient drops living on the current level.
//! This module exists to own spawning, the greedy pursuit step, contact damage, and drop
//! lifetimes behind one arena pair. It does not own player health or the kill tally; callers
//! apply the hits and kills it reports.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::map::TileMap;
use crate::rng::GameRng;
use crate::types::{DropId, DropKind, EnemyId, Millis, Pos, TileKind};

pub const PLAYER_START_HEALTH: i32 = 100;
pub const REGULAR_GOLD: u32 = 10;
pub const BOSS_GOLD: u32 = 50;
pub const DROP_LIFETIME_MS: u64 = 30_000;

const SPAWN_ATTEMPTS: usize = 50;
const REGULAR_SPAWN_RADIUS: i32 = 3;
const BOSS_SPAWN_RADIUS: i32 = 2;
const MIN_SPAWN_DISTANCE: i32 = 5;
const PURSUIT_RANGE: i32 = 10;
const REGULAR_CONTACT_DAMAGE: i32 = 5;
const BOSS_CONTACT_DAMAGE: i32 = 15;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enemy {
    pub pos: Pos,
    pub health: i32,
    pub boss: bool,
}

impl Enemy {
    pub fn regular(pos: Pos, level: u8) -> Self {
        Self { pos, health: 50 + 5 * i32::from(level), boss: false }
    }

    pub fn boss(pos: Pos, level: u8) -> Self {
        Self { pos, health: 100 + 10 * i32::from(level), boss: true }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn gold_value(&self) -> u32 {
        if self.boss { BOSS_GOLD } else { REGULAR_GOLD }
    }

    pub fn contact_damage(&self) -> i32 {
        if self.boss { BOSS_CONTACT_DAMAGE } else { REGULAR_CONTACT_DAMAGE }
    }

    /// Returns true when this hit is the one that kills.
    pub(crate) fn take_damage(&mut self, amount: i32) -> bool {
        let was_alive = self.is_alive();
        self.health -= amount;
        was_alive && !self.is_alive()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransientDrop {
    pub pos: Pos,
    pub kind: DropKind,
    pub spawned_at: Millis,
}

impl TransientDrop {
    /// A drop survives exactly `DROP_LIFETIME_MS`; it is gone one tick later.
    pub fn is_expired(&self, now: Millis) -> bool {
        now.since(self.spawned_at) > DROP_LIFETIME_MS
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContactHit {
    pub enemy: EnemyId,
    pub damage: i32,
}

#[derive(Clone, Debug, Default)]
pub struct EntitySim {
    enemies: SlotMap<EnemyId, Enemy>,
    drops: SlotMap<DropId, TransientDrop>,
}

impl EntitySim {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(enemies: Vec<Enemy>, drops: Vec<TransientDrop>) -> Self {
        let mut sim = Self::new();
        for enemy in enemies {
            sim.enemies.insert(enemy);
        }
        for drop in drops {
            sim.drops.insert(drop);
        }
        sim
    }

    pub fn enemies(&self) -> impl Iterator<Item = (EnemyId, &Enemy)> {
        self.enemies.iter()
    }

    pub fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.get(id)
    }

    pub(crate) fn enemy_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.enemies.get_mut(id)
    }

    pub fn living_enemies(&self) -> impl Iterator<Item = (EnemyId, &Enemy)> {
        self.enemies.iter().filter(|(_, enemy)| enemy.is_alive())
    }

    pub fn drops(&self) -> impl Iterator<Item = (DropId, &TransientDrop)> {
        self.drops.iter()
    }

    pub fn insert_enemy(&mut self, enemy: Enemy) -> EnemyId {
        self.enemies.insert(enemy)
    }

    pub fn occupant_at(&self, pos: Pos) -> Option<EnemyId> {
        self.living_enemies().find(|(_, enemy)| enemy.pos == pos).map(|(id, _)| id)
    }

    /// Best-effort spawn of `5 + level` regular enemies and `1 + level / 5` bosses.
    ///
    /// Each enemy anchors on a random room cell and tries up to 50 nearby offsets; an enemy
    /// whose attempts all fail is skipped. Returns how many enemies were placed.
    pub fn spawn_enemies(
        &mut self,
        map: &TileMap,
        level: u8,
        player: Pos,
        rng: &mut GameRng,
    ) -> usize {
        let rooms = map.room_cells();
        if rooms.is_empty() {
            warn!("level {level} has no room cells; no enemies spawned");
            return 0;
        }

        let regular_count = 5 + usize::from(level);
        let boss_count = 1 + usize::from(level / 5);
        let mut placed = 0;

        for _ in 0..regular_count {
            let spawned = self.try_spawn(map, &rooms, player, REGULAR_SPAWN_RADIUS, rng);
            if let Some(pos) = spawned {
                self.enemies.insert(Enemy::regular(pos, level));
                placed += 1;
            }
        }
        for _ in 0..boss_count {
            let spawned = self.try_spawn(map, &rooms, player, BOSS_SPAWN_RADIUS, rng);
            if let Some(pos) = spawned {
                self.enemies.insert(Enemy::boss(pos, level));
                placed += 1;
            }
        }

        let wanted = regular_count + boss_count;
        if placed < wanted {
            warn!("level {level}: spawn attempts exhausted, placed {placed} of {wanted} enemies");
        } else {
            debug!("level {level}: spawned {regular_count} regular enemies and {boss_count} bosses");
        }
        placed
    }

    fn try_spawn(
        &self,
        map: &TileMap,
        rooms: &[Pos],
        player: Pos,
        radius: i32,
        rng: &mut GameRng,
    ) -> Option<Pos> {
        let anchor = rooms[rng.below(rooms.len())];
        let span = (2 * radius + 1) as usize;
        for _ in 0..SPAWN_ATTEMPTS {
            let dx = rng.below(span) as i32 - radius;
            let dy = rng.below(span) as i32 - radius;
            let candidate = anchor.offset(dx, dy);
            if self.is_valid_spawn(map, candidate, player) {
                return Some(candidate);
            }
        }
        None
    }

    fn is_valid_spawn(&self, map: &TileMap, pos: Pos, player: Pos) -> bool {
        map.tile_at(pos) == TileKind::Room
            && pos != player
            && chebyshev(pos, player) >= MIN_SPAWN_DISTANCE
            && self.occupant_at(pos).is_none()
    }

    /// One greedy pursuit step for every living enemy within the 10-tile box around the player,
    /// in arena order. Each enemy that ends orthogonally adjacent to the player hits once.
    pub fn move_enemies(
        &mut self,
        map: &TileMap,
        player: Pos,
        rng: &mut GameRng,
    ) -> Vec<ContactHit> {
        let ids: Vec<EnemyId> = self.living_enemies().map(|(id, _)| id).collect();
        let mut hits = Vec::new();

        for id in ids {
            let pos = self.enemies[id].pos;
            let dx = player.x - pos.x;
            let dy = player.y - pos.y;
            if dx.abs() > PURSUIT_RANGE || dy.abs() > PURSUIT_RANGE {
                continue;
            }

            let horizontal = rng.coin();
            let step = if horizontal && dx != 0 {
                Some(pos.offset(dx.signum(), 0))
            } else if dy != 0 {
                Some(pos.offset(0, dy.signum()))
            } else {
                None
            };
            if let Some(target) = step
                && self.can_enemy_enter(map, target, player)
            {
                self.enemies[id].pos = target;
            }

            let enemy = &self.enemies[id];
            if manhattan(enemy.pos, player) == 1 {
                hits.push(ContactHit { enemy: id, damage: enemy.contact_damage() });
            }
        }

        hits
    }

    /// Enemies stay inside rooms and never stack or step onto the player.
    fn can_enemy_enter(&self, map: &TileMap, pos: Pos, player: Pos) -> bool {
        map.tile_at(pos) == TileKind::Room && pos != player && self.occupant_at(pos).is_none()
    }

    pub fn spawn_drop(&mut self, pos: Pos, kind: DropKind, now: Millis) -> DropId {
        self.drops.insert(TransientDrop { pos, kind, spawned_at: now })
    }

    /// Removes and returns every drop lying on `pos`.
    pub fn collect_drops_at(&mut self, pos: Pos) -> Vec<DropKind> {
        self.remove_drops_where(|drop| drop.pos == pos).into_iter().map(|drop| drop.kind).collect()
    }

    /// Removes and returns every drop older than the lifetime window.
    pub fn expire_drops(&mut self, now: Millis) -> Vec<TransientDrop> {
        self.remove_drops_where(|drop| drop.is_expired(now))
    }

    fn remove_drops_where(
        &mut self,
        mut predicate: impl FnMut(&TransientDrop) -> bool,
    ) -> Vec<TransientDrop> {
        let doomed: Vec<DropId> =
            self.drops.iter().filter(|(_, drop)| predicate(drop)).map(|(id, _)| id).collect();
        doomed.into_iter().filter_map(|id| self.drops.remove(id)).collect()
    }
}

pub(crate) fn chebyshev(a: Pos, b: Pos) -> i32 {
    (a.x - b.x).abs().max((a.y - b.y).abs())
}

pub(crate) fn manhattan(a: Pos, b: Pos) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}
