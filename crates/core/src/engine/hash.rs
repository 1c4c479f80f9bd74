//! Stable state hashing for deterministic verification.
//! This module exists to keep hashing concerns separate from simulation control code.
//! It does not own replay execution or snapshot persistence.

use std::hash::Hasher;

use xxhash_rust::xxh3::Xxh3;

use super::*;
use crate::map::tile_code;

impl Engine {
    /// Hash over every field a snapshot carries. The event log and the cosmetic attack trail
    /// are excluded, so a restored engine hashes like the one it was captured from.
    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_u64(self.config.run_seed);
        hasher.write_u64(self.rng.seed());
        hasher.write_u64(self.rng.draws());
        hasher.write_u64(self.now.0);
        hasher.write_u8(self.progression.level());
        hasher.write_u8(self.progression.stage() as u8);
        hasher.write_u32(self.progression.regular_kills());
        hasher.write_u32(self.progression.boss_kills());
        hasher.write_i32(self.player_pos.x);
        hasher.write_i32(self.player_pos.y);
        hasher.write_u8(self.facing as u8);
        hasher.write_i32(self.health);
        hasher.write_u32(self.gold);
        hasher.write_u32(self.potions);
        hasher.write_u8(match self.outcome {
            None => 0,
            Some(RunOutcome::Victory) => 1,
            Some(RunOutcome::Defeat) => 2,
        });

        hasher.write_u64(self.map.width() as u64);
        hasher.write_u64(self.map.height() as u64);
        for (index, tile) in self.map.tiles.iter().enumerate() {
            hasher.write_u8(tile_code(*tile));
            hasher.write_u8(u8::from(self.map.explored[index]));
            hasher.write_u64(self.map.visit_times[index].map_or(u64::MAX, |at| at.0));
        }
        for (kind, tally) in &self.map.actions {
            hasher.write_u8(*kind as u8);
            hasher.write_u32(tally.count);
            hasher.write_u64(tally.last_at.0);
        }
        write_optional_pos(&mut hasher, self.map.key_position());
        write_optional_pos(&mut hasher, self.map.exit_door_position());

        for (_, enemy) in self.sim.enemies() {
            hasher.write_i32(enemy.pos.x);
            hasher.write_i32(enemy.pos.y);
            hasher.write_i32(enemy.health);
            hasher.write_u8(u8::from(enemy.boss));
        }
        let mut drops: Vec<&TransientDrop> = self.sim.drops().map(|(_, drop)| drop).collect();
        drops.sort_by_key(|drop| (drop.spawned_at, drop.pos, drop_code(drop.kind)));
        for drop in drops {
            let (kind, amount) = drop_code(drop.kind);
            hasher.write_i32(drop.pos.x);
            hasher.write_i32(drop.pos.y);
            hasher.write_u64(drop.spawned_at.0);
            hasher.write_u8(kind);
            hasher.write_u32(amount);
        }
        hasher.finish()
    }
}

// Drop arenas reuse freed slots, so drops are hashed in a content order rather than slot order.
fn drop_code(kind: DropKind) -> (u8, u32) {
    match kind {
        DropKind::Gold { amount } => (0, amount),
        DropKind::HealthPotion => (1, 0),
    }
}

fn write_optional_pos(hasher: &mut Xxh3, pos: Option<Pos>) {
    match pos {
        Some(pos) => {
            hasher.write_u8(1);
            hasher.write_i32(pos.x);
            hasher.write_i32(pos.y);
        }
        None => hasher.write_u8(0),
    }
}
