//! The two player intents and the shared tail of every step.
//! This module exists to keep the step order in one place: a move lets enemies answer before
//! progression is re-evaluated, while a fireball only re-evaluates progression.
//! It does not own level installation or persistence.

use super::*;

impl Engine {
    /// Attempts one cardinal step. Returns whether the move was accepted.
    pub fn apply_move(&mut self, dx: i32, dy: i32) -> bool {
        if self.is_finished() {
            return false;
        }
        let Some(direction) = Direction::from_delta(dx, dy) else {
            return false;
        };
        let target = self.player_pos.step(direction, 1);
        if !self.map.tile_at(target).is_passable() || self.sim.occupant_at(target).is_some() {
            return false;
        }

        self.begin_step();
        self.player_pos = target;
        self.facing = direction;
        self.map.record_visit(target, self.now);
        self.map.record_action(ActionKind::Move, self.now);
        self.log.push(LogEvent::PlayerMoved { to: target });

        self.collect_drops();
        self.finish_step();
        true
    }

    /// Casts a fireball. Returns `None` without side effects once the run is over.
    ///
    /// Enemies hold still for an attack; only a move gives them a turn.
    pub fn apply_attack(&mut self, direction: Direction) -> Option<FireballReport> {
        if self.is_finished() {
            return None;
        }

        self.begin_step();
        let report = resolve_fireball(
            &self.map,
            &mut self.sim,
            &mut self.progression,
            self.player_pos,
            direction,
            self.now,
        );

        if let Some(hit) = report.hit {
            self.map.record_action(ActionKind::Fireball, self.now);
            self.log.push(LogEvent::EnemyHit {
                enemy: hit.enemy,
                damage: hit.damage,
                critical: hit.critical,
            });
            if hit.killed {
                self.map.record_action(ActionKind::Kill, self.now);
                let killed = LogEvent::EnemyKilled { enemy: hit.enemy, boss: hit.boss, pos: hit.pos };
                self.log.push(killed);
            }
        }
        for &(pos, kind) in &report.drops {
            self.log.push(LogEvent::DropSpawned { kind, pos });
        }
        self.trail = Some(AttackTrail::new(report.path.clone(), self.now));

        self.evaluate_progression();
        Some(report)
    }

    fn begin_step(&mut self) {
        self.step_start = self.log.len();
    }

    fn finish_step(&mut self) {
        self.advance_enemies();
        self.evaluate_progression();
    }

    fn collect_drops(&mut self) {
        for kind in self.sim.collect_drops_at(self.player_pos) {
            match kind {
                DropKind::Gold { amount } => self.gold = self.gold.saturating_add(amount),
                DropKind::HealthPotion => self.potions += 1,
            }
            self.log.push(LogEvent::DropCollected { kind });
        }
    }

    fn advance_enemies(&mut self) {
        let hits = self.sim.move_enemies(&self.map, self.player_pos, &mut self.rng);
        for hit in hits {
            if self.is_finished() {
                break;
            }
            self.health = (self.health - hit.damage).max(0);
            self.map.record_action(ActionKind::Damage, self.now);
            self.log.push(LogEvent::PlayerDamaged { amount: hit.damage, remaining: self.health });
            if self.health == 0 {
                self.finish(RunOutcome::Defeat);
            }
        }
    }

    fn evaluate_progression(&mut self) {
        if self.is_finished() {
            return;
        }
        let events = self.progression.evaluate(&mut self.map, self.player_pos, &mut self.rng);
        self.log.extend(events);
        if self.progression.stage() == UnlockStage::LevelComplete {
            self.complete_level();
        }
    }
}
