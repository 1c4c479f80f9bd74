//! The turn-based facade a shell drives: two intents in, read-only queries out.
//! This module exists to sequence movement, combat, enemy turns, and progression in one
//! synchronous step. It does not own file formats or wall-clock time; callers push `Millis`.

use log::{info, warn};

use crate::combat::{FireballReport, resolve_fireball};
use crate::config::EngineConfig;
use crate::entities::{Enemy, EntitySim, PLAYER_START_HEALTH, TransientDrop};
use crate::map::TileMap;
use crate::mapgen::{DungeonGenerator, derive_level_seed};
use crate::progression::{ProgressionState, UnlockStage};
use crate::render::{AttackTrail, Placed, Renderable};
use crate::rng::GameRng;
use crate::story;
use crate::types::*;

mod hash;
mod intent;
mod level;
mod persist;


pub struct Engine {
    config: EngineConfig,
    rng: GameRng,
    map: TileMap,
    sim: EntitySim,
    progression: ProgressionState,
    player_pos: Pos,
    facing: Direction,
    health: i32,
    gold: u32,
    potions: u32,
    now: Millis,
    outcome: Option<RunOutcome>,
    log: Vec<LogEvent>,
    // Index into `log` where the events of the most recent step begin.
    step_start: usize,
    trail: Option<AttackTrail>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let level = level::LevelParts::build(&config, 1, Millis(0));
        let mut engine = Self {
            config,
            rng: level.rng,
            map: level.map,
            sim: level.sim,
            progression: ProgressionState::new(1),
            player_pos: level.start,
            facing: Direction::East,
            health: PLAYER_START_HEALTH,
            gold: 0,
            potions: 0,
            now: Millis(0),
            outcome: None,
            log: Vec::new(),
            step_start: 0,
            trail: None,
        };
        engine.log.push(LogEvent::LevelStarted { level: 1, start: engine.player_pos });
        engine
    }

    pub fn from_seed(seed: u64) -> Self {
        Self::new(EngineConfig::with_seed(seed))
    }

    /// Advances the engine clock and drops anything past its lifetime. Earlier times are ignored.
    pub fn set_time(&mut self, now: Millis) {
        if now <= self.now {
            return;
        }
        self.now = now;
        for drop in self.sim.expire_drops(now) {
            self.log.push(LogEvent::DropExpired { kind: drop.kind, pos: drop.pos });
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    pub fn map(&self) -> &TileMap {
        &self.map
    }

    pub fn level(&self) -> u8 {
        self.progression.level()
    }

    pub fn player_pos(&self) -> Pos {
        self.player_pos
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn gold(&self) -> u32 {
        self.gold
    }

    pub fn potions(&self) -> u32 {
        self.potions
    }

    pub fn progression(&self) -> &ProgressionState {
        &self.progression
    }

    pub fn entities(&self) -> &EntitySim {
        &self.sim
    }

    pub fn enemies(&self) -> impl Iterator<Item = (EnemyId, &Enemy)> {
        self.sim.enemies()
    }

    pub fn drops(&self) -> impl Iterator<Item = (DropId, &TransientDrop)> {
        self.sim.drops()
    }

    pub fn outcome(&self) -> Option<RunOutcome> {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn log(&self) -> &[LogEvent] {
        &self.log
    }

    /// Events produced by the most recent intent.
    pub fn last_step_events(&self) -> &[LogEvent] {
        &self.log[self.step_start..]
    }

    pub fn story(&self) -> Vec<String> {
        story::fragments(&self.map, self.player_pos, self.now, self.last_step_events())
    }

    /// Living enemies first, then drops, each in arena order.
    pub fn renderables(&self) -> Vec<Placed> {
        let enemies = self.sim.living_enemies().map(|(_, enemy)| Placed {
            pos: enemy.pos,
            renderable: Renderable::Enemy { boss: enemy.boss },
        });
        let drops = self
            .sim
            .drops()
            .map(|(_, drop)| Placed { pos: drop.pos, renderable: Renderable::from(drop.kind) });
        enemies.chain(drops).collect()
    }

    pub fn attack_trail(&self, now: Millis) -> &[Pos] {
        self.trail.as_ref().map_or(&[], |trail| trail.visible_cells(now))
    }
}
