//! Level construction and the transition between levels.
//! This module exists to isolate per-level state installation from the intent handlers.
//! It does not own the unlock rules that decide when a level is complete.

use super::*;

pub(super) struct LevelParts {
    pub(super) rng: GameRng,
    pub(super) map: TileMap,
    pub(super) sim: EntitySim,
    pub(super) start: Pos,
}

impl LevelParts {
    /// Generates the map and spawn layout for `level` from one level-seeded stream.
    pub(super) fn build(config: &EngineConfig, level: u8, now: Millis) -> Self {
        let mut rng = GameRng::seeded(derive_level_seed(config.run_seed, level));
        let generated = DungeonGenerator::new(config.width, config.height).generate(&mut rng);
        let mut map = generated.map;

        let start = map.first_room_cell().unwrap_or_else(|| {
            let center = Pos { y: (map.height() / 2) as i32, x: (map.width() / 2) as i32 };
            warn!("level {level} has no room cell; starting the player at {center:?}");
            center
        });
        map.record_visit(start, now);

        let mut sim = EntitySim::new();
        sim.spawn_enemies(&map, level, start, &mut rng);

        Self { rng, map, sim, start }
    }
}

impl Engine {
    /// Reacts to a completed level: the next level is installed, or the run is won at the cap.
    pub(super) fn complete_level(&mut self) {
        let finished = self.progression.level();
        if finished >= self.config.level_cap() {
            info!("level {finished} cleared; run won");
            self.finish(RunOutcome::Victory);
            return;
        }
        self.install_level(finished + 1);
    }

    fn install_level(&mut self, level: u8) {
        let parts = LevelParts::build(&self.config, level, self.now);
        self.rng = parts.rng;
        self.map = parts.map;
        self.sim = parts.sim;
        self.player_pos = parts.start;
        self.progression = ProgressionState::new(level);
        self.trail = None;
        info!("entering level {level} at {:?}", parts.start);
        self.log.push(LogEvent::LevelStarted { level, start: parts.start });
    }

    pub(super) fn finish(&mut self, outcome: RunOutcome) {
        if self.outcome.is_some() {
            return;
        }
        self.outcome = Some(outcome);
        info!("run finished: {outcome:?} on level {}", self.progression.level());
        self.log.push(LogEvent::RunFinished { outcome });
    }
}
