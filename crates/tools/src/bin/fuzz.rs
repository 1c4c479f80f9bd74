use std::path::PathBuf;

use anyhow::{Context, Result, ensure};
use clap::Parser;
use dungeon_tools::load_config;
use game_core::run_log::RunRecorder;
use game_core::map::TileMap;
use game_core::mapgen::is_well_placed_door;
use game_core::snapshot_file::format_hash;
use game_core::{
    Direction, Engine, EngineConfig, InputPayload, Millis, Pos, TileKind, apply_input,
};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML engine config; `--seed` overrides its `run_seed`
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short = 'n', long, default_value_t = 5000)]
    steps: u32,
    /// Milliseconds the clock advances between intents
    #[arg(long, default_value_t = 150)]
    tick_ms: u64,
    /// Record every accepted intent and its fingerprint to this JSONL run log
    #[arg(short, long)]
    journal: Option<PathBuf>,
}

fn choose<T: Copy>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p]
}

fn random_intent(rng: &mut ChaCha8Rng) -> InputPayload {
    let direction = choose(rng, &Direction::ALL);
    // Bias toward movement so runs actually explore.
    if rng.next_u64() % 4 == 0 {
        InputPayload::Attack { direction }
    } else {
        let (dx, dy) = direction.delta();
        InputPayload::Move { dx, dy }
    }
}

/// The engine under test, optionally recording each accepted intent.
enum Session {
    Bare(Engine),
    Recorded(RunRecorder),
}

impl Session {
    fn engine(&self) -> &Engine {
        match self {
            Self::Bare(engine) => engine,
            Self::Recorded(recorder) => recorder.engine(),
        }
    }

    fn apply(&mut self, payload: InputPayload) -> Result<bool> {
        match self {
            Self::Bare(engine) => Ok(apply_input(engine, &payload)),
            Self::Recorded(recorder) => {
                recorder.apply(payload).context("Failed to append to run log")
            }
        }
    }
}

fn check_invariants(engine: &Engine) -> Result<()> {
    let map = engine.map();
    ensure!(
        map.tile_at(engine.player_pos()).is_passable(),
        "Invariant failed: player inside wall at {:?}",
        engine.player_pos()
    );
    ensure!((0..=100).contains(&engine.health()), "Invariant failed: health {}", engine.health());
    ensure!((1..=30).contains(&engine.level()), "Invariant failed: level {}", engine.level());
    for (_, enemy) in engine.entities().living_enemies() {
        ensure!(
            matches!(map.tile_at(enemy.pos), TileKind::Room | TileKind::LevelExitDoor),
            "Invariant failed: enemy outside a room at {:?}",
            enemy.pos
        );
    }
    let progression = engine.progression();
    ensure!(
        !progression.has_key() || progression.quota_met(),
        "Invariant failed: key available before the kill quota"
    );
    ensure!(
        map.exit_door_position().is_none() || progression.key_collected(),
        "Invariant failed: exit placed before the key was collected"
    );
    check_doors(map)
}

fn check_doors(map: &TileMap) -> Result<()> {
    for y in 0..map.height() as i32 {
        for x in 0..map.width() as i32 {
            let pos = Pos { y, x };
            if map.tile_at(pos) != TileKind::Door {
                continue;
            }
            ensure!(
                is_well_placed_door(map, pos),
                "Invariant failed: door at {pos:?} does not join a room to a corridor"
            );
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("Starting fuzz harness on seed {} for max {} steps...", args.seed, args.steps);
    let config = match &args.config {
        Some(path) => EngineConfig { run_seed: args.seed, ..load_config(path)? },
        None => EngineConfig::with_seed(args.seed),
    };
    let mut session = match &args.journal {
        Some(path) => Session::Recorded(
            RunRecorder::create(path, config, "fuzz")
                .with_context(|| format!("Failed to create run log: {}", path.display()))?,
        ),
        None => Session::Bare(Engine::new(config)),
    };
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);

    check_invariants(session.engine())?;
    let mut accepted = 0u32;
    for step in 1..=args.steps {
        if let Some(outcome) = session.engine().outcome() {
            println!("Finished with outcome {outcome:?} after {} steps", step - 1);
            break;
        }

        let clock = InputPayload::Clock { now: Millis(u64::from(step) * args.tick_ms) };
        let intent = random_intent(&mut rng);
        for payload in [clock, intent] {
            if session.apply(payload)? {
                accepted += 1;
            }
        }

        check_invariants(session.engine()).with_context(|| format!("after step {step}"))?;
    }

    let engine = session.engine();
    println!(
        "Fuzzing completed: level {}, health {}, gold {}, {accepted} inputs accepted.",
        engine.level(),
        engine.health(),
        engine.gold()
    );
    println!("Snapshot hash: {}", format_hash(engine.snapshot_hash()));
    Ok(())
}
