//! Rebuilding a run from its intent log.
//! This module exists to drive a fresh `Engine` through a journal and to record accepted
//! intents while playing. It does not own the file format; see `run_log`.

use std::error::Error;
use std::fmt;

use crate::engine::Engine;
use crate::journal::{InputJournal, InputPayload, JOURNAL_FORMAT_VERSION};
use crate::types::{Direction, Millis, RunOutcome};

#[derive(Debug, PartialEq, Eq)]
pub enum ReplayError {
    UnsupportedVersion { found: u16 },
    SequenceGap { expected: u64, found: u64 },
    /// The engine refused a journaled intent, so the log does not describe this build's game.
    RejectedInput { seq: u64 },
    /// A checkpoint list must hold the starting fingerprint plus one per input.
    CheckpointCount { expected: usize, found: usize },
    /// After `applied` inputs the engine no longer hashes to the recorded fingerprint.
    Diverged { applied: u64, expected: u64, found: u64 },
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported journal format version {found}")
            }
            Self::SequenceGap { expected, found } => {
                write!(f, "journal sequence gap: expected {expected}, found {found}")
            }
            Self::RejectedInput { seq } => write!(f, "journal input {seq} was rejected on replay"),
            Self::CheckpointCount { expected, found } => {
                write!(f, "expected {expected} checkpoints, found {found}")
            }
            Self::Diverged { applied, expected, found } => {
                write!(f, "replay diverged after {applied} inputs: ")?;
                write!(f, "recorded {expected:#018x}, got {found:#018x}")
            }
        }
    }
}

impl Error for ReplayError {}

#[derive(Debug, PartialEq, Eq)]
pub struct ReplayResult {
    pub final_outcome: Option<RunOutcome>,
    pub final_snapshot_hash: u64,
    pub final_level: u8,
    pub inputs_applied: u64,
}

/// Feeds one intent to the engine. Clock updates always succeed; `set_time` ignores stale values.
pub fn apply_input(engine: &mut Engine, payload: &InputPayload) -> bool {
    match *payload {
        InputPayload::Clock { now } => {
            engine.set_time(now);
            true
        }
        InputPayload::Move { dx, dy } => engine.apply_move(dx, dy),
        InputPayload::Attack { direction } => engine.apply_attack(direction).is_some(),
    }
}

pub fn replay_engine(journal: &InputJournal) -> Result<Engine, ReplayError> {
    replay_with(journal, |_, _| Ok(()))
}

/// Replays `journal` and compares the engine against `checkpoints` along the way:
/// `checkpoints[0]` is the fresh engine and `checkpoints[n]` follows the `n`th input.
pub fn replay_checked(
    journal: &InputJournal,
    checkpoints: &[u64],
) -> Result<Engine, ReplayError> {
    let expected = journal.inputs.len() + 1;
    if checkpoints.len() != expected {
        return Err(ReplayError::CheckpointCount { expected, found: checkpoints.len() });
    }
    replay_with(journal, |applied, engine| {
        let expected = checkpoints[applied as usize];
        let found = engine.snapshot_hash();
        if found != expected {
            return Err(ReplayError::Diverged { applied, expected, found });
        }
        Ok(())
    })
}

/// Drives a fresh engine through the journal, calling `check` with the number of inputs
/// applied so far: once before the first input and once after each.
fn replay_with(
    journal: &InputJournal,
    mut check: impl FnMut(u64, &Engine) -> Result<(), ReplayError>,
) -> Result<Engine, ReplayError> {
    if journal.format_version != JOURNAL_FORMAT_VERSION {
        return Err(ReplayError::UnsupportedVersion { found: journal.format_version });
    }

    let mut engine = Engine::new(journal.config);
    check(0, &engine)?;
    for (expected, record) in (0u64..).zip(&journal.inputs) {
        if record.seq != expected {
            return Err(ReplayError::SequenceGap { expected, found: record.seq });
        }
        if !apply_input(&mut engine, &record.payload) {
            return Err(ReplayError::RejectedInput { seq: record.seq });
        }
        check(expected + 1, &engine)?;
    }
    Ok(engine)
}

pub fn replay_to_end(journal: &InputJournal) -> Result<ReplayResult, ReplayError> {
    let engine = replay_engine(journal)?;
    Ok(ReplayResult {
        final_outcome: engine.outcome(),
        final_snapshot_hash: engine.snapshot_hash(),
        final_level: engine.level(),
        inputs_applied: journal.inputs.len() as u64,
    })
}

/// An engine paired with the journal of every intent it accepted.
pub struct RecordedRun {
    engine: Engine,
    journal: InputJournal,
}

impl RecordedRun {
    pub fn new(journal: InputJournal) -> Self {
        let engine = Engine::new(journal.config);
        Self { engine, journal: InputJournal { inputs: Vec::new(), ..journal } }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn journal(&self) -> &InputJournal {
        &self.journal
    }

    pub fn into_parts(self) -> (Engine, InputJournal) {
        (self.engine, self.journal)
    }

    /// Applies the intent and journals it only if the engine accepted it.
    pub fn apply(&mut self, payload: InputPayload) -> bool {
        let accepted = apply_input(&mut self.engine, &payload);
        if accepted {
            self.journal.append(payload);
        }
        accepted
    }

    pub fn set_time(&mut self, now: Millis) -> bool {
        self.apply(InputPayload::Clock { now })
    }

    pub fn move_player(&mut self, dx: i32, dy: i32) -> bool {
        self.apply(InputPayload::Move { dx, dy })
    }

    pub fn attack(&mut self, direction: Direction) -> bool {
        self.apply(InputPayload::Attack { direction })
    }
}
