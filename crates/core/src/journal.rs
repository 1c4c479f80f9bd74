use crate::config::EngineConfig;
use crate::types::{Direction, Millis};

use serde::{Deserialize, Serialize};

pub const JOURNAL_FORMAT_VERSION: u16 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputJournal {
    pub format_version: u16,
    pub build_id: String,
    pub config: EngineConfig,
    pub inputs: Vec<InputRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    pub seq: u64,
    pub payload: InputPayload,
}

/// One accepted intent. Rejected moves are never journaled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputPayload {
    Clock { now: Millis },
    Move { dx: i32, dy: i32 },
    Attack { direction: Direction },
}

impl InputJournal {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            format_version: JOURNAL_FORMAT_VERSION,
            build_id: "dev".to_string(),
            config,
            inputs: Vec::new(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.config.run_seed
    }

    pub fn next_seq(&self) -> u64 {
        self.inputs.len() as u64
    }

    pub fn append(&mut self, payload: InputPayload) {
        let seq = self.next_seq();
        self.inputs.push(InputRecord { seq, payload });
    }

    pub fn append_clock(&mut self, now: Millis) {
        self.append(InputPayload::Clock { now });
    }

    pub fn append_move(&mut self, dx: i32, dy: i32) {
        self.append(InputPayload::Move { dx, dy });
    }

    pub fn append_attack(&mut self, direction: Direction) {
        self.append(InputPayload::Attack { direction });
    }
}
