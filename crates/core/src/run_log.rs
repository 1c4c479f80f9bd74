//! Append-only JSONL run log: every accepted intent next to the fingerprint it produced.
//!
//! Line 1 is a header holding the config and the fingerprint of the fresh engine. Each later
//! line is a checkpoint: the intent, the engine's `snapshot_hash` right after it, and a
//! SHA-256 link over the previous link and this checkpoint. The first link is the digest of the
//! header line itself, so editing the config breaks the chain as well.
//!
//! Loading checks the links. `RunLog::verify` then replays the intents and stops at the first
//! checkpoint whose fingerprint this build no longer reproduces.

use std::error::Error;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::journal::{InputJournal, InputPayload, JOURNAL_FORMAT_VERSION};
use crate::replay::{ReplayError, apply_input, replay_checked};
use crate::snapshot_file::{format_hash, parse_hash};

#[derive(Serialize, Deserialize)]
struct Header {
    format_version: u16,
    build_id: String,
    config: EngineConfig,
    start_fingerprint: String,
}

#[derive(Serialize, Deserialize)]
struct Checkpoint {
    seq: u64,
    payload: InputPayload,
    fingerprint: String,
    link: String,
}

fn header_link(header_line: &str) -> String {
    format!("{:064x}", Sha256::digest(header_line.as_bytes()))
}

fn next_link(prev: &str, seq: u64, payload: &InputPayload, fingerprint: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prev.as_bytes());
    hasher.update(seq.to_le_bytes());
    match *payload {
        InputPayload::Clock { now } => {
            hasher.update([0u8]);
            hasher.update(now.0.to_le_bytes());
        }
        InputPayload::Move { dx, dy } => {
            hasher.update([1u8]);
            hasher.update(dx.to_le_bytes());
            hasher.update(dy.to_le_bytes());
        }
        InputPayload::Attack { direction } => hasher.update([2u8, direction as u8]),
    }
    hasher.update(fingerprint.to_le_bytes());
    format!("{:064x}", hasher.finalize())
}

/// An engine whose accepted intents are written to a run log as they happen.
pub struct RunRecorder {
    engine: Engine,
    out: BufWriter<File>,
    link: String,
    next_seq: u64,
}

impl RunRecorder {
    /// Starts a fresh engine for `config` and writes the header line.
    pub fn create(path: &Path, config: EngineConfig, build_id: &str) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let engine = Engine::new(config);
        let header = Header {
            format_version: JOURNAL_FORMAT_VERSION,
            build_id: build_id.to_string(),
            config,
            start_fingerprint: format_hash(engine.snapshot_hash()),
        };
        let line = serde_json::to_string(&header).map_err(io::Error::other)?;
        let mut out = BufWriter::new(File::create(path)?);
        writeln!(out, "{line}")?;
        out.flush()?;

        Ok(Self { engine, out, link: header_link(&line), next_seq: 0 })
    }

    /// Replays an existing log, checking every fingerprint, and reopens it for appending.
    pub fn resume(path: &Path) -> Result<Self, RunLogError> {
        let log = load_run_log(path)?;
        let engine = log.verify()?;
        let file = OpenOptions::new().append(true).open(path).map_err(RunLogError::Io)?;
        debug!("resuming run log {} at seq {}", path.display(), log.journal.next_seq());

        Ok(Self {
            engine,
            out: BufWriter::new(file),
            next_seq: log.journal.next_seq(),
            link: log.last_link,
        })
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn into_engine(self) -> Engine {
        self.engine
    }

    /// Feeds the intent to the engine. An accepted intent is written and flushed together with
    /// the fingerprint it produced; a rejected one leaves the log untouched.
    pub fn apply(&mut self, payload: InputPayload) -> io::Result<bool> {
        if !apply_input(&mut self.engine, &payload) {
            return Ok(false);
        }

        let fingerprint = self.engine.snapshot_hash();
        let checkpoint = Checkpoint {
            seq: self.next_seq,
            payload,
            fingerprint: format_hash(fingerprint),
            link: next_link(&self.link, self.next_seq, &payload, fingerprint),
        };
        let line = serde_json::to_string(&checkpoint).map_err(io::Error::other)?;
        writeln!(self.out, "{line}")?;
        self.out.flush()?;

        self.link = checkpoint.link;
        self.next_seq += 1;
        Ok(true)
    }
}

/// A run log whose links have been checked but whose fingerprints have not been replayed.
#[derive(Debug)]
pub struct RunLog {
    pub journal: InputJournal,
    /// The fresh engine's fingerprint followed by one per input.
    pub fingerprints: Vec<u64>,
    last_link: String,
}

impl RunLog {
    /// Replays the intents on a fresh engine and checks every recorded fingerprint.
    pub fn verify(&self) -> Result<Engine, ReplayError> {
        replay_checked(&self.journal, &self.fingerprints)
    }

    pub fn final_fingerprint(&self) -> Option<u64> {
        self.fingerprints.last().copied()
    }
}

#[derive(Debug)]
pub enum RunLogError {
    Io(io::Error),
    EmptyFile,
    InvalidHeader { message: String },
    InvalidCheckpoint { line: usize, message: String },
    /// The line has no trailing newline, as after a crash mid-write.
    Truncated { line: usize },
    BrokenLink { line: usize },
    Replay(ReplayError),
}

impl fmt::Display for RunLogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "run log I/O error: {e}"),
            Self::EmptyFile => write!(f, "run log is empty"),
            Self::InvalidHeader { message } => write!(f, "invalid run log header: {message}"),
            Self::InvalidCheckpoint { line, message } => {
                write!(f, "invalid checkpoint at line {line}: {message}")
            }
            Self::Truncated { line } => write!(f, "run log line {line} is truncated"),
            Self::BrokenLink { line } => write!(f, "checkpoint link broken at line {line}"),
            Self::Replay(e) => write!(f, "run log does not replay: {e}"),
        }
    }
}

impl Error for RunLogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Replay(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ReplayError> for RunLogError {
    fn from(e: ReplayError) -> Self {
        Self::Replay(e)
    }
}

/// Reads a run log and checks its header and every link.
pub fn load_run_log(path: &Path) -> Result<RunLog, RunLogError> {
    let content = fs::read_to_string(path).map_err(RunLogError::Io)?;
    let mut lines = content.split_inclusive('\n');

    let first = lines.next().ok_or(RunLogError::EmptyFile)?;
    let header_line = first.strip_suffix('\n').ok_or(RunLogError::Truncated { line: 1 })?;
    let header: Header = serde_json::from_str(header_line)
        .map_err(|e| RunLogError::InvalidHeader { message: e.to_string() })?;
    if header.format_version != JOURNAL_FORMAT_VERSION {
        let message = format!("unsupported format version {}", header.format_version);
        return Err(RunLogError::InvalidHeader { message });
    }
    let Some(start) = parse_hash(&header.start_fingerprint) else {
        let text = header.start_fingerprint;
        let message = format!("start fingerprint {text:?} is not hexadecimal");
        return Err(RunLogError::InvalidHeader { message });
    };

    let mut journal = InputJournal::new(header.config);
    journal.build_id = header.build_id;
    let mut fingerprints = vec![start];
    let mut link = header_link(header_line);

    for (line, raw) in (2..).zip(lines) {
        let text = raw.strip_suffix('\n').ok_or(RunLogError::Truncated { line })?;
        let checkpoint: Checkpoint = serde_json::from_str(text)
            .map_err(|e| RunLogError::InvalidCheckpoint { line, message: e.to_string() })?;

        let expected_seq = journal.next_seq();
        if checkpoint.seq != expected_seq {
            let message = format!("expected seq {expected_seq}, found {}", checkpoint.seq);
            return Err(RunLogError::InvalidCheckpoint { line, message });
        }
        let fingerprint = parse_hash(&checkpoint.fingerprint).ok_or_else(|| {
            let message = format!("fingerprint {:?} is not hexadecimal", checkpoint.fingerprint);
            RunLogError::InvalidCheckpoint { line, message }
        })?;
        if next_link(&link, checkpoint.seq, &checkpoint.payload, fingerprint) != checkpoint.link {
            return Err(RunLogError::BrokenLink { line });
        }

        journal.append(checkpoint.payload);
        fingerprints.push(fingerprint);
        link = checkpoint.link;
    }

    debug!("loaded run log {} with {} inputs", path.display(), journal.inputs.len());
    Ok(RunLog { journal, fingerprints, last_link: link })
}
