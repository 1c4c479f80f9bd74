//! JSON save file holding a snapshot plus the hash it must restore to.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::Engine;
use crate::snapshot::{Snapshot, SnapshotError};

pub const SNAPSHOT_FILE_VERSION: u32 = 1;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFile {
    pub format_version: u32,
    pub snapshot_hash_hex: String,
    pub snapshot: Snapshot,
}

impl SnapshotFile {
    pub fn capture(engine: &Engine) -> Self {
        Self {
            format_version: SNAPSHOT_FILE_VERSION,
            snapshot_hash_hex: format_hash(engine.snapshot_hash()),
            snapshot: engine.snapshot(),
        }
    }

    /// Writes to a sibling temp file and renames it over `path`, so readers never see a
    /// half-written save.
    pub fn write_atomic(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;

        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, path)?;

        Ok(())
    }

    pub fn load(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        let file: Self = serde_json::from_str(&content)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(file)
    }

    /// Restores the engine and checks it against the stored hash.
    pub fn restore(self) -> Result<Engine, SnapshotError> {
        let Some(expected) = parse_hash(&self.snapshot_hash_hex) else {
            return Err(SnapshotError::MalformedHash { text: self.snapshot_hash_hex });
        };
        let engine = Engine::restore(self.snapshot)?;
        let found = engine.snapshot_hash();
        if found != expected {
            return Err(SnapshotError::HashMismatch { expected, found });
        }
        Ok(engine)
    }
}

pub fn format_hash(hash: u64) -> String {
    format!("{hash:#018x}")
}

pub(crate) fn parse_hash(hex: &str) -> Option<u64> {
    u64::from_str_radix(hex.trim_start_matches("0x"), 16).ok()
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::types::Millis;

    fn played_engine() -> Engine {
        let mut engine = Engine::from_seed(2_025);
        engine.set_time(Millis(400));
        engine.apply_move(1, 0);
        engine.apply_move(0, 1);
        engine
    }

    #[test]
    fn atomic_write_then_load_restores_the_same_engine() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("saves").join("run.json");
        let engine = played_engine();

        SnapshotFile::capture(&engine).write_atomic(&path).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());

        let restored = SnapshotFile::load(&path).unwrap().restore().unwrap();
        assert_eq!(restored.snapshot_hash(), engine.snapshot_hash());
        assert_eq!(restored.snapshot(), engine.snapshot());
    }

    #[test]
    fn edited_save_fails_hash_verification() {
        let mut file = SnapshotFile::capture(&played_engine());
        file.snapshot.gold += 1_000;

        let err = file.restore().err().expect("tampered save must not restore");

        assert!(matches!(err, SnapshotError::HashMismatch { .. }));
    }

    #[test]
    fn unreadable_hash_is_rejected_before_restoring() {
        let mut file = SnapshotFile::capture(&played_engine());
        file.snapshot_hash_hex = "zz".to_string();

        let err = file.restore().err().expect("bad hash text must not restore");

        assert_eq!(err, SnapshotError::MalformedHash { text: "zz".to_string() });
    }

    #[test]
    fn hash_hex_round_trips() {
        let hash = 0x0123_4567_89ab_cdef;
        assert_eq!(format_hash(hash), "0x0123456789abcdef");
        assert_eq!(parse_hash(&format_hash(hash)), Some(hash));
        assert_eq!(parse_hash("not hex"), None);
    }

    #[test]
    fn garbage_file_is_invalid_data() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let err = SnapshotFile::load(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
