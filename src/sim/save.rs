/// Progress persistence: one JSON record `{"level": n, "scores": [...]}`.
///
/// `load` never fails: a missing or unreadable record is `None` and the
/// caller resets. `save` reports failures so they can be logged; the game
/// keeps running on its in-memory copy.
///
/// `FileStore` writes `progress.json` next to the executable when that
/// directory is writable, otherwise under `~/.local/share/strokemaze`.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::domain::progress::GameProgress;

pub const SAVE_FILE: &str = "progress.json";

#[derive(Debug)]
pub enum StorageError {
    Read(io::Error),
    Parse(serde_json::Error),
    Write(io::Error),
    Encode(serde_json::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Read(e) => write!(f, "could not read progress: {}", e),
            StorageError::Parse(e) => write!(f, "corrupt progress record: {}", e),
            StorageError::Write(e) => write!(f, "could not write progress: {}", e),
            StorageError::Encode(e) => write!(f, "could not encode progress: {}", e),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Read(e) | StorageError::Write(e) => Some(e),
            StorageError::Parse(e) | StorageError::Encode(e) => Some(e),
        }
    }
}

pub trait ProgressStore {
    fn load(&self) -> Option<GameProgress>;
    fn save(&mut self, progress: &GameProgress) -> Result<(), StorageError>;

    /// Write and return fresh progress (level 0, no scores).
    fn reset(&mut self) -> GameProgress {
        let fresh = GameProgress::default();
        if let Err(e) = self.save(&fresh) {
            log::error!("Progress reset not persisted: {e}");
        }
        fresh
    }
}

// ══════════════════════════════════════════════════════════════
// File-backed store
// ══════════════════════════════════════════════════════════════

pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        FileStore { path }
    }

    /// Store in the default save directory, or `dir_override` if given.
    pub fn in_dir(dir_override: Option<&Path>) -> Self {
        let dir = match dir_override {
            Some(d) => d.to_path_buf(),
            None => save_dir(),
        };
        FileStore::new(dir.join(SAVE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<GameProgress, StorageError> {
        let text = std::fs::read_to_string(&self.path).map_err(StorageError::Read)?;
        serde_json::from_str(&text).map_err(StorageError::Parse)
    }
}

impl ProgressStore for FileStore {
    fn load(&self) -> Option<GameProgress> {
        match self.read() {
            Ok(p) => Some(p),
            Err(StorageError::Read(e)) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                log::warn!("{} ({}), starting fresh", e, self.path.display());
                None
            }
        }
    }

    fn save(&mut self, progress: &GameProgress) -> Result<(), StorageError> {
        let json = serde_json::to_string(progress).map_err(StorageError::Encode)?;
        // Write beside the record, then swap it in.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(StorageError::Write)?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            StorageError::Write(e)
        })
    }
}

/// Directory for the progress record and log file.
pub fn save_dir() -> PathBuf {
    // 1. Exe directory (portable installs)
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            // System installs like /usr/games/ won't be writable
            let test_path = parent.join(".write_test_strokemaze");
            if std::fs::write(&test_path, "").is_ok() {
                let _ = std::fs::remove_file(&test_path);
                return parent.to_path_buf();
            }
        }
    }

    // 2. XDG data home
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/strokemaze");
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    // 3. CWD
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

// ══════════════════════════════════════════════════════════════
// In-memory store
// ══════════════════════════════════════════════════════════════

/// Keeps the serialized record in memory. `fail_writes` simulates a full disk.
#[allow(dead_code)]
#[derive(Default)]
pub struct MemoryStore {
    pub record: Option<String>,
    pub fail_writes: bool,
    pub writes: usize,
}

#[allow(dead_code)]
impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn with_record(json: &str) -> Self {
        MemoryStore {
            record: Some(json.to_string()),
            ..MemoryStore::default()
        }
    }
}

impl ProgressStore for MemoryStore {
    fn load(&self) -> Option<GameProgress> {
        let json = self.record.as_ref()?;
        match serde_json::from_str(json) {
            Ok(p) => Some(p),
            Err(e) => {
                log::warn!("{}, starting fresh", StorageError::Parse(e));
                None
            }
        }
    }

    fn save(&mut self, progress: &GameProgress) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Write(io::Error::new(
                io::ErrorKind::Other,
                "store is read-only",
            )));
        }
        self.record = Some(serde_json::to_string(progress).map_err(StorageError::Encode)?);
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn temp_store(tag: &str) -> FileStore {
        let dir = std::env::temp_dir().join(format!(
            "strokemaze-test-{}-{}",
            tag,
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let store = FileStore::in_dir(Some(&dir));
        let _ = std::fs::remove_file(store.path());
        store
    }

    #[test]
    fn fresh_store_loads_none_then_reset_value() {
        let mut store = MemoryStore::new();
        assert!(store.load().is_none());
        let fresh = store.reset();
        assert_eq!(fresh, GameProgress { level: 0, scores: vec![] });
        assert_eq!(store.load(), Some(fresh));
    }

    #[test]
    fn corrupt_record_loads_none() {
        let store = MemoryStore::with_record("{not json");
        assert!(store.load().is_none());
        let store = MemoryStore::with_record(r#"{"level":-3,"scores":[]}"#);
        assert!(store.load().is_none());
    }

    #[test]
    fn failed_write_is_reported() {
        let mut store = MemoryStore::new();
        store.fail_writes = true;
        let err = store.save(&GameProgress::default()).unwrap_err();
        assert!(matches!(err, StorageError::Write(_)));
        assert!(store.load().is_none());
    }

    #[test]
    fn file_store_round_trip_and_reset() {
        let mut store = temp_store("roundtrip");
        assert!(store.load().is_none());

        let p = GameProgress { level: 4, scores: vec![Some(2), None, Some(0), Some(8)] };
        store.save(&p).unwrap();
        assert_eq!(store.load(), Some(p));

        let fresh = store.reset();
        assert_eq!(store.load(), Some(fresh));
        let _ = std::fs::remove_file(store.path());
    }

    #[test]
    fn failed_rename_leaves_no_temp_file() {
        let mut store = temp_store("rename");
        // A directory in the record's place makes the rename fail.
        std::fs::create_dir_all(store.path()).unwrap();
        let err = store.save(&GameProgress::default()).unwrap_err();
        assert!(matches!(err, StorageError::Write(_)));
        assert!(!store.path().with_extension("json.tmp").exists());
        let _ = std::fs::remove_dir(store.path());
    }

    #[test]
    fn file_store_treats_garbage_as_missing() {
        let store = temp_store("garbage");
        std::fs::write(store.path(), "level=3\nscore=9\n").unwrap();
        assert!(store.load().is_none());
        let _ = std::fs::remove_file(store.path());
    }

    proptest! {
        #[test]
        fn record_round_trips_with_gaps(
            level in 0usize..40,
            scores in proptest::collection::vec(proptest::option::of(0u32..200), 0..40),
        ) {
            let mut store = MemoryStore::new();
            let p = GameProgress { level, scores };
            store.save(&p).unwrap();
            prop_assert_eq!(store.load(), Some(p));
        }
    }
}
