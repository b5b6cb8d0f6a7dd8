//! Scan state persistence — JSON file on disk, or memory for tests and embedding.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;

use crate::state::ScanState;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("scan state I/O at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("scan state at {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("serialize scan state: {0}")]
    Serialize(String),
}

/// Whole-state load/save/clear. `load(save(s)) == s` must hold exactly.
pub trait ScanStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<ScanState>, StoreError>;

    fn save(&self, state: &ScanState) -> Result<(), StoreError>;

    /// Forget the saved state. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), StoreError>;
}

/// Pretty-printed JSON file, replaced atomically on every save.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ScanStore for JsonFileStore {
    fn load(&self) -> Result<Option<ScanState>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_err(e)),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                path: self.path.clone(),
                reason: e.to_string(),
            })
    }

    fn save(&self, state: &ScanState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        let json =
            serde_json::to_string_pretty(state).map_err(|e| StoreError::Serialize(e.to_string()))?;

        // Write then rename so a crash mid-write never leaves a truncated file.
        let tmp = self.tmp_path();
        std::fs::write(&tmp, json).map_err(|e| self.io_err(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_err(e))
    }

    fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_err(e)),
        }
    }
}

/// In-memory store. Saves a clone; loads hand back a clone.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<ScanState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: ScanState) -> Self {
        Self {
            slot: Mutex::new(Some(state)),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<ScanState>> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ScanStore for MemoryStore {
    fn load(&self) -> Result<Option<ScanState>, StoreError> {
        Ok(self.slot().clone())
    }

    fn save(&self, state: &ScanState) -> Result<(), StoreError> {
        *self.slot() = Some(state.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::fixtures::hit;

    fn sample_state() -> ScanState {
        let mut state = ScanState::new();
        state.high_prob.push(hit("NVDA"));
        state.scanned_symbols.extend(["NVDA".to_string(), "AAPL".to_string()]);
        state.failed_count = 1;
        state
    }

    #[test]
    fn file_roundtrip_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("scan_state.json"));
        let state = sample_state();

        store.save(&state).unwrap();
        assert_eq!(store.load().unwrap(), Some(state));
        assert!(!store.tmp_path().exists());
    }

    #[test]
    fn missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("absent.json"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan_state.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = JsonFileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn clear_removes_file_and_tolerates_absence() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("scan_state.json"));
        store.save(&ScanState::new()).unwrap();
        store.clear().unwrap();
        assert!(!store.path().exists());
        store.clear().unwrap();
    }

    #[test]
    fn save_overwrites_previous_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("scan_state.json"));
        store.save(&sample_state()).unwrap();
        store.save(&ScanState::new()).unwrap();
        assert_eq!(store.load().unwrap(), Some(ScanState::new()));
    }

    #[test]
    fn memory_store_roundtrip_and_clear() {
        let store = MemoryStore::new();
        assert_eq!(store.load().unwrap(), None);
        store.save(&sample_state()).unwrap();
        assert_eq!(store.load().unwrap(), Some(sample_state()));
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}
