//! Persistence slot for the conversation history.
//!
//! The whole turn list is stored as one JSON document under a fixed key. Stores only
//! move bytes; deciding what to do with a corrupt slot is up to the caller.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{StoreError, StoreResult};
use crate::state::ChatTurn;

/// Key of the persisted history slot.
pub const HISTORY_KEY: &str = "paubra-chat-messages";

pub trait HistoryStore: Send {
    /// Returns the persisted turns, or `None` when nothing has been saved.
    fn load(&self) -> StoreResult<Option<Vec<ChatTurn>>>;

    fn save(&self, turns: &[ChatTurn]) -> StoreResult<()>;

    fn clear(&self) -> StoreResult<()>;
}

/// Stores the history as `<dir>/paubra-chat-messages.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", HISTORY_KEY)),
        }
    }

    /// Store under `$PAUBRA_DATA_DIR`, or the platform data dir.
    pub fn in_default_location() -> StoreResult<Self> {
        Ok(Self::new(default_data_dir()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Directory for history and logs.
pub fn default_data_dir() -> StoreResult<PathBuf> {
    if let Some(dir) = std::env::var_os("PAUBRA_DATA_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::data_dir()
        .map(|dir| dir.join("paubra-chat"))
        .ok_or(StoreError::NoDataDir)
}

impl HistoryStore for JsonFileStore {
    fn load(&self) -> StoreResult<Option<Vec<ChatTurn>>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        let turns: Vec<ChatTurn> = serde_json::from_str(&content)?;
        Ok(Some(turns))
    }

    fn save(&self, turns: &[ChatTurn]) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string(turns)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keeps the serialized slot in memory. Used by tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with raw slot contents, which need not be valid JSON.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(raw.into())),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl HistoryStore for MemoryStore {
    fn load(&self) -> StoreResult<Option<Vec<ChatTurn>>> {
        match self.raw() {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn save(&self, turns: &[ChatTurn]) -> StoreResult<()> {
        let raw = serde_json::to_string(turns)?;
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(raw);
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

// Lets a caller keep a handle on the store it injected.
impl<S: HistoryStore + Sync> HistoryStore for std::sync::Arc<S> {
    fn load(&self) -> StoreResult<Option<Vec<ChatTurn>>> {
        (**self).load()
    }

    fn save(&self, turns: &[ChatTurn]) -> StoreResult<()> {
        (**self).save(turns)
    }

    fn clear(&self) -> StoreResult<()> {
        (**self).clear()
    }
}
