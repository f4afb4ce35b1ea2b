//! Progress persistence collaborator.
//!
//! Bin counters are saved under a file (session) identifier and restored
//! once at session start. Every failure is logged and non-fatal: a failed
//! restore leaves the bins at zero, a failed periodic save retries on the
//! next cadence.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::bins::{BinFillRecord, BinRoster};

#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    #[error("progress i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("progress record malformed: {0}")]
    Format(#[from] serde_json::Error),
}

/// Saved counters for one session file: bin label → four fills.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub bins: BTreeMap<String, BinFillRecord>,
}

impl ProgressRecord {
    pub fn capture(roster: &BinRoster) -> Self {
        let bins = roster
            .iter()
            .map(|bin| (bin.label(), bin.metrics.snapshot()))
            .collect();
        Self { bins }
    }

    /// Apply saved counters onto the roster, matching bins by label.
    /// Unknown labels are ignored; missing labels keep their current state.
    pub fn apply(&self, roster: &mut BinRoster) {
        for bin in roster.iter_mut() {
            if let Some(record) = self.bins.get(&bin.label()) {
                bin.metrics.restore(record);
            }
        }
    }
}

/// Storage seam for progress records. The core never assumes a concrete
/// backend; the rendering shell picks one at session construction.
pub trait ProgressStore {
    fn load(&self, file_id: &str) -> Result<Option<ProgressRecord>, ProgressError>;
    fn save(&mut self, file_id: &str, record: &ProgressRecord) -> Result<(), ProgressError>;
}

/// Volatile store; the default for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    files: BTreeMap<String, ProgressRecord>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for MemoryProgressStore {
    fn load(&self, file_id: &str) -> Result<Option<ProgressRecord>, ProgressError> {
        Ok(self.files.get(file_id).cloned())
    }

    fn save(&mut self, file_id: &str, record: &ProgressRecord) -> Result<(), ProgressError> {
        self.files.insert(file_id.to_string(), record.clone());
        Ok(())
    }
}

/// One JSON document holding every session file's progress, mirroring the
/// original workstation's single browser-side database.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ProgressDocument {
    files: BTreeMap<String, ProgressRecord>,
}

/// JSON-file-backed store.
#[derive(Debug)]
pub struct JsonProgressStore {
    path: PathBuf,
}

impl JsonProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_document(&self) -> Result<ProgressDocument, ProgressError> {
        if !self.path.exists() {
            return Ok(ProgressDocument::default());
        }
        let text = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl ProgressStore for JsonProgressStore {
    fn load(&self, file_id: &str) -> Result<Option<ProgressRecord>, ProgressError> {
        Ok(self.read_document()?.files.get(file_id).cloned())
    }

    fn save(&mut self, file_id: &str, record: &ProgressRecord) -> Result<(), ProgressError> {
        let mut document = self.read_document()?;
        document.files.insert(file_id.to_string(), record.clone());
        let text = serde_json::to_string_pretty(&document)?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }
}

/// Periodic saver driven by the session's `advance` clock.
pub struct ProgressSaver {
    file_id: String,
    store: Box<dyn ProgressStore>,
    interval: Duration,
    next_save: Option<Instant>,
}

impl ProgressSaver {
    pub fn new(file_id: impl Into<String>, store: Box<dyn ProgressStore>, interval: Duration) -> Self {
        Self {
            file_id: file_id.into(),
            store,
            interval,
            next_save: None,
        }
    }

    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    /// Restore saved counters into the roster. Returns whether anything was
    /// restored; failures are logged and leave the roster untouched.
    pub fn restore(&self, roster: &mut BinRoster) -> bool {
        match self.store.load(&self.file_id) {
            Ok(Some(record)) => {
                record.apply(roster);
                debug!(file_id = %self.file_id, "restored bin progress");
                true
            }
            Ok(None) => false,
            Err(error) => {
                warn!(file_id = %self.file_id, %error, "progress restore failed, starting from zero");
                false
            }
        }
    }

    pub fn schedule(&mut self, now: Instant) {
        self.next_save = Some(now + self.interval);
    }

    /// Save when the cadence has elapsed. A failed save is logged and
    /// retried on the next cadence.
    pub fn poll(&mut self, now: Instant, roster: &BinRoster) -> bool {
        match self.next_save {
            Some(due) if due <= now => {
                self.next_save = Some(now + self.interval);
                self.save_now(roster)
            }
            _ => false,
        }
    }

    /// Best-effort immediate save (periodic cadence and teardown path).
    pub fn save_now(&mut self, roster: &BinRoster) -> bool {
        let record = ProgressRecord::capture(roster);
        match self.store.save(&self.file_id, &record) {
            Ok(()) => true,
            Err(error) => {
                warn!(file_id = %self.file_id, %error, "progress save failed");
                false
            }
        }
    }
}

impl std::fmt::Debug for ProgressSaver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressSaver")
            .field("file_id", &self.file_id)
            .field("interval", &self.interval)
            .field("next_save", &self.next_save)
            .finish()
    }
}
