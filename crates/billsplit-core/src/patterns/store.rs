//! Persisted, mutable pattern store.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info};

use super::{compile_pattern, PatternField, PatternSet};
use crate::error::{PatternError, Result, StorageError};

/// Persistence seam for pattern sets.
///
/// The host decides where patterns live; the store only dictates the shape.
pub trait PatternStorage {
    /// Load the stored pattern set, or `None` if nothing was saved yet.
    fn load(&self) -> std::result::Result<Option<PatternSet>, StorageError>;

    /// Persist the pattern set, replacing any previous value.
    fn save(&self, patterns: &PatternSet) -> std::result::Result<(), StorageError>;
}

/// Stores the pattern set as pretty-printed JSON on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    /// Create a storage backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PatternStorage for JsonFileStorage {
    fn load(&self) -> std::result::Result<Option<PatternSet>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn save(&self, patterns: &PatternSet) -> std::result::Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(patterns)?;
        fs::write(&self.path, content)?;
        debug!("Saved patterns to {}", self.path.display());
        Ok(())
    }
}

/// In-memory storage, for hosts that persist elsewhere and for tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    saved: Mutex<Option<PatternSet>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an already-saved pattern set.
    pub fn with_patterns(patterns: PatternSet) -> Self {
        Self {
            saved: Mutex::new(Some(patterns)),
        }
    }

    /// The last saved pattern set.
    pub fn saved(&self) -> Option<PatternSet> {
        self.saved.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl PatternStorage for MemoryStorage {
    fn load(&self) -> std::result::Result<Option<PatternSet>, StorageError> {
        Ok(self.saved())
    }

    fn save(&self, patterns: &PatternSet) -> std::result::Result<(), StorageError> {
        if let Ok(mut saved) = self.saved.lock() {
            *saved = Some(patterns.clone());
        }
        Ok(())
    }
}

/// Ordered account and name patterns with add/remove/reset operations.
///
/// Every mutating call persists the full set through the storage backend.
/// If persisting fails the in-memory change is kept and the error returned.
pub struct PatternStore<S: PatternStorage> {
    patterns: PatternSet,
    storage: S,
}

impl<S: PatternStorage> PatternStore<S> {
    /// Open a store, loading saved patterns or falling back to the defaults.
    pub fn open(storage: S) -> Result<Self> {
        let patterns = match storage.load()? {
            Some(patterns) => patterns,
            None => {
                debug!("No saved patterns, using defaults");
                PatternSet::defaults()
            }
        };
        Ok(Self { patterns, storage })
    }

    /// Patterns for a field, in priority order.
    pub fn list(&self, field: PatternField) -> &[String] {
        self.patterns.get(field)
    }

    /// The current pattern set.
    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    /// A copy of the current pattern set, safe to hand to a splitter.
    pub fn snapshot(&self) -> PatternSet {
        self.patterns.clone()
    }

    /// Append a pattern with the lowest priority.
    ///
    /// Fails if the pattern is not a valid regular expression. Capture
    /// groups are not checked here; a split validates them when it starts.
    pub fn add(&mut self, field: PatternField, pattern: &str) -> Result<()> {
        compile_pattern(pattern)?;
        self.patterns.get_mut(field).push(pattern.to_string());
        info!("Added {} pattern: {}", field, pattern);
        self.persist()
    }

    /// Remove the pattern at `index`, returning it.
    pub fn remove(&mut self, field: PatternField, index: usize) -> Result<String> {
        let list = self.patterns.get_mut(field);
        if index >= list.len() {
            return Err(PatternError::IndexOutOfRange {
                field,
                index,
                len: list.len(),
            }
            .into());
        }
        let removed = list.remove(index);
        info!("Removed {} pattern #{}: {}", field, index, removed);
        self.persist()?;
        Ok(removed)
    }

    /// Discard all custom patterns and restore the defaults for both fields.
    pub fn reset(&mut self) -> Result<()> {
        self.patterns = PatternSet::defaults();
        info!("Reset patterns to defaults");
        self.persist()
    }

    /// The storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn persist(&self) -> Result<()> {
        self.storage.save(&self.patterns)?;
        Ok(())
    }
}
