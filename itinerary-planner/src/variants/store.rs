//! Persistent storage for variant records.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::error::StoreError;

/// Variant code → station names served, in calling order.
///
/// An empty list is a valid record: the variant serves no station.
pub type VariantRecords = BTreeMap<String, Vec<String>>;

/// Default store file, in the current directory.
const DEFAULT_PATH: &str = "variant_stations.json";

/// Whole-document storage for variant records.
pub trait VariantStore: Send {
    /// Read every stored record.
    fn load(&self) -> Result<VariantRecords, StoreError>;

    /// Replace the stored document.
    fn save(&self, records: &VariantRecords) -> Result<(), StoreError>;
}

/// Variant records kept in a JSON file.
///
/// The file is a plain JSON object `{"KASE": ["Bourg-la-Reine", ...]}`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the store file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for JsonFileStore {
    fn default() -> Self {
        Self::new(DEFAULT_PATH)
    }
}

impl VariantStore for JsonFileStore {
    /// A missing file loads as an empty store (first run).
    fn load(&self) -> Result<VariantRecords, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(VariantRecords::new());
            }
            Err(e) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };

        serde_json::from_str(&contents).map_err(|e| StoreError::Json {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Creates parent directories if they don't exist.
    fn save(&self, records: &VariantRecords) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let json = serde_json::to_string_pretty(records).map_err(|e| StoreError::Json {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        std::fs::write(&self.path, json).map_err(|e| StoreError::Io {
            path: self.path.clone(),
            source: e,
        })
    }
}

/// In-process store.
///
/// Clones share the same document, so a handle kept outside the classifier
/// can observe what was saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<VariantRecords>>,
    saves: Arc<Mutex<usize>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with records.
    pub fn with_records(records: VariantRecords) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            saves: Arc::default(),
        }
    }

    /// Snapshot of the stored document.
    pub fn records(&self) -> VariantRecords {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Number of times the document has been saved.
    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|n| *n).unwrap_or_default()
    }
}

impl VariantStore for MemoryStore {
    fn load(&self) -> Result<VariantRecords, StoreError> {
        self.records
            .lock()
            .map(|r| r.clone())
            .map_err(|_| StoreError::Poisoned)
    }

    fn save(&self, records: &VariantRecords) -> Result<(), StoreError> {
        let mut stored = self.records.lock().map_err(|_| StoreError::Poisoned)?;
        *stored = records.clone();
        let mut saves = self.saves.lock().map_err(|_| StoreError::Poisoned)?;
        *saves += 1;
        Ok(())
    }
}
