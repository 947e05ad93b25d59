//! Local key-value settings storage
//!
//! Settings are a flat map of string keys to JSON values, persisted as a
//! single JSON object. Reads are served from memory; every write rewrites the
//! file through a temporary file and a rename so a crash never leaves a
//! half-written document behind.

use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use total_evolve_shared::StorageError;
use tracing::{debug, warn};

/// Durable key-value storage
///
/// Mirrors the small subset of a platform settings store the application
/// needs. A value stored under a key with a different type reads as absent
/// from the typed getters; [`SettingsStore::contains`] still reports it.
pub trait SettingsStore: Send + Sync {
    /// Short backend name for readiness reports
    fn backend(&self) -> &'static str;

    /// Where the settings live, if they live anywhere
    fn location(&self) -> Option<String> {
        None
    }

    /// Whether any value is stored under `key`, whatever its type
    fn contains(&self, key: &str) -> Result<bool, StorageError>;

    fn string_array(&self, key: &str) -> Result<Option<Vec<String>>, StorageError>;

    fn set_string_array(&self, key: &str, value: &[String]) -> Result<(), StorageError>;

    fn string(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_string(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Check the backing storage is reachable and writable
    fn health_check(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

fn as_string_array(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

fn as_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

// ============================================================================
// In-memory store
// ============================================================================

/// Settings kept in memory only
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    values: Mutex<Map<String, Value>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an arbitrary JSON value, bypassing the typed setters
    pub fn insert_raw(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        values.insert(key.to_string(), value);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(values.get(key).cloned())
    }
}

impl SettingsStore for MemorySettingsStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn contains(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.get(key)?.is_some())
    }

    fn string_array(&self, key: &str) -> Result<Option<Vec<String>>, StorageError> {
        Ok(self.get(key)?.as_ref().and_then(as_string_array))
    }

    fn set_string_array(&self, key: &str, value: &[String]) -> Result<(), StorageError> {
        self.insert_raw(key, Value::from(value.to_vec()))
    }

    fn string(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get(key)?.as_ref().and_then(as_string))
    }

    fn set_string(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.insert_raw(key, Value::from(value))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        values.remove(key);
        Ok(())
    }
}

// ============================================================================
// File-backed store
// ============================================================================

/// Settings persisted to a JSON file
#[derive(Debug)]
pub struct FileSettingsStore {
    path: PathBuf,
    values: Mutex<Map<String, Value>>,
}

impl FileSettingsStore {
    /// Open the settings file at `path`, creating parent directories
    ///
    /// A missing file starts empty. A file that is not a JSON object is
    /// logged and treated as empty; it is replaced on the next write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let values = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<Value>(&bytes) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    warn!(path = %path.display(), "Settings file is not a JSON object, starting empty");
                    Map::new()
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Settings file is corrupt, starting empty");
                    Map::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), keys = values.len(), "Opened settings store");

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    /// Apply `change` and persist; memory is only updated if the write succeeds
    fn update<F>(&self, change: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut Map<String, Value>),
    {
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        let mut next = values.clone();
        change(&mut next);
        self.persist(&next)?;
        *values = next;
        Ok(())
    }

    fn persist(&self, values: &Map<String, Value>) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(values)?;
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SettingsStore for FileSettingsStore {
    fn backend(&self) -> &'static str {
        "file"
    }

    fn location(&self) -> Option<String> {
        Some(self.path.display().to_string())
    }

    fn contains(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.get(key)?.is_some())
    }

    fn string_array(&self, key: &str) -> Result<Option<Vec<String>>, StorageError> {
        Ok(self.get(key)?.as_ref().and_then(as_string_array))
    }

    fn set_string_array(&self, key: &str, value: &[String]) -> Result<(), StorageError> {
        let value = Value::from(value.to_vec());
        self.update(|values| {
            values.insert(key.to_string(), value);
        })
    }

    fn string(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get(key)?.as_ref().and_then(as_string))
    }

    fn set_string(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|values| {
            values.insert(key.to_string(), Value::from(value));
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|values| {
            values.remove(key);
        })
    }

    fn health_check(&self) -> Result<(), StorageError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if fs::metadata(dir)?.permissions().readonly() {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                format!("{} is read-only", dir.display()),
            )));
        }
        Ok(())
    }
}
