//! The secret store.
//!
//! One JSON document per wallet, loaded once and flushed whole after each
//! logical mutation. A missing file is an empty record; a file that exists
//! but does not parse is a fatal error, since resetting it would destroy
//! the only copy of the encrypted key material.

use crate::error::StoreError;
use log::debug;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

/// Paths with a live store instance. A second open of the same path would
/// create a divergent in-memory copy racing on save, so it is refused.
fn open_paths() -> &'static Mutex<HashSet<PathBuf>> {
    static OPEN: OnceLock<Mutex<HashSet<PathBuf>>> = OnceLock::new();
    OPEN.get_or_init(|| Mutex::new(HashSet::new()))
}

/// Durable key-value store backed by a single JSON file.
pub struct SecretStore {
    path: PathBuf,
    data: Map<String, Value>,
}

impl SecretStore {
    /// Open the store at `path`, loading the backing file if present.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        {
            let mut open = open_paths().lock().unwrap_or_else(|e| e.into_inner());
            if !open.insert(path.clone()) {
                return Err(StoreError::AlreadyOpen(path));
            }
        }

        let data = match Self::load(&path) {
            Ok(data) => data,
            Err(e) => {
                // Release the registry slot; the caller got no instance.
                let mut open = open_paths().lock().unwrap_or_else(|e| e.into_inner());
                open.remove(&path);
                return Err(e);
            }
        };

        Ok(Self { path, data })
    }

    fn load(path: &Path) -> Result<Map<String, Value>, StoreError> {
        if !path.exists() {
            debug!("no storage file at {}, starting empty", path.display());
            return Ok(Map::new());
        }

        let raw = fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&raw).map_err(|e| StoreError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        match value {
            Value::Object(map) => Ok(map),
            other => Err(StoreError::Malformed {
                path: path.to_path_buf(),
                reason: format!("expected a JSON object, found {}", json_kind(&other)),
            }),
        }
    }

    /// Default per-user storage path (`~/.helix-wallet/storage.json`).
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".helix-wallet")
            .join("storage.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The full in-memory record.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Look up a single field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Shallow-merge `partial` into the record; `partial` wins on
    /// collisions. Does not touch the disk.
    pub fn set_data(&mut self, partial: Map<String, Value>) {
        for (key, value) in partial {
            self.data.insert(key, value);
        }
    }

    /// Set a single field. Does not touch the disk.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
    }

    /// Remove a single field. Does not touch the disk.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    /// Write the full record to disk, creating parent directories as
    /// needed. The file is replaced atomically via a temp file + rename.
    pub fn save(&self) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }

        let serialized = serde_json::to_string_pretty(&Value::Object(self.data.clone()))
            .map_err(|e| StoreError::Malformed {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serialized)?;
        fs::rename(&tmp, &self.path)?;
        debug!("saved {} fields to {}", self.data.len(), self.path.display());
        Ok(())
    }
}

impl Drop for SecretStore {
    fn drop(&mut self) {
        let mut open = open_paths().lock().unwrap_or_else(|e| e.into_inner());
        open.remove(&self.path);
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
