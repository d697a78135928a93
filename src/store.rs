use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::keys::NAMESPACE;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Quota exceeded: {size} bytes over a limit of {limit}")]
    QuotaExceeded { size: usize, limit: usize },
}

/// Flat, namespaced key -> JSON value mapping.
///
/// Backed either by nothing (in-memory) or by a single JSON object file that is
/// rewritten atomically after every mutation. A failed write leaves both the
/// file and the in-memory map as they were before the call.
#[derive(Debug, Default)]
pub struct Store {
    entries: BTreeMap<String, Value>,
    path: Option<PathBuf>,
    quota: Option<usize>,
}

impl Store {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a file-backed store. A missing file starts empty; an unreadable or
    /// corrupt one also starts empty and is overwritten on the next write.
    #[instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<BTreeMap<String, Value>>(&raw) {
                Ok(entries) => {
                    info!(keys = entries.len(), "Loaded store");
                    entries
                }
                Err(e) => {
                    warn!(error = %e, "Store file is not a JSON object, starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No store file yet, starting empty");
                BTreeMap::new()
            }
            Err(e) => {
                error!(error = %e, "Failed to read store file, starting empty");
                BTreeMap::new()
            }
        };
        Self { entries, path: Some(path), quota: None }
    }

    /// Cap the serialized size of the whole namespace, like a browser storage quota.
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn full(key: &str) -> String {
        if key.starts_with(NAMESPACE) {
            key.to_string()
        } else {
            format!("{NAMESPACE}{key}")
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(&Self::full(key))
    }

    /// Typed read. Missing keys and values that do not fit `T` both yield `None`;
    /// the latter is logged since it means the stored data drifted from its schema.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let full = Self::full(key);
        let value = self.entries.get(&full)?;
        match T::deserialize(value) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(key = %full, error = %e, "Stored value does not match its schema, using fallback");
                None
            }
        }
    }

    pub fn read_or<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        self.read(key).unwrap_or(fallback)
    }

    pub fn read_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        self.read(key).unwrap_or_default()
    }

    pub fn write<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let value = serde_json::to_value(value)?;
        self.commit(Self::full(key), Some(value))
    }

    /// Best-effort write: failures are logged and dropped, and the caller carries
    /// on with its in-memory value.
    pub fn put<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        if let Err(e) = self.write(key, value) {
            error!(key = %Self::full(key), error = %e, "Failed to persist value");
        }
    }

    pub fn remove(&mut self, key: &str) {
        let full = Self::full(key);
        if !self.entries.contains_key(&full) {
            return;
        }
        if let Err(e) = self.commit(full.clone(), None) {
            error!(key = %full, error = %e, "Failed to remove value");
        }
    }

    /// Append to the array stored at `key` and return the new array.
    pub fn push<T: Serialize + DeserializeOwned>(&mut self, key: &str, item: T) -> Vec<T> {
        let mut items: Vec<T> = self.read_or(key, Vec::new());
        items.push(item);
        self.put(key, &items);
        items
    }

    /// Drop the last element of the array stored at `key`.
    pub fn pop_last<T: Serialize + DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        let mut items: Vec<T> = self.read_or(key, Vec::new());
        let last = items.pop()?;
        self.put(key, &items);
        Some(last)
    }

    pub fn update<T, F>(&mut self, key: &str, f: F) -> T
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(Option<T>) -> T,
    {
        let next = f(self.read(key));
        self.put(key, &next);
        next
    }

    /// Full keys (namespace included) under `prefix`, in key order.
    pub fn list_keys(&self, prefix: &str) -> Vec<String> {
        let full = Self::full(prefix);
        self.entries
            .range(full.clone()..)
            .take_while(|(k, _)| k.starts_with(&full))
            .map(|(k, _)| k.clone())
            .collect()
    }

    pub fn clear_all(&mut self) {
        let previous = std::mem::take(&mut self.entries);
        if let Err(e) = self.flush() {
            error!(error = %e, "Failed to clear store");
            self.entries = previous;
        }
    }

    pub fn dump(&self) -> BTreeMap<String, Value> {
        self.entries.clone()
    }

    fn commit(&mut self, key: String, value: Option<Value>) -> Result<(), StoreError> {
        let previous = match value {
            Some(v) => self.entries.insert(key.clone(), v),
            None => self.entries.remove(&key),
        };
        if let Err(e) = self.flush() {
            match previous {
                Some(old) => self.entries.insert(key, old),
                None => self.entries.remove(&key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn flush(&self) -> Result<(), StoreError> {
        if self.quota.is_none() && self.path.is_none() {
            return Ok(());
        }
        let json = serde_json::to_string(&self.entries)?;
        if let Some(limit) = self.quota {
            if json.len() > limit {
                return Err(StoreError::QuotaExceeded { size: json.len(), limit });
            }
        }
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}
