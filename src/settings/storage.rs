//! Key-value persistence backends
//!
//! Settings persistence is best effort. Backends report failures as
//! `SettingsError`; the store logs them and carries on with what it has.

use super::SettingsError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError>;
    fn remove(&mut self, key: &str) -> Result<(), SettingsError>;
}

/// In-memory store; the default outside the browser
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<'a>(values: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SettingsError> {
        self.values.remove(key);
        Ok(())
    }
}

/// A JSON object on disk, rewritten on every change
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Open `path`. A missing file starts empty; an unreadable or corrupt
    /// one is logged and also starts empty.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                log::warn!("ignoring corrupt settings file {}: {}", path.display(), e);
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                log::warn!("cannot read settings file {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, json).map_err(|e| SettingsError::Write {
            key: self.path.display().to_string(),
            message: e.to_string(),
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), SettingsError> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Browser `localStorage`
#[cfg(target_arch = "wasm32")]
pub struct LocalStorageStore {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    pub fn open() -> Result<Self, SettingsError> {
        let window = web_sys::window().ok_or(SettingsError::Unavailable("no window"))?;
        let storage = window
            .local_storage()
            .map_err(|_| SettingsError::Unavailable("localStorage access denied"))?
            .ok_or(SettingsError::Unavailable("localStorage missing"))?;
        Ok(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        self.storage.get_item(key).map_err(|e| SettingsError::Read {
            key: key.to_string(),
            message: format!("{:?}", e),
        })
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.storage.set_item(key, value).map_err(|e| SettingsError::Write {
            key: key.to_string(),
            message: format!("{:?}", e),
        })
    }

    fn remove(&mut self, key: &str) -> Result<(), SettingsError> {
        self.storage.remove_item(key).map_err(|e| SettingsError::Write {
            key: key.to_string(),
            message: format!("{:?}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        store.set("noteIconSize", "75").unwrap();
        assert_eq!(store.get("noteIconSize").unwrap().as_deref(), Some("75"));
        store.remove("noteIconSize").unwrap();
        assert_eq!(store.get("noteIconSize").unwrap(), None);
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut store = FileStore::open(&path);
        store.set("notesDisplayMode", "inline").unwrap();
        drop(store);

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get("notesDisplayMode").unwrap().as_deref(), Some("inline"));
    }

    #[test]
    fn test_file_store_tolerates_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();

        let store = FileStore::open(&path);
        assert_eq!(store.get("anything").unwrap(), None);
    }
}
