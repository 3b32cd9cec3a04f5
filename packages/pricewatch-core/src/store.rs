//! Snapshot persistence to a JSON key-value file.

use crate::registry::{EngineRegistry, EntityKey};
use crate::snapshot::EngineSnapshot;
use crate::Result;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Entity snapshots persisted as one JSON object keyed by entity.
#[derive(Debug)]
pub struct SnapshotStore {
    /// Path to the state JSON file
    path: PathBuf,
    /// In-memory snapshots
    entries: BTreeMap<EntityKey, EngineSnapshot>,
}

impl SnapshotStore {
    /// Open the store at the default path, starting empty if it cannot be read.
    pub fn new() -> Self {
        Self::load_or_default(Self::default_path())
    }

    /// Open a store at a custom path, starting empty if it cannot be read.
    pub fn load_or_default(path: PathBuf) -> Self {
        let entries = match Self::load_from_path(&path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "state file unreadable, starting fresh");
                BTreeMap::new()
            }
        };
        Self { path, entries }
    }

    /// Open a store at a custom path, surfacing read and parse errors.
    pub fn load(path: PathBuf) -> Result<Self> {
        let entries = Self::load_from_path(&path)?;
        Ok(Self { path, entries })
    }

    /// Create an in-memory store (no persistence).
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::new(),
            entries: BTreeMap::new(),
        }
    }

    /// Get the default state file path.
    ///
    /// Default path: `~/.pricewatch/state.json`
    /// Can be overridden with the `PRICEWATCH_STATE_FILE` environment variable.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var("PRICEWATCH_STATE_FILE") {
            return PathBuf::from(path);
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".pricewatch/state.json"))
            .unwrap_or_else(|| PathBuf::from("pricewatch-state.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_path(path: &Path) -> Result<BTreeMap<EntityKey, EngineSnapshot>> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write all snapshots to disk.
    pub fn save(&self) -> Result<()> {
        // Skip if in-memory only
        if self.path.as_os_str().is_empty() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &EntityKey) -> Option<&EngineSnapshot> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: EntityKey, snapshot: EngineSnapshot) {
        self.entries.insert(key, snapshot);
    }

    pub fn remove(&mut self, key: &EntityKey) -> Option<EngineSnapshot> {
        self.entries.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &EntityKey> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record the current state of every engine in the registry.
    pub fn capture(&mut self, registry: &EngineRegistry) {
        self.entries.extend(registry.snapshots());
    }

    /// Load every stored snapshot into the registry.
    pub fn restore_into(&self, registry: &mut EngineRegistry) -> Result<usize> {
        registry.restore_all(self.entries.clone())
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::Error;
    use tempfile::tempdir;

    fn populated_registry() -> EngineRegistry {
        let mut registry = EngineRegistry::new(EngineConfig::default()).unwrap();
        let key = EntityKey::from("btc");
        for (i, price) in [100.0, 101.0, 99.5].iter().enumerate() {
            registry.submit_price(&key, *price, i as i64).unwrap();
        }
        registry
    }

    #[test]
    fn test_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/state.json");

        // Capture and save
        {
            let mut store = SnapshotStore::load_or_default(path.clone());
            store.capture(&populated_registry());
            store.save().unwrap();
        }

        // Reload and restore
        {
            let store = SnapshotStore::load(path).unwrap();
            assert_eq!(store.len(), 1);

            let mut registry = EngineRegistry::new(EngineConfig::default()).unwrap();
            assert_eq!(store.restore_into(&mut registry).unwrap(), 1);

            let engine = registry.get(&EntityKey::from("btc")).unwrap();
            assert_eq!(engine.series().as_array(), vec![100.0, 101.0, 99.5]);
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::load(dir.path().join("absent.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_corrupt_file_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(SnapshotStore::load(path.clone()), Err(Error::Json(_))));
        assert!(SnapshotStore::load_or_default(path).is_empty());
    }

    #[test]
    fn test_in_memory_save_is_noop() {
        let mut store = SnapshotStore::in_memory();
        store.capture(&populated_registry());
        assert!(store.save().is_ok());
        assert!(store.get(&EntityKey::from("btc")).is_some());

        assert!(store.remove(&EntityKey::from("btc")).is_some());
        assert_eq!(store.keys().count(), 0);
    }
}
