//! Single-level undo for store writes
//!
//! One snapshot of the store is kept. It is taken right before an ingest
//! writes the store, replaced by the next ingest, and consumed by undo.

use crate::error::{Error, Result};
use crate::store::{StoreBackend, TranslationStore};
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

/// A copy of the store as it was before a merge was written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndoSnapshot {
    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,
    /// The store contents at that moment
    pub store: TranslationStore,
}

impl UndoSnapshot {
    /// Deep-copy a store into a new snapshot
    pub fn capture(store: &TranslationStore) -> Self {
        Self {
            taken_at: Utc::now(),
            store: store.clone(),
        }
    }
}

/// Manages the single undo snapshot held by a backend
pub struct UndoManager<'a, B: StoreBackend + ?Sized> {
    backend: &'a mut B,
}

impl<'a, B: StoreBackend + ?Sized> UndoManager<'a, B> {
    pub fn new(backend: &'a mut B) -> Self {
        Self { backend }
    }

    /// Save a copy of `store`, replacing any earlier snapshot
    pub fn snapshot(&mut self, store: &TranslationStore) -> Result<()> {
        self.backend.set_backup(&UndoSnapshot::capture(store))
    }

    /// The snapshotted store, without touching the live store
    pub fn restore(&self) -> Result<TranslationStore> {
        self.backend
            .get_backup()?
            .map(|snapshot| snapshot.store)
            .ok_or(Error::NoBackup)
    }

    /// Whether a snapshot is available
    pub fn has_backup(&self) -> Result<bool> {
        Ok(self.backend.get_backup()?.is_some())
    }

    /// When the current snapshot was taken
    pub fn backup_time(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.backend.get_backup()?.map(|s| s.taken_at))
    }

    /// Put the snapshot back as the live store and drop it
    pub fn undo(&mut self) -> Result<TranslationStore> {
        let store = self.restore()?;
        self.backend.set(&store)?;
        self.backend.clear_backup()?;
        info!("restored store from undo snapshot");
        Ok(store)
    }

    /// Drop the snapshot without restoring it
    pub fn discard(&mut self) -> Result<()> {
        self.backend.clear_backup()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Lang, MemoryBackend};

    fn store_with(key: &str, value: &str) -> TranslationStore {
        let mut store = TranslationStore::new();
        store.set(Lang::Primary, key, value);
        store
    }

    #[test]
    fn test_snapshot_and_restore() {
        let mut backend = MemoryBackend::new();
        let mut undo = UndoManager::new(&mut backend);

        assert!(!undo.has_backup().unwrap());
        assert!(matches!(undo.restore(), Err(Error::NoBackup)));

        let store = store_with("home", "Home");
        undo.snapshot(&store).unwrap();
        assert!(undo.has_backup().unwrap());
        assert!(undo.backup_time().unwrap().is_some());
        assert_eq!(undo.restore().unwrap(), store);
    }

    #[test]
    fn test_snapshot_is_overwritten() {
        let mut backend = MemoryBackend::new();
        let mut undo = UndoManager::new(&mut backend);

        undo.snapshot(&store_with("first", "First")).unwrap();
        undo.snapshot(&store_with("second", "Second")).unwrap();

        let restored = undo.restore().unwrap();
        assert!(restored.primary.contains_key("second"));
        assert!(!restored.primary.contains_key("first"));
    }

    #[test]
    fn test_undo_writes_store_and_consumes_snapshot() {
        let before = store_with("home", "Home");
        let mut backend = MemoryBackend::with_store(store_with("home", "Homepage"));
        {
            let mut undo = UndoManager::new(&mut backend);
            undo.snapshot(&before).unwrap();
            undo.undo().unwrap();
            assert!(!undo.has_backup().unwrap());
            assert!(matches!(undo.undo(), Err(Error::NoBackup)));
        }
        assert_eq!(backend.get().unwrap(), Some(before));
    }

    #[test]
    fn test_snapshot_is_a_deep_copy() {
        let mut backend = MemoryBackend::new();
        let mut undo = UndoManager::new(&mut backend);

        let mut store = store_with("home", "Home");
        undo.snapshot(&store).unwrap();
        store.set(Lang::Primary, "home", "Changed");

        assert_eq!(undo.restore().unwrap().get(Lang::Primary, "home"), Some("Home"));
    }

    #[test]
    fn test_discard() {
        let mut backend = MemoryBackend::new();
        let mut undo = UndoManager::new(&mut backend);
        undo.snapshot(&TranslationStore::new()).unwrap();
        undo.discard().unwrap();
        assert!(!undo.has_backup().unwrap());
    }
}
