//! Ingest pipeline: parse, resolve roles, merge, snapshot, persist
//!
//! A [`Pipeline`] owns the store backend. Each operation holds the backend
//! for its whole run, so a second ingest or undo on the same pipeline gets
//! [`Error::Busy`] instead of interleaving its read-modify-write.
//! Any error leaves both the store and the undo snapshot untouched.

use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::history::UndoManager;
use crate::merger::{merge, MergeOutcome};
use crate::parser::{parse_file, parse_paste};
use crate::roles::{resolve_roles, ColumnRoleMap, ConfirmPrimary};
use crate::store::{StoreBackend, TranslationStore};
use log::{debug, info};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, TryLockError};

/// Result of a completed ingest
#[derive(Debug, Clone)]
pub struct IngestReport {
    /// How the columns were interpreted
    pub roles: ColumnRoleMap,
    /// Merge result; `outcome.store` is what was persisted
    pub outcome: MergeOutcome,
    /// Whether the previous store was saved for undo
    pub snapshot_taken: bool,
    /// Whether the store was written (false when nothing changed)
    pub store_written: bool,
}

/// Runs ingest and undo operations against a store backend
pub struct Pipeline<B: StoreBackend> {
    backend: Mutex<B>,
}

impl<B: StoreBackend> Pipeline<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend: Mutex::new(backend),
        }
    }

    /// Give the backend back
    pub fn into_backend(self) -> B {
        self.backend
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock(&self) -> Result<MutexGuard<'_, B>> {
        match self.backend.try_lock() {
            Ok(guard) => Ok(guard),
            Err(TryLockError::WouldBlock) => Err(Error::Busy),
            Err(TryLockError::Poisoned(poisoned)) => Ok(poisoned.into_inner()),
        }
    }

    /// Parse pasted text and merge it
    pub fn ingest_paste(&self, text: &str, confirmer: &mut dyn ConfirmPrimary) -> Result<IngestReport> {
        let grid = parse_paste(text)?;
        self.ingest_grid(&grid, confirmer)
    }

    /// Parse a spreadsheet, CSV or text file and merge it
    pub fn ingest_file<P: AsRef<Path>>(
        &self,
        path: P,
        confirmer: &mut dyn ConfirmPrimary,
    ) -> Result<IngestReport> {
        let grid = parse_file(path)?;
        self.ingest_grid(&grid, confirmer)
    }

    /// Merge an already-parsed grid into the store
    ///
    /// The undo snapshot is taken only after the merge has been computed and
    /// right before the store write. When the merge changes nothing, neither
    /// the snapshot nor the store is written.
    pub fn ingest_grid(&self, grid: &Grid, confirmer: &mut dyn ConfirmPrimary) -> Result<IngestReport> {
        if grid.is_empty() {
            return Err(Error::EmptyInput);
        }

        let mut backend = self.lock()?;

        let headers = grid.headers();
        let roles = resolve_roles(&headers, confirmer)?;

        let previous = backend.get()?;
        let current = previous.clone().unwrap_or_default();
        let outcome = merge(grid, &roles, &current);

        if !outcome.has_changes() {
            debug!("nothing changed, store left as is");
            return Ok(IngestReport {
                roles,
                outcome,
                snapshot_taken: false,
                store_written: false,
            });
        }

        // With no earlier store there is nothing to roll back to, and the
        // previous snapshot (if any) is kept.
        let snapshot_taken = match &previous {
            Some(store) => {
                UndoManager::new(&mut *backend).snapshot(store)?;
                true
            }
            None => false,
        };

        backend.set(&outcome.store)?;
        info!(
            "store updated: {} added, {} updated",
            outcome.added(),
            outcome.updated()
        );

        Ok(IngestReport {
            roles,
            outcome,
            snapshot_taken,
            store_written: true,
        })
    }

    /// Restore the undo snapshot as the live store
    pub fn undo(&self) -> Result<TranslationStore> {
        let mut backend = self.lock()?;
        UndoManager::new(&mut *backend).undo()
    }

    /// Whether an undo snapshot exists
    pub fn has_backup(&self) -> Result<bool> {
        let mut backend = self.lock()?;
        UndoManager::new(&mut *backend).has_backup()
    }

    /// The stored translations, or an empty store if none were saved yet
    pub fn current_store(&self) -> Result<TranslationStore> {
        Ok(self.lock()?.get()?.unwrap_or_default())
    }

    /// Edit the store directly (used for per-language imports)
    ///
    /// The previous store is snapshotted first, so the edit can be undone
    /// like an ingest.
    pub fn update_store<F>(&self, edit: F) -> Result<TranslationStore>
    where
        F: FnOnce(&mut TranslationStore) -> Result<()>,
    {
        let mut backend = self.lock()?;
        let previous = backend.get()?;
        let mut store = previous.clone().unwrap_or_default();
        edit(&mut store)?;

        if let Some(prev) = &previous {
            UndoManager::new(&mut *backend).snapshot(prev)?;
        }
        backend.set(&store)?;
        Ok(store)
    }
}
