//! Engine facade — the single consumer-facing entry point
//!
//! Owns the ledger, the persistence bridge, and the harvest entry point.
//! Every mutation persists before returning; a failed harvest leaves the
//! ledger byte-for-byte unchanged.

use crate::harvest::{HarvestError, HarvestOrchestrator, HarvestReport};
use crate::ledger::{
    CaseRecord, Ledger, LedgerError, Priority, RecordFilter, RecordId, SignatureSnapshot,
};
use crate::storage::{BlobStore, LedgerStore, StorageError};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::info;

/// Errors from engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Headline counts for a status display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerStats {
    /// Every record in storage, discarded included
    pub total: usize,
    /// Records still visible
    pub active: usize,
    /// Records pinned to the vault
    pub saved: usize,
    /// Active records flagged High
    pub high_priority: usize,
}

/// Facade over the ledger, persistence, and the harvest pipeline
pub struct DocketEngine {
    ledger: Mutex<Ledger>,
    store: LedgerStore,
    orchestrator: HarvestOrchestrator,
    /// Serializes harvests so two cycles can never interleave a commit
    harvest_guard: tokio::sync::Mutex<()>,
}

impl DocketEngine {
    /// Open an engine over a blob store, loading any persisted ledger.
    /// Corrupt storage degrades to an empty ledger.
    pub fn open(
        store: Arc<dyn BlobStore>,
        orchestrator: HarvestOrchestrator,
    ) -> Result<Self, EngineError> {
        let store = LedgerStore::new(store);
        let ledger = store.load()?;
        info!(records = ledger.len(), "ledger loaded");
        Ok(Self {
            ledger: Mutex::new(ledger),
            store,
            orchestrator,
            harvest_guard: tokio::sync::Mutex::new(()),
        })
    }

    /// Run one harvest cycle: snapshot signatures, query both sources,
    /// dedup, commit the survivors atomically, persist.
    ///
    /// On failure the ledger is left unchanged and nothing is persisted.
    pub async fn harvest(&self) -> Result<HarvestReport, HarvestError> {
        let _running = self.harvest_guard.lock().await;

        let snapshot: SignatureSnapshot = self.ledger.lock().unwrap().snapshot();
        let outcome = self.orchestrator.gather(&snapshot).await?;

        // Single state replacement: merge into a copy, persist it, and
        // only then swap it in. A failure at any step leaves the visible
        // ledger exactly as it was.
        let added = {
            let mut ledger = self.ledger.lock().unwrap();
            let mut updated = ledger.clone();
            let added = updated.merge_new(outcome.records);
            self.store.save(&updated)?;
            *ledger = updated;
            added
        };

        Ok(HarvestReport {
            added,
            downgraded: outcome.downgraded,
            citations: outcome.citations,
        })
    }

    /// Toggle a record's saved flag. Returns the new state.
    pub fn toggle_saved(&self, id: RecordId) -> Result<bool, EngineError> {
        self.mutate(|ledger| ledger.toggle_saved(id))
    }

    /// Discard a record. One-way; its signature stays in the exclusion
    /// set.
    pub fn discard(&self, id: RecordId) -> Result<(), EngineError> {
        self.mutate(|ledger| ledger.discard(id))
    }

    /// Move a record into a folder.
    pub fn move_to_folder(
        &self,
        id: RecordId,
        folder: impl Into<String>,
    ) -> Result<(), EngineError> {
        let folder = folder.into();
        self.mutate(|ledger| ledger.move_to_folder(id, folder))
    }

    /// Delete a record entirely.
    pub fn delete(&self, id: RecordId) -> Result<CaseRecord, EngineError> {
        self.mutate(|ledger| ledger.delete(id))
    }

    /// Drop every unsaved record ahead of a fresh harvest, keeping the
    /// vault. Returns the number of records removed.
    pub fn purge_unsaved(&self) -> Result<usize, EngineError> {
        self.mutate(|ledger| Ok(ledger.retain_saved()))
    }

    /// Snapshot of every record, newest first, discarded included.
    pub fn records(&self) -> Vec<CaseRecord> {
        self.ledger.lock().unwrap().records().to_vec()
    }

    /// Non-discarded records matching a filter.
    pub fn find(&self, filter: &RecordFilter) -> Vec<CaseRecord> {
        self.ledger
            .lock()
            .unwrap()
            .find(filter)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Saved, non-discarded records.
    pub fn vault(&self) -> Vec<CaseRecord> {
        self.ledger
            .lock()
            .unwrap()
            .vault()
            .into_iter()
            .cloned()
            .collect()
    }

    /// Folder labels with record counts.
    pub fn folders(&self) -> Vec<(String, usize)> {
        self.ledger.lock().unwrap().folders()
    }

    pub fn get(&self, id: RecordId) -> Option<CaseRecord> {
        self.ledger.lock().unwrap().get(id).cloned()
    }

    /// Resolve a record by its id string, or failing that by signature.
    pub fn resolve(&self, reference: &str) -> Option<CaseRecord> {
        let ledger = self.ledger.lock().unwrap();
        if let Some(id) = RecordId::parse(reference) {
            if let Some(record) = ledger.get(id) {
                return Some(record.clone());
            }
        }
        ledger
            .records()
            .iter()
            .find(|r| r.signature == reference)
            .cloned()
    }

    pub fn stats(&self) -> LedgerStats {
        let ledger = self.ledger.lock().unwrap();
        let records = ledger.records();
        LedgerStats {
            total: records.len(),
            active: records.iter().filter(|r| !r.is_discarded).count(),
            saved: records
                .iter()
                .filter(|r| r.is_saved && !r.is_discarded)
                .count(),
            high_priority: records
                .iter()
                .filter(|r| !r.is_discarded && r.priority == Priority::High)
                .count(),
        }
    }

    pub fn view_preference(&self) -> Result<Option<String>, EngineError> {
        Ok(self.store.view_preference()?)
    }

    pub fn set_view_preference(&self, preference: &str) -> Result<(), EngineError> {
        Ok(self.store.set_view_preference(preference)?)
    }

    /// Clear the provider's rate-limit downgrade latch.
    pub fn reset_downgrade(&self) {
        self.orchestrator.config().reset();
    }

    fn mutate<T>(
        &self,
        action: impl FnOnce(&mut Ledger) -> Result<T, LedgerError>,
    ) -> Result<T, EngineError> {
        let mut ledger = self.ledger.lock().unwrap();
        let result = action(&mut ledger)?;
        self.store.save(&ledger)?;
        Ok(result)
    }
}
