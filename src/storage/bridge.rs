//! Persistence bridge — serializes the ledger to the blob store
//!
//! One key holds the full ledger as a JSON array; a second key holds the
//! last-selected view/folder preference. A corrupt ledger blob degrades
//! to an empty ledger with a warning — startup never crashes on bad
//! storage.

use super::traits::{BlobStore, StorageResult};
use crate::ledger::Ledger;
use std::sync::Arc;
use tracing::warn;

/// Storage key for the serialized ledger
pub const LEDGER_KEY: &str = "case_ledger_v1";

/// Storage key for the view/folder preference
pub const VIEW_PREF_KEY: &str = "view_pref_v1";

/// Bridge between the in-memory ledger and a blob store
pub struct LedgerStore {
    store: Arc<dyn BlobStore>,
}

impl LedgerStore {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Load the persisted ledger. Absent or malformed blobs yield an
    /// empty ledger, never an error.
    pub fn load(&self) -> StorageResult<Ledger> {
        match self.store.get(LEDGER_KEY)? {
            None => Ok(Ledger::new()),
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(ledger) => Ok(ledger),
                Err(err) => {
                    warn!(error = %err, "persisted ledger is corrupt, starting empty");
                    Ok(Ledger::new())
                }
            },
        }
    }

    /// Persist the full ledger under its single key.
    pub fn save(&self, ledger: &Ledger) -> StorageResult<()> {
        let blob = serde_json::to_string(ledger)?;
        self.store.set(LEDGER_KEY, &blob)
    }

    pub fn view_preference(&self) -> StorageResult<Option<String>> {
        self.store.get(VIEW_PREF_KEY)
    }

    pub fn set_view_preference(&self, preference: &str) -> StorageResult<()> {
        self.store.set(VIEW_PREF_KEY, preference)
    }
}
