//! Ledger state — the authoritative ordered set of known case records
//!
//! Newest records sit at the front. The harvest orchestrator is the only
//! producer of new records; rendering layers read, the user actions below
//! mutate individual entries.

use super::record::{CaseRecord, Priority, RecordId, DEFAULT_FOLDER};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Folders that exist even before any record is filed into them
pub const DEFAULT_FOLDERS: [&str; 4] = [
    DEFAULT_FOLDER,
    "Exit Liquidity",
    "Meme Rugs",
    "Laundered Alpha",
];

/// Errors from ledger mutations
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("record not found: {0}")]
    UnknownRecord(RecordId),
}

/// The signature sets a harvest snapshots before calling any source
#[derive(Debug, Clone, Default)]
pub struct SignatureSnapshot {
    /// Signatures of records not yet discarded
    pub active: Vec<String>,
    /// Signatures of discarded records — these stay in the exclusion set
    /// indefinitely
    pub discarded: Vec<String>,
}

impl SignatureSnapshot {
    /// Deduplicated union of active and discarded signatures.
    pub fn known(&self) -> HashSet<String> {
        self.active
            .iter()
            .chain(self.discarded.iter())
            .cloned()
            .collect()
    }
}

/// Filter criteria for listing records
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// Case-insensitive substring match over signature, summary, court,
    /// and article
    pub text: Option<String>,
    /// Filter by priority
    pub priority: Option<Priority>,
    /// Filter by folder label
    pub folder: Option<String>,
    /// Maximum number of results
    pub limit: Option<usize>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn matches(&self, record: &CaseRecord) -> bool {
        if let Some(priority) = self.priority {
            if record.priority != priority {
                return false;
            }
        }
        if let Some(ref folder) = self.folder {
            if &record.folder != folder {
                return false;
            }
        }
        if let Some(ref text) = self.text {
            let needle = text.to_lowercase();
            let haystack = format!(
                "{} {} {} {}",
                record.signature, record.summary, record.court, record.article
            )
            .to_lowercase();
            if !haystack.contains(&needle) {
                return false;
            }
        }
        true
    }
}

/// Ordered collection of all known case records, newest first
///
/// Persisted as a bare JSON array under a single storage key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    records: Vec<CaseRecord>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<CaseRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records, newest first, discarded included.
    pub fn records(&self) -> &[CaseRecord] {
        &self.records
    }

    pub fn get(&self, id: RecordId) -> Option<&CaseRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Snapshot the signature sets for a harvest. Taken once, before any
    /// source call begins.
    pub fn snapshot(&self) -> SignatureSnapshot {
        let mut snapshot = SignatureSnapshot::default();
        for record in &self.records {
            if record.is_discarded {
                snapshot.discarded.push(record.signature.clone());
            } else {
                snapshot.active.push(record.signature.clone());
            }
        }
        snapshot
    }

    pub fn contains_signature(&self, signature: &str) -> bool {
        self.records.iter().any(|r| r.signature == signature)
    }

    /// Commit incoming records from a harvest: drop any whose signature is
    /// already in the ledger or appeared earlier in the same batch (first
    /// occurrence wins), then prepend the survivors in batch order.
    ///
    /// Returns the number of records added.
    pub fn merge_new(&mut self, incoming: Vec<CaseRecord>) -> usize {
        let mut seen: HashSet<String> = self
            .records
            .iter()
            .map(|r| r.signature.clone())
            .collect();
        let survivors: Vec<CaseRecord> = incoming
            .into_iter()
            .filter(|record| seen.insert(record.signature.clone()))
            .collect();
        let added = survivors.len();
        self.records.splice(0..0, survivors);
        added
    }

    /// Toggle the saved flag. Returns the new state.
    pub fn toggle_saved(&mut self, id: RecordId) -> Result<bool, LedgerError> {
        let record = self.get_mut(id)?;
        record.is_saved = !record.is_saved;
        Ok(record.is_saved)
    }

    /// Discard a record. One-way: there is no undiscard, and the record's
    /// signature keeps contributing to the exclusion set.
    pub fn discard(&mut self, id: RecordId) -> Result<(), LedgerError> {
        self.get_mut(id)?.is_discarded = true;
        Ok(())
    }

    /// Move a record into a folder. Does not touch dedup identity.
    pub fn move_to_folder(
        &mut self,
        id: RecordId,
        folder: impl Into<String>,
    ) -> Result<(), LedgerError> {
        self.get_mut(id)?.folder = folder.into();
        Ok(())
    }

    /// Drop every record that is not saved, discarded ones included.
    /// Used by a "fresh" harvest to re-index from scratch while keeping
    /// the vault. Returns the number of records removed.
    pub fn retain_saved(&mut self) -> usize {
        let before = self.records.len();
        self.records.retain(|r| r.is_saved);
        before - self.records.len()
    }

    /// Remove a record entirely. Its signature leaves the exclusion set.
    pub fn delete(&mut self, id: RecordId) -> Result<CaseRecord, LedgerError> {
        let index = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(LedgerError::UnknownRecord(id))?;
        Ok(self.records.remove(index))
    }

    /// Non-discarded records matching the filter, newest first.
    pub fn find(&self, filter: &RecordFilter) -> Vec<&CaseRecord> {
        let matches = self
            .records
            .iter()
            .filter(|r| !r.is_discarded)
            .filter(|r| filter.matches(r));
        match filter.limit {
            Some(limit) => matches.take(limit).collect(),
            None => matches.collect(),
        }
    }

    /// The vault: saved, non-discarded records. A derived view, not a
    /// separate collection.
    pub fn vault(&self) -> Vec<&CaseRecord> {
        self.records
            .iter()
            .filter(|r| r.is_saved && !r.is_discarded)
            .collect()
    }

    /// Folder labels with their record counts. Default folders are always
    /// present; folders invented by moves are appended in record order.
    pub fn folders(&self) -> Vec<(String, usize)> {
        let mut labels: Vec<String> =
            DEFAULT_FOLDERS.iter().map(|f| f.to_string()).collect();
        for record in &self.records {
            if !labels.contains(&record.folder) {
                labels.push(record.folder.clone());
            }
        }
        labels
            .into_iter()
            .map(|label| {
                let count = self
                    .records
                    .iter()
                    .filter(|r| r.folder == label)
                    .count();
                (label, count)
            })
            .collect()
    }

    fn get_mut(&mut self, id: RecordId) -> Result<&mut CaseRecord, LedgerError> {
        self.records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(LedgerError::UnknownRecord(id))
    }
}
