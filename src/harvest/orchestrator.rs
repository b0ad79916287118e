//! Harvest orchestrator — one end-to-end cycle over both sources
//!
//! Snapshots the ledger's signature sets once, runs both adapters
//! concurrently, substitutes an empty result when the judicial source
//! fails, and merges A-then-B with first-occurrence-wins dedup. The
//! archive source is primary: its failure fails the whole harvest.

use crate::ledger::{CaseRecord, SignatureSnapshot};
use crate::provider::{Citation, ProviderConfig, ProviderError};
use crate::storage::StorageError;
use super::archive::ArchiveSearchAdapter;
use super::judicial::JudicialRecordsAdapter;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Top-level harvest failure. The ledger is left unchanged.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("archive source failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}

/// New records and metadata gathered by one harvest, before commit
#[derive(Debug, Default)]
pub struct GatherOutcome {
    /// Survivors of the dedup filter, in merge order (archive first)
    pub records: Vec<CaseRecord>,
    /// Grounding citations from the archive search
    pub citations: Vec<Citation>,
    /// Whether the provider tier is running downgraded
    pub downgraded: bool,
}

/// Outcome of a committed harvest cycle
#[derive(Debug, Clone)]
pub struct HarvestReport {
    /// Records actually added to the ledger
    pub added: usize,
    /// Whether the provider tier is running downgraded
    pub downgraded: bool,
    /// Grounding citations from the archive search
    pub citations: Vec<Citation>,
}

impl HarvestReport {
    /// Human-readable status line for a caller's banner.
    pub fn status_line(&self) -> String {
        if self.added == 0 {
            "No new records. Ledger already synchronized.".to_string()
        } else {
            format!(
                "Harvest complete. {} new record(s) added to the ledger.",
                self.added
            )
        }
    }
}

/// Coordinates the two source adapters of a harvest
pub struct HarvestOrchestrator {
    archive: ArchiveSearchAdapter,
    judicial: JudicialRecordsAdapter,
    config: Arc<ProviderConfig>,
}

impl HarvestOrchestrator {
    pub fn new(
        archive: ArchiveSearchAdapter,
        judicial: JudicialRecordsAdapter,
        config: Arc<ProviderConfig>,
    ) -> Self {
        Self {
            archive,
            judicial,
            config,
        }
    }

    /// The shared provider configuration (downgrade latch lives here).
    pub fn config(&self) -> &Arc<ProviderConfig> {
        &self.config
    }

    /// Run both adapters concurrently against one signature snapshot and
    /// return the deduplicated new records.
    ///
    /// The judicial source is best-effort: its failure logs and yields an
    /// empty result set. An archive failure propagates and the caller
    /// must leave the ledger untouched.
    pub async fn gather(
        &self,
        snapshot: &SignatureSnapshot,
    ) -> Result<GatherOutcome, HarvestError> {
        let known = snapshot.known();

        let (archive_result, judicial_result) = tokio::join!(
            self.archive.search(&snapshot.active, &snapshot.discarded),
            self.judicial.fetch(&known),
        );

        let archive = archive_result?;
        let judicial = judicial_result.unwrap_or_else(|err| {
            warn!(error = %err, "judicial source unavailable, continuing with archive results only");
            Vec::new()
        });

        let records = merge_incoming(archive.records, judicial, &known);
        info!(added = records.len(), "harvest gathered");

        Ok(GatherOutcome {
            records,
            citations: archive.citations,
            downgraded: self.config.is_downgraded(),
        })
    }
}

/// Concatenate adapter results (archive first) and drop every record whose
/// signature is already known or appeared earlier in this batch. Two
/// sources surfacing the same case independently resolve to the first
/// occurrence in concat order.
pub fn merge_incoming(
    archive: Vec<CaseRecord>,
    judicial: Vec<CaseRecord>,
    known: &HashSet<String>,
) -> Vec<CaseRecord> {
    let mut seen: HashSet<String> = HashSet::new();
    archive
        .into_iter()
        .chain(judicial)
        .filter(|record| {
            !known.contains(&record.signature) && seen.insert(record.signature.clone())
        })
        .collect()
}
