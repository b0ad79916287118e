//! Harvest layer — source adapters and the orchestrator that merges
//! their output into the ledger

mod archive;
mod judicial;
mod orchestrator;
pub mod scan;

pub use archive::{ArchiveHarvest, ArchiveSearchAdapter, EXCLUDE_CAP};
pub use judicial::{JudicialRecordsAdapter, MAX_CLASSIFY_BATCH, SOURCE_PREFIX, TEXT_BUDGET};
pub use orchestrator::{
    merge_incoming, GatherOutcome, HarvestError, HarvestOrchestrator, HarvestReport,
};
pub use scan::{JudgmentSource, RawJudgment, ScanClient, ScanError, DEFAULT_QUERY};
