//! Docket: harvest-and-merge engine for cryptocurrency case intelligence
//!
//! Aggregates records of crypto-related legal cases from two sources — a
//! generative archival search and a public judicial-records API —
//! normalizes them into one canonical record type, deduplicates by case
//! signature, and commits the survivors into a persisted ledger.
//!
//! # Core Concepts
//!
//! - **Ledger**: the authoritative, ordered (newest-first) set of all
//!   known case records
//! - **Signature**: a record's dedup identity key, independent of its
//!   storage id
//! - **Harvest**: one cycle of querying both sources, merging,
//!   deduplicating, and committing new records
//!
//! # Example
//!
//! ```
//! use docket::Ledger;
//!
//! let ledger = Ledger::new();
//! assert!(ledger.is_empty());
//! ```

pub mod engine;
pub mod harvest;
pub mod ledger;
pub mod provider;
pub mod storage;

pub use engine::{DocketEngine, EngineError, LedgerStats};
pub use harvest::{
    ArchiveSearchAdapter, HarvestError, HarvestOrchestrator, HarvestReport,
    JudicialRecordsAdapter, ScanClient,
};
pub use ledger::{
    CaseRecord, GeoPoint, Ledger, LedgerError, Priority, RecordFilter, RecordId, Region,
    SignatureSnapshot,
};
pub use provider::{
    Citation, GenerativeClient, HttpGenerativeClient, MockGenerativeClient, ModelTier,
    ProviderConfig, ProviderError,
};
pub use storage::{BlobStore, LedgerStore, OpenStore, SqliteStore, StorageError, StorageResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
