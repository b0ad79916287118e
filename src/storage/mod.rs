//! Storage layer for docket
//!
//! A key/value blob store trait with a SQLite backend, plus the bridge
//! that serializes the ledger in and out of it.

mod bridge;
mod sqlite;
mod traits;

pub use bridge::{LedgerStore, LEDGER_KEY, VIEW_PREF_KEY};
pub use sqlite::SqliteStore;
pub use traits::{BlobStore, OpenStore, StorageError, StorageResult};
