//! Ledger layer — canonical records, identity keys, and the ordered state
//! the harvest pipeline commits into

mod record;
pub mod signature;
mod state;

pub use record::{
    CaseRecord, GeoPoint, Priority, RecordId, Region, DEFAULT_FOLDER, PLACEHOLDER_URL,
    UNKNOWN_AMOUNT,
};
pub use state::{
    Ledger, LedgerError, RecordFilter, SignatureSnapshot, DEFAULT_FOLDERS,
};
