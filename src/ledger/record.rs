//! Canonical case record — the unit the harvest pipeline produces

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a ledger record
///
/// Assigned once at ingestion and never recomputed from content.
/// Dedup identity lives in the record's `signature`, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Create a new random RecordId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a RecordId from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse a RecordId from its string form
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Investigation priority reported by a source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    #[default]
    Low,
}

impl Priority {
    /// Parse a source-provided label. Unrecognized values fall back to Low.
    pub fn parse_lenient(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "high" => Priority::High,
            "medium" => Priority::Medium,
            _ => Priority::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

/// Jurisdiction classification of a case
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Region {
    #[default]
    Domestic,
    Supranational,
}

impl Region {
    /// Parse a source-provided label, defaulting to Domestic.
    pub fn parse_lenient(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "supranational" | "european union" | "eu" => Region::Supranational,
            _ => Region::Domestic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Domestic => "Domestic",
            Region::Supranational => "Supranational",
        }
    }
}

/// Geocoordinate plus city label. Consumed only by map-style renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
    pub city: String,
}

/// Folder every record starts in
pub const DEFAULT_FOLDER: &str = "Uncategorized";

/// Sentinel link used when no verifiable source URL is available
pub const PLACEHOLDER_URL: &str = "#";

/// Sentinel for amounts the source could not determine
pub const UNKNOWN_AMOUNT: &str = "Unknown";

/// A single case in the ledger
///
/// Created only by the harvest orchestrator at merge time; mutated only
/// through the ledger's user actions (save-toggle, discard, move, delete).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    /// Storage identity, opaque and never reused
    pub id: RecordId,
    /// Dedup identity key; see `ledger::signature`
    pub signature: String,
    pub court: String,
    pub date: String,
    pub summary: String,
    pub amount: String,
    pub article: String,
    pub priority: Priority,
    /// Reference link; may be the placeholder sentinel
    pub source_url: String,
    pub region: Region,
    pub folder: String,
    pub is_saved: bool,
    pub is_discarded: bool,
    pub location: Option<GeoPoint>,
    /// When this record entered the ledger
    pub harvested_at: DateTime<Utc>,
}

impl CaseRecord {
    /// Create a freshly-ingested record with default flags and folder
    pub fn new(signature: impl Into<String>) -> Self {
        Self {
            id: RecordId::new(),
            signature: signature.into(),
            court: String::new(),
            date: String::new(),
            summary: String::new(),
            amount: UNKNOWN_AMOUNT.to_string(),
            article: String::new(),
            priority: Priority::Low,
            source_url: PLACEHOLDER_URL.to_string(),
            region: Region::Domestic,
            folder: DEFAULT_FOLDER.to_string(),
            is_saved: false,
            is_discarded: false,
            location: None,
            harvested_at: Utc::now(),
        }
    }

    /// Set the court label
    pub fn with_court(mut self, court: impl Into<String>) -> Self {
        self.court = court.into();
        self
    }

    /// Set the judgment date label
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_parses_leniently() {
        assert_eq!(Priority::parse_lenient("High"), Priority::High);
        assert_eq!(Priority::parse_lenient("  medium "), Priority::Medium);
        assert_eq!(Priority::parse_lenient("low"), Priority::Low);
        assert_eq!(Priority::parse_lenient("CRITICAL"), Priority::Low);
        assert_eq!(Priority::parse_lenient(""), Priority::Low);
    }

    #[test]
    fn region_parses_leniently() {
        assert_eq!(Region::parse_lenient("Supranational"), Region::Supranational);
        assert_eq!(Region::parse_lenient("European Union"), Region::Supranational);
        assert_eq!(Region::parse_lenient("Domestic"), Region::Domestic);
        assert_eq!(Region::parse_lenient("???"), Region::Domestic);
    }

    #[test]
    fn new_record_has_ingestion_defaults() {
        let record = CaseRecord::new("II AKa 12/23");
        assert_eq!(record.signature, "II AKa 12/23");
        assert_eq!(record.folder, DEFAULT_FOLDER);
        assert_eq!(record.amount, UNKNOWN_AMOUNT);
        assert_eq!(record.source_url, PLACEHOLDER_URL);
        assert!(!record.is_saved);
        assert!(!record.is_discarded);
        assert!(record.location.is_none());
    }

    #[test]
    fn record_ids_are_unique() {
        assert_ne!(CaseRecord::new("a").id, CaseRecord::new("a").id);
    }

    #[test]
    fn record_json_roundtrip() {
        let record = CaseRecord::new("III K 55/24")
            .with_court("Sąd Okręgowy w Warszawie")
            .with_date("2024-03-18")
            .with_priority(Priority::High);
        let json = serde_json::to_string(&record).unwrap();
        let parsed: CaseRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn record_id_parse_roundtrip() {
        let id = RecordId::new();
        assert_eq!(RecordId::parse(&id.to_string()), Some(id));
        assert_eq!(RecordId::parse("not-a-uuid"), None);
    }
}
