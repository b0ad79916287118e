//! Shared fixtures for integration tests
//!
//! Provides a fixture judgment source and canned provider payloads so the
//! full harvest cycle runs without network access. Archive search requests
//! are distinguished from classification requests by their grounding flag.

use async_trait::async_trait;
use docket::harvest::scan::{CourtCase, JudgmentSource, RawJudgment, ScanError};
use docket::harvest::{ArchiveSearchAdapter, HarvestOrchestrator, JudicialRecordsAdapter};
use docket::{DocketEngine, MockGenerativeClient, ProviderConfig, SqliteStore};
use serde_json::json;
use std::sync::Arc;

/// Judgment source serving a fixed list, or failing every call.
pub enum FixtureSource {
    Items(Vec<RawJudgment>),
    Unavailable,
}

#[async_trait]
impl JudgmentSource for FixtureSource {
    async fn fetch_raw(&self, _query: &str) -> Result<Vec<RawJudgment>, ScanError> {
        match self {
            FixtureSource::Items(items) => Ok(items.clone()),
            FixtureSource::Unavailable => Err(ScanError::Endpoint {
                status: 503,
                body: "uplink flatlined".to_string(),
            }),
        }
    }
}

/// A raw judgment whose only docketed case number is `case_number`
/// (empty = none).
pub fn judgment(id: i64, case_number: &str) -> RawJudgment {
    RawJudgment {
        id,
        court_cases: if case_number.is_empty() {
            Vec::new()
        } else {
            vec![CourtCase {
                case_number: case_number.to_string(),
            }]
        },
        judgment_date: "2023-06-01".to_string(),
        text_content: "Wyrok w sprawie obrotu kryptowalutami...".to_string(),
        court_type: "COMMON".to_string(),
    }
}

/// Archive search reply listing the given signatures.
pub fn archive_json(signatures: &[&str]) -> String {
    let cases: Vec<serde_json::Value> = signatures
        .iter()
        .map(|s| {
            json!({
                "signature": s,
                "court": "Sąd Okręgowy w Warszawie",
                "date": "2023-05-20",
                "summary": "Oszustwo inwestycyjne na rynku krypto.",
                "amount": "3.4 mln PLN",
                "article": "Art. 286 KK",
                "priority": "High",
                "sourceUrl": "https://example.org/case",
                "region": "Domestic"
            })
        })
        .collect();
    json!({ "cases": cases }).to_string()
}

/// Classifier verdict confirming (or rejecting) relevance.
pub fn verdict_json(relevant: bool) -> String {
    json!({
        "isCryptoCrime": relevant,
        "summary": "Pranie pieniędzy przez giełdę.",
        "amount": "800 tys. PLN",
        "article": "Art. 299 KK",
        "priority": "Medium"
    })
    .to_string()
}

/// Mock client answering archive searches (grounded requests) with
/// `archive` and every classification with a confirming verdict.
pub fn scripted_client(archive: String) -> Arc<MockGenerativeClient> {
    Arc::new(MockGenerativeClient::respond_with(move |request| {
        if request.grounding {
            Ok(docket::provider::GenerateResponse::from_text(archive.clone()))
        } else {
            Ok(docket::provider::GenerateResponse::from_text(verdict_json(
                true,
            )))
        }
    }))
}

/// Wire an engine over the given store, provider mock, and judgment
/// fixture.
pub fn build_engine(
    store: Arc<SqliteStore>,
    client: Arc<MockGenerativeClient>,
    source: FixtureSource,
) -> DocketEngine {
    let config = Arc::new(ProviderConfig::new());
    let archive = ArchiveSearchAdapter::new(Arc::clone(&client) as _, Arc::clone(&config));
    let judicial = JudicialRecordsAdapter::new(
        Arc::new(source),
        Arc::clone(&client) as _,
        Arc::clone(&config),
    );
    let orchestrator = HarvestOrchestrator::new(archive, judicial, config);
    DocketEngine::open(store, orchestrator).expect("engine should open")
}

/// Serialize the engine's full ledger for byte-level comparisons.
pub fn ledger_bytes(engine: &DocketEngine) -> String {
    serde_json::to_string(&engine.records()).expect("ledger should serialize")
}
