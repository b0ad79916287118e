//! End-to-end harvest cycle tests over mocked sources
//!
//! Each test drives the full pipeline — snapshot, concurrent adapters,
//! dedup merge, atomic commit, persistence — with no network access.

mod common;

use common::{
    archive_json, build_engine, judgment, ledger_bytes, scripted_client, FixtureSource,
};
use docket::provider::GenerateResponse;
use docket::storage::LEDGER_KEY;
use docket::{
    BlobStore, HarvestError, MockGenerativeClient, ModelTier, OpenStore, ProviderError,
    SqliteStore,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn memory_store() -> Arc<SqliteStore> {
    Arc::new(SqliteStore::open_in_memory().expect("in-memory store"))
}

// --- Scenario: fresh harvest merges both sources ---

#[tokio::test]
async fn first_harvest_merges_both_sources() {
    let store = memory_store();
    let engine = build_engine(
        Arc::clone(&store),
        scripted_client(archive_json(&["A-1", "A-2", "A-3"])),
        FixtureSource::Items(vec![judgment(101, "B-1"), judgment(102, "B-2")]),
    );

    let report = engine.harvest().await.unwrap();
    assert_eq!(report.added, 5);

    let signatures: Vec<String> = engine
        .records()
        .iter()
        .map(|r| r.signature.clone())
        .collect();
    assert_eq!(signatures, vec!["A-1", "A-2", "A-3", "B-1", "B-2"]);
}

// --- Scenario: re-harvesting known signatures is a no-op ---

#[tokio::test]
async fn idempotent_reharvest_changes_nothing() {
    let store = memory_store();
    let engine = build_engine(
        Arc::clone(&store),
        scripted_client(archive_json(&["A-1", "A-2"])),
        FixtureSource::Items(vec![judgment(101, "B-1")]),
    );
    engine.harvest().await.unwrap();
    let before = ledger_bytes(&engine);

    // Same sources again: the provider "ignores" the exclusion list.
    let report = engine.harvest().await.unwrap();
    assert_eq!(report.added, 0);
    assert_eq!(ledger_bytes(&engine), before);
    assert!(report.status_line().contains("already synchronized"));
}

// --- Scenario: both adapters surface the same case in one batch ---

#[tokio::test]
async fn intra_batch_duplicate_keeps_archive_version() {
    let store = memory_store();
    // Archive returns X-1; the judicial fixture's judgment also maps to
    // signature X-1 via its docketed case number.
    let engine = build_engine(
        Arc::clone(&store),
        scripted_client(archive_json(&["X-1"])),
        FixtureSource::Items(vec![judgment(500, "X-1")]),
    );

    let report = engine.harvest().await.unwrap();
    assert_eq!(report.added, 1);

    let records = engine.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].signature, "X-1");
    // Archive wins: its court label, not the judicial COMMON court type.
    assert_eq!(records[0].court, "Sąd Okręgowy w Warszawie");
}

// --- Scenario: discard is one-way and exclusion-sticky ---

#[tokio::test]
async fn discarded_signature_never_returns() {
    let store = memory_store();
    let engine = build_engine(
        Arc::clone(&store),
        scripted_client(archive_json(&["X-2"])),
        FixtureSource::Items(Vec::new()),
    );
    engine.harvest().await.unwrap();

    let id = engine.records()[0].id;
    engine.discard(id).unwrap();

    // The provider re-surfaces X-2 despite the exclusion instruction.
    let report = engine.harvest().await.unwrap();
    assert_eq!(report.added, 0);

    let records = engine.records();
    assert_eq!(records.len(), 1);
    assert!(records[0].is_discarded);
}

// --- Scenario: judicial source failure is isolated ---

#[tokio::test]
async fn judicial_failure_keeps_archive_results() {
    let store = memory_store();
    let engine = build_engine(
        Arc::clone(&store),
        scripted_client(archive_json(&["A-1", "A-2"])),
        FixtureSource::Unavailable,
    );

    let report = engine.harvest().await.unwrap();
    assert_eq!(report.added, 2);
    assert_eq!(engine.records().len(), 2);
}

// --- Scenario: archive failure fails the harvest, ledger untouched ---

#[tokio::test]
async fn archive_failure_is_fatal_and_commits_nothing() {
    let store = memory_store();
    let engine = build_engine(
        Arc::clone(&store),
        scripted_client(archive_json(&["A-1"])),
        FixtureSource::Items(Vec::new()),
    );
    engine.harvest().await.unwrap();
    let before = ledger_bytes(&engine);

    let failing = Arc::new(MockGenerativeClient::respond_with(|request| {
        if request.grounding {
            Err(ProviderError::Status {
                status: 500,
                body: "upstream error".to_string(),
            })
        } else {
            Ok(GenerateResponse::from_text(common::verdict_json(true)))
        }
    }));
    let engine = build_engine(
        Arc::clone(&store),
        failing,
        FixtureSource::Items(vec![judgment(900, "B-9")]),
    );

    let err = engine.harvest().await.unwrap_err();
    assert!(matches!(err, HarvestError::Provider(_)));
    assert_eq!(ledger_bytes(&engine), before);

    // Nothing was persisted either.
    let reopened = build_engine(
        store,
        scripted_client(archive_json(&[])),
        FixtureSource::Items(Vec::new()),
    );
    assert_eq!(ledger_bytes(&reopened), before);
}

// --- Scenario: rate limit downgrades the tier and retries once ---

#[tokio::test]
async fn rate_limit_triggers_single_downgraded_retry() {
    let store = memory_store();
    let searches = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&searches);
    let client = Arc::new(MockGenerativeClient::respond_with(move |request| {
        if request.grounding {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(ProviderError::RateLimited)
            } else {
                Ok(GenerateResponse::from_text(archive_json(&["A-1"])))
            }
        } else {
            Ok(GenerateResponse::from_text(common::verdict_json(true)))
        }
    }));

    let engine = build_engine(
        Arc::clone(&store),
        Arc::clone(&client),
        FixtureSource::Items(Vec::new()),
    );
    let report = engine.harvest().await.unwrap();

    assert_eq!(report.added, 1);
    assert!(report.downgraded);
    assert_eq!(searches.load(Ordering::SeqCst), 2);

    let search_tiers: Vec<ModelTier> = client
        .requests()
        .iter()
        .filter(|r| r.grounding)
        .map(|r| r.tier)
        .collect();
    assert_eq!(search_tiers, vec![ModelTier::Pro, ModelTier::Flash]);
}

#[tokio::test]
async fn second_rate_limit_fails_without_third_attempt() {
    let store = memory_store();
    let client = Arc::new(MockGenerativeClient::respond_with(|request| {
        if request.grounding {
            Err(ProviderError::RateLimited)
        } else {
            Ok(GenerateResponse::from_text(common::verdict_json(true)))
        }
    }));

    let engine = build_engine(
        store,
        Arc::clone(&client),
        FixtureSource::Items(Vec::new()),
    );
    let err = engine.harvest().await.unwrap_err();
    assert!(matches!(
        err,
        HarvestError::Provider(ProviderError::RateLimited)
    ));

    let searches = client.requests().iter().filter(|r| r.grounding).count();
    assert_eq!(searches, 2);
}

// --- Scenario: corrupt storage degrades to an empty ledger ---

#[tokio::test]
async fn corrupt_storage_starts_empty() {
    let store = memory_store();
    store
        .set(LEDGER_KEY, "definitely-not-json")
        .expect("seed corrupt blob");

    let engine = build_engine(
        store,
        scripted_client(archive_json(&[])),
        FixtureSource::Items(Vec::new()),
    );
    assert!(engine.records().is_empty());
}

// --- Scenario: the two-harvest walkthrough ---

#[tokio::test]
async fn two_harvest_walkthrough_orders_newest_first() {
    let store = memory_store();

    // Harvest 1: 3 archive + 2 judicial, no overlaps.
    let engine = build_engine(
        Arc::clone(&store),
        scripted_client(archive_json(&["A-1", "A-2", "A-3"])),
        FixtureSource::Items(vec![judgment(101, "B-1"), judgment(102, "B-2")]),
    );
    let report = engine.harvest().await.unwrap();
    assert_eq!(report.added, 5);
    assert_eq!(engine.records().len(), 5);

    // Harvest 2: provider ignores exclusions and repeats all five, plus
    // one genuinely new signature.
    let engine = build_engine(
        Arc::clone(&store),
        scripted_client(archive_json(&[
            "A-1", "A-2", "A-3", "B-1", "B-2", "NEW-1",
        ])),
        FixtureSource::Items(Vec::new()),
    );
    let report = engine.harvest().await.unwrap();
    assert_eq!(report.added, 1);

    let signatures: Vec<String> = engine
        .records()
        .iter()
        .map(|r| r.signature.clone())
        .collect();
    assert_eq!(
        signatures,
        vec!["NEW-1", "A-1", "A-2", "A-3", "B-1", "B-2"]
    );
}

// --- Scenario: signature determinism across adapter runs ---

#[tokio::test]
async fn judicial_resurfacing_same_judgment_dedups_by_signature() {
    let store = memory_store();
    // Judgment 777 has no docketed case number, so its signature is
    // synthesized from the native id — identically on every harvest.
    let engine = build_engine(
        Arc::clone(&store),
        scripted_client(archive_json(&[])),
        FixtureSource::Items(vec![judgment(777, "")]),
    );
    let report = engine.harvest().await.unwrap();
    assert_eq!(report.added, 1);
    assert_eq!(engine.records()[0].signature, "synth:saos-777");

    let report = engine.harvest().await.unwrap();
    assert_eq!(report.added, 0);
    assert_eq!(engine.records().len(), 1);
}
