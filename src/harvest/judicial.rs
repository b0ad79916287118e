//! Judicial records adapter — raw archive scan plus per-item relevance
//! classification
//!
//! Fetches raw judgments, asks the generative provider a yes/no relevance
//! question per item (with field extraction), and maps confirmed items
//! into canonical records. One item's failure never aborts the batch; the
//! whole adapter is best-effort from the orchestrator's point of view.

use crate::ledger::{signature, CaseRecord, GeoPoint, Priority, Region, UNKNOWN_AMOUNT};
use crate::provider::{
    GenerateRequest, GenerativeClient, ModelTier, ProviderConfig, ProviderError,
};
use super::scan::{JudgmentSource, RawJudgment, ScanError};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Signature prefix for records synthesized from this source
pub const SOURCE_PREFIX: &str = "saos";

/// Upper bound on classification calls per harvest, in provider order
pub const MAX_CLASSIFY_BATCH: usize = 24;

/// Character budget for the judgment text sent to the classifier
pub const TEXT_BUDGET: usize = 8_000;

/// Concurrent classification calls in flight
const CLASSIFY_CONCURRENCY: usize = 4;

/// Court seat used when the provider gives no geolocation of its own
fn default_location() -> GeoPoint {
    GeoPoint {
        lat: 52.2297,
        lng: 21.0122,
        city: "Warsaw".to_string(),
    }
}

/// Classifier verdict for one raw judgment
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Classification {
    is_crypto_crime: bool,
    summary: String,
    amount: String,
    article: String,
    priority: String,
    source_url: String,
}

/// Adapter over the judicial-records provider
pub struct JudicialRecordsAdapter {
    source: Arc<dyn JudgmentSource>,
    client: Arc<dyn GenerativeClient>,
    config: Arc<ProviderConfig>,
    query: String,
}

impl JudicialRecordsAdapter {
    pub fn new(
        source: Arc<dyn JudgmentSource>,
        client: Arc<dyn GenerativeClient>,
        config: Arc<ProviderConfig>,
    ) -> Self {
        Self {
            source,
            client,
            config,
            query: super::scan::DEFAULT_QUERY.to_string(),
        }
    }

    /// Override the full-text scan query.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Fetch, classify, and map raw judgments into canonical records.
    ///
    /// Judgments whose derived signature is already in `exclude` skip the
    /// classification call entirely. A raw-fetch failure propagates; the
    /// orchestrator treats this source as optional.
    pub async fn fetch(
        &self,
        exclude: &HashSet<String>,
    ) -> Result<Vec<CaseRecord>, ScanError> {
        let raw = self.source.fetch_raw(&self.query).await?;

        let candidates: Vec<RawJudgment> = raw
            .into_iter()
            .filter(|item| !exclude.contains(&prospective_signature(item)))
            .take(MAX_CLASSIFY_BATCH)
            .collect();

        let semaphore = Arc::new(Semaphore::new(CLASSIFY_CONCURRENCY));
        let mut tasks: JoinSet<Option<(usize, CaseRecord)>> = JoinSet::new();

        for (index, item) in candidates.into_iter().enumerate() {
            if item.text_content.trim().is_empty() {
                debug!(id = item.id, "skipping judgment without text");
                continue;
            }
            let client = Arc::clone(&self.client);
            let semaphore = Arc::clone(&semaphore);
            let tier = self.config.classify_tier();
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok()?;
                match classify(client.as_ref(), tier, &item).await {
                    Ok(Some(analysis)) => Some((index, into_record(item, analysis))),
                    Ok(None) => {
                        debug!(id = item.id, "classifier rejected judgment");
                        None
                    }
                    Err(err) => {
                        warn!(id = item.id, error = %err, "classification failed, dropping item");
                        None
                    }
                }
            });
        }

        let mut confirmed: Vec<(usize, CaseRecord)> = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            if let Ok(Some(entry)) = joined {
                confirmed.push(entry);
            }
        }
        // Restore provider order lost to fan-out completion order.
        confirmed.sort_by_key(|(index, _)| *index);
        Ok(confirmed.into_iter().map(|(_, record)| record).collect())
    }
}

/// Signature this judgment would get once mapped.
fn prospective_signature(item: &RawJudgment) -> String {
    signature::derive(item.case_number(), SOURCE_PREFIX, item.id)
}

/// Ask the provider whether one judgment is crypto-relevant, extracting
/// descriptive fields at the same time. `Ok(None)` means the classifier
/// rejected the judgment.
async fn classify(
    client: &dyn GenerativeClient,
    tier: ModelTier,
    item: &RawJudgment,
) -> Result<Option<Classification>, ProviderError> {
    let excerpt: String = item.text_content.chars().take(TEXT_BUDGET).collect();
    let prompt = format!(
        "Analyze this Polish court judgment text. Determine whether it involves a \
         cryptocurrency-related crime (theft, fraud, money laundering, tax evasion).\n\n\
         JUDGMENT TEXT:\n{excerpt}"
    );
    let request = GenerateRequest::new(tier, prompt, classification_schema());
    let response = client.generate(&request).await?;

    let analysis: Classification = serde_json::from_str(&response.text)
        .map_err(|e| ProviderError::Malformed(e.to_string()))?;
    // Only the classifier's explicit verdict admits a judgment.
    if analysis.is_crypto_crime {
        Ok(Some(analysis))
    } else {
        Ok(None)
    }
}

fn classification_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "isCryptoCrime": {"type": "BOOLEAN"},
            "summary": {"type": "STRING"},
            "amount": {"type": "STRING"},
            "article": {"type": "STRING"},
            "priority": {"type": "STRING", "enum": ["High", "Medium", "Low"]},
            "sourceUrl": {"type": "STRING"}
        },
        "required": ["isCryptoCrime", "summary", "amount", "article", "priority"]
    })
}

fn into_record(item: RawJudgment, analysis: Classification) -> CaseRecord {
    let mut record = CaseRecord::new(prospective_signature(&item));
    record.court = non_empty(item.court_type.clone(), "Common Court");
    record.date = non_empty(item.judgment_date.clone(), "Unknown");
    record.summary = non_empty(analysis.summary, "Standard judicial record.");
    record.amount = non_empty(analysis.amount, UNKNOWN_AMOUNT);
    record.article = non_empty(analysis.article, "KK");
    record.priority = Priority::parse_lenient(&analysis.priority);
    record.region = Region::Domestic;
    record.source_url = if analysis.source_url.trim().is_empty() {
        item.canonical_url()
    } else {
        analysis.source_url
    };
    record.location = Some(default_location());
    record
}

fn non_empty(value: String, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value
    }
}
