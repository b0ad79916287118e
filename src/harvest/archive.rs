//! Archive search adapter — the generative-search source
//!
//! Issues one grounded structured-output request for cases not already in
//! the ledger and normalizes the reply into canonical records. The
//! exclusion list embedded in the prompt is advisory only — the provider
//! may ignore it, and the orchestrator's merge enforces dedup.

use crate::ledger::{
    CaseRecord, GeoPoint, Priority, Region, PLACEHOLDER_URL, UNKNOWN_AMOUNT,
};
use crate::provider::{
    Citation, GenerateRequest, GenerateResponse, GenerativeClient, ProviderConfig, ProviderError,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Combined cap on exclusion-list entries embedded in the prompt
pub const EXCLUDE_CAP: usize = 50;

/// Result of one archive search: normalized records plus grounding
/// citations
#[derive(Debug, Default)]
pub struct ArchiveHarvest {
    pub records: Vec<CaseRecord>,
    pub citations: Vec<Citation>,
}

/// Adapter over the generative archival search
pub struct ArchiveSearchAdapter {
    client: Arc<dyn GenerativeClient>,
    config: Arc<ProviderConfig>,
}

impl ArchiveSearchAdapter {
    pub fn new(client: Arc<dyn GenerativeClient>, config: Arc<ProviderConfig>) -> Self {
        Self { client, config }
    }

    /// Issue one archival search, excluding already-known signatures.
    ///
    /// A rate-limited attempt latches the tier downgrade and the request
    /// is retried exactly once under the downgraded identity. Every other
    /// failure propagates to the orchestrator.
    pub async fn search(
        &self,
        active: &[String],
        discarded: &[String],
    ) -> Result<ArchiveHarvest, ProviderError> {
        let request = self.build_request(active, discarded);
        match self.client.generate(&request).await {
            Ok(response) => normalize(response),
            Err(ProviderError::RateLimited) => {
                warn!("provider rate limited; downgrading model tier and retrying once");
                self.config.downgrade();
                let retry = self.build_request(active, discarded);
                let response = self.client.generate(&retry).await?;
                normalize(response)
            }
            Err(err) => Err(err),
        }
    }

    fn build_request(&self, active: &[String], discarded: &[String]) -> GenerateRequest {
        let exclude: Vec<&str> = active
            .iter()
            .chain(discarded.iter())
            .take(EXCLUDE_CAP)
            .map(String::as_str)
            .collect();

        let prompt = format!(
            "Perform a deep archival search of Polish and EU judicial records where \
             cryptocurrency intersects with penal codes (Art. 286, 299, 287 KK).\n\
             Target 40-60 unique results.\n\
             Extract the city and approximate GPS coordinates of each court.\n\
             Ensure sourceUrl is a valid link to a legal database or news report.\n\
             Absolutely exclude these signatures already in the ledger: [{}].",
            exclude.join(", ")
        );

        GenerateRequest::new(self.config.search_tier(), prompt, case_list_schema())
            .with_system_instruction(
                "You are a professional researcher of Polish and EU cryptocurrency court \
                 cases. Return only valid JSON matching the provided schema.",
            )
            .with_grounding()
    }
}

/// Structured-output schema for the case list reply
fn case_list_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "cases": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "signature": {"type": "STRING"},
                        "court": {"type": "STRING"},
                        "date": {"type": "STRING"},
                        "summary": {"type": "STRING"},
                        "amount": {"type": "STRING"},
                        "article": {"type": "STRING"},
                        "priority": {"type": "STRING", "enum": ["High", "Medium", "Low"]},
                        "sourceUrl": {"type": "STRING"},
                        "region": {"type": "STRING", "enum": ["Domestic", "Supranational"]},
                        "location": {
                            "type": "OBJECT",
                            "properties": {
                                "lat": {"type": "NUMBER"},
                                "lng": {"type": "NUMBER"},
                                "city": {"type": "STRING"}
                            },
                            "required": ["lat", "lng", "city"]
                        }
                    },
                    "required": ["signature", "court", "date", "summary", "priority", "sourceUrl"]
                }
            }
        },
        "required": ["cases"]
    })
}

/// Wire shape of one case in the provider's structured reply
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WireCase {
    signature: String,
    court: String,
    date: String,
    summary: String,
    amount: String,
    article: String,
    priority: String,
    source_url: String,
    region: String,
    location: Option<WireLocation>,
}

#[derive(Debug, Default, Deserialize)]
struct WireLocation {
    #[serde(default)]
    lat: f64,
    #[serde(default)]
    lng: f64,
    #[serde(default)]
    city: String,
}

#[derive(Debug, Default, Deserialize)]
struct WirePayload {
    #[serde(default)]
    cases: Vec<WireCase>,
}

fn normalize(response: GenerateResponse) -> Result<ArchiveHarvest, ProviderError> {
    let payload: WirePayload = serde_json::from_str(&response.text)
        .map_err(|e| ProviderError::Malformed(e.to_string()))?;

    let records = payload
        .cases
        .into_iter()
        .filter_map(|case| {
            if case.signature.trim().is_empty() {
                debug!("dropping archive case without signature");
                return None;
            }
            Some(into_record(case, &response.citations))
        })
        .collect();

    Ok(ArchiveHarvest {
        records,
        citations: response.citations,
    })
}

fn into_record(case: WireCase, citations: &[Citation]) -> CaseRecord {
    let mut record = CaseRecord::new(case.signature.trim());
    record.court = non_empty(case.court, "Unknown court");
    record.date = non_empty(case.date, "Unknown");
    record.summary = non_empty(case.summary, "No summary supplied.");
    record.amount = non_empty(case.amount, UNKNOWN_AMOUNT);
    record.article = non_empty(case.article, "Unspecified");
    record.priority = Priority::parse_lenient(&case.priority);
    record.region = Region::parse_lenient(&case.region);
    record.source_url = resolve_source_url(&case.source_url, citations);
    record.location = case.location.map(|loc| GeoPoint {
        lat: loc.lat,
        lng: loc.lng,
        city: loc.city,
    });
    record
}

fn non_empty(value: String, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

/// Keep a well-formed absolute URL; otherwise substitute the first
/// citation link, or the placeholder sentinel.
fn resolve_source_url(url: &str, citations: &[Citation]) -> String {
    if is_absolute_url(url) {
        return url.to_string();
    }
    citations
        .iter()
        .map(|c| c.uri.as_str())
        .find(|uri| is_absolute_url(uri))
        .unwrap_or(PLACEHOLDER_URL)
        .to_string()
}

fn is_absolute_url(candidate: &str) -> bool {
    reqwest::Url::parse(candidate)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}
