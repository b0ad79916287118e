//! Raw judicial-records fetch
//!
//! Talks to the public judgments endpoint directly, honoring its paging
//! contract: bounded page count and size, dedup by the provider's native
//! numeric id across pages, early stop on a short page. A first-page
//! failure propagates; failures on later pages keep the partial results.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Default base URL of the judicial-records provider
pub const DEFAULT_BASE_URL: &str = "https://www.saos.org.pl";

/// Default full-text query for the crypto-case scan
pub const DEFAULT_QUERY: &str = "waluta wirtualna kryptowaluta";

/// Upper bound on pages fetched per scan
const MAX_PAGES: usize = 3;

/// Items requested per page
const PAGE_SIZE: usize = 40;

/// Per-call timeout on the judgments endpoint
const FETCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Errors from the raw judgments fetch
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("judgments request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("judgments endpoint returned {status}: {body}")]
    Endpoint { status: u16, body: String },
}

/// A case reference docketed on a judgment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourtCase {
    #[serde(default)]
    pub case_number: String,
}

/// One raw judgment as returned by the provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawJudgment {
    /// Provider-native primary key
    pub id: i64,
    pub court_cases: Vec<CourtCase>,
    pub judgment_date: String,
    pub text_content: String,
    pub court_type: String,
}

impl RawJudgment {
    /// First docketed case number, if the provider supplied a non-empty one.
    pub fn case_number(&self) -> Option<&str> {
        self.court_cases
            .iter()
            .map(|c| c.case_number.trim())
            .find(|n| !n.is_empty())
    }

    /// Canonical public URL for this judgment.
    pub fn canonical_url(&self) -> String {
        format!("{DEFAULT_BASE_URL}/judgments/{}", self.id)
    }
}

#[derive(Deserialize, Default)]
struct JudgmentPage {
    #[serde(default)]
    items: Vec<RawJudgment>,
}

/// Seam for the raw fetch so the adapter can run on fixtures in tests
#[async_trait]
pub trait JudgmentSource: Send + Sync {
    /// Fetch raw judgments for a full-text query.
    async fn fetch_raw(&self, query: &str) -> Result<Vec<RawJudgment>, ScanError>;
}

/// HTTP client for the public judgments endpoint
pub struct ScanClient {
    http: reqwest::Client,
    base_url: String,
}

impl Default for ScanClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .build()
                .unwrap_or_default(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Override the endpoint base URL (no trailing slash required).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn fetch_page(&self, query: &str, page: usize) -> Result<Vec<RawJudgment>, ScanError> {
        let url = format!("{}/api/judgments", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("textContent", query),
                ("pageSize", &PAGE_SIZE.to_string()),
                ("pageNumber", &page.to_string()),
                ("sortingField", "JUDGMENT_DATE"),
                ("sortingDirection", "DESC"),
            ])
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScanError::Endpoint {
                status: status.as_u16(),
                body,
            });
        }

        let body: JudgmentPage = response.json().await?;
        Ok(body.items)
    }
}

#[async_trait]
impl JudgmentSource for ScanClient {
    async fn fetch_raw(&self, query: &str) -> Result<Vec<RawJudgment>, ScanError> {
        let mut gathered: Vec<RawJudgment> = Vec::new();
        let mut seen: HashSet<i64> = HashSet::new();

        for page in 0..MAX_PAGES {
            match self.fetch_page(query, page).await {
                Ok(items) => {
                    let short_page = items.len() < PAGE_SIZE;
                    for item in items {
                        if seen.insert(item.id) {
                            gathered.push(item);
                        }
                    }
                    if short_page {
                        break;
                    }
                }
                Err(err) if page == 0 => return Err(err),
                Err(err) => {
                    warn!(page, error = %err, "page fetch failed, keeping partial results");
                    break;
                }
            }
        }

        debug!(count = gathered.len(), "raw judgments gathered");
        Ok(gathered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_client_trims_trailing_slash() {
        let client = ScanClient::new().with_base_url("http://localhost:4000/");
        assert_eq!(client.base_url, "http://localhost:4000");
    }

    #[test]
    fn raw_judgment_parses_provider_shape() {
        let json = r#"{
            "id": 123456,
            "courtCases": [{"caseNumber": "II AKa 12/23"}],
            "judgmentDate": "2023-06-01",
            "textContent": "Wyrok w sprawie...",
            "courtType": "COMMON",
            "unknownField": true
        }"#;
        let judgment: RawJudgment = serde_json::from_str(json).unwrap();
        assert_eq!(judgment.id, 123456);
        assert_eq!(judgment.case_number(), Some("II AKa 12/23"));
        assert_eq!(judgment.court_type, "COMMON");
    }

    #[test]
    fn missing_fields_default() {
        let judgment: RawJudgment = serde_json::from_str(r#"{"id": 9}"#).unwrap();
        assert_eq!(judgment.case_number(), None);
        assert!(judgment.text_content.is_empty());
    }

    #[test]
    fn blank_case_numbers_are_skipped() {
        let judgment = RawJudgment {
            id: 1,
            court_cases: vec![
                CourtCase {
                    case_number: "  ".into(),
                },
                CourtCase {
                    case_number: "V Ka 7/22".into(),
                },
            ],
            ..Default::default()
        };
        assert_eq!(judgment.case_number(), Some("V Ka 7/22"));
    }

    #[test]
    fn canonical_url_uses_native_id() {
        let judgment = RawJudgment {
            id: 420001,
            ..Default::default()
        };
        assert_eq!(
            judgment.canonical_url(),
            "https://www.saos.org.pl/judgments/420001"
        );
    }
}
