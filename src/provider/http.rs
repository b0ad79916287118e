//! HTTP provider client speaking the `generateContent` wire format
//!
//! Posts structured-output requests to the Gemini REST endpoint and maps
//! grounding metadata into citations. The credential is checked before
//! any network attempt; HTTP 429 maps to `ProviderError::RateLimited` so
//! the archive adapter can downgrade and retry.

use super::client::{Citation, GenerateRequest, GenerateResponse, GenerativeClient, ProviderError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Default REST endpoint for the generative provider
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variable the credential is read from
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Fallback citation title when a grounding chunk carries none
const CITATION_FALLBACK_TITLE: &str = "Judicial Archive Record";

/// reqwest-backed generative provider client
pub struct HttpGenerativeClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpGenerativeClient {
    /// Create a client with an explicit credential. `None` defers the
    /// failure to the first call, which then fails fast without touching
    /// the network.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    /// Create a client reading the credential from `GEMINI_API_KEY`.
    pub fn from_env() -> Self {
        Self::new(std::env::var(API_KEY_ENV).ok())
    }

    /// Override the endpoint base URL (no trailing slash required).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl GenerativeClient for HttpGenerativeClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ProviderError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::CredentialMissing)?;

        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url,
            request.tier.model_name()
        );
        let body = WireRequest::from(request);

        debug!(model = request.tier.model_name(), grounding = request.grounding, "provider call");
        let response = self
            .http
            .post(&url)
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let wire: WireResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;
        wire.into_response()
    }
}

// --- Wire types -----------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest {
    contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool>>,
    generation_config: WireGenerationConfig,
}

#[derive(Serialize, Deserialize, Default)]
struct WireContent {
    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Serialize, Deserialize, Default)]
struct WirePart {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireTool {
    google_search: Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

impl WireContent {
    fn from_text(text: &str) -> Self {
        Self {
            parts: vec![WirePart {
                text: text.to_string(),
            }],
        }
    }
}

impl From<&GenerateRequest> for WireRequest {
    fn from(request: &GenerateRequest) -> Self {
        Self {
            contents: vec![WireContent::from_text(&request.prompt)],
            system_instruction: request
                .system_instruction
                .as_deref()
                .map(WireContent::from_text),
            tools: request.grounding.then(|| {
                vec![WireTool {
                    google_search: Value::Object(Default::default()),
                }]
            }),
            generation_config: WireGenerationConfig {
                response_mime_type: "application/json",
                response_schema: request.response_schema.clone(),
            },
        }
    }
}

#[derive(Deserialize, Default)]
struct WireResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct WireCandidate {
    #[serde(default)]
    content: WireContent,
    #[serde(default)]
    grounding_metadata: Option<WireGroundingMetadata>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct WireGroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<WireGroundingChunk>,
}

#[derive(Deserialize, Default)]
struct WireGroundingChunk {
    #[serde(default)]
    web: Option<WireWebSource>,
}

#[derive(Deserialize, Default)]
struct WireWebSource {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    uri: Option<String>,
}

impl WireResponse {
    fn into_response(mut self) -> Result<GenerateResponse, ProviderError> {
        if self.candidates.is_empty() {
            return Err(ProviderError::Malformed("no candidates in reply".into()));
        }
        let candidate = self.candidates.remove(0);

        let text: String = candidate
            .content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();
        if text.is_empty() {
            return Err(ProviderError::Malformed("empty candidate text".into()));
        }

        let citations = candidate
            .grounding_metadata
            .map(|meta| {
                meta.grounding_chunks
                    .into_iter()
                    .filter_map(|chunk| chunk.web)
                    .map(|web| Citation {
                        title: web
                            .title
                            .unwrap_or_else(|| CITATION_FALLBACK_TITLE.to_string()),
                        uri: web.uri.unwrap_or_else(|| "#".to_string()),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(GenerateResponse { text, citations })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::config::ModelTier;
    use serde_json::json;

    #[tokio::test]
    async fn missing_credential_fails_before_network() {
        // Base URL points nowhere routable; the call must fail on the
        // credential check, not on connection.
        let client = HttpGenerativeClient::new(None).with_base_url("http://127.0.0.1:1");
        let request = GenerateRequest::new(ModelTier::Pro, "q", json!({"type": "OBJECT"}));
        let err = client.generate(&request).await.unwrap_err();
        assert!(matches!(err, ProviderError::CredentialMissing));
    }

    #[test]
    fn empty_credential_counts_as_missing() {
        assert!(!HttpGenerativeClient::new(Some(String::new())).has_credential());
        assert!(HttpGenerativeClient::new(Some("k".into())).has_credential());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = HttpGenerativeClient::new(Some("k".into()))
            .with_base_url("http://localhost:9999/");
        assert_eq!(client.base_url, "http://localhost:9999");
    }

    #[test]
    fn wire_request_includes_grounding_tool_only_when_asked() {
        let plain = GenerateRequest::new(ModelTier::Flash, "q", json!({"type": "OBJECT"}));
        let body = serde_json::to_value(WireRequest::from(&plain)).unwrap();
        assert!(body.get("tools").is_none());

        let grounded = plain.clone().with_grounding();
        let body = serde_json::to_value(WireRequest::from(&grounded)).unwrap();
        assert_eq!(body["tools"][0]["googleSearch"], json!({}));
    }

    #[test]
    fn wire_request_carries_schema_and_system_instruction() {
        let request = GenerateRequest::new(ModelTier::Pro, "q", json!({"type": "OBJECT"}))
            .with_system_instruction("be terse");
        let body = serde_json::to_value(WireRequest::from(&request)).unwrap();
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be terse");
    }

    #[test]
    fn wire_response_concatenates_parts_and_maps_citations() {
        let wire: WireResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"parts": [{"text": "{\"cases\""}, {"text": ": []}"}]},
                "groundingMetadata": {
                    "groundingChunks": [
                        {"web": {"title": "SAOS", "uri": "https://example.org/1"}},
                        {"web": {"uri": "https://example.org/2"}},
                        {}
                    ]
                }
            }]
        }))
        .unwrap();

        let response = wire.into_response().unwrap();
        assert_eq!(response.text, "{\"cases\": []}");
        assert_eq!(response.citations.len(), 2);
        assert_eq!(response.citations[0].title, "SAOS");
        assert_eq!(response.citations[1].title, CITATION_FALLBACK_TITLE);
    }

    #[test]
    fn wire_response_without_candidates_is_malformed() {
        let wire = WireResponse::default();
        assert!(matches!(
            wire.into_response(),
            Err(ProviderError::Malformed(_))
        ));
    }
}
