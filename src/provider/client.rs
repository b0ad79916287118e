//! Generative provider client — trait, request/response types, and errors
//!
//! Abstracts over transport (HTTP, mock) so the harvest adapters don't
//! depend on how the provider is reached.

use super::config::ModelTier;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Mutex;
use thiserror::Error;

/// Errors from generative provider calls
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Required credential absent. Raised before any network attempt.
    #[error("provider credential missing")]
    CredentialMissing,

    /// The provider answered with a rate-limit status.
    #[error("provider rate limited")]
    RateLimited,

    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The reply text did not parse as JSON matching the request schema.
    #[error("malformed provider response: {0}")]
    Malformed(String),
}

/// One structured-output generation request
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub tier: ModelTier,
    pub prompt: String,
    pub system_instruction: Option<String>,
    /// JSON schema the provider must shape its reply to
    pub response_schema: Value,
    /// Enable live-web grounding for this request
    pub grounding: bool,
}

impl GenerateRequest {
    pub fn new(tier: ModelTier, prompt: impl Into<String>, response_schema: Value) -> Self {
        Self {
            tier,
            prompt: prompt.into(),
            system_instruction: None,
            response_schema,
            grounding: false,
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_grounding(mut self) -> Self {
        self.grounding = true;
        self
    }
}

/// Citation metadata attached to a grounded reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub title: String,
    pub uri: String,
}

/// A provider reply: a text payload expected to parse as JSON matching
/// the request schema, plus any grounding citations
#[derive(Debug, Clone, Default)]
pub struct GenerateResponse {
    pub text: String,
    pub citations: Vec<Citation>,
}

impl GenerateResponse {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            citations: Vec::new(),
        }
    }
}

/// Client trait for generative provider calls
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Issue one generation request.
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ProviderError>;
}

type MockHandler =
    Box<dyn Fn(&GenerateRequest) -> Result<GenerateResponse, ProviderError> + Send + Sync>;

/// Mock client for tests — answers via a configurable handler and records
/// every request it saw.
pub struct MockGenerativeClient {
    handler: MockHandler,
    seen: Mutex<Vec<GenerateRequest>>,
}

impl MockGenerativeClient {
    /// Mock that answers every request with the same text payload.
    pub fn returning(text: impl Into<String>) -> Self {
        let response = GenerateResponse::from_text(text);
        Self::respond_with(move |_| Ok(response.clone()))
    }

    /// Mock that answers via the given handler.
    pub fn respond_with<F>(handler: F) -> Self
    where
        F: Fn(&GenerateRequest) -> Result<GenerateResponse, ProviderError> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Mock that fails every request.
    pub fn failing<F>(make_error: F) -> Self
    where
        F: Fn() -> ProviderError + Send + Sync + 'static,
    {
        Self::respond_with(move |_| Err(make_error()))
    }

    /// Every request this mock has received, in arrival order.
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.seen.lock().expect("mock request log poisoned").clone()
    }

    pub fn request_count(&self) -> usize {
        self.seen.lock().expect("mock request log poisoned").len()
    }
}

#[async_trait]
impl GenerativeClient for MockGenerativeClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ProviderError> {
        self.seen
            .lock()
            .expect("mock request log poisoned")
            .push(request.clone());
        (self.handler)(request)
    }
}
