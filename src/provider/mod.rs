//! Generative provider layer — configuration, client trait, and the HTTP
//! implementation

mod client;
mod config;
mod http;

pub use client::{
    Citation, GenerateRequest, GenerateResponse, GenerativeClient, MockGenerativeClient,
    ProviderError,
};
pub use config::{ModelTier, ProviderConfig};
pub use http::{HttpGenerativeClient, API_KEY_ENV, DEFAULT_BASE_URL};
