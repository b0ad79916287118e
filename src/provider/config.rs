//! Provider configuration — model tier selection and the rate-limit
//! downgrade latch
//!
//! Owned by the caller and shared by reference with both adapters. The
//! latch replaces the process-global mutable flag of earlier designs:
//! once tripped it applies to every subsequent search call until an
//! explicit `reset()`.

use std::sync::atomic::{AtomicBool, Ordering};

/// Model identity tiers offered by the generative provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    /// High-effort tier used for archival search
    Pro,
    /// Efficient tier used for per-item classification, and for search
    /// after a rate-limit downgrade
    Flash,
}

impl ModelTier {
    /// Provider-native model name for this tier.
    pub fn model_name(self) -> &'static str {
        match self {
            ModelTier::Pro => "gemini-3-pro-preview",
            ModelTier::Flash => "gemini-3-flash-preview",
        }
    }
}

/// Shared provider configuration
#[derive(Debug, Default)]
pub struct ProviderConfig {
    downgraded: AtomicBool,
}

impl ProviderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tier for archival search calls. Flash once downgraded, Pro otherwise.
    pub fn search_tier(&self) -> ModelTier {
        if self.is_downgraded() {
            ModelTier::Flash
        } else {
            ModelTier::Pro
        }
    }

    /// Tier for per-item classification calls. Always the efficient tier.
    pub fn classify_tier(&self) -> ModelTier {
        ModelTier::Flash
    }

    /// Latch the downgrade after a rate-limit response.
    pub fn downgrade(&self) {
        self.downgraded.store(true, Ordering::SeqCst);
    }

    pub fn is_downgraded(&self) -> bool {
        self.downgraded.load(Ordering::SeqCst)
    }

    /// Clear the latch, e.g. after quota or credentials change.
    pub fn reset(&self) {
        self.downgraded.store(false, Ordering::SeqCst);
    }
}
