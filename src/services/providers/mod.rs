//! Diagnosis provider abstraction.
//!
//! A provider turns raw image bytes into the model's textual reply. The
//! trait seam allows swapping the Gemini backend for a mock in tests.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Trait for diagnosis backends (Gemini, mock).
#[async_trait]
pub trait DiagnosisProvider: Send + Sync {
    /// Submit the image for diagnosis and return the model's raw text reply.
    ///
    /// The reply is expected to be JSON matching
    /// [`crate::models::DiagnosisReport`], but enforcing that is the
    /// boundary's job; the provider passes the text through verbatim.
    async fn diagnose(&self, image: &[u8]) -> Result<String, ProviderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ProviderError>;
}
