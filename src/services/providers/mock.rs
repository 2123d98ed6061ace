//! Mock provider for testing.

use super::{DiagnosisProvider, ProviderError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

enum MockReply {
    Text(String),
    Unconfigured,
    Unreachable,
}

/// Mock diagnosis provider with a canned reply and an invocation counter,
/// so tests can assert that failed requests never reach the backend.
pub struct MockDiagnosisProvider {
    reply: MockReply,
    calls: AtomicUsize,
}

impl MockDiagnosisProvider {
    /// Provider that answers every diagnosis with the given text.
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            reply: MockReply::Text(reply.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Provider that behaves like a service with no API key.
    pub fn unconfigured() -> Self {
        Self {
            reply: MockReply::Unconfigured,
            calls: AtomicUsize::new(0),
        }
    }

    /// Provider that behaves like an unreachable backend.
    pub fn unreachable() -> Self {
        Self {
            reply: MockReply::Unreachable,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of diagnose calls received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DiagnosisProvider for MockDiagnosisProvider {
    async fn diagnose(&self, _image: &[u8]) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.reply {
            MockReply::Text(text) => Ok(text.clone()),
            MockReply::Unconfigured => Err(ProviderError::NotConfigured(
                "Mock provider not configured".to_string(),
            )),
            MockReply::Unreachable => Err(ProviderError::NetworkError(
                "Mock backend unreachable".to_string(),
            )),
        }
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        match &self.reply {
            MockReply::Text(_) => Ok(()),
            MockReply::Unconfigured => Err(ProviderError::NotConfigured(
                "Mock provider not configured".to_string(),
            )),
            MockReply::Unreachable => Err(ProviderError::NetworkError(
                "Mock backend unreachable".to_string(),
            )),
        }
    }
}
