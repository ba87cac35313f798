//! Error types surfaced by provider adapters.
//!
//! Mapping problems (missing fields, unparseable numbers, misaligned line
//! items) never show up here: they are absorbed as null values in the
//! normalized record.

use thiserror::Error;

/// Errors returned to callers of an [`OcrProvider`](crate::ocr::OcrProvider).
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The vendor call failed: non-200 status, unreadable body, or the
    /// request never reached the vendor. Carries the vendor's diagnostic text.
    #[error("{0}")]
    ProviderFailure(String),

    /// The feature is permanently disabled for this provider.
    #[error("{0}")]
    DeprecatedFeature(String),

    /// The input document could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProviderError {
    pub fn failure(message: impl Into<String>) -> Self {
        Self::ProviderFailure(message.into())
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        Self::ProviderFailure(format!("request to provider failed: {}", e))
    }
}

/// Result type for provider calls.
pub type Result<T> = std::result::Result<T, ProviderError>;
